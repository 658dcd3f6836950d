//! rowmapper - materialize tabular query results into values, maps and
//! object graphs.
//!
//! The crate sits between a database driver and application code. A driver
//! exposes its result sets through [`cursor::Cursor`]; the materializers turn
//! them into:
//!
//! - scalars, one per row ([`scalar`])
//! - ordered column name to value maps and dynamic records ([`map`])
//! - flat destination objects ([`object`])
//! - object graphs assembled from joined rows, with parents and children
//!   deduplicated by key ([`entity`])
//!
//! Destination types describe their members once through [`schema::Record`].

pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod cursor;
pub mod dedup;
pub mod entity;
pub mod error;
pub mod logging;
pub mod map;
pub mod object;
pub mod output;
pub mod scalar;
pub mod schema;
pub mod value;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod test_utils;

pub use cursor::{Column, ColumnType, Cursor, CursorError, MemoryCursor, ResultSet};
pub use entity::{Entity, EntityDescriptor, MemberCollection};
pub use error::{ConfigError, MaterializeError};
pub use map::{DynamicRecord, RowMap};
pub use schema::{Record, Schema};
pub use value::{ColumnValue, Value};
