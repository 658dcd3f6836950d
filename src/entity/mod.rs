//! Entity graphs: nested objects and collections rebuilt from joined rows.
//!
//! An [`EntityDescriptor`] declares, for a root [`Record`](crate::schema::Record)
//! type, its identity key and its nested members. [`EntityDescriptor::build`]
//! freezes that into an [`Entity`], which can materialize any number of
//! queries:
//!
//! 1. On the first row every node binds to its columns. Nodes bind in
//!    depth-first declaration order and never share a column.
//! 2. Each row parses the root's own columns. A root whose key was already
//!    seen is reused instead of appended.
//! 3. Each relation parses its child from the same row. Children whose
//!    columns are all null are skipped; collection children with a key that
//!    is already in the parent's collection are reused; single members are
//!    reassigned, keeping the existing instance when the key matches.

pub mod collection;
mod context;
pub mod descriptor;
mod materializer;
pub mod relation;

pub use collection::MemberCollection;
pub use context::BoundEntity;
pub use descriptor::{Comparator, EntityDescriptor};
pub use materializer::Entity;
pub use relation::{BoundRelation, CollectionRelation, MemberRelation, Relation};
