//! Error types for materialization and entity graph configuration.
//!
//! Runtime failures while reading a cursor surface as [`MaterializeError`];
//! mistakes in an [`EntityDescriptor`](crate::entity::EntityDescriptor) surface
//! as [`ConfigError`] at the call that made them.

use thiserror::Error;

use crate::cursor::CursorError;

/// Failures raised while materializing rows from a cursor.
#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("Cursor is closed; materialization needs an open cursor")]
    CursorClosed,

    #[error("Duplicate column '{name}' in result set; alias one side of the join")]
    DuplicateColumn { name: String },

    #[error("Cannot convert {found} into {expected} for '{member}'")]
    Conversion {
        member: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Cursor(#[from] CursorError),
}

impl MaterializeError {
    /// Builds a conversion failure for a member (or scalar target) name.
    pub fn conversion(member: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::Conversion {
            member: member.into(),
            expected,
            found,
        }
    }
}

/// Mistakes in an entity descriptor, raised while the graph is configured.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("'{member}' is not a member of {type_name}")]
    UnknownMember {
        type_name: &'static str,
        member: String,
    },

    #[error("'{member}' on {type_name} is a scalar member, not a nested object or collection")]
    NotARelation {
        type_name: &'static str,
        member: String,
    },

    #[error("'{member}' on {type_name} has no add operation; it is not a collection")]
    NotACollection {
        type_name: &'static str,
        member: String,
    },

    #[error("'{member}' on {type_name} is a collection; use has_member_collection")]
    NotASingleMember {
        type_name: &'static str,
        member: String,
    },

    #[error("'{member}' holds {expected}, but the descriptor describes {found}")]
    ChildTypeMismatch {
        member: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{member}' cannot be a key of {type_name}: {reason}")]
    InvalidKey {
        type_name: &'static str,
        member: String,
        reason: String,
    },

    #[error("Relation '{member}' on {type_name} is already declared")]
    DuplicateRelation {
        type_name: &'static str,
        member: String,
    },
}
