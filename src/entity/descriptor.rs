//! Fluent configuration of entity graphs.
//!
//! ```ignore
//! let orders = EntityDescriptor::<Order>::new()
//!     .has_key("Id")?
//!     .has_member_collection_with("Items", EntityDescriptor::<Item>::new().has_key("Sku")?)?
//!     .build();
//! let result = orders.parse_all(&mut cursor)?;
//! ```
//!
//! Members are selected by the names they were registered under in the
//! type's [`Schema`]. Every mistake is reported by the call that made it.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use super::materializer::Entity;
use super::relation::Relation;
use crate::error::ConfigError;
use crate::schema::{schema_of, ChildDescriptor, MemberKind, Record, Schema};
use crate::value::Key;

/// Identity of a type's instances, derived from its key members.
///
/// With no key members nothing is ever equal, so nothing is deduplicated.
pub struct Comparator<T> {
    schema: Arc<Schema<T>>,
    keys: Vec<usize>,
}

impl<T> Comparator<T> {
    pub fn is_keyed(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Scalar member indexes of the key, in declaration order.
    pub fn key_indexes(&self) -> &[usize] {
        &self.keys
    }

    pub fn key_members(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|&i| self.schema.scalars()[i].name())
    }

    /// Compares key members in declaration order, stopping at the first
    /// difference.
    pub fn equals(&self, a: &T, b: &T) -> bool {
        self.is_keyed()
            && self.keys.iter().all(|&i| {
                let member = &self.schema.scalars()[i];
                member.key_part(a) == member.key_part(b)
            })
    }

    /// Hashable form of the identity; `None` when there are no key members.
    pub fn key(&self, target: &T) -> Option<Key> {
        if !self.is_keyed() {
            return None;
        }
        self.keys
            .iter()
            .map(|&i| self.schema.scalars()[i].key_part(target))
            .collect::<Option<Vec<_>>>()
            .map(Key)
    }
}

impl<T> fmt::Debug for Comparator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.key_members()).finish()
    }
}

/// Builder describing how to materialize `T` and its nested members.
pub struct EntityDescriptor<T: Record> {
    schema: Arc<Schema<T>>,
    prefix: String,
    keys: Vec<usize>,
    relations: Vec<Box<dyn Relation<T>>>,
}

impl<T: Record> EntityDescriptor<T> {
    /// Descriptor with no keys, no relations and no column prefix.
    pub fn new() -> Self {
        Self {
            schema: schema_of::<T>(),
            prefix: String::new(),
            keys: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Declares a nested single object with the child type's default
    /// descriptor.
    pub fn has_member(self, name: &str) -> Result<Self, ConfigError> {
        self.add_relation(name, MemberKind::One, None)
    }

    /// Declares a nested single object described by `child`.
    pub fn has_member_with<C: Record>(self, name: &str, child: EntityDescriptor<C>) -> Result<Self, ConfigError> {
        self.add_relation(name, MemberKind::One, Some(ChildDescriptor::new(child)))
    }

    /// Declares a nested collection with the item type's default descriptor.
    /// Without keys on the item type, every row appends a new item.
    pub fn has_member_collection(self, name: &str) -> Result<Self, ConfigError> {
        self.add_relation(name, MemberKind::Many, None)
    }

    /// Declares a nested collection whose items are described by `child`.
    pub fn has_member_collection_with<C: Record>(
        self,
        name: &str,
        child: EntityDescriptor<C>,
    ) -> Result<Self, ConfigError> {
        self.add_relation(name, MemberKind::Many, Some(ChildDescriptor::new(child)))
    }

    /// Adds a member to the identity key. Call repeatedly for a composite key.
    pub fn has_key(mut self, name: &str) -> Result<Self, ConfigError> {
        let Some(index) = self.schema.scalar_index(name) else {
            if self.schema.relation(name).is_some() {
                return Err(self.invalid_key(name, "nested objects and collections cannot be keys".into()));
            }
            return Err(self.schema.unknown_member(name));
        };

        let member = &self.schema.scalars()[index];
        if !member.column_type().is_key_compatible() {
            let reason = format!("{} is not a key type", member.value_type());
            return Err(self.invalid_key(name, reason));
        }
        if !self.keys.contains(&index) {
            self.keys.push(index);
        }
        Ok(self)
    }

    /// Matches this node's members against columns named `prefix + member`.
    pub fn with_column_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Freezes the descriptor into a reusable graph.
    pub fn build(self) -> Entity<T> {
        let comparator = Comparator {
            schema: self.schema.clone(),
            keys: self.keys,
        };
        Entity::new(self.schema, self.prefix, comparator, self.relations)
    }

    /// Unwraps a caller-supplied child descriptor, or makes a default one.
    pub(crate) fn from_child(child: Option<ChildDescriptor>, member: &str) -> Result<Self, ConfigError> {
        let Some(child) = child else {
            return Ok(Self::new());
        };
        let found = child.type_name;
        child
            .descriptor
            .downcast::<Self>()
            .map(|descriptor| *descriptor)
            .map_err(|_| ConfigError::ChildTypeMismatch {
                member: member.to_string(),
                expected: type_name::<T>(),
                found,
            })
    }

    fn add_relation(mut self, name: &str, kind: MemberKind, child: Option<ChildDescriptor>) -> Result<Self, ConfigError> {
        let type_name = self.schema.type_name();
        let Some(member) = self.schema.relation(name) else {
            if self.schema.scalar_index(name).is_some() {
                return Err(ConfigError::NotARelation {
                    type_name,
                    member: name.to_string(),
                });
            }
            return Err(self.schema.unknown_member(name));
        };

        match (kind, member.kind()) {
            (MemberKind::One, MemberKind::Many) => {
                return Err(ConfigError::NotASingleMember {
                    type_name,
                    member: name.to_string(),
                })
            }
            (MemberKind::Many, MemberKind::One) => {
                return Err(ConfigError::NotACollection {
                    type_name,
                    member: name.to_string(),
                })
            }
            _ => {}
        }
        if self.relations.iter().any(|relation| relation.member() == name) {
            return Err(ConfigError::DuplicateRelation {
                type_name,
                member: name.to_string(),
            });
        }

        let relation = member.build(child)?;
        self.relations.push(relation);
        Ok(self)
    }

    fn invalid_key(&self, name: &str, reason: String) -> ConfigError {
        ConfigError::InvalidKey {
            type_name: self.schema.type_name(),
            member: name.to_string(),
            reason,
        }
    }
}

impl<T: Record> Default for EntityDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}
