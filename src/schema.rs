//! Destination type schemas: the binding plans behind object and entity
//! materialization.
//!
//! A destination type implements [`Record`] and lists its members once:
//! scalar members read from columns (`property` / `field`), nested single
//! objects (`one`) and nested collections (`many`). Accessors are plain
//! function pointers, so non-capturing closures work:
//!
//! ```ignore
//! impl Record for Order {
//!     fn schema() -> Schema<Self> {
//!         Schema::<Self>::new()
//!             .property("Id", |o| &o.id, |o| &mut o.id)
//!             .many("Items", |o| &mut o.items)
//!     }
//! }
//! ```
//!
//! [`schema_of`] builds each schema at most once per process.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::cursor::ColumnType;
use crate::entity::{CollectionRelation, EntityDescriptor, MemberCollection, MemberRelation, Relation};
use crate::error::ConfigError;
use crate::value::{ColumnValue, KeyPart, Mismatch, Value};

/// A type that rows can be materialized into.
///
/// `Default` stands in for the parameterless constructor.
pub trait Record: Default + 'static {
    fn schema() -> Schema<Self>;
}

/// How a member was registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Field,
    /// Nested single object.
    One,
    /// Nested collection.
    Many,
}

type SetFn<T> = Box<dyn Fn(&mut T, Value) -> Result<(), Mismatch> + Send + Sync>;
type KeyFn<T> = Box<dyn Fn(&T) -> Option<KeyPart> + Send + Sync>;
type BuildFn<T> = Box<dyn Fn(Option<ChildDescriptor>) -> Result<Box<dyn Relation<T>>, ConfigError> + Send + Sync>;

/// A member filled from a single column.
pub struct ScalarMember<T> {
    name: String,
    kind: MemberKind,
    column_type: ColumnType,
    value_type: &'static str,
    set: SetFn<T>,
    key: KeyFn<T>,
}

impl<T> ScalarMember<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Declared column type the member naturally reads from.
    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    pub fn value_type(&self) -> &'static str {
        self.value_type
    }

    pub fn set(&self, target: &mut T, value: Value) -> Result<(), Mismatch> {
        (self.set)(target, value)
    }

    pub fn key_part(&self, target: &T) -> Option<KeyPart> {
        (self.key)(target)
    }
}

impl<T> fmt::Debug for ScalarMember<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarMember")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("value_type", &self.value_type)
            .finish()
    }
}

/// A caller-supplied child descriptor, type-erased until the relation that
/// owns it checks its type.
pub struct ChildDescriptor {
    pub(crate) descriptor: Box<dyn Any>,
    pub(crate) type_name: &'static str,
}

impl ChildDescriptor {
    pub(crate) fn new<C: Record>(descriptor: EntityDescriptor<C>) -> Self {
        Self {
            descriptor: Box::new(descriptor),
            type_name: type_name::<C>(),
        }
    }
}

/// A nested object or collection member.
pub struct RelationMember<T> {
    name: String,
    kind: MemberKind,
    child_type: &'static str,
    build: BuildFn<T>,
}

impl<T> RelationMember<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn child_type(&self) -> &'static str {
        self.child_type
    }

    /// Builds the graph edge for this member. `None` uses the child type's
    /// default descriptor: no keys and no nested relations.
    pub(crate) fn build(&self, child: Option<ChildDescriptor>) -> Result<Box<dyn Relation<T>>, ConfigError> {
        (self.build)(child)
    }
}

impl<T> fmt::Debug for RelationMember<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationMember")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("child_type", &self.child_type)
            .finish()
    }
}

/// Registered members of a destination type, in declaration order.
pub struct Schema<T> {
    scalars: Vec<ScalarMember<T>>,
    relations: Vec<RelationMember<T>>,
}

impl<T: Record> Schema<T> {
    pub fn new() -> Self {
        Self {
            scalars: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Registers a public settable property.
    pub fn property<F: ColumnValue>(self, name: &str, get: fn(&T) -> &F, get_mut: fn(&mut T) -> &mut F) -> Self {
        self.scalar(name, MemberKind::Property, get, get_mut)
    }

    /// Registers a public field. Fields are only matched against columns when
    /// no property of the type matched any column.
    pub fn field<F: ColumnValue>(self, name: &str, get: fn(&T) -> &F, get_mut: fn(&mut T) -> &mut F) -> Self {
        self.scalar(name, MemberKind::Field, get, get_mut)
    }

    fn scalar<F: ColumnValue>(
        mut self,
        name: &str,
        kind: MemberKind,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self {
        self.scalars.push(ScalarMember {
            name: name.to_string(),
            kind,
            column_type: F::column_type(),
            value_type: type_name::<F>(),
            set: Box::new(move |target: &mut T, value: Value| -> Result<(), Mismatch> {
                *get_mut(target) = F::from_value(value)?;
                Ok(())
            }),
            key: Box::new(move |target: &T| get(target).key_part()),
        });
        self
    }

    /// Registers a nested single object.
    pub fn one<C: Record>(mut self, name: &str, access: fn(&mut T) -> &mut Option<C>) -> Self {
        let member = name.to_string();
        self.relations.push(RelationMember {
            name: member.clone(),
            kind: MemberKind::One,
            child_type: type_name::<C>(),
            build: Box::new(move |child: Option<ChildDescriptor>| -> Result<Box<dyn Relation<T>>, ConfigError> {
                let descriptor = EntityDescriptor::<C>::from_child(child, &member)?;
                let relation: Box<dyn Relation<T>> =
                    Box::new(MemberRelation::new(member.clone(), access, descriptor.build()));
                Ok(relation)
            }),
        });
        self
    }

    /// Registers a nested collection.
    pub fn many<L>(mut self, name: &str, access: fn(&mut T) -> &mut L) -> Self
    where
        L: MemberCollection,
    {
        let member = name.to_string();
        self.relations.push(RelationMember {
            name: member.clone(),
            kind: MemberKind::Many,
            child_type: type_name::<L::Item>(),
            build: Box::new(move |child: Option<ChildDescriptor>| -> Result<Box<dyn Relation<T>>, ConfigError> {
                let descriptor = EntityDescriptor::<L::Item>::from_child(child, &member)?;
                let relation: Box<dyn Relation<T>> =
                    Box::new(CollectionRelation::new(member.clone(), access, descriptor.build()));
                Ok(relation)
            }),
        });
        self
    }
}

impl<T: Record> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Schema<T> {
    pub fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    pub fn scalars(&self) -> &[ScalarMember<T>] {
        &self.scalars
    }

    pub fn relations(&self) -> &[RelationMember<T>] {
        &self.relations
    }

    pub fn scalar_index(&self, name: &str) -> Option<usize> {
        self.scalars.iter().position(|m| m.name == name)
    }

    pub fn relation(&self, name: &str) -> Option<&RelationMember<T>> {
        self.relations.iter().find(|m| m.name == name)
    }

    /// Kind of a registered member, looked up by exact name.
    pub fn member_kind(&self, name: &str) -> Option<MemberKind> {
        self.scalar_index(name)
            .map(|i| self.scalars[i].kind)
            .or_else(|| self.relation(name).map(|m| m.kind))
    }

    pub(crate) fn unknown_member(&self, name: &str) -> ConfigError {
        ConfigError::UnknownMember {
            type_name: self.type_name(),
            member: name.to_string(),
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &type_name::<T>())
            .field("scalars", &self.scalars)
            .field("relations", &self.relations)
            .finish()
    }
}

type Registry = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Cached schema of `T`, built on first use.
pub fn schema_of<T: Record>() -> Arc<Schema<T>> {
    let registry = REGISTRY.get_or_init(Registry::default);
    let cached = registry
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&TypeId::of::<T>())
        .cloned();
    if let Some(schema) = cached.and_then(|any| any.downcast::<Schema<T>>().ok()) {
        return schema;
    }

    // Built outside the lock: a schema may ask for other schemas
    let schema = Arc::new(T::schema());
    let mut registry = registry.write().unwrap_or_else(PoisonError::into_inner);
    let entry = registry
        .entry(TypeId::of::<T>())
        .or_insert_with(|| schema.clone() as Arc<dyn Any + Send + Sync>)
        .clone();
    entry.downcast::<Schema<T>>().unwrap_or(schema)
}
