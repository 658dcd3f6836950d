//! Graph edges: nested single members and nested collections.
//!
//! A [`Relation`] is the immutable, reusable edge built by a descriptor. For
//! each query it is bound against the result set's columns, producing a
//! [`BoundRelation`] that updates parent instances row by row.

use tracing::trace;

use super::collection::MemberCollection;
use super::context::BoundEntity;
use super::materializer::Entity;
use crate::cursor::Cursor;
use crate::error::MaterializeError;
use crate::object::ClaimedColumns;
use crate::schema::Record;

/// Immutable edge from a parent type `P` to one of its nested members.
pub trait Relation<P>: Send + Sync {
    /// Name of the parent member this relation fills.
    fn member(&self) -> &str;

    fn is_collection(&self) -> bool;

    /// Runs once on every freshly materialized parent, before anything is
    /// attached to it.
    fn initialize(&self, parent: &mut P);

    /// Binds the child entity (and its own relations) to the current result
    /// set, claiming the columns it uses.
    fn bind<'e>(
        &'e self,
        cursor: &dyn Cursor,
        claimed: &mut ClaimedColumns,
    ) -> Result<Box<dyn BoundRelation<P> + 'e>, MaterializeError>;
}

/// A relation bound to one query's columns.
pub trait BoundRelation<P> {
    /// Reads the child's columns from the current row and attaches the child
    /// to `parent`.
    fn update(&self, parent: &mut P, cursor: &dyn Cursor) -> Result<(), MaterializeError>;
}

/// Nested single object stored as `Option<C>`.
pub struct MemberRelation<P, C: Record> {
    member: String,
    access: fn(&mut P) -> &mut Option<C>,
    child: Entity<C>,
}

impl<P, C: Record> MemberRelation<P, C> {
    pub fn new(member: String, access: fn(&mut P) -> &mut Option<C>, child: Entity<C>) -> Self {
        Self { member, access, child }
    }

    pub fn child(&self) -> &Entity<C> {
        &self.child
    }
}

impl<P: 'static, C: Record> Relation<P> for MemberRelation<P, C> {
    fn member(&self) -> &str {
        &self.member
    }

    fn is_collection(&self) -> bool {
        false
    }

    fn initialize(&self, _parent: &mut P) {}

    fn bind<'e>(
        &'e self,
        cursor: &dyn Cursor,
        claimed: &mut ClaimedColumns,
    ) -> Result<Box<dyn BoundRelation<P> + 'e>, MaterializeError> {
        let child = self.child.bind(cursor, claimed)?;
        Ok(Box::new(BoundMember { relation: self, child }))
    }
}

struct BoundMember<'e, P, C: Record> {
    relation: &'e MemberRelation<P, C>,
    child: BoundEntity<'e, C>,
}

impl<P, C: Record> BoundRelation<P> for BoundMember<'_, P, C> {
    fn update(&self, parent: &mut P, cursor: &dyn Cursor) -> Result<(), MaterializeError> {
        let values = self.child.read(cursor)?;
        if self.child.is_absent(&values) {
            trace!(member = %self.relation.member, "no child in row");
            return Ok(());
        }

        let candidate = self.child.fresh(values.clone())?;
        let slot = (self.relation.access)(parent);
        match slot.as_mut() {
            // Same identity: keep the instance, take this row's values
            Some(existing) if self.child.comparator().equals(existing, &candidate) => {
                self.child.apply(existing, values)?;
                self.child.update_relations(existing, cursor)
            }
            _ => {
                let child = slot.insert(candidate);
                self.child.update_relations(child, cursor)
            }
        }
    }
}

/// Nested collection of `L::Item`.
pub struct CollectionRelation<P, L: MemberCollection> {
    member: String,
    access: fn(&mut P) -> &mut L,
    child: Entity<L::Item>,
}

impl<P, L: MemberCollection> CollectionRelation<P, L> {
    pub fn new(member: String, access: fn(&mut P) -> &mut L, child: Entity<L::Item>) -> Self {
        Self { member, access, child }
    }

    pub fn child(&self) -> &Entity<L::Item> {
        &self.child
    }
}

impl<P: 'static, L: MemberCollection> Relation<P> for CollectionRelation<P, L> {
    fn member(&self) -> &str {
        &self.member
    }

    fn is_collection(&self) -> bool {
        true
    }

    fn initialize(&self, parent: &mut P) {
        (self.access)(parent).initialize();
    }

    fn bind<'e>(
        &'e self,
        cursor: &dyn Cursor,
        claimed: &mut ClaimedColumns,
    ) -> Result<Box<dyn BoundRelation<P> + 'e>, MaterializeError> {
        let child = self.child.bind(cursor, claimed)?;
        Ok(Box::new(BoundCollection { relation: self, child }))
    }
}

struct BoundCollection<'e, P, L: MemberCollection> {
    relation: &'e CollectionRelation<P, L>,
    child: BoundEntity<'e, L::Item>,
}

impl<P, L: MemberCollection> BoundRelation<P> for BoundCollection<'_, P, L> {
    fn update(&self, parent: &mut P, cursor: &dyn Cursor) -> Result<(), MaterializeError> {
        let values = self.child.read(cursor)?;
        if self.child.is_absent(&values) {
            trace!(member = %self.relation.member, "no child in row");
            return Ok(());
        }

        let candidate = self.child.fresh(values)?;
        let collection = (self.relation.access)(parent);
        let comparator = self.child.comparator();
        let existing = if comparator.is_keyed() {
            collection.position(&|item: &L::Item| comparator.equals(item, &candidate))
        } else {
            None
        };

        match existing.and_then(|index| collection.get_mut(index)) {
            Some(child) => self.child.update_relations(child, cursor),
            None => {
                let mut child = candidate;
                self.child.update_relations(&mut child, cursor)?;
                collection.add(child);
                trace!(member = %self.relation.member, len = collection.len(), "attached child");
                Ok(())
            }
        }
    }
}
