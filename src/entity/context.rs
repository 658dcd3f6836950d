//! Per-query state of one entity node.

use tracing::debug;

use super::descriptor::Comparator;
use super::materializer::Entity;
use super::relation::BoundRelation;
use crate::cursor::Cursor;
use crate::error::MaterializeError;
use crate::object::{ClaimedColumns, ObjectBinding, RowValues};
use crate::schema::Record;

/// An [`Entity`] bound to the columns of the current result set, together
/// with its bound relations.
///
/// Created once per query on the first row and dropped when the query is
/// done; the entity itself is never modified.
pub struct BoundEntity<'e, T: Record> {
    entity: &'e Entity<T>,
    binding: ObjectBinding<T>,
    relations: Vec<Box<dyn BoundRelation<T> + 'e>>,
}

impl<'e, T: Record> BoundEntity<'e, T> {
    /// Binds the node's own members first, then each relation depth-first in
    /// declaration order.
    pub(crate) fn bind(
        entity: &'e Entity<T>,
        cursor: &dyn Cursor,
        claimed: &mut ClaimedColumns,
    ) -> Result<Self, MaterializeError> {
        let binding = ObjectBinding::resolve(entity.schema().clone(), cursor, entity.prefix(), claimed)?;
        let relations = entity
            .relations()
            .iter()
            .map(|relation| relation.bind(cursor, claimed))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            entity = entity.schema().type_name(),
            columns = binding.len(),
            relations = relations.len(),
            "bound entity"
        );
        Ok(Self {
            entity,
            binding,
            relations,
        })
    }

    pub fn comparator(&self) -> &Comparator<T> {
        self.entity.comparator()
    }

    /// Reads this node's own columns from the current row.
    pub fn read(&self, cursor: &dyn Cursor) -> Result<RowValues, MaterializeError> {
        self.binding.read(cursor)
    }

    /// True when the row carries no instance of this node: all key columns
    /// are null, or all bound columns when the node has no key.
    pub fn is_absent(&self, values: &RowValues) -> bool {
        let comparator = self.comparator();
        if comparator.is_keyed() {
            values.is_null_for(comparator.key_indexes())
        } else {
            values.is_null()
        }
    }

    /// A new instance holding `values`, with every relation initialized.
    pub fn fresh(&self, values: RowValues) -> Result<T, MaterializeError> {
        let mut target = T::default();
        self.binding.apply(&mut target, values)?;
        self.entity.initialize(&mut target);
        Ok(target)
    }

    pub fn apply(&self, target: &mut T, values: RowValues) -> Result<(), MaterializeError> {
        self.binding.apply(target, values)
    }

    /// Lets every relation attach its child from the current row.
    pub fn update_relations(&self, target: &mut T, cursor: &dyn Cursor) -> Result<(), MaterializeError> {
        for relation in &self.relations {
            relation.update(target, cursor)?;
        }
        Ok(())
    }
}
