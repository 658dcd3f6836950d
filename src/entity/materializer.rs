//! Entity graph materialization over joined rows.
//!
//! Rows are pulled one at a time. On the first row the whole graph binds to
//! the result set's columns; every row then parses the root's own columns,
//! reuses an already materialized root with the same key, and lets each
//! relation attach its child from the same row.

use std::sync::Arc;

use tracing::{debug, trace};

use super::context::BoundEntity;
use super::descriptor::Comparator;
use super::relation::Relation;
use crate::cursor::Cursor;
use crate::dedup::KeyIndex;
use crate::error::MaterializeError;
use crate::object::ClaimedColumns;
use crate::schema::{Record, Schema};

/// Immutable, reusable graph node describing how to materialize `T`.
///
/// Built by [`EntityDescriptor::build`](super::EntityDescriptor::build).
pub struct Entity<T: Record> {
    schema: Arc<Schema<T>>,
    prefix: String,
    comparator: Comparator<T>,
    relations: Vec<Box<dyn Relation<T>>>,
}

impl<T: Record> Entity<T> {
    pub(crate) fn new(
        schema: Arc<Schema<T>>,
        prefix: String,
        comparator: Comparator<T>,
        relations: Vec<Box<dyn Relation<T>>>,
    ) -> Self {
        Self {
            schema,
            prefix,
            comparator,
            relations,
        }
    }

    pub fn schema(&self) -> &Arc<Schema<T>> {
        &self.schema
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn comparator(&self) -> &Comparator<T> {
        &self.comparator
    }

    pub fn relations(&self) -> &[Box<dyn Relation<T>>] {
        &self.relations
    }

    /// Runs every relation's initializer on a fresh instance.
    pub(crate) fn initialize(&self, target: &mut T) {
        for relation in &self.relations {
            relation.initialize(target);
        }
    }

    /// Binds this node and everything below it to the current result set.
    pub fn bind<'e>(
        &'e self,
        cursor: &dyn Cursor,
        claimed: &mut ClaimedColumns,
    ) -> Result<BoundEntity<'e, T>, MaterializeError> {
        BoundEntity::bind(self, cursor, claimed)
    }

    /// Materializes every remaining row of the current result set into root
    /// instances, merging rows that repeat a root's key.
    pub fn parse_all(&self, cursor: &mut dyn Cursor) -> Result<Vec<T>, MaterializeError> {
        if cursor.is_closed() {
            return Err(MaterializeError::CursorClosed);
        }

        let mut roots = Vec::new();
        if !cursor.advance()? || cursor.column_count() == 0 {
            debug!(entity = self.schema.type_name(), "no rows to materialize");
            return Ok(roots);
        }

        let bound = self.bind(&*cursor, &mut ClaimedColumns::new())?;
        let mut index = KeyIndex::new();
        let mut rows = 0usize;
        loop {
            rows += 1;
            let candidate = bound.fresh(bound.read(&*cursor)?)?;
            let position = match self.comparator.key(&candidate) {
                Some(key) => match index.position(&key) {
                    Some(position) => {
                        trace!(row = rows, root = position, "reusing root");
                        position
                    }
                    None => {
                        index.insert(key, roots.len());
                        roots.push(candidate);
                        roots.len() - 1
                    }
                },
                None => {
                    roots.push(candidate);
                    roots.len() - 1
                }
            };
            bound.update_relations(&mut roots[position], &*cursor)?;

            if !cursor.advance()? {
                break;
            }
        }

        debug!(
            entity = self.schema.type_name(),
            rows,
            roots = roots.len(),
            "entity materialization finished"
        );
        Ok(roots)
    }

    /// Materializes the first root.
    ///
    /// Reads the rest of the result set and merges every row that repeats
    /// the first root's key, so the result equals the first element
    /// [`parse_all`](Self::parse_all) would return even when the join rows
    /// of that root are not contiguous. Rows of other roots are consumed
    /// and dropped. Returns `(false, T::default())` when there is no row.
    pub fn parse_single(&self, cursor: &mut dyn Cursor) -> Result<(bool, T), MaterializeError> {
        if cursor.is_closed() {
            return Err(MaterializeError::CursorClosed);
        }
        if !cursor.advance()? || cursor.column_count() == 0 {
            return Ok((false, T::default()));
        }

        let bound = self.bind(&*cursor, &mut ClaimedColumns::new())?;
        let mut root = bound.fresh(bound.read(&*cursor)?)?;
        let first_key = self.comparator.key(&root);
        bound.update_relations(&mut root, &*cursor)?;

        // Without a key no later row can belong to the first root
        if let Some(first_key) = first_key {
            let mut skipped = 0usize;
            while cursor.advance()? {
                let candidate = bound.fresh(bound.read(&*cursor)?)?;
                if self.comparator.key(&candidate).as_ref() != Some(&first_key) {
                    skipped += 1;
                    continue;
                }
                bound.update_relations(&mut root, &*cursor)?;
            }
            trace!(skipped, "rows of other roots dropped");
        }
        Ok((true, root))
    }
}

impl<T: Record> Default for Entity<T> {
    /// Graph with no keys and no relations: one flat instance per row.
    fn default() -> Self {
        super::EntityDescriptor::new().build()
    }
}
