//! Flat object materializer.
//!
//! Matches column names case-insensitively against the scalar members of a
//! [`Record`] once per query and replays the resulting plan by position on
//! every row. Properties are tried first; fields only when no property
//! matched a column. Columns nobody claims are ignored.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::classify::{classify_columns, ClassifiedColumn};
use crate::cursor::{Cursor, CursorError};
use crate::error::MaterializeError;
use crate::schema::{schema_of, MemberKind, Record, Schema};
use crate::value::Value;

/// Column ordinals already bound to some member.
///
/// Shared by every node of an entity graph while it binds, so a column can
/// only ever feed one member of the graph.
#[derive(Debug, Clone, Default)]
pub struct ClaimedColumns {
    ordinals: HashSet<usize>,
}

impl ClaimedColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_claimed(&self, ordinal: usize) -> bool {
        self.ordinals.contains(&ordinal)
    }

    /// Returns false if the ordinal was already claimed.
    pub fn claim(&mut self, ordinal: usize) -> bool {
        self.ordinals.insert(ordinal)
    }

    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }
}

/// Values of one row for the members of one binding, as
/// `(member index, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowValues(Vec<(usize, Value)>);

impl RowValues {
    /// True when nothing was bound or every bound column is null.
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|(_, value)| value.is_null())
    }

    /// True when every bound column of the given members is null. When none
    /// of them is bound this is [`is_null`](Self::is_null).
    pub fn is_null_for(&self, members: &[usize]) -> bool {
        let mut selected = self.0.iter().filter(|(member, _)| members.contains(member)).peekable();
        if selected.peek().is_none() {
            return self.is_null();
        }
        selected.all(|(_, value)| value.is_null())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
struct BoundColumn {
    member: usize,
    column: ClassifiedColumn,
}

/// Per-query plan mapping columns of the current result set to scalar
/// members of `T`.
#[derive(Debug)]
pub struct ObjectBinding<T> {
    schema: Arc<Schema<T>>,
    columns: Vec<BoundColumn>,
}

impl<T: Record> ObjectBinding<T> {
    /// Binds the members of `T` to the columns named `prefix + member`.
    ///
    /// Each member takes the first matching column (by ordinal) that is not
    /// claimed yet, and claims it.
    pub fn resolve(
        schema: Arc<Schema<T>>,
        cursor: &dyn Cursor,
        prefix: &str,
        claimed: &mut ClaimedColumns,
    ) -> Result<Self, MaterializeError> {
        let classified = classify_columns(cursor)?;
        let lowered: Vec<String> = classified.iter().map(|c| c.column.name.to_lowercase()).collect();

        let mut columns = bind_members(&schema, &classified, &lowered, prefix, MemberKind::Property, claimed);
        if columns.is_empty() {
            columns = bind_members(&schema, &classified, &lowered, prefix, MemberKind::Field, claimed);
        }

        debug!(
            target_type = schema.type_name(),
            prefix,
            bound = columns.len(),
            "resolved object binding"
        );
        Ok(Self { schema, columns })
    }

    pub fn schema(&self) -> &Arc<Schema<T>> {
        &self.schema
    }

    /// Number of bound columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Names of the bound members, in binding order.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|b| self.schema.scalars()[b.member].name())
    }

    /// Reads the bound columns of the current row.
    pub fn read(&self, cursor: &dyn Cursor) -> Result<RowValues, MaterializeError> {
        let values = self
            .columns
            .iter()
            .map(|bound| Ok((bound.member, bound.column.read(cursor)?)))
            .collect::<Result<Vec<_>, CursorError>>()?;
        Ok(RowValues(values))
    }

    /// Stores row values into their members.
    pub fn apply(&self, target: &mut T, values: RowValues) -> Result<(), MaterializeError> {
        for (index, value) in values.0 {
            let member = &self.schema.scalars()[index];
            member
                .set(target, value)
                .map_err(|m| MaterializeError::conversion(member.name(), m.expected, m.found))?;
        }
        Ok(())
    }

    /// Reads the current row into a fresh `T`.
    pub fn materialize(&self, cursor: &dyn Cursor) -> Result<T, MaterializeError> {
        let mut target = T::default();
        self.apply(&mut target, self.read(cursor)?)?;
        Ok(target)
    }
}

fn bind_members<T>(
    schema: &Schema<T>,
    classified: &[ClassifiedColumn],
    lowered: &[String],
    prefix: &str,
    kind: MemberKind,
    claimed: &mut ClaimedColumns,
) -> Vec<BoundColumn> {
    let mut bound = Vec::new();
    for (member, scalar) in schema.scalars().iter().enumerate() {
        if scalar.kind() != kind {
            continue;
        }
        let wanted = format!("{}{}", prefix, scalar.name()).to_lowercase();
        let found = classified
            .iter()
            .zip(lowered)
            .find(|(column, name)| **name == wanted && !claimed.is_claimed(column.column.ordinal));
        if let Some((column, _)) = found {
            claimed.claim(column.column.ordinal);
            bound.push(BoundColumn {
                member,
                column: column.clone(),
            });
        }
    }
    bound
}

/// Materializes every remaining row of the current result set as a `T`.
pub fn parse_all<T: Record>(cursor: &mut dyn Cursor) -> Result<Vec<T>, MaterializeError> {
    if cursor.is_closed() {
        return Err(MaterializeError::CursorClosed);
    }

    let mut items = Vec::new();
    if !cursor.advance()? || cursor.column_count() == 0 {
        return Ok(items);
    }
    let binding = ObjectBinding::resolve(schema_of::<T>(), &*cursor, "", &mut ClaimedColumns::new())?;
    loop {
        items.push(binding.materialize(&*cursor)?);
        trace!(row = items.len(), "materialized object row");
        if !cursor.advance()? {
            break;
        }
    }
    debug!(rows = items.len(), "object materialization finished");
    Ok(items)
}

/// Materializes the next row only; `(false, T::default())` when there is none.
pub fn parse_single<T: Record>(cursor: &mut dyn Cursor) -> Result<(bool, T), MaterializeError> {
    if cursor.is_closed() {
        return Err(MaterializeError::CursorClosed);
    }
    if !cursor.advance()? || cursor.column_count() == 0 {
        return Ok((false, T::default()));
    }
    let binding = ObjectBinding::resolve(schema_of::<T>(), &*cursor, "", &mut ClaimedColumns::new())?;
    Ok((true, binding.materialize(&*cursor)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{ColumnType, MemoryCursor, ResultSet};
    use crate::test_utils::{Item, Point};
    use rstest::{fixture, rstest};

    #[fixture]
    fn items() -> MemoryCursor {
        MemoryCursor::new(vec![
            ResultSet::new(vec![
                ("SKU", ColumnType::Str),
                ("quantity", ColumnType::I32),
                ("Colour", ColumnType::Str),
                ("Weight", ColumnType::Other("measure".into())),
            ])
            .with_row(vec!["A".into(), Value::I32(2), "red".into(), "1kg".into()])
            .with_row(vec!["B".into(), Value::Null, "blue".into(), Value::Null]),
        ])
    }

    #[rstest]
    fn test_columns_match_members_ignoring_case(mut items: MemoryCursor) {
        let parsed: Vec<Item> = parse_all(&mut items).unwrap();
        assert_eq!(
            parsed,
            vec![
                Item {
                    sku: "A".into(),
                    quantity: 2,
                },
                Item {
                    sku: "B".into(),
                    quantity: 0,
                },
            ]
        );
    }

    #[rstest]
    fn test_fields_used_when_no_property_matches() {
        let mut cursor = MemoryCursor::new(vec![
            ResultSet::new(vec![("x", ColumnType::I64), ("Y", ColumnType::I64)])
                .with_row(vec![3i64.into(), 4i64.into()]),
        ]);
        let (found, point) = parse_single::<Point>(&mut cursor).unwrap();
        assert!(found);
        assert_eq!(point, Point { label: String::new(), x: 3, y: 4 });
    }

    #[rstest]
    fn test_fields_ignored_when_a_property_matches() {
        let mut cursor = MemoryCursor::new(vec![
            ResultSet::new(vec![("Label", ColumnType::Str), ("X", ColumnType::I64)])
                .with_row(vec!["origin".into(), 9i64.into()]),
        ]);
        let (_, point) = parse_single::<Point>(&mut cursor).unwrap();
        assert_eq!(point.label, "origin");
        assert_eq!(point.x, 0);
    }

    #[rstest]
    fn test_conversion_error_names_member() {
        let mut cursor = MemoryCursor::new(vec![
            ResultSet::new(vec![("Quantity", ColumnType::Str)]).with_row(vec!["lots".into()]),
        ]);
        let err = parse_all::<Item>(&mut cursor).unwrap_err();
        assert!(matches!(err, MaterializeError::Conversion { ref member, .. } if member == "Quantity"));
    }

    #[rstest]
    fn test_prefix_and_claimed_columns() {
        let mut cursor = MemoryCursor::new(vec![
            ResultSet::new(vec![
                ("Sku", ColumnType::Str),
                ("item_sku", ColumnType::Str),
                ("Sku", ColumnType::Str),
            ])
            .with_row(vec!["root".into(), "prefixed".into(), "second".into()]),
        ]);
        cursor.advance().unwrap();
        let schema = schema_of::<Item>();
        let mut claimed = ClaimedColumns::new();

        let prefixed = ObjectBinding::resolve(schema.clone(), &cursor, "item_", &mut claimed).unwrap();
        let plain = ObjectBinding::resolve(schema.clone(), &cursor, "", &mut claimed).unwrap();
        let again = ObjectBinding::resolve(schema, &cursor, "", &mut claimed).unwrap();

        assert_eq!(prefixed.materialize(&cursor).unwrap().sku, "prefixed");
        assert_eq!(plain.materialize(&cursor).unwrap().sku, "root");
        assert_eq!(again.materialize(&cursor).unwrap().sku, "second");
        assert_eq!(claimed.len(), 3);
    }

    #[rstest]
    fn test_row_values_null_detection() {
        assert!(RowValues::default().is_null());
        assert!(RowValues(vec![(0, Value::Null)]).is_null());
        assert!(!RowValues(vec![(0, Value::Null), (1, Value::I32(1))]).is_null());

        let null_key = RowValues(vec![(0, Value::Null), (1, Value::I32(5))]);
        assert!(null_key.is_null_for(&[0]));
        assert!(!null_key.is_null_for(&[1]));
        // Unbound members fall back to every column
        assert!(!null_key.is_null_for(&[7]));
    }

    #[rstest]
    fn test_single_and_empty(items: MemoryCursor) {
        let mut first = items;
        let (found, single) = parse_single::<Item>(&mut first).unwrap();
        assert!(found);
        assert_eq!(single.sku, "A");

        let mut empty = MemoryCursor::new(vec![ResultSet::new(vec![("Sku", ColumnType::Str)])]);
        assert_eq!(parse_single::<Item>(&mut empty).unwrap(), (false, Item::default()));
        assert!(parse_all::<Item>(&mut empty).unwrap().is_empty());
    }
}
