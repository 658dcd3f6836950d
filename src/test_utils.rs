//! Shared test utilities: destination types and cursor builders.

use std::io::Write;

use rust_decimal::Decimal;
use tempfile::NamedTempFile;

use crate::cursor::{ColumnType, MemoryCursor, ResultSet};
use crate::schema::{Record, Schema};

/// Create a temporary file containing the given content.
///
/// Used for result set documents and config files.
pub fn create_temp_json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

// =============================================================================
// Destination types
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    pub id: i64,
    pub reference: String,
    pub customer: Option<Customer>,
    pub items: Vec<Item>,
}

impl Record for Order {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .property("Id", |o| &o.id, |o| &mut o.id)
            .property("Reference", |o| &o.reference, |o| &mut o.reference)
            .one("Customer", |o| &mut o.customer)
            .many("Items", |o| &mut o.items)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
}

impl Record for Customer {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .property("Id", |c| &c.id, |c| &mut c.id)
            .property("Name", |c| &c.name, |c| &mut c.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Item {
    pub sku: String,
    pub quantity: i32,
}

impl Record for Item {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .property("Sku", |i| &i.sku, |i| &mut i.sku)
            .property("Quantity", |i| &i.quantity, |i| &mut i.quantity)
    }
}

/// One property and two public fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub label: String,
    pub x: i64,
    pub y: i64,
}

impl Record for Point {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .property("Label", |p| &p.label, |p| &mut p.label)
            .field("X", |p| &p.x, |p| &mut p.x)
            .field("Y", |p| &p.y, |p| &mut p.y)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Priced {
    pub price: Decimal,
}

impl Record for Priced {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new().property("Price", |p| &p.price, |p| &mut p.price)
    }
}

// =============================================================================
// Cursor builders
// =============================================================================

/// Flattened `orders JOIN items` rows as `(Id, Sku, Quantity)`.
pub fn order_rows(rows: &[(i64, &str, i32)]) -> MemoryCursor {
    let mut set = ResultSet::new(vec![
        ("Id", ColumnType::I64),
        ("Sku", ColumnType::Str),
        ("Quantity", ColumnType::I32),
    ]);
    for (id, sku, quantity) in rows {
        set = set.with_row(vec![(*id).into(), (*sku).into(), (*quantity).into()]);
    }
    MemoryCursor::new(vec![set])
}
