//! Record metadata and record ⇄ row mapping.
//!
//! A record type describes its fields once, as a static descriptor table
//! (usually generated by `#[derive(Record)]`). The metadata cache resolves
//! external names from that table on first use, and the mapper converts
//! between record instances and generic rows through it.

mod info;
mod mapper;


use crate::value::{ColumnType, Value};

// re-exports
pub use info::{FieldInfo, RecordTypeInfo, info};
pub use mapper::{fields_and_values, to_map, to_record, to_record_normalized};

///
/// Record
///
/// A plain struct whose named fields map to store columns.
///
/// `Default` supplies both the fresh instance rows are decoded into and the
/// zero values that key fields are checked against.
///

pub trait Record: Default + 'static {
    /// Field descriptors in declaration order.
    const FIELDS: &'static [FieldDescriptor<Self>];
}

///
/// FieldDescriptor
///
/// Static description of one record field: its naming annotations, its
/// storage-type hint, and accessor functions over the record.
///

pub struct FieldDescriptor<R> {
    /// Field name as declared in the struct.
    pub ident: &'static str,

    /// Explicit rename annotation, `#[cql(rename = "...")]`.
    pub rename: Option<&'static str>,

    /// Unnamed annotation, `#[cql("...")]`.
    pub alias: Option<&'static str>,

    /// Storage-type hint, `#[cql_type = "..."]`.
    pub type_hint: Option<&'static str>,

    /// Column type declared by the field's Rust type.
    pub column_type: fn() -> Option<ColumnType>,

    pub get: fn(&R) -> Value,

    /// Assigns the value when its kind matches the field type; reports
    /// whether it did.
    pub set: fn(&mut R, &Value) -> bool,
}

impl<R> FieldDescriptor<R> {
    /// External name: rename, then unnamed annotation, then declared name.
    #[must_use]
    pub fn external_name(&self) -> &'static str {
        self.rename.or(self.alias).unwrap_or(self.ident)
    }
}
