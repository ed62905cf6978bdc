use proc_macro::TokenStream;

mod attr;
mod record;


/// Derive `cqltable::record::Record` for a struct with named fields.
///
/// Field attributes:
/// - `#[cql(rename = "name")]` sets the column name.
/// - `#[cql("name")]` sets the column name when no rename is given.
/// - `#[cql(skip)]` leaves the field out of every statement.
/// - `#[cql_type = "set"]` hints the column's storage type.
#[proc_macro_derive(Record, attributes(cql, cql_type))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}
