//! Statement dialect rendering: identifier quoting and inline literals.

use serde_json::Value as Json;

/// Double-quote an identifier, doubling any embedded quote. Case is kept.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a column name; column names are always lower-cased.
#[must_use]
pub fn quote_column(name: &str) -> String {
    quote_ident(&name.to_lowercase())
}

/// `"keyspace"."table"`
pub(crate) fn qualified(keyspace: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(keyspace), quote_ident(table))
}

/// `?, ?, ?`
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

pub(crate) fn column_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| quote_column(name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a JSON document as an inline map literal: `{'key': value, ...}`
/// with single-quoted strings.
pub(crate) fn map_literal(value: &Json) -> String {
    match value {
        Json::Null => "null".to_string(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => n.to_string(),
        Json::String(s) => quote_string(s),
        Json::Array(items) => {
            let items = items.iter().map(map_literal).collect::<Vec<_>>();
            format!("[{}]", items.join(", "))
        }
        Json::Object(entries) => {
            let entries = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", quote_string(k), map_literal(v)))
                .collect::<Vec<_>>();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
