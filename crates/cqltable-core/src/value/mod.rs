mod column;
mod compare;

#[cfg(test)]
mod tests;

use crate::types::Blob;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

// re-exports
pub use column::ColumnType;

///
/// Row
///
/// One generic result row keyed by column name, as the store reports it.
///

pub type Row = BTreeMap<String, Value>;

///
/// Value
///
/// Tagged value over the store's primitive kinds. Used for bound statement
/// parameters, decoded row cells, and record field snapshots.
///
/// Null → an unset cell or an `Option::None` field.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    /// Ordered collection; order is preserved.
    List(Vec<Self>),
    /// Unique collection; entries are kept in insertion order as given.
    Set(Vec<Self>),
    Map(Vec<(Self, Self)>),
}

impl Value {
    /// Short label of the value's kind, used in errors and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::TinyInt(_) => "tinyint",
            Self::SmallInt(_) => "smallint",
            Self::Int(_) => "int",
            Self::BigInt(_) => "bigint",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
            Self::Uuid(_) => "uuid",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Store type implied by this runtime value.
    ///
    /// Returns `None` when the value carries no type information:
    /// nulls and empty collections.
    #[must_use]
    pub fn column_type(&self) -> Option<ColumnType> {
        let ty = match self {
            Self::Null => return None,
            Self::Bool(_) => ColumnType::Boolean,
            Self::TinyInt(_) => ColumnType::TinyInt,
            Self::SmallInt(_) => ColumnType::SmallInt,
            Self::Int(_) => ColumnType::Int,
            Self::BigInt(_) => ColumnType::BigInt,
            Self::Float(_) => ColumnType::Float,
            Self::Double(_) => ColumnType::Double,
            Self::Text(_) => ColumnType::Text,
            Self::Blob(_) => ColumnType::Blob,
            Self::Timestamp(_) => ColumnType::Timestamp,
            Self::Uuid(_) => ColumnType::Uuid,
            Self::List(items) => ColumnType::List(Box::new(items.first()?.column_type()?)),
            Self::Set(items) => ColumnType::Set(Box::new(items.first()?.column_type()?)),
            Self::Map(entries) => {
                let (key, value) = entries.first()?;
                ColumnType::Map(Box::new(key.column_type()?), Box::new(value.column_type()?))
            }
        };

        Some(ty)
    }

    /// Re-tag a list as a set; other values pass through.
    #[must_use]
    pub(crate) fn into_set(self) -> Self {
        match self {
            Self::List(items) => Self::Set(items),
            other => other,
        }
    }

    /// Re-tag a set as a list; other values pass through.
    #[must_use]
    pub(crate) fn into_list(self) -> Self {
        match self {
            Self::Set(items) => Self::List(items),
            other => other,
        }
    }
}

// impl_value_from
macro_rules! impl_value_from {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_value_from!(
    bool => Bool,
    i8 => TinyInt,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    f32 => Float,
    f64 => Double,
    String => Text,
    &str => Text,
    DateTime<Utc> => Timestamp,
    Uuid => Uuid,
);

impl From<Blob> for Value {
    fn from(v: Blob) -> Self {
        Self::Blob(v.0)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
