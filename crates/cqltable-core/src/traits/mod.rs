#[cfg(test)]
mod tests;

use crate::{
    types::Blob,
    value::{ColumnType, Value},
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

///
/// FieldValue
///
/// Conversion boundary between a record field's Rust type and `Value`.
///
/// `from_value` is strict: it accepts only the exact value kind the type
/// maps to and returns `None` for anything else, including other integer
/// widths. Callers treat `None` as "leave the field untouched".
///

pub trait FieldValue: Sized {
    fn to_value(&self) -> Value;

    #[must_use]
    fn from_value(value: &Value) -> Option<Self>;

    /// Column type declared by the Rust type itself, if any.
    #[must_use]
    fn column_type() -> Option<ColumnType> {
        None
    }
}

// impl_field_value
macro_rules! impl_field_value {
    ( $( $type:ty => $variant:ident : $column:ident ),* $(,)? ) => {
        $(
            impl FieldValue for $type {
                #[allow(clippy::clone_on_copy)]
                fn to_value(&self) -> Value {
                    Value::$variant(self.clone().into())
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone().into()),
                        _ => None,
                    }
                }

                fn column_type() -> Option<ColumnType> {
                    Some(ColumnType::$column)
                }
            }
        )*
    };
}

impl_field_value!(
    bool => Bool: Boolean,
    i8 => TinyInt: TinyInt,
    i16 => SmallInt: SmallInt,
    i32 => Int: Int,
    i64 => BigInt: BigInt,
    f32 => Float: Float,
    f64 => Double: Double,
    String => Text: Text,
    Blob => Blob: Blob,
    DateTime<Utc> => Timestamp: Timestamp,
    Uuid => Uuid: Uuid,
);

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }

        T::from_value(value).map(Some)
    }

    fn column_type() -> Option<ColumnType> {
        T::column_type()
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        let Value::List(items) = value else {
            return None;
        };

        items.iter().map(T::from_value).collect()
    }

    fn column_type() -> Option<ColumnType> {
        T::column_type().map(|inner| ColumnType::List(Box::new(inner)))
    }
}

impl<T: FieldValue + Ord> FieldValue for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::Set(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        let Value::Set(items) = value else {
            return None;
        };

        items.iter().map(T::from_value).collect()
    }

    fn column_type() -> Option<ColumnType> {
        T::column_type().map(|inner| ColumnType::Set(Box::new(inner)))
    }
}

impl<K: FieldValue + Ord, V: FieldValue> FieldValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: &Value) -> Option<Self> {
        let Value::Map(entries) = value else {
            return None;
        };

        entries
            .iter()
            .map(|(k, v)| Some((K::from_value(k)?, V::from_value(v)?)))
            .collect()
    }

    fn column_type() -> Option<ColumnType> {
        Some(ColumnType::Map(
            Box::new(K::column_type()?),
            Box::new(V::column_type()?),
        ))
    }
}
