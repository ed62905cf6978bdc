use super::Value;
use std::cmp::Ordering;

// Values of the same kind are ordered the way the store orders them.
// Values of different kinds are incomparable; null sorts before everything.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Null, _) => Some(Ordering::Less),
            (_, Self::Null) => Some(Ordering::Greater),

            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            (Self::TinyInt(a), Self::TinyInt(b)) => a.partial_cmp(b),
            (Self::SmallInt(a), Self::SmallInt(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            (Self::BigInt(a), Self::BigInt(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Blob(a), Self::Blob(b)) => a.partial_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.partial_cmp(b),
            (Self::Uuid(a), Self::Uuid(b)) => a.partial_cmp(b),

            (Self::List(a), Self::List(b)) | (Self::Set(a), Self::Set(b)) => {
                a.iter().partial_cmp(b.iter())
            }
            (Self::Map(a), Self::Map(b)) => a.iter().partial_cmp(b.iter()),

            _ => None,
        }
    }
}
