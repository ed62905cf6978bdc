use super::*;
use std::cmp::Ordering;

#[test]
fn column_type_follows_runtime_value() {
    assert_eq!(Value::Int(1).column_type(), Some(ColumnType::Int));
    assert_eq!(Value::BigInt(1).column_type(), Some(ColumnType::BigInt));
    assert_eq!(
        Value::Text("a".into()).column_type(),
        Some(ColumnType::Text)
    );
    assert_eq!(
        Value::Uuid(Uuid::nil()).column_type(),
        Some(ColumnType::Uuid)
    );
    assert_eq!(Value::Null.column_type(), None);
}

#[test]
fn collection_column_type_needs_an_element() {
    assert_eq!(Value::List(vec![]).column_type(), None);

    let list = Value::List(vec![Value::Text("x".into())]);
    assert_eq!(list.column_type().unwrap().to_string(), "list<text>");

    let map = Value::Map(vec![(Value::Text("k".into()), Value::BigInt(3))]);
    assert_eq!(map.column_type().unwrap().to_string(), "map<text, bigint>");
}

#[test]
fn hint_retags_collections() {
    let base = Some(ColumnType::List(Box::new(ColumnType::Text)));

    assert_eq!(
        ColumnType::with_hint(base.clone(), "set"),
        Some(ColumnType::Set(Box::new(ColumnType::Text)))
    );
    assert_eq!(
        ColumnType::with_hint(base, "counter"),
        Some(ColumnType::Custom("counter".into()))
    );
    assert_eq!(ColumnType::with_hint(Some(ColumnType::Int), "set"), None);
}

#[test]
fn same_kind_values_order_naturally() {
    assert_eq!(
        Value::BigInt(1).partial_cmp(&Value::BigInt(2)),
        Some(Ordering::Less)
    );
    assert_eq!(
        Value::Text("b".into()).partial_cmp(&Value::Text("a".into())),
        Some(Ordering::Greater)
    );
    assert_eq!(Value::Null.partial_cmp(&Value::Int(0)), Some(Ordering::Less));
}

#[test]
fn mixed_kinds_are_incomparable() {
    assert_eq!(Value::Int(1).partial_cmp(&Value::BigInt(1)), None);
    assert_ne!(Value::Int(1), Value::BigInt(1));
}

#[test]
fn option_converts_to_null() {
    assert_eq!(Value::from(None::<i32>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
}
