use super::*;

#[test]
fn from_value_requires_exact_kind() {
    assert_eq!(i64::from_value(&Value::BigInt(7)), Some(7));
    assert_eq!(i64::from_value(&Value::Int(7)), None);
    assert_eq!(i32::from_value(&Value::BigInt(7)), None);
    assert_eq!(String::from_value(&Value::Null), None);
}

#[test]
fn option_maps_null_both_ways() {
    assert_eq!(None::<String>.to_value(), Value::Null);
    assert_eq!(Option::<String>::from_value(&Value::Null), Some(None));
    assert_eq!(
        Option::<String>::from_value(&Value::Text("x".into())),
        Some(Some("x".to_string()))
    );
    assert_eq!(Option::<String>::from_value(&Value::Int(1)), None);
}

#[test]
fn collections_round_trip_and_reject_other_kinds() {
    let tags = vec!["a".to_string(), "b".to_string()];
    let value = tags.to_value();

    assert_eq!(Vec::<String>::from_value(&value), Some(tags));
    assert_eq!(Vec::<String>::from_value(&value.clone().into_set()), None);
    assert_eq!(
        Vec::<String>::from_value(&Value::List(vec![Value::Int(1)])),
        None
    );

    let set: BTreeSet<i32> = [3, 1].into_iter().collect();
    assert_eq!(BTreeSet::<i32>::from_value(&set.to_value()), Some(set));
}

#[test]
fn declared_column_types_nest() {
    assert_eq!(
        Vec::<Uuid>::column_type().map(|t| t.to_string()),
        Some("list<uuid>".to_string())
    );
    assert_eq!(
        BTreeMap::<String, i64>::column_type().map(|t| t.to_string()),
        Some("map<text, bigint>".to_string())
    );
    assert_eq!(
        Option::<DateTime<Utc>>::column_type(),
        Some(ColumnType::Timestamp)
    );
}

#[test]
fn blob_maps_to_blob_value() {
    let blob = Blob::from(&b"\x00\x01"[..]);

    assert_eq!(blob.to_value(), Value::Blob(vec![0, 1]));
    assert_eq!(Blob::from_value(&Value::Blob(vec![0, 1])), Some(blob.clone()));
    assert_eq!(blob.into_inner(), [0, 1]);
}
