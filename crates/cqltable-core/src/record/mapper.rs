use crate::{
    record::{FieldInfo, Record, info},
    value::{Row, Value},
};

// Collection values travel as the kind the field's type hint names.
fn hinted_value(field: &FieldInfo, value: Value) -> Value {
    match field.type_hint {
        Some(hint) if hint.eq_ignore_ascii_case("set") => value.into_set(),
        _ => value,
    }
}

// The inverse of `hinted_value`, applied before a value reaches a setter.
fn unhinted_value(field: &FieldInfo, value: &Value) -> Option<Value> {
    match (field.type_hint, value) {
        (Some(hint), Value::Set(_)) if hint.eq_ignore_ascii_case("set") => {
            Some(value.clone().into_list())
        }
        _ => None,
    }
}

fn assign<R: Record>(record: &mut R, field: &FieldInfo, value: &Value) {
    let set = R::FIELDS[field.declared_order].set;

    if let Some(list) = unhinted_value(field, value)
        && set(record, &list)
    {
        return;
    }

    // a kind mismatch leaves the field untouched
    set(record, value);
}

/// Convert a record into an external-name → value row.
#[must_use]
pub fn to_map<R: Record>(record: &R) -> Row {
    let info = info::<R>();

    info.fields()
        .iter()
        .map(|field| {
            let value = (R::FIELDS[field.declared_order].get)(record);
            (field.external_name.to_string(), hinted_value(field, value))
        })
        .collect()
}

/// Assign every entry of `row` whose key is a known external name and whose
/// value kind matches the field's type. Other entries are ignored.
pub fn to_record<R: Record>(row: &Row, record: &mut R) {
    let info = info::<R>();

    for (name, value) in row {
        if let Some(field) = info.field(name) {
            assign(record, field, value);
        }
    }
}

/// Like `to_record`, but keys are matched to external names ignoring case,
/// the way the store reports lower-cased column names.
pub fn to_record_normalized<R: Record>(row: &Row, record: &mut R) {
    let info = info::<R>();

    for (name, value) in row {
        if let Some(field) = info.field_normalized(name) {
            assign(record, field, value);
        }
    }
}

/// External names and values of `record`, both in declaration order.
#[must_use]
pub fn fields_and_values<R: Record>(record: &R) -> (Vec<&'static str>, Vec<Value>) {
    let info = info::<R>();
    let fields = info.fields();

    let mut names = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());

    for field in fields {
        names.push(field.external_name);
        values.push(hinted_value(
            field,
            (R::FIELDS[field.declared_order].get)(record),
        ));
    }

    (names, values)
}
