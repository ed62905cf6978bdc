use crate::{
    db::{
        Range, Table,
        cql::{column_list, placeholders, quote_column},
    },
    error::{Error, ValidationError},
    record::{Record, fields_and_values, info, to_map},
    value::Value,
};
use chrono::{DateTime, Utc};
use derive_more::Deref;
use std::{cmp::Ordering, fmt};

///
/// Crud
///
/// Key-aware row operations over a `Table`. Statements are generated from
/// the table's key layout and the record's field metadata.
///

#[derive(Deref)]
pub struct Crud<R: Record> {
    table: Table<R>,
}

impl<R: Record> Crud<R> {
    #[must_use]
    pub const fn new(table: Table<R>) -> Self {
        Self { table }
    }

    #[must_use]
    pub const fn table(&self) -> &Table<R> {
        &self.table
    }

    /// Upsert every column of `record`.
    pub fn insert(&self, record: &R) -> Result<(), Error> {
        self.insert_inner(record, None)
    }

    /// Upsert with the row expiring at `expires_at`.
    pub fn insert_with_ttl(&self, record: &R, expires_at: DateTime<Utc>) -> Result<(), Error> {
        self.insert_inner(record, Some(ttl_seconds(expires_at, Utc::now())))
    }

    /// Fetch the row with exactly these key values, partition keys first.
    pub fn get(&self, keys: &[Value]) -> Result<R, Error> {
        let names = self.primary_keys();
        self.check_arity("get", keys.len(), names.len())?;

        let statement = format!(
            "SELECT * FROM {} WHERE {} LIMIT 1",
            self.qualified_name(),
            equalities(&names),
        );

        self.query(statement, keys.to_vec()).fetch_one()
    }

    /// Set every non-key column of the row identified by `record`'s keys.
    pub fn update(&self, record: &R) -> Result<(), Error> {
        let keys = self.key_values("update", record)?;
        let key_names = keys.iter().map(|(name, _)| *name).collect::<Vec<_>>();

        let (names, values) = fields_and_values(record);
        let mut assignments = Vec::new();
        let mut params = Vec::new();

        for (name, value) in names.into_iter().zip(values) {
            if !key_names.iter().any(|key| key.eq_ignore_ascii_case(name)) {
                assignments.push(format!("{} = ?", quote_column(name)));
                params.push(value);
            }
        }
        if assignments.is_empty() {
            return Err(ValidationError::NoValueColumns {
                table: self.name().to_string(),
                op: "update",
            }
            .into());
        }
        params.extend(keys.into_iter().map(|(_, value)| value));

        let statement = format!(
            "UPDATE {} SET {} WHERE {}",
            self.qualified_name(),
            assignments.join(", "),
            equalities(&key_names),
        );

        self.query(statement, params).exec()
    }

    /// Delete the row identified by `record`'s keys.
    pub fn delete(&self, record: &R) -> Result<(), Error> {
        let keys = self.key_values("delete", record)?;
        let (names, params): (Vec<_>, Vec<_>) = keys.into_iter().unzip();

        let statement = format!(
            "DELETE FROM {} WHERE {}",
            self.qualified_name(),
            equalities(&names),
        );

        self.query(statement, params).exec()
    }

    /// Every row matching the leading key values.
    pub fn list(&self, keys: &[Value]) -> Result<Vec<R>, Error> {
        self.range(keys)?.fetch()
    }

    /// Range scan seeded with equality on the leading key values.
    pub fn range(&self, keys: &[Value]) -> Result<Range<R>, Error> {
        let names = self.primary_keys();
        if keys.len() > names.len() {
            return Err(ValidationError::TooManyKeys {
                table: self.name().to_string(),
                op: "list",
                found: keys.len(),
                required: names.len(),
            }
            .into());
        }

        let range = names
            .iter()
            .zip(keys)
            .fold(Range::new(self.table.clone()), |range, (name, value)| {
                range.equal_to(name, value.clone())
            });

        Ok(range)
    }

    fn insert_inner(&self, record: &R, ttl: Option<i32>) -> Result<(), Error> {
        self.check_keys_set("insert", record)?;

        let (names, mut params) = fields_and_values(record);
        let mut statement = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.qualified_name(),
            column_list(&names),
            placeholders(names.len()),
        );

        if let Some(ttl) = ttl {
            statement.push_str(" USING TTL ?");
            params.push(Value::Int(ttl));
        }

        self.query(statement, params).exec()
    }

    // key fields must differ from the record type's default value
    fn check_keys_set(&self, op: &'static str, record: &R) -> Result<(), Error> {
        let info = info::<R>();
        let blank = R::default();

        for key in self.primary_keys() {
            let Some(field) = info.field_normalized(key) else {
                continue;
            };
            let get = R::FIELDS[field.declared_order].get;

            if get(record) == get(&blank) {
                return Err(ValidationError::MissingKey {
                    table: self.name().to_string(),
                    op,
                    key: key.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    // (key name, value) pairs from the record, in primary key order;
    // every key must be present and set
    fn key_values(&self, op: &'static str, record: &R) -> Result<Vec<(&str, Value)>, Error> {
        let info = info::<R>();
        let row = to_map(record);
        let names = self.primary_keys();

        let keys = names
            .iter()
            .filter_map(|&name| {
                let field = info.field_normalized(name)?;
                row.get(field.external_name)
                    .map(|value| (name, value.clone()))
            })
            .collect::<Vec<_>>();

        if keys.len() < names.len() {
            return Err(ValidationError::TooFewKeys {
                table: self.name().to_string(),
                op,
                found: keys.len(),
                required: names.len(),
            }
            .into());
        }
        self.check_keys_set(op, record)?;

        Ok(keys)
    }

    fn check_arity(&self, op: &'static str, found: usize, required: usize) -> Result<(), Error> {
        let table = self.name().to_string();

        let err = match found.cmp(&required) {
            Ordering::Equal => return Ok(()),
            Ordering::Less => ValidationError::TooFewKeys {
                table,
                op,
                found,
                required,
            },
            Ordering::Greater => ValidationError::TooManyKeys {
                table,
                op,
                found,
                required,
            },
        };

        Err(err.into())
    }
}

/// Relative TTL in whole seconds, rounded to nearest, saturating at the
/// bounds of the bound parameter type.
pub(crate) fn ttl_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i32 {
    let millis = (expires_at - now).num_milliseconds();
    let seconds = (millis + 500).div_euclid(1000);

    i32::try_from(seconds).unwrap_or(if seconds < 0 { i32::MIN } else { i32::MAX })
}

// "a" = ? AND "b" = ?
fn equalities<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| format!("{} = ?", quote_column(name.as_ref())))
        .collect::<Vec<_>>()
        .join(" AND ")
}

impl<R: Record> From<Table<R>> for Crud<R> {
    fn from(table: Table<R>) -> Self {
        Self::new(table)
    }
}

impl<R: Record> Clone for Crud<R> {
    fn clone(&self) -> Self {
        Self::new(self.table.clone())
    }
}

impl<R: Record> fmt::Debug for Crud<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Crud").field(&self.table).finish()
    }
}
