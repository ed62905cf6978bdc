use crate::{
    db::{
        Keyspace, Query,
        cql::{qualified, quote_column},
    },
    error::{Error, ValidationError},
    record::{Record, info},
    value::{ColumnType, Value},
};
use std::{fmt, sync::Arc};

///
/// Table
///
/// Handle on one table of a keyspace: its name, its key layout, and a
/// prototype record that fixes the column set and column types.
///
/// Key names are external names; partition keys come first, then clustering
/// keys, in the order given.
///

pub struct Table<R: Record> {
    keyspace: Keyspace,
    name: String,
    partition_keys: Vec<String>,
    clustering_keys: Vec<String>,
    row: Arc<R>,
}

impl<R: Record> Table<R> {
    pub(crate) fn new(
        keyspace: Keyspace,
        name: String,
        partition_keys: Vec<String>,
        clustering_keys: Vec<String>,
        row: R,
    ) -> Self {
        Self {
            keyspace,
            name,
            partition_keys,
            clustering_keys,
            row: Arc::new(row),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    #[must_use]
    pub fn partition_keys(&self) -> &[String] {
        &self.partition_keys
    }

    #[must_use]
    pub fn clustering_keys(&self) -> &[String] {
        &self.clustering_keys
    }

    /// Partition keys followed by clustering keys.
    #[must_use]
    pub fn primary_keys(&self) -> Vec<&str> {
        self.partition_keys
            .iter()
            .chain(&self.clustering_keys)
            .map(String::as_str)
            .collect()
    }

    /// The prototype record this table was bound with.
    #[must_use]
    pub fn row(&self) -> &R {
        &self.row
    }

    /// `"keyspace"."table"`
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualified(self.keyspace.name(), &self.name)
    }

    /// `CREATE TABLE` with no extra properties.
    pub fn create(&self) -> Result<(), Error> {
        self.create_with_properties::<&str>(&[])
    }

    /// `CREATE TABLE ... WITH p1 AND p2`, properties passed through verbatim.
    pub fn create_with_properties<S: AsRef<str>>(&self, properties: &[S]) -> Result<(), Error> {
        let statement = self.create_statement(properties)?;

        self.keyspace.execute(&statement, &[])
    }

    /// Render the `CREATE TABLE` statement without sending it.
    ///
    /// Columns follow the prototype's declaration order, typed from a field's
    /// hint, else from its current value, else from its declared Rust type.
    pub fn create_statement<S: AsRef<str>>(&self, properties: &[S]) -> Result<String, Error> {
        if self.partition_keys.is_empty() {
            return Err(ValidationError::MissingPartitionKey {
                table: self.name.clone(),
            }
            .into());
        }

        let info = info::<R>();
        let mut columns = Vec::with_capacity(info.fields().len() + 1);

        for field in info.fields() {
            let descriptor = &R::FIELDS[field.declared_order];
            let value = (descriptor.get)(&self.row);
            let ty = column_type(&value, (descriptor.column_type)(), field.type_hint).ok_or_else(
                || Error::UnmappableType {
                    column: field.external_name.to_string(),
                    kind: value.kind(),
                },
            )?;

            columns.push(format!("{} {ty}", quote_column(field.external_name)));
        }

        columns.push(self.primary_key_clause());

        let mut statement = format!(
            "CREATE TABLE {} ({})",
            self.qualified_name(),
            columns.join(", ")
        );

        if !properties.is_empty() {
            let properties = properties.iter().map(AsRef::as_ref).collect::<Vec<_>>();
            statement.push_str(" WITH ");
            statement.push_str(&properties.join(" AND "));
        }

        Ok(statement)
    }

    /// `DROP TABLE`.
    pub fn drop(&self) -> Result<(), Error> {
        let statement = format!("DROP TABLE {}", self.qualified_name());

        self.keyspace.execute(&statement, &[])
    }

    /// Bind a raw statement to this table, for `exec`, `fetch`, or `fetch_one`.
    #[must_use]
    pub fn query(&self, statement: impl Into<String>, values: Vec<Value>) -> Query<R> {
        Query::new(self.clone(), statement.into(), values)
    }

    // PRIMARY KEY (("p1", "p2"), "c1", "c2")
    fn primary_key_clause(&self) -> String {
        let partition = self
            .partition_keys
            .iter()
            .map(|key| quote_column(key))
            .collect::<Vec<_>>()
            .join(", ");

        let mut parts = vec![format!("({partition})")];
        parts.extend(self.clustering_keys.iter().map(|key| quote_column(key)));

        format!("PRIMARY KEY ({})", parts.join(", "))
    }
}

fn column_type(value: &Value, declared: Option<ColumnType>, hint: Option<&str>) -> Option<ColumnType> {
    let base = value.column_type().or(declared);

    match hint {
        Some(hint) => ColumnType::with_hint(base, hint),
        None => base,
    }
}

impl<R: Record> Clone for Table<R> {
    fn clone(&self) -> Self {
        Self {
            keyspace: self.keyspace.clone(),
            name: self.name.clone(),
            partition_keys: self.partition_keys.clone(),
            clustering_keys: self.clustering_keys.clone(),
            row: Arc::clone(&self.row),
        }
    }
}

impl<R: Record> fmt::Debug for Table<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("keyspace", &self.keyspace.name())
            .field("name", &self.name)
            .field("partition_keys", &self.partition_keys)
            .field("clustering_keys", &self.clustering_keys)
            .finish_non_exhaustive()
    }
}
