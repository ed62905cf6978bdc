use crate::{
    db::{
        Table,
        cql::{map_literal, quote_ident},
    },
    error::Error,
    obs::{self, ExecKind},
    record::Record,
    session::Session,
    value::Value,
};
use serde::Serialize;
use std::{fmt, sync::Arc};

const LIST_TABLES: &str = "SELECT table_name FROM system_schema.tables WHERE keyspace_name = ?";

///
/// Keyspace
///
/// Named namespace of tables, bound to the session that executes its
/// statements. Cheap to clone; carries no state beyond name and session.
///

#[derive(Clone)]
pub struct Keyspace {
    name: String,
    session: Arc<dyn Session>,
}

impl Keyspace {
    #[must_use]
    pub fn new(name: impl Into<String>, session: Arc<dyn Session>) -> Self {
        Self {
            name: name.into(),
            session,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    /// `CREATE KEYSPACE` with the given replication options.
    ///
    /// The options are serialised through serde and rendered as an inline
    /// map literal, e.g. `{'class': 'SimpleStrategy', 'replication_factor': 1}`.
    pub fn create<T>(&self, replication: &T, durable_writes: bool) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let replication = map_literal(&serde_json::to_value(replication)?);
        let statement = format!(
            "CREATE KEYSPACE {} WITH REPLICATION = {replication} AND DURABLE_WRITES = {durable_writes}",
            quote_ident(&self.name),
        );

        self.execute(&statement, &[])
    }

    /// `DROP KEYSPACE`.
    pub fn drop(&self) -> Result<(), Error> {
        let statement = format!("DROP KEYSPACE {}", quote_ident(&self.name));

        self.execute(&statement, &[])
    }

    /// Names of the tables in this keyspace, from the store's schema tables.
    pub fn tables(&self) -> Result<Vec<String>, Error> {
        let params = [Value::Text(self.name.clone())];
        obs::statement_sent(ExecKind::Fetch, LIST_TABLES, &params);

        let mut cursor = self.session.stream(LIST_TABLES, &params);
        let mut names = Vec::new();
        while let Some(row) = cursor.scan_row() {
            if let Some(name) = row.get("table_name").and_then(Value::as_text) {
                names.push(name.to_string());
            }
        }
        cursor.close().map_err(|err| {
            obs::statement_failed(LIST_TABLES, &params, &err);
            Error::from(err)
        })?;

        Ok(names)
    }

    /// Bind a table handle. No statement is sent.
    #[must_use]
    pub fn new_table<R, P, C>(
        &self,
        name: impl Into<String>,
        partition_keys: P,
        clustering_keys: C,
        row: R,
    ) -> Table<R>
    where
        R: Record,
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Table::new(
            self.clone(),
            name.into(),
            partition_keys.into_iter().map(Into::into).collect(),
            clustering_keys.into_iter().map(Into::into).collect(),
            row,
        )
    }

    pub(crate) fn execute(&self, statement: &str, params: &[Value]) -> Result<(), Error> {
        obs::statement_sent(ExecKind::Exec, statement, params);

        self.session.execute(statement, params).map_err(|err| {
            obs::statement_failed(statement, params, &err);
            Error::from(err)
        })
    }
}

impl fmt::Debug for Keyspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyspace")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
