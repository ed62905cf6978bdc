use crate::{
    MemoryError,
    parser::{RelOp, Relation, Statement, TableName, Term},
};
use cqltable_core::value::{Row, Value};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, btree_map::Entry},
};

const SCHEMA_KEYSPACE: &str = "system_schema";
const SCHEMA_TABLES: &str = "tables";

static NULL: Value = Value::Null;

///
/// Store
///
/// Keyspaces and their tables. Rows are kept grouped by partition, in
/// clustering order.
///

#[derive(Debug, Default)]
pub(crate) struct Store {
    keyspaces: BTreeMap<String, KeyspaceData>,
}

#[derive(Debug, Default)]
struct KeyspaceData {
    tables: BTreeMap<String, TableData>,
}

#[derive(Debug)]
struct TableData {
    columns: Vec<String>,
    partition_keys: Vec<String>,
    clustering_keys: Vec<String>,
    descending: Vec<String>,
    rows: Vec<Row>,
}

impl Store {
    /// Run one statement; only `SELECT` produces rows.
    pub(crate) fn run(
        &mut self,
        statement: Statement,
        params: &[Value],
    ) -> Result<Vec<Row>, MemoryError> {
        let bind = Binder(params);

        match statement {
            Statement::CreateKeyspace { name } => {
                match self.keyspaces.entry(name) {
                    Entry::Occupied(entry) => {
                        return Err(MemoryError::AlreadyExists(format!(
                            "keyspace {}",
                            entry.key()
                        )));
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(KeyspaceData::default());
                    }
                }
                Ok(Vec::new())
            }
            Statement::DropKeyspace { name } => {
                self.keyspaces.remove(&name).ok_or_else(|| {
                    MemoryError::Invalid(format!("keyspace '{name}' does not exist"))
                })?;
                Ok(Vec::new())
            }
            Statement::CreateTable {
                table,
                columns,
                partition_keys,
                clustering_keys,
                descending,
            } => {
                let data =
                    TableData::new(columns, partition_keys, clustering_keys, descending)?;
                let keyspace = self.keyspace_mut(&table)?;

                match keyspace.tables.entry(table.name) {
                    Entry::Occupied(entry) => Err(MemoryError::AlreadyExists(format!(
                        "table {}",
                        entry.key()
                    ))),
                    Entry::Vacant(entry) => {
                        tracing::debug!(table = %entry.key(), "memory table created");
                        entry.insert(data);
                        Ok(Vec::new())
                    }
                }
            }
            Statement::DropTable { table } => {
                let keyspace = self.keyspace_mut(&table)?;
                keyspace
                    .tables
                    .remove(&table.name)
                    .ok_or(MemoryError::Unconfigured(table.name))?;
                Ok(Vec::new())
            }
            Statement::Insert {
                table,
                columns,
                values,
                ttl,
            } => {
                if columns.len() != values.len() {
                    return Err(MemoryError::Invalid(format!(
                        "unmatched column names/values ({} columns, {} values)",
                        columns.len(),
                        values.len()
                    )));
                }
                if let Some(ttl) = &ttl {
                    // expiry is not modelled; the value is only type-checked
                    match bind.term(ttl)? {
                        Value::Int(_) | Value::BigInt(_) => {}
                        other => {
                            return Err(MemoryError::Invalid(format!(
                                "TTL must be an integer, got {}",
                                other.kind()
                            )));
                        }
                    }
                }

                let data = self.table_mut(&table)?;
                let mut row = Row::new();
                for (column, term) in columns.into_iter().zip(&values) {
                    data.check_column(&column)?;
                    row.insert(column, bind.term(term)?);
                }
                data.upsert(row)?;

                Ok(Vec::new())
            }
            Statement::Update {
                table,
                assignments,
                filter,
            } => {
                let data = self.table_mut(&table)?;
                let mut row = Row::new();

                for (column, term) in &assignments {
                    data.check_column(column)?;
                    if data.is_primary_key(column) {
                        return Err(MemoryError::Invalid(format!(
                            "PRIMARY KEY part {column} found in SET part"
                        )));
                    }
                    row.insert(column.clone(), bind.term(term)?);
                }
                for (column, value) in data.full_key(&filter, &bind)? {
                    row.insert(column, value);
                }
                data.upsert(row)?;

                Ok(Vec::new())
            }
            Statement::Delete { table, filter } => {
                let data = self.table_mut(&table)?;
                data.check_delete(&filter)?;

                let relations = bind.relations(&filter)?;
                data.rows.retain(|row| !matches_all(row, &relations));

                Ok(Vec::new())
            }
            Statement::Select {
                table,
                columns,
                filter,
                order,
                limit,
                allow_filtering,
            } => {
                let relations = bind.relations(&filter)?;

                if is_schema_tables(&table) {
                    return Ok(self.schema_tables(&relations));
                }

                let data = self.table(&table)?;
                data.check_select(&filter, &order, allow_filtering)?;
                if let Some(columns) = &columns {
                    for column in columns {
                        data.check_column(column)?;
                    }
                }

                let mut rows = data
                    .rows
                    .iter()
                    .filter(|row| matches_all(row, &relations))
                    .cloned()
                    .collect::<Vec<_>>();

                if !order.is_empty() {
                    rows.sort_by(|a, b| compare_by(a, b, &order));
                }
                if let Some(limit) = limit {
                    rows.truncate(limit);
                }

                let columns = columns.as_ref().unwrap_or(&data.columns);
                Ok(rows.iter().map(|row| project(row, columns)).collect())
            }
        }
    }

    /// Number of rows currently held by a table.
    pub(crate) fn row_count(&self, keyspace: &str, table: &str) -> Option<usize> {
        self.keyspaces
            .get(keyspace)?
            .tables
            .get(table)
            .map(|data| data.rows.len())
    }

    fn schema_tables(&self, relations: &[(String, RelOp, Vec<Value>)]) -> Vec<Row> {
        self.keyspaces
            .iter()
            .flat_map(|(keyspace, data)| {
                data.tables.keys().map(move |table| {
                    Row::from([
                        ("keyspace_name".to_string(), Value::Text(keyspace.clone())),
                        ("table_name".to_string(), Value::Text(table.clone())),
                    ])
                })
            })
            .filter(|row| matches_all(row, relations))
            .collect()
    }

    fn keyspace_mut(&mut self, table: &TableName) -> Result<&mut KeyspaceData, MemoryError> {
        let name = keyspace_of(table)?;

        self.keyspaces
            .get_mut(name)
            .ok_or_else(|| MemoryError::Invalid(format!("keyspace {name} does not exist")))
    }

    fn table(&self, table: &TableName) -> Result<&TableData, MemoryError> {
        let name = keyspace_of(table)?;

        self.keyspaces
            .get(name)
            .and_then(|keyspace| keyspace.tables.get(&table.name))
            .ok_or_else(|| MemoryError::Unconfigured(table.name.clone()))
    }

    fn table_mut(&mut self, table: &TableName) -> Result<&mut TableData, MemoryError> {
        let name = keyspace_of(table)?;

        self.keyspaces
            .get_mut(name)
            .and_then(|keyspace| keyspace.tables.get_mut(&table.name))
            .ok_or_else(|| MemoryError::Unconfigured(table.name.clone()))
    }
}

impl TableData {
    fn new(
        columns: Vec<String>,
        partition_keys: Vec<String>,
        clustering_keys: Vec<String>,
        descending: Vec<String>,
    ) -> Result<Self, MemoryError> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(MemoryError::Invalid(format!(
                    "multiple definition of identifier {column}"
                )));
            }
        }
        for key in partition_keys.iter().chain(&clustering_keys) {
            if !columns.contains(key) {
                return Err(MemoryError::Invalid(format!(
                    "unknown definition {key} referenced in PRIMARY KEY"
                )));
            }
        }
        for column in &descending {
            if !clustering_keys.contains(column) {
                return Err(MemoryError::Invalid(format!(
                    "missing CLUSTERING ORDER for column {column}"
                )));
            }
        }

        Ok(Self {
            columns,
            partition_keys,
            clustering_keys,
            descending,
            rows: Vec::new(),
        })
    }

    fn check_column(&self, column: &str) -> Result<(), MemoryError> {
        if self.columns.iter().any(|c| c == column) {
            Ok(())
        } else {
            Err(MemoryError::Invalid(format!(
                "undefined column name {column}"
            )))
        }
    }

    fn is_primary_key(&self, column: &str) -> bool {
        self.partition_keys
            .iter()
            .chain(&self.clustering_keys)
            .any(|key| key == column)
    }

    fn is_partition_key(&self, column: &str) -> bool {
        self.partition_keys.iter().any(|key| key == column)
    }

    fn key_of<'a>(&self, row: &'a Row) -> Vec<&'a Value> {
        self.partition_keys
            .iter()
            .chain(&self.clustering_keys)
            .map(|key| row.get(key).unwrap_or(&NULL))
            .collect()
    }

    // one equality per primary key column, nothing else
    fn full_key(
        &self,
        filter: &[Relation],
        bind: &Binder<'_>,
    ) -> Result<Vec<(String, Value)>, MemoryError> {
        let mut key = Vec::new();

        for relation in filter {
            if !self.is_primary_key(&relation.column) {
                return Err(MemoryError::Invalid(format!(
                    "non PRIMARY KEY column {} found in WHERE clause of UPDATE",
                    relation.column
                )));
            }
            if relation.op != RelOp::Eq {
                return Err(MemoryError::Invalid(format!(
                    "invalid operator on PRIMARY KEY part {}",
                    relation.column
                )));
            }
            key.push((relation.column.clone(), bind.term(&relation.terms[0])?));
        }

        for column in self.partition_keys.iter().chain(&self.clustering_keys) {
            if !key.iter().any(|(c, _)| c == column) {
                return Err(MemoryError::Invalid(format!(
                    "some PRIMARY KEY parts are missing: {column}"
                )));
            }
        }

        Ok(key)
    }

    fn check_delete(&self, filter: &[Relation]) -> Result<(), MemoryError> {
        for relation in filter {
            if !self.is_primary_key(&relation.column) {
                return Err(MemoryError::Invalid(format!(
                    "non PRIMARY KEY column {} found in WHERE clause of DELETE",
                    relation.column
                )));
            }
        }
        for key in &self.partition_keys {
            let restricted = filter
                .iter()
                .any(|r| &r.column == key && r.op.is_equality());
            if !restricted {
                return Err(MemoryError::Invalid(format!(
                    "some partition key parts are missing: {key}"
                )));
            }
        }

        Ok(())
    }

    // a simplified version of the store's rules for when a scan has to
    // opt into filtering
    fn check_select(
        &self,
        filter: &[Relation],
        order: &[(String, bool)],
        allow_filtering: bool,
    ) -> Result<(), MemoryError> {
        for relation in filter {
            self.check_column(&relation.column)?;
        }

        let partition_restricted = self.partition_keys.iter().all(|key| {
            filter
                .iter()
                .any(|r| &r.column == key && r.op.is_equality())
        });

        for (column, _) in order {
            if !self.clustering_keys.contains(column) {
                return Err(MemoryError::Invalid(
                    "ORDER BY is only supported on the clustering columns of the PRIMARY KEY"
                        .to_string(),
                ));
            }
        }
        if !order.is_empty() && !partition_restricted {
            return Err(MemoryError::Invalid(
                "ORDER BY is only supported when the partition key is restricted by an EQ or an IN"
                    .to_string(),
            ));
        }

        if !allow_filtering && self.needs_filtering(filter, partition_restricted) {
            return Err(MemoryError::Invalid(
                "cannot execute this query as it might involve data filtering; \
                 use ALLOW FILTERING"
                    .to_string(),
            ));
        }

        Ok(())
    }

    fn needs_filtering(&self, filter: &[Relation], partition_restricted: bool) -> bool {
        let regular = filter.iter().any(|r| !self.is_primary_key(&r.column));
        let partition_range = filter
            .iter()
            .any(|r| self.is_partition_key(&r.column) && !r.op.is_equality());
        if regular || partition_range {
            return true;
        }

        let clustering = filter
            .iter()
            .filter(|r| self.clustering_keys.contains(&r.column))
            .collect::<Vec<_>>();
        if clustering.is_empty() {
            return false;
        }
        if !partition_restricted {
            return true;
        }

        // restrictions must cover a prefix, with only the last one a range
        let mut open = false;
        for key in &self.clustering_keys {
            let ops = clustering
                .iter()
                .filter(|r| &r.column == key)
                .map(|r| r.op)
                .collect::<Vec<_>>();

            if ops.is_empty() {
                open = true;
            } else if open {
                return true;
            } else if ops.iter().any(|op| !op.is_equality()) {
                open = true;
            }
        }

        false
    }

    fn upsert(&mut self, row: Row) -> Result<(), MemoryError> {
        for key in self.partition_keys.iter().chain(&self.clustering_keys) {
            if row.get(key).is_none_or(Value::is_null) {
                return Err(MemoryError::Invalid(format!(
                    "invalid null value for PRIMARY KEY part {key}"
                )));
            }
        }

        let existing = self
            .rows
            .iter()
            .position(|stored| self.key_of(stored) == self.key_of(&row));

        match existing {
            Some(i) => self.rows[i].extend(row),
            None => {
                self.rows.push(row);
                self.sort_rows();
            }
        }

        Ok(())
    }

    // partitions in first-write order; rows inside a partition in clustering order
    fn sort_rows(&mut self) {
        let mut partitions: Vec<Vec<Value>> = Vec::new();
        let mut keyed = Vec::with_capacity(self.rows.len());

        for row in self.rows.drain(..) {
            let partition = self
                .partition_keys
                .iter()
                .map(|key| row.get(key).cloned().unwrap_or(Value::Null))
                .collect::<Vec<_>>();
            let index = partitions
                .iter()
                .position(|p| *p == partition)
                .unwrap_or_else(|| {
                    partitions.push(partition);
                    partitions.len() - 1
                });
            keyed.push((index, row));
        }

        let order = self
            .clustering_keys
            .iter()
            .map(|key| (key.clone(), self.descending.contains(key)))
            .collect::<Vec<_>>();

        keyed.sort_by(|(pa, a), (pb, b)| pa.cmp(pb).then_with(|| compare_by(a, b, &order)));
        self.rows = keyed.into_iter().map(|(_, row)| row).collect();
    }
}

///
/// Binder
///
/// Resolves terms against the statement's positional parameters.
///

struct Binder<'a>(&'a [Value]);

impl Binder<'_> {
    fn term(&self, term: &Term) -> Result<Value, MemoryError> {
        match term {
            Term::Param(i) => self.0.get(*i).cloned().ok_or_else(|| {
                MemoryError::Invalid(format!(
                    "expected at least {} bound values, got {}",
                    i + 1,
                    self.0.len()
                ))
            }),
            Term::Literal(value) => Ok(value.clone()),
        }
    }

    fn relations(&self, filter: &[Relation]) -> Result<Vec<(String, RelOp, Vec<Value>)>, MemoryError> {
        filter
            .iter()
            .map(|relation| {
                let values = relation
                    .terms
                    .iter()
                    .map(|term| self.term(term))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok::<_, MemoryError>((relation.column.clone(), relation.op, values))
            })
            .collect()
    }
}

fn keyspace_of(table: &TableName) -> Result<&str, MemoryError> {
    table
        .keyspace
        .as_deref()
        .ok_or_else(|| MemoryError::Invalid("no keyspace has been specified".to_string()))
}

fn is_schema_tables(table: &TableName) -> bool {
    table.keyspace.as_deref() == Some(SCHEMA_KEYSPACE) && table.name == SCHEMA_TABLES
}

fn matches_all(row: &Row, relations: &[(String, RelOp, Vec<Value>)]) -> bool {
    relations.iter().all(|(column, op, values)| {
        let cell = row.get(column).unwrap_or(&NULL);
        let ordering = || {
            if cell.is_null() {
                None
            } else {
                cell.partial_cmp(&values[0])
            }
        };

        match op {
            RelOp::Eq => *cell == values[0],
            RelOp::In => values.contains(cell),
            RelOp::Lt => ordering() == Some(Ordering::Less),
            RelOp::Lte => matches!(ordering(), Some(Ordering::Less | Ordering::Equal)),
            RelOp::Gt => ordering() == Some(Ordering::Greater),
            RelOp::Gte => matches!(ordering(), Some(Ordering::Greater | Ordering::Equal)),
        }
    })
}

fn compare_by(a: &Row, b: &Row, order: &[(String, bool)]) -> Ordering {
    for (column, desc) in order {
        let left = a.get(column).unwrap_or(&NULL);
        let right = b.get(column).unwrap_or(&NULL);
        let ordering = left.partial_cmp(right).unwrap_or(Ordering::Equal);

        let ordering = if *desc { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

// unset columns read back as null
fn project(row: &Row, columns: &[String]) -> Row {
    columns
        .iter()
        .map(|column| {
            let value = row.get(column).cloned().unwrap_or(Value::Null);
            (column.clone(), value)
        })
        .collect()
}
