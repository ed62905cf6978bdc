use crate::{
    db::{
        Table,
        cql::{column_list, placeholders, quote_column},
    },
    error::Error,
    record::Record,
    value::Value,
};
use derive_more::Display;
use std::fmt;

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum CompareOp {
    #[display("=")]
    Eq,
    #[display("<")]
    Lt,
    #[display("<=")]
    Lte,
    #[display(">")]
    Gt,
    #[display(">=")]
    Gte,
    #[display("IN")]
    In,
}

impl CompareOp {
    /// Inequalities need the store's filtering opt-in.
    #[must_use]
    pub const fn requires_filtering(self) -> bool {
        matches!(self, Self::Lt | Self::Lte | Self::Gt | Self::Gte)
    }
}

///
/// Predicate
///
/// One `WHERE` term. Every operator but `In` binds exactly one value.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: CompareOp,
    pub values: Vec<Value>,
}

impl Predicate {
    fn render(&self) -> String {
        let column = quote_column(&self.column);

        match self.op {
            CompareOp::In => format!("{column} IN ({})", placeholders(self.values.len())),
            op => format!("{column} {op} ?"),
        }
    }
}

///
/// Range
///
/// Scan statement under construction. Every refinement returns a new value,
/// so a partially built range can be reused as the prefix of several scans.
///

pub struct Range<R: Record> {
    table: Table<R>,
    predicates: Vec<Predicate>,
    order: Option<String>,
    limit: Option<u32>,
    columns: Vec<String>,
    requires_filtering: bool,
}

impl<R: Record> Range<R> {
    #[must_use]
    pub const fn new(table: Table<R>) -> Self {
        Self {
            table,
            predicates: Vec::new(),
            order: None,
            limit: None,
            columns: Vec::new(),
            requires_filtering: false,
        }
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    #[must_use]
    pub const fn requires_filtering(&self) -> bool {
        self.requires_filtering
    }

    #[must_use]
    pub fn equal_to(&self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(column, CompareOp::Eq, value.into())
    }

    #[must_use]
    pub fn less_than(&self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(column, CompareOp::Lt, value.into())
    }

    #[must_use]
    pub fn less_or_equal(&self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(column, CompareOp::Lte, value.into())
    }

    #[must_use]
    pub fn more_than(&self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(column, CompareOp::Gt, value.into())
    }

    #[must_use]
    pub fn more_or_equal(&self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(column, CompareOp::Gte, value.into())
    }

    /// One `IN` predicate per column, in iteration order. Columns with no
    /// values are skipped.
    #[must_use]
    pub fn where_in<I, K>(&self, columns: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<Value>)>,
        K: AsRef<str>,
    {
        let mut next = self.clone();
        next.predicates.extend(
            columns
                .into_iter()
                .filter(|(_, values)| !values.is_empty())
                .map(|(column, values)| Predicate {
                    column: column.as_ref().to_string(),
                    op: CompareOp::In,
                    values,
                }),
        );

        next
    }

    /// `ORDER BY` clause body, used verbatim, e.g. `"id DESC"`.
    #[must_use]
    pub fn order_by(&self, spec: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.order = Some(spec.into());
        next
    }

    #[must_use]
    pub fn limit(&self, limit: u32) -> Self {
        let mut next = self.clone();
        next.limit = Some(limit);
        next
    }

    /// Project onto the given columns instead of `*`.
    #[must_use]
    pub fn select_columns<I, S>(&self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.columns = columns.into_iter().map(Into::into).collect();
        next
    }

    /// Compile to statement text and positional parameters.
    #[must_use]
    pub fn statement(&self) -> (String, Vec<Value>) {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            column_list(&self.columns)
        };

        let mut parts = vec![format!(
            "SELECT {columns} FROM {}",
            self.table.qualified_name()
        )];

        if !self.predicates.is_empty() {
            let terms = self
                .predicates
                .iter()
                .map(Predicate::render)
                .collect::<Vec<_>>();
            parts.push(format!("WHERE {}", terms.join(" AND ")));
        }
        if let Some(order) = &self.order {
            parts.push(format!("ORDER BY {order}"));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("LIMIT {limit}"));
        }
        if self.requires_filtering {
            parts.push("ALLOW FILTERING".to_string());
        }

        let values = self
            .predicates
            .iter()
            .flat_map(|predicate| predicate.values.iter().cloned())
            .collect();

        (parts.join(" "), values)
    }

    /// Run the scan and collect every row. The cursor is closed before
    /// returning and its failure, if any, is the result.
    pub fn fetch(&self) -> Result<Vec<R>, Error> {
        let (statement, values) = self.statement();
        let mut iter = self.table.query(statement, values).fetch();

        let rows = iter.rows().collect();
        iter.close()?;

        Ok(rows)
    }

    fn compare(&self, column: &str, op: CompareOp, value: Value) -> Self {
        let mut next = self.clone();
        next.predicates.push(Predicate {
            column: column.to_string(),
            op,
            values: vec![value],
        });
        next.requires_filtering |= op.requires_filtering();

        next
    }
}

impl<R: Record> Clone for Range<R> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            predicates: self.predicates.clone(),
            order: self.order.clone(),
            limit: self.limit,
            columns: self.columns.clone(),
            requires_filtering: self.requires_filtering,
        }
    }
}

impl<R: Record> fmt::Debug for Range<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Range")
            .field("table", &self.table.name())
            .field("predicates", &self.predicates)
            .field("order", &self.order)
            .field("limit", &self.limit)
            .field("columns", &self.columns)
            .field("requires_filtering", &self.requires_filtering)
            .finish()
    }
}
