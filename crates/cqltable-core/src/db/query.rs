use crate::{
    db::Table,
    error::Error,
    obs::{self, ExecKind},
    record::{Record, to_record_normalized},
    session::{Cursor, StoreError},
    value::Value,
};
use std::{fmt, iter::FusedIterator, marker::PhantomData};

///
/// Query
///
/// A statement bound to a table's session, keyspace, and record type.
///

pub struct Query<R: Record> {
    table: Table<R>,
    statement: String,
    values: Vec<Value>,
}

impl<R: Record> Query<R> {
    pub(crate) const fn new(table: Table<R>, statement: String, values: Vec<Value>) -> Self {
        Self {
            table,
            statement,
            values,
        }
    }

    #[must_use]
    pub fn statement(&self) -> &str {
        &self.statement
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Execute without reading rows.
    pub fn exec(&self) -> Result<(), Error> {
        self.table
            .keyspace()
            .execute(&self.statement, &self.values)
    }

    /// Open a streaming iterator over the result rows.
    #[must_use]
    pub fn fetch(&self) -> Iter<R> {
        obs::statement_sent(ExecKind::Fetch, &self.statement, &self.values);

        let cursor = self
            .table
            .keyspace()
            .session()
            .stream(&self.statement, &self.values);

        Iter::new(self.table.name().to_string(), cursor)
    }

    /// First row of the result, or `Error::NotFound` when there is none.
    ///
    /// The cursor is always closed; a close failure takes precedence over
    /// the row.
    pub fn fetch_one(&self) -> Result<R, Error> {
        let mut iter = self.fetch();
        let row = iter.next_row();
        iter.close()?;

        row.ok_or_else(|| Error::NotFound {
            table: self.table.name().to_string(),
        })
    }
}

impl<R: Record> fmt::Debug for Query<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("table", &self.table.name())
            .field("statement", &self.statement)
            .field("values", &self.values)
            .finish()
    }
}

///
/// CursorState
///

enum CursorState {
    Open(Box<dyn Cursor>),
    Closed(Result<(), StoreError>),
}

///
/// Iter
///
/// Streaming reader over a fetched statement. Rows are decoded one at a
/// time into fresh records; the underlying cursor stays open until the
/// rows run out or the iterator is closed or dropped.
///

pub struct Iter<R: Record> {
    table: String,
    state: CursorState,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Iter<R> {
    fn new(table: String, cursor: Box<dyn Cursor>) -> Self {
        Self {
            table,
            state: CursorState::Open(cursor),
            _record: PhantomData,
        }
    }

    /// Decode the next row, or `None` once the rows are exhausted.
    /// Columns are matched to fields ignoring case.
    pub fn next_row(&mut self) -> Option<R> {
        let CursorState::Open(cursor) = &mut self.state else {
            return None;
        };

        let row = cursor.scan_row()?;
        let mut record = R::default();
        to_record_normalized(&row, &mut record);

        Some(record)
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.state, CursorState::Closed(_))
    }

    /// Close the cursor and report the first failure seen while streaming.
    /// A failure is also logged, once.
    ///
    /// Idempotent: later calls return the same result without touching the
    /// session again.
    pub fn close(&mut self) -> Result<(), Error> {
        let result = match &mut self.state {
            CursorState::Open(cursor) => {
                let result = cursor.close();
                if let Err(err) = &result {
                    obs::close_failed(&self.table, err);
                }
                self.state = CursorState::Closed(result.clone());
                result
            }
            CursorState::Closed(result) => result.clone(),
        };

        result.map_err(Error::from)
    }

    /// Borrow as a standard iterator of records.
    pub const fn rows(&mut self) -> Rows<'_, R> {
        Rows { iter: self }
    }
}

impl<R: Record> Drop for Iter<R> {
    fn drop(&mut self) {
        if !self.is_closed() {
            // failures are logged by close
            let _ = self.close();
        }
    }
}

impl<R: Record> fmt::Debug for Iter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("table", &self.table)
            .field("closed", &self.is_closed())
            .finish()
    }
}

///
/// Rows
///
/// `Iterator` view of an `Iter`. The cursor is released as soon as the rows
/// run out; `cancel` releases it early.
///

pub struct Rows<'a, R: Record> {
    iter: &'a mut Iter<R>,
}

impl<R: Record> Rows<'_, R> {
    /// Stop reading and release the cursor.
    pub fn cancel(self) -> Result<(), Error> {
        self.iter.close()
    }
}

impl<R: Record> Iterator for Rows<'_, R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        let row = self.iter.next_row();
        if row.is_none() {
            // latched; surfaced by Iter::close
            let _ = self.iter.close();
        }

        row
    }
}

impl<R: Record> FusedIterator for Rows<'_, R> {}
