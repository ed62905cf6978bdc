//! In-memory `Session` that interprets the statement dialect cqltable emits:
//! keyspace and table DDL, upserting `INSERT`/`UPDATE`, `DELETE`, and
//! `SELECT` with comparisons, `IN`, `ORDER BY`, `LIMIT`, and
//! `ALLOW FILTERING`. Also answers the schema query used to list tables.
//!
//! Intended for tests; nothing is persisted and TTLs never expire.

mod lexer;
mod parser;
mod store;

#[cfg(test)]
mod tests;

use cqltable_core::{
    session::{Cursor, Session, StoreError},
    value::{Row, Value},
};
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
};
use store::Store;
use thiserror::Error as ThisError;

///
/// MemoryError
///
/// Rejections raised by the in-memory store, shaped after the messages a
/// real cluster returns. Reaches callers wrapped in a `StoreError`.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MemoryError {
    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unconfigured table {0}")]
    Unconfigured(String),
}

///
/// MemorySession
///

#[derive(Debug, Default)]
pub struct MemorySession {
    state: Mutex<State>,
    closes: Arc<AtomicUsize>,
}

#[derive(Debug, Default)]
struct State {
    store: Store,
    log: Vec<String>,
    close_error: Option<StoreError>,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Statement text of everything executed or streamed, in order.
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        self.state().log.clone()
    }

    /// Make the next cursor opened report `message` from `close`.
    pub fn fail_next_close(&self, message: impl Into<String>) {
        self.state().close_error = Some(StoreError::msg(message));
    }

    /// Number of cursor `close` calls that reached this session.
    #[must_use]
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Rows currently stored in `keyspace.table`.
    #[must_use]
    pub fn row_count(&self, keyspace: &str, table: &str) -> Option<usize> {
        self.state().store.row_count(keyspace, table)
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .expect("memory session mutex poisoned")
    }

    fn run(&self, statement: &str, params: &[Value]) -> Result<Vec<Row>, MemoryError> {
        let mut state = self.state();
        state.log.push(statement.to_string());

        let parsed = parser::parse_statement(statement)?;
        tracing::trace!(?parsed, params = params.len(), "memory session statement");

        state.store.run(parsed, params)
    }
}

impl Session for MemorySession {
    fn execute(&self, statement: &str, params: &[Value]) -> Result<(), StoreError> {
        self.run(statement, params)
            .map(drop)
            .map_err(StoreError::new)
    }

    fn stream(&self, statement: &str, params: &[Value]) -> Box<dyn Cursor> {
        let (rows, error) = match self.run(statement, params) {
            Ok(rows) => (rows, None),
            Err(err) => (Vec::new(), Some(StoreError::new(err))),
        };
        let close_error = self.state().close_error.take();

        Box::new(MemoryCursor {
            rows: rows.into(),
            error: error.or(close_error),
            closes: Arc::clone(&self.closes),
        })
    }
}

///
/// MemoryCursor
///
/// Holds a fully materialised result. A failed statement yields no rows and
/// reports its error from `close`.
///

struct MemoryCursor {
    rows: VecDeque<Row>,
    error: Option<StoreError>,
    closes: Arc<AtomicUsize>,
}

impl Cursor for MemoryCursor {
    fn scan_row(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.closes.fetch_add(1, Ordering::SeqCst);

        self.error.take().map_or(Ok(()), Err)
    }
}
