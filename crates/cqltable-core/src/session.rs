//! Boundary to the external client that actually talks to the store.
//!
//! Connection handling, pooling, retries, and the wire protocol live behind
//! these traits. This crate only builds statements, hands them over, and
//! maps what comes back.

use crate::value::{Row, Value};
use std::{error::Error as StdError, sync::Arc};
use thiserror::Error as ThisError;

///
/// Session
///
/// Blocking statement execution against the store.
///

pub trait Session: Send + Sync {
    /// Execute a statement that produces no rows.
    fn execute(&self, statement: &str, params: &[Value]) -> Result<(), StoreError>;

    /// Open a streaming cursor over a statement's rows.
    ///
    /// Failures are latched by the cursor and reported from `Cursor::close`.
    fn stream(&self, statement: &str, params: &[Value]) -> Box<dyn Cursor>;
}

///
/// Cursor
///
/// Server-side streaming handle over a result set.
///

pub trait Cursor: Send {
    /// Scan the next row into a column-name keyed map.
    /// `None` once the rows are exhausted or the cursor has failed.
    fn scan_row(&mut self) -> Option<Row>;

    /// Release the cursor, reporting any failure seen while streaming.
    fn close(&mut self) -> Result<(), StoreError>;
}

///
/// StoreError
///
/// Opaque error reported by the session: connection, consistency, timeout,
/// syntax. Passed through unchanged; cloneable so a latched close result
/// can be returned more than once.
///

#[derive(Clone, Debug, ThisError)]
#[error(transparent)]
pub struct StoreError(Arc<dyn StdError + Send + Sync>);

impl StoreError {
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    /// Build a store error from a bare message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Message(message.into()))
    }

    #[must_use]
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.0
    }

    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

#[derive(Debug, ThisError)]
#[error("{0}")]
struct Message(String);
