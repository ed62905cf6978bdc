//! Observability: structured `tracing` events for statements handed to the
//! session. No subscriber is installed here; the host application decides
//! where events go.

use crate::{session::StoreError, value::Value};
use std::fmt;

/// Target shared by every statement event.
pub const STATEMENT_TARGET: &str = "cqltable::statement";

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Exec,
    Fetch,
}

impl fmt::Display for ExecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Exec => "exec",
            Self::Fetch => "fetch",
        };
        write!(f, "{label}")
    }
}

pub(crate) fn statement_sent(kind: ExecKind, statement: &str, params: &[Value]) {
    tracing::debug!(
        target: STATEMENT_TARGET,
        %kind,
        params = params.len(),
        "{statement}"
    );
}

pub(crate) fn statement_failed(statement: &str, params: &[Value], err: &StoreError) {
    let kinds = params.iter().map(Value::kind).collect::<Vec<_>>();

    tracing::warn!(
        target: STATEMENT_TARGET,
        error = %err,
        params = ?kinds,
        "{statement}"
    );
}

pub(crate) fn close_failed(table: &str, err: &StoreError) {
    tracing::warn!(
        target: STATEMENT_TARGET,
        table,
        error = %err,
        "cursor close failed"
    );
}
