use crate::{
    db::Keyspace,
    obs::STATEMENT_TARGET,
    session::{Cursor, Session, StoreError},
    value::{Row, Value},
};
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tracing::{
    Event, Level, Metadata, Subscriber,
    span::{Attributes, Id, Record},
    subscriber::Interest,
};

/// Keyspace name used by core-only tests.
pub const TEST_KEYSPACE: &str = "test_ks";

///
/// RecordingSession
///
/// Test-only session that records every statement it is handed and serves
/// scripted result sets. Failures can be queued for the next `execute` or
/// the next cursor `close`.
///

#[derive(Default)]
pub struct RecordingSession {
    log: Mutex<Vec<(String, Vec<Value>)>>,
    results: Mutex<VecDeque<Vec<Row>>>,
    exec_error: Mutex<Option<StoreError>>,
    close_error: Mutex<Option<StoreError>>,
    closes: Arc<AtomicUsize>,
}

impl RecordingSession {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Keyspace bound to a fresh recording session.
    #[must_use]
    pub fn keyspace() -> (Arc<Self>, Keyspace) {
        let session = Self::new();
        let keyspace = Keyspace::new(TEST_KEYSPACE, session.clone());

        (session, keyspace)
    }

    /// Queue the rows served by the next `stream` call.
    pub fn push_result(&self, rows: Vec<Row>) {
        self.results.lock().unwrap().push_back(rows);
    }

    pub fn fail_next_exec(&self, message: &str) {
        *self.exec_error.lock().unwrap() = Some(StoreError::msg(message));
    }

    pub fn fail_next_close(&self, message: &str) {
        *self.close_error.lock().unwrap() = Some(StoreError::msg(message));
    }

    /// Every statement handed over so far, in order.
    #[must_use]
    pub fn statements(&self) -> Vec<(String, Vec<Value>)> {
        self.log.lock().unwrap().clone()
    }

    #[must_use]
    pub fn last_statement(&self) -> (String, Vec<Value>) {
        self.statements().pop().expect("no statement recorded")
    }

    /// Number of cursor `close` calls that reached this session.
    #[must_use]
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn record(&self, statement: &str, params: &[Value]) {
        self.log
            .lock()
            .unwrap()
            .push((statement.to_string(), params.to_vec()));
    }
}

impl Session for RecordingSession {
    fn execute(&self, statement: &str, params: &[Value]) -> Result<(), StoreError> {
        self.record(statement, params);

        self.exec_error.lock().unwrap().take().map_or(Ok(()), Err)
    }

    fn stream(&self, statement: &str, params: &[Value]) -> Box<dyn Cursor> {
        self.record(statement, params);

        Box::new(ScriptedCursor {
            rows: self.results.lock().unwrap().pop_front().unwrap_or_default().into(),
            close_error: self.close_error.lock().unwrap().take(),
            closes: Arc::clone(&self.closes),
        })
    }
}

///
/// ScriptedCursor
///

struct ScriptedCursor {
    rows: VecDeque<Row>,
    close_error: Option<StoreError>,
    closes: Arc<AtomicUsize>,
}

impl Cursor for ScriptedCursor {
    fn scan_row(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.closes.fetch_add(1, Ordering::SeqCst);

        self.close_error.take().map_or(Ok(()), Err)
    }
}

/// Build a row from `(column, value)` pairs.
pub fn row<const N: usize>(entries: [(&str, Value); N]) -> Row {
    entries
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .collect()
}

///
/// WarnCounter
///
/// Subscriber counting `warn!` statement events on the current thread.
///

struct WarnCounter(Arc<AtomicUsize>);

impl Subscriber for WarnCounter {
    fn register_callsite(&self, _: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _: &Id, _: &Record<'_>) {}

    fn record_follows_from(&self, _: &Id, _: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let meta = event.metadata();
        if *meta.level() == Level::WARN && meta.target() == STATEMENT_TARGET {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn enter(&self, _: &Id) {}

    fn exit(&self, _: &Id) {}
}

/// Run `f` and return how many statement warnings it logged.
pub fn count_warnings(f: impl FnOnce()) -> usize {
    let count = Arc::new(AtomicUsize::new(0));
    tracing::subscriber::with_default(WarnCounter(Arc::clone(&count)), f);

    count.load(Ordering::SeqCst)
}
