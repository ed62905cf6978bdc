//! ## Crate layout
//! - `db`: keyspace and table handles, statements, CRUD, and range scans.
//! - `error`: the error taxonomy shared by every operation.
//! - `record`: record metadata cache and record ⇄ row mapping.
//! - `session`: the boundary to the client that talks to the store.
//! - `value`: store values and column types.
//!
//! `#[derive(Record)]` generates the field descriptor table a record type
//! needs. The `prelude` module carries the everyday surface.

pub use cqltable_core::{Error, db, error, obs, record, session, traits, types, value};
pub use cqltable_derive::Record;

/// re-exports
///
/// value types the prelude exposes, so callers don't need to depend on
/// them directly
pub mod __reexports {
    pub use chrono;
    pub use uuid;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// `Record` names both the trait and its derive
///

pub mod prelude {
    pub use crate::{
        Record,
        db::{Crud, Iter, Keyspace, Query, Range, Table},
        error::{Error, ErrorClass},
        record::Record,
        session::{Cursor, Session, StoreError},
        traits::FieldValue as _,
        types::Blob,
        value::{Row, Value},
    };
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}
