//! Core runtime for cqltable: store values, record metadata and mapping,
//! the session boundary, and the keyspace/table/query surface built on top.
#![warn(unreachable_pub)]

extern crate self as cqltable;

// public exports are one module level down
pub mod db;
pub mod error;
pub mod obs;
pub mod record;
pub mod session;
pub mod traits;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

pub use error::Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No executors, sessions, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{Crud, Keyspace, Range, Table},
        record::Record,
        traits::FieldValue,
        types::Blob,
        value::{Row, Value},
    };
}
