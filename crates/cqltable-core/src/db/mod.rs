//! Keyspace and table handles, statement execution, and the CRUD and range
//! surfaces built on them.

mod cql;
mod crud;
mod keyspace;
mod query;
mod range;
mod table;


// re-exports
pub use cql::{quote_column, quote_ident};
pub use crud::Crud;
pub use keyspace::Keyspace;
pub use query::{Iter, Query, Rows};
pub use range::{CompareOp, Predicate, Range};
pub use table::Table;
