//! Live schema diffing and transactional apply.
//!
//! This crate keeps database tables in line with definitions authored in
//! code. The [`Driver`] trait is the capability boundary: everything
//! above it — the diff engine, [`SchemaSync`], and the dirty-tracked
//! views — works against any driver, and [`MySqlDriver`] binds it to a
//! MySQL connection via sqlx.
//!
//! The flow is read, diff, apply: a driver reports a table's current
//! columns and keys, [`diff_table`] compares them with the desired
//! definition, and [`SchemaSync`] runs the resulting ordered change
//! list inside one transaction.

pub mod apply;
pub mod diff;
pub mod driver;
pub mod error;
pub mod mysql;
#[cfg(test)]
pub(crate) mod testing;
pub mod view;

pub use apply::SchemaSync;
pub use diff::{diff_table, Change, DiffOptions, PossibleRename, TableDiff};
pub use driver::Driver;
pub use error::{DiffError, DriverError, Result, SchemaError, TransactionError};
pub use mysql::MySqlDriver;
pub use view::{ColumnView, TableView, ViewState};
