//! In-memory driver used by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use stela_sql::{Column, Key, Row, SqlBuilder};
use tokio::sync::Notify;

use crate::driver::Driver;
use crate::error::DriverError;

/// Records every statement it receives and serves canned introspection
/// results. `entered`/`release` turn `query` into a rendezvous point for
/// concurrency tests.
#[derive(Default)]
pub(crate) struct MockDriver {
    pub(crate) builder: SqlBuilder,
    pub(crate) log: Mutex<Vec<String>>,
    pub(crate) fail_on: Option<String>,
    pub(crate) fail_rollback: bool,
    pub(crate) columns: Vec<Column>,
    pub(crate) keys: Vec<Key>,
    pub(crate) databases: Vec<String>,
    pub(crate) tables: Vec<String>,
    pub(crate) entered: Option<Notify>,
    pub(crate) release: Option<Notify>,
}

impl MockDriver {
    pub(crate) fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.lock().unwrap().push(entry.into());
    }
}

#[async_trait]
impl Driver for MockDriver {
    fn sql_builder(&self) -> &SqlBuilder {
        &self.builder
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>, DriverError> {
        if let (Some(entered), Some(release)) = (&self.entered, &self.release) {
            entered.notify_one();
            release.notified().await;
        }
        self.record(sql);
        if self.fail_on.as_deref() == Some(sql) {
            return Err(DriverError::message("duplicate column name"));
        }
        Ok(Vec::new())
    }

    async fn begin(&self) -> Result<(), DriverError> {
        self.record("BEGIN");
        Ok(())
    }

    async fn commit(&self) -> Result<(), DriverError> {
        self.record("COMMIT");
        Ok(())
    }

    async fn rollback(&self) -> Result<(), DriverError> {
        self.record("ROLLBACK");
        if self.fail_rollback {
            return Err(DriverError::message("connection lost"));
        }
        Ok(())
    }

    async fn get_columns(
        &self,
        _database_name: &str,
        _table_name: &str,
    ) -> Result<Vec<Column>, DriverError> {
        Ok(self.columns.clone())
    }

    async fn get_keys(
        &self,
        _database_name: &str,
        _table_name: &str,
    ) -> Result<Vec<Key>, DriverError> {
        Ok(self.keys.clone())
    }

    async fn get_databases(&self) -> Result<Vec<String>, DriverError> {
        Ok(self.databases.clone())
    }

    async fn get_tables(&self, _database_name: &str) -> Result<Vec<String>, DriverError> {
        Ok(self.tables.clone())
    }
}
