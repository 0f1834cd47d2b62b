//! Transactional application of schema change lists.

use std::sync::atomic::{AtomicBool, Ordering};

use stela_sql::Table;
use tracing::{debug, info, warn};

use crate::diff::{diff_table, DiffOptions, TableDiff};
use crate::driver::Driver;
use crate::error::{Result, SchemaError, TransactionError};

/// Applies schema changes over a [`Driver`], one transaction at a time.
///
/// The driver holds a single connection, so overlapping transactions
/// would interleave statements. A second call while a transaction is in
/// flight fails fast with [`TransactionError::AlreadyActive`] instead of
/// queuing.
pub struct SchemaSync<D> {
    driver: D,
    in_flight: AtomicBool,
}

impl<D: Driver> SchemaSync<D> {
    /// Wraps a driver.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Returns the wrapped driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Runs the given statements inside one transaction.
    ///
    /// On a statement failure the transaction is rolled back and the
    /// failed statement surfaces in the error. A failed rollback
    /// preserves both causes.
    pub async fn apply_statements(&self, statements: &[String]) -> Result<(), TransactionError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            return Err(TransactionError::AlreadyActive);
        }
        let result = self.run_transaction(statements).await;
        self.in_flight.store(false, Ordering::Release);
        result
    }

    async fn run_transaction(&self, statements: &[String]) -> Result<(), TransactionError> {
        self.driver.begin().await?;
        for statement in statements {
            debug!(%statement, "applying");
            if let Err(cause) = self.driver.query(statement).await {
                let failed = TransactionError::StatementFailed {
                    statement: statement.clone(),
                    cause,
                };
                warn!(%statement, "statement failed, rolling back");
                return match self.driver.rollback().await {
                    Ok(()) => Err(failed),
                    Err(cause) => Err(TransactionError::RollbackFailed {
                        original: Box::new(failed),
                        cause,
                    }),
                };
            }
        }
        self.driver.commit().await?;
        Ok(())
    }

    /// Brings a table on the server in line with the desired definition.
    ///
    /// Reads the current columns and keys, diffs them against `desired`,
    /// and applies the resulting change list in one transaction. The
    /// computed diff is returned so the caller can inspect what was
    /// applied and whether any possible renames were withheld.
    pub async fn update_table(
        &self,
        database_name: &str,
        desired: &Table,
        options: &DiffOptions,
    ) -> Result<TableDiff, SchemaError> {
        let columns = self
            .driver
            .get_columns(database_name, &desired.name)
            .await?;
        let keys = self.driver.get_keys(database_name, &desired.name).await?;
        let mut current = Table::new(&desired.name);
        current.columns = columns;
        current.keys = keys;

        let diff = diff_table(self.driver.sql_builder(), &current, desired, options)?;
        if diff.changes.is_empty() {
            debug!(table = %desired.name, "table already up to date");
            return Ok(diff);
        }
        let statements = diff.to_sql(self.driver.sql_builder(), database_name, &desired.name);
        info!(
            table = %desired.name,
            statements = statements.len(),
            "updating table"
        );
        self.apply_statements(&statements).await?;
        Ok(diff)
    }
}

#[cfg(test)]
mod tests {
    use stela_sql::{Column, Key, KeyBase, SqlValue};
    use tokio::sync::Notify;

    use super::*;
    use crate::testing::MockDriver;

    fn statements(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| String::from(*s)).collect()
    }

    #[tokio::test]
    async fn statements_run_inside_one_transaction() {
        let sync = SchemaSync::new(MockDriver::default());
        sync.apply_statements(&statements(&["ALTER TABLE t ADD COLUMN a INT NOT NULL"]))
            .await
            .unwrap();
        assert_eq!(
            sync.driver().log(),
            vec!["BEGIN", "ALTER TABLE t ADD COLUMN a INT NOT NULL", "COMMIT"]
        );
    }

    #[tokio::test]
    async fn failed_statement_rolls_back() {
        let sync = SchemaSync::new(MockDriver {
            fail_on: Some(String::from("second")),
            ..MockDriver::default()
        });
        let err = sync
            .apply_statements(&statements(&["first", "second", "third"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransactionError::StatementFailed { ref statement, .. } if statement == "second"
        ));
        // The third statement never runs.
        assert_eq!(
            sync.driver().log(),
            vec!["BEGIN", "first", "second", "ROLLBACK"]
        );
    }

    #[tokio::test]
    async fn failed_rollback_preserves_both_causes() {
        let sync = SchemaSync::new(MockDriver {
            fail_on: Some(String::from("boom")),
            fail_rollback: true,
            ..MockDriver::default()
        });
        let err = sync
            .apply_statements(&statements(&["boom"]))
            .await
            .unwrap_err();
        match err {
            TransactionError::RollbackFailed { original, .. } => {
                assert!(matches!(
                    *original,
                    TransactionError::StatementFailed { ref statement, .. } if statement == "boom"
                ));
            }
            other => panic!("expected RollbackFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_apply_fails_fast() {
        let driver = MockDriver {
            entered: Some(Notify::new()),
            release: Some(Notify::new()),
            ..MockDriver::default()
        };
        let sync = std::sync::Arc::new(SchemaSync::new(driver));

        let first = {
            let sync = std::sync::Arc::clone(&sync);
            tokio::spawn(async move { sync.apply_statements(&statements(&["slow"])).await })
        };
        sync.driver().entered.as_ref().unwrap().notified().await;

        let err = sync
            .apply_statements(&statements(&["fast"]))
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::AlreadyActive));

        sync.driver().release.as_ref().unwrap().notify_one();
        first.await.unwrap().unwrap();

        // A finished transaction releases the guard.
        sync.driver().release.as_ref().unwrap().notify_one();
        sync.apply_statements(&statements(&["after"])).await.unwrap();
    }

    #[tokio::test]
    async fn update_table_applies_the_diff() {
        let current_columns = vec![
            Column::new("id", "bigint").unsigned().generated(),
            Column::new("name", "varchar").with_params(vec![SqlValue::Int(255)]),
        ];
        let current_keys = vec![Key::Primary(KeyBase::new("PRIMARY", ["id"]))];
        let sync = SchemaSync::new(MockDriver {
            columns: current_columns,
            keys: current_keys,
            ..MockDriver::default()
        });

        let desired = stela_sql::Table::new("users")
            .column(Column::new("id", "bigint").unsigned().generated())
            .column(Column::new("name", "varchar").with_params(vec![SqlValue::Int(255)]))
            .column(
                Column::new("email", "varchar")
                    .with_params(vec![SqlValue::Int(255)])
                    .nullable(),
            )
            .key(Key::Primary(KeyBase::new("PRIMARY", ["id"])));

        let diff = sync
            .update_table("app", &desired, &DiffOptions::default())
            .await
            .unwrap();
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(
            sync.driver().log(),
            vec![
                "BEGIN",
                "ALTER TABLE `app`.`users` ADD COLUMN `email` VARCHAR(255) NULL",
                "COMMIT"
            ]
        );
    }

    #[tokio::test]
    async fn update_table_is_idempotent() {
        let columns = vec![Column::new("id", "bigint").unsigned().generated()];
        let keys = vec![Key::Primary(KeyBase::new("PRIMARY", ["id"]))];
        let sync = SchemaSync::new(MockDriver {
            columns: columns.clone(),
            keys: keys.clone(),
            ..MockDriver::default()
        });

        let mut desired = stela_sql::Table::new("users");
        desired.columns = columns;
        desired.keys = keys;

        let diff = sync
            .update_table("app", &desired, &DiffOptions::default())
            .await
            .unwrap();
        assert!(diff.is_empty());
        // No transaction was opened.
        assert!(sync.driver().log().is_empty());
    }
}
