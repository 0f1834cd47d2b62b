//! The driver capability boundary.
//!
//! Everything above this trait — the diff engine, views, and query
//! helpers — depends only on this capability set, never on a concrete
//! database client.

use async_trait::async_trait;

use stela_sql::{Column, Key, Predicate, Query, Row, SqlBuilder, Table};

use crate::error::{DriverError, Result};

/// The capabilities a database driver must provide.
///
/// Transaction statements (`begin`/`commit`/`rollback`) serialize
/// against the underlying connection; the one-transaction-at-a-time
/// rule is enforced above this boundary by [`crate::SchemaSync`].
#[async_trait]
pub trait Driver: Send + Sync {
    /// The SQL builder configured for this driver's dialect.
    fn sql_builder(&self) -> &SqlBuilder;

    /// Executes a statement and returns raw result rows untouched.
    async fn query(&self, sql: &str) -> Result<Vec<Row>, DriverError>;

    /// Begins a transaction on the connection.
    async fn begin(&self) -> Result<(), DriverError>;

    /// Commits the open transaction.
    async fn commit(&self) -> Result<(), DriverError>;

    /// Rolls back the open transaction.
    async fn rollback(&self) -> Result<(), DriverError>;

    /// Reads the current column definitions of a table.
    async fn get_columns(&self, database_name: &str, table_name: &str)
        -> Result<Vec<Column>, DriverError>;

    /// Reads the current key definitions of a table.
    async fn get_keys(&self, database_name: &str, table_name: &str)
        -> Result<Vec<Key>, DriverError>;

    /// Lists the database names visible on the server.
    async fn get_databases(&self) -> Result<Vec<String>, DriverError>;

    /// Lists the table names of a database.
    async fn get_tables(&self, database_name: &str) -> Result<Vec<String>, DriverError>;

    /// Creates a database.
    async fn create_database(&self, database_name: &str) -> Result<()> {
        let sql = format!(
            "CREATE DATABASE {}",
            self.sql_builder().escape_identifier([database_name])
        );
        self.query(&sql).await?;
        Ok(())
    }

    /// Drops a database and everything in it.
    async fn remove_database(&self, database_name: &str) -> Result<()> {
        let sql = format!(
            "DROP DATABASE {}",
            self.sql_builder().escape_identifier([database_name])
        );
        self.query(&sql).await?;
        Ok(())
    }

    /// Creates a table from its full definition, columns and keys
    /// included.
    async fn create_table(&self, database_name: &str, table: &Table) -> Result<()> {
        let sql = self
            .sql_builder()
            .build_create_table_sql(database_name, table);
        self.query(&sql).await?;
        Ok(())
    }

    /// Drops a table. This is the removal path referred to by the diff
    /// engine's empty-definition precondition.
    async fn remove_table(&self, database_name: &str, table_name: &str) -> Result<()> {
        let sql = format!(
            "DROP TABLE {}",
            self.sql_builder()
                .escape_identifier([database_name, table_name])
        );
        self.query(&sql).await?;
        Ok(())
    }

    /// Builds and runs a SELECT for the given query.
    async fn select(
        &self,
        database_name: &str,
        table_name: &str,
        query: &Query,
        selector: Option<&Predicate>,
    ) -> Result<Vec<Row>> {
        let sql = self
            .sql_builder()
            .build_select_sql(database_name, table_name, query, selector)?;
        Ok(self.query(&sql).await?)
    }

    /// Inserts one row.
    async fn insert(&self, database_name: &str, table_name: &str, row: &Row) -> Result<()> {
        let sql = self
            .sql_builder()
            .build_insert_into_sql(database_name, table_name, row);
        self.query(&sql).await?;
        Ok(())
    }

    /// Inserts multiple rows in one statement. Rows with heterogeneous
    /// key sets are null-filled against the union column list.
    async fn insert_multiple(
        &self,
        database_name: &str,
        table_name: &str,
        rows: &[Row],
    ) -> Result<()> {
        let sql = self
            .sql_builder()
            .build_insert_into_multiple_sql(database_name, table_name, rows);
        self.query(&sql).await?;
        Ok(())
    }
}
