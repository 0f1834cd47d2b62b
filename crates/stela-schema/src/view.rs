//! Dirty-tracked views over live table definitions.
//!
//! A view caches what the server reported, lets the caller stage a new
//! definition locally, and pushes the staged definition on `save`. The
//! state machine is Unloaded -> Loaded -> Dirty, and Dirty drops back to
//! Loaded only after a successful write.

use stela_sql::{Column, Table};

use crate::apply::SchemaSync;
use crate::diff::DiffOptions;
use crate::driver::Driver;
use crate::error::{Result, SchemaError};

/// Cache state of a view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// Nothing fetched yet.
    Unloaded,
    /// In sync with the server as of the last load or save.
    Loaded(T),
    /// Staged locally, not yet written.
    Dirty(T),
}

impl<T> ViewState<T> {
    /// Returns the cached value, loaded or staged.
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Unloaded => None,
            Self::Loaded(value) | Self::Dirty(value) => Some(value),
        }
    }

    /// Returns `true` if a staged value awaits a save.
    pub const fn is_dirty(&self) -> bool {
        matches!(self, Self::Dirty(_))
    }
}

/// A view over one table's live definition.
pub struct TableView<'a, D> {
    sync: &'a SchemaSync<D>,
    database_name: String,
    table_name: String,
    state: ViewState<Table>,
}

impl<'a, D: Driver> TableView<'a, D> {
    /// Creates an unloaded view.
    pub fn new(sync: &'a SchemaSync<D>, database_name: &str, table_name: &str) -> Self {
        Self {
            sync,
            database_name: String::from(database_name),
            table_name: String::from(table_name),
            state: ViewState::Unloaded,
        }
    }

    /// Returns the cached definition, if any.
    pub fn definition(&self) -> Option<&Table> {
        self.state.get()
    }

    /// Returns `true` if a staged definition awaits a save.
    pub const fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    /// Fetches the current definition from the server. Discards any
    /// staged definition.
    pub async fn load(&mut self) -> Result<&Table> {
        let columns = self
            .sync
            .driver()
            .get_columns(&self.database_name, &self.table_name)
            .await?;
        let keys = self
            .sync
            .driver()
            .get_keys(&self.database_name, &self.table_name)
            .await?;
        let mut table = Table::new(&self.table_name);
        table.columns = columns;
        table.keys = keys;
        self.state = ViewState::Loaded(table);
        self.state.get().ok_or_else(unreachable_state)
    }

    /// Stages a new definition locally.
    pub fn set(&mut self, mut desired: Table) {
        desired.name.clone_from(&self.table_name);
        self.state = ViewState::Dirty(desired);
    }

    /// Writes the staged definition to the server, if dirty.
    pub async fn save(&mut self, options: &DiffOptions) -> Result<()> {
        let ViewState::Dirty(desired) = &self.state else {
            return Ok(());
        };
        self.sync
            .update_table(&self.database_name, desired, options)
            .await?;
        if let ViewState::Dirty(desired) = std::mem::replace(&mut self.state, ViewState::Unloaded) {
            self.state = ViewState::Loaded(desired);
        }
        Ok(())
    }
}

/// A view over one column of a live table.
pub struct ColumnView<'a, D> {
    sync: &'a SchemaSync<D>,
    database_name: String,
    table_name: String,
    column_name: String,
    state: ViewState<Column>,
}

impl<'a, D: Driver> ColumnView<'a, D> {
    /// Creates an unloaded view.
    pub fn new(
        sync: &'a SchemaSync<D>,
        database_name: &str,
        table_name: &str,
        column_name: &str,
    ) -> Self {
        Self {
            sync,
            database_name: String::from(database_name),
            table_name: String::from(table_name),
            column_name: String::from(column_name),
            state: ViewState::Unloaded,
        }
    }

    /// Returns the cached definition, if any.
    pub fn definition(&self) -> Option<&Column> {
        self.state.get()
    }

    /// Returns `true` if a staged definition awaits a save.
    pub const fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    /// Fetches the current definition from the server. Returns `None`
    /// (leaving the view unloaded) when the column does not exist.
    pub async fn load(&mut self) -> Result<Option<&Column>> {
        let columns = self
            .sync
            .driver()
            .get_columns(&self.database_name, &self.table_name)
            .await?;
        match columns.into_iter().find(|c| c.name == self.column_name) {
            Some(column) => {
                self.state = ViewState::Loaded(column);
                Ok(self.state.get())
            }
            None => {
                self.state = ViewState::Unloaded;
                Ok(None)
            }
        }
    }

    /// Stages a new definition locally.
    pub fn set(&mut self, mut desired: Column) {
        desired.name.clone_from(&self.column_name);
        self.state = ViewState::Dirty(desired);
    }

    /// Writes the staged definition, redefining the column if it exists
    /// on the server and adding it otherwise.
    pub async fn save(&mut self) -> Result<()> {
        let ViewState::Dirty(desired) = &self.state else {
            return Ok(());
        };
        let builder = self.sync.driver().sql_builder();
        let fqtn = builder.escape_identifier([self.database_name.as_str(), self.table_name.as_str()]);
        let exists = self
            .sync
            .driver()
            .get_columns(&self.database_name, &self.table_name)
            .await?
            .iter()
            .any(|c| c.name == self.column_name);
        let statement = if exists {
            format!(
                "ALTER TABLE {fqtn} CHANGE COLUMN {} {}",
                builder.escape_identifier([self.column_name.as_str()]),
                builder.build_column_sql(desired)
            )
        } else {
            format!("ALTER TABLE {fqtn} ADD COLUMN {}", builder.build_column_sql(desired))
        };
        self.sync.apply_statements(&[statement]).await?;
        if let ViewState::Dirty(desired) = std::mem::replace(&mut self.state, ViewState::Unloaded) {
            self.state = ViewState::Loaded(desired);
        }
        Ok(())
    }
}

fn unreachable_state() -> SchemaError {
    SchemaError::Driver(crate::error::DriverError::message(
        "view state lost after load",
    ))
}
