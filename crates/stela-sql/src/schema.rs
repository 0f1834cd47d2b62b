//! Table, column, and key definitions shared by the DDL builder and the
//! schema diff engine.

use crate::value::SqlValue;

/// A column definition, desired or observed.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Base type keyword (stored uppercase, e.g. `INT`, `VARCHAR`).
    pub data_type: String,
    /// Type arguments, e.g. the `255` in `VARCHAR(255)`.
    pub type_params: Vec<SqlValue>,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether the numeric type is unsigned.
    pub unsigned: bool,
    /// Whether the value is generated (auto-increment).
    pub generated: bool,
    /// Default value; `None` and `Some(Null)` both mean "no default".
    pub default_value: Option<SqlValue>,
    /// Column comment; empty means none.
    pub comment: String,
}

impl Column {
    /// Creates a column with the given name and type and no extras.
    #[must_use]
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: String::from(name),
            data_type: data_type.to_uppercase(),
            type_params: Vec::new(),
            nullable: false,
            unsigned: false,
            generated: false,
            default_value: None,
            comment: String::new(),
        }
    }

    /// Sets the type arguments.
    #[must_use]
    pub fn with_params(mut self, params: Vec<SqlValue>) -> Self {
        self.type_params = params;
        self
    }

    /// Marks the column nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the column unsigned.
    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// Marks the column generated (auto-increment).
    #[must_use]
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: SqlValue) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// Fields shared by every key variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBase {
    /// Key name as reported by the server or chosen by the caller.
    pub name: String,
    /// Covered columns, in order. Must be non-empty and reference
    /// columns of the same table definition.
    pub column_names: Vec<String>,
}

impl KeyBase {
    /// Creates a key header.
    #[must_use]
    pub fn new<I, S>(name: &str, column_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: String::from(name),
            column_names: column_names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Referential action applied on delete/update of a referenced row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForeignKeyRule {
    /// No action (the default; never rendered in DDL).
    #[default]
    NoAction,
    /// RESTRICT.
    Restrict,
    /// CASCADE.
    Cascade,
    /// SET NULL.
    SetNull,
}

impl std::fmt::Display for ForeignKeyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
        })
    }
}

/// A foreign key: header plus reference target and update rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Shared key header.
    pub base: KeyBase,
    /// Referenced table name.
    pub referenced_table: String,
    /// Referenced columns, aligned with the covered columns.
    pub referenced_columns: Vec<String>,
    /// Action on delete of the referenced row.
    pub on_delete: ForeignKeyRule,
    /// Action on update of the referenced row.
    pub on_update: ForeignKeyRule,
}

/// A table key. The primary key is unnamed in DDL: there is exactly one
/// per table and its identifier is never rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// Plain index.
    Index(KeyBase),
    /// Unique key.
    Unique(KeyBase),
    /// Primary key.
    Primary(KeyBase),
    /// Foreign key.
    Foreign(ForeignKey),
}

/// Discriminant of [`Key`], used as the key of the keyword map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyKind {
    /// Plain index.
    Index,
    /// Unique key.
    Unique,
    /// Primary key.
    Primary,
    /// Foreign key.
    Foreign,
}

impl Key {
    /// Returns the key's kind.
    #[must_use]
    pub const fn kind(&self) -> KeyKind {
        match self {
            Self::Index(_) => KeyKind::Index,
            Self::Unique(_) => KeyKind::Unique,
            Self::Primary(_) => KeyKind::Primary,
            Self::Foreign(_) => KeyKind::Foreign,
        }
    }

    /// Returns the shared header.
    #[must_use]
    pub const fn base(&self) -> &KeyBase {
        match self {
            Self::Index(base) | Self::Unique(base) | Self::Primary(base) => base,
            Self::Foreign(fk) => &fk.base,
        }
    }

    /// Returns the key name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.base().name
    }

    /// Returns the covered column names.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.base().column_names
    }
}

/// A full table definition: the desired shape authored by the caller, or
/// the current shape observed on the server.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Columns, in order.
    pub columns: Vec<Column>,
    /// Keys, in order.
    pub keys: Vec<Key>,
}

impl Table {
    /// Creates an empty table definition.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            columns: Vec::new(),
            keys: Vec::new(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a key.
    #[must_use]
    pub fn key(mut self, key: Key) -> Self {
        self.keys.push(key);
        self
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks up a key by name.
    #[must_use]
    pub fn find_key(&self, name: &str) -> Option<&Key> {
        self.keys.iter().find(|k| k.name() == name)
    }
}
