//! Configuration for the SQL builder.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::escape::{Escaper, MySqlEscaper};
use crate::schema::KeyKind;

/// All knobs recognized by [`crate::SqlBuilder`].
///
/// Every option has a documented default and overrides only the named
/// behavior. The option set is immutable once the builder is constructed.
#[derive(Clone)]
pub struct SqlBuilderOptions {
    /// Value/identifier quoting strategy. Default: [`MySqlEscaper`].
    pub escaper: Arc<dyn Escaper>,
    /// Joins the parts of a qualified identifier. Default: `.`.
    pub identifier_delimiter: String,
    /// Opening bracket for array expressions. Default: `(`.
    pub array_open_bracket: String,
    /// Closing bracket for array expressions. Default: `)`.
    pub array_close_bracket: String,
    /// Element delimiter for array expressions. Default: `,`.
    pub array_delimiter: String,
    /// Opening bracket for bare lists (projections, orders). Default: empty.
    pub list_open_bracket: String,
    /// Closing bracket for bare lists. Default: empty.
    pub list_close_bracket: String,
    /// Element delimiter for bare lists. Default: `,`.
    pub list_delimiter: String,
    /// Opening bracket for column/value maps. Default: empty.
    pub map_open_bracket: String,
    /// Closing bracket for column/value maps. Default: empty.
    pub map_close_bracket: String,
    /// Separator between a map key and its value. Default: `=`.
    pub map_delimiter: String,
    /// Separator between map pairs. Default: `,`.
    pub map_pair_delimiter: String,
    /// Alias assigned to the primary table. Default: `__t`.
    pub table_alias: String,
    /// Pattern for join aliases; `{{ index }}` is replaced with the
    /// 1-based join number. Default: `__j{{ index }}`.
    pub join_alias_pattern: String,
    /// Maximum number of join parameters subject to alias renaming.
    /// Default: 5.
    pub max_join_params: usize,
    /// Source logical operator to SQL keyword map.
    /// Default: `&&` → `AND`, `||` → `OR`.
    pub logical_operator_map: BTreeMap<String, String>,
    /// Source binary operator to SQL operator map. Default: the fixed
    /// table `==`/`===` → `=`, `!=`/`!==` → `!=`, comparison and
    /// arithmetic operators unchanged, `in` → `IN`.
    pub binary_operator_map: BTreeMap<String, String>,
    /// Key kind to DDL keyword map. Default: `INDEX`, `PRIMARY KEY`,
    /// `UNIQUE KEY`, `FOREIGN KEY`.
    pub key_map: BTreeMap<KeyKind, String>,
    /// Keyword for generated (auto-increment) columns.
    /// Default: `AUTO_INCREMENT`.
    pub generated_keyword: String,
    /// Keyword for unsigned numeric columns. Default: `UNSIGNED`.
    pub unsigned_keyword: String,
    /// Options appended verbatim after the column list of a
    /// CREATE TABLE statement; empty means none. Default: `ENGINE=InnoDB`.
    pub table_options: String,
}

impl std::fmt::Debug for SqlBuilderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlBuilderOptions")
            .field("identifier_delimiter", &self.identifier_delimiter)
            .field("table_alias", &self.table_alias)
            .field("join_alias_pattern", &self.join_alias_pattern)
            .field("max_join_params", &self.max_join_params)
            .finish_non_exhaustive()
    }
}

impl Default for SqlBuilderOptions {
    fn default() -> Self {
        let logical_operator_map = [("&&", "AND"), ("||", "OR")]
            .into_iter()
            .map(|(k, v)| (String::from(k), String::from(v)))
            .collect();
        let binary_operator_map = [
            ("in", "IN"),
            ("===", "="),
            ("==", "="),
            ("!==", "!="),
            ("!=", "!="),
            ("<", "<"),
            (">", ">"),
            ("<=", "<="),
            (">=", ">="),
            ("+", "+"),
            ("-", "-"),
            ("/", "/"),
            ("*", "*"),
        ]
        .into_iter()
        .map(|(k, v)| (String::from(k), String::from(v)))
        .collect();
        let key_map = [
            (KeyKind::Index, "INDEX"),
            (KeyKind::Primary, "PRIMARY KEY"),
            (KeyKind::Unique, "UNIQUE KEY"),
            (KeyKind::Foreign, "FOREIGN KEY"),
        ]
        .into_iter()
        .map(|(k, v)| (k, String::from(v)))
        .collect();

        Self {
            escaper: Arc::new(MySqlEscaper),
            identifier_delimiter: String::from("."),
            array_open_bracket: String::from("("),
            array_close_bracket: String::from(")"),
            array_delimiter: String::from(","),
            list_open_bracket: String::new(),
            list_close_bracket: String::new(),
            list_delimiter: String::from(","),
            map_open_bracket: String::new(),
            map_close_bracket: String::new(),
            map_delimiter: String::from("="),
            map_pair_delimiter: String::from(","),
            table_alias: String::from("__t"),
            join_alias_pattern: String::from("__j{{ index }}"),
            max_join_params: 5,
            logical_operator_map,
            binary_operator_map,
            key_map,
            generated_keyword: String::from("AUTO_INCREMENT"),
            unsigned_keyword: String::from("UNSIGNED"),
            table_options: String::from("ENGINE=InnoDB"),
        }
    }
}

impl SqlBuilderOptions {
    /// Replaces the escaper, keeping every other default.
    #[must_use]
    pub fn with_escaper(mut self, escaper: Arc<dyn Escaper>) -> Self {
        self.escaper = escaper;
        self
    }
}
