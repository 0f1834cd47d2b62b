//! Pluggable value and identifier escaping.
//!
//! The escaper is the only dialect-specific seam in the compiler: every
//! literal passes through [`Escaper::escape_value`] and every identifier
//! through [`Escaper::escape_identifier`]. Swapping the escaper retargets
//! the emitted SQL without touching the grammar.

use crate::value::SqlValue;

/// A value/identifier quoting strategy.
///
/// Implementations must be stateless or internally synchronized; one
/// escaper instance is shared by all concurrent compilations.
pub trait Escaper: Send + Sync {
    /// Renders a scalar value as an inline SQL literal.
    ///
    /// NULL handling happens before this call; implementations never see
    /// [`SqlValue::Null`].
    fn escape_value(&self, value: &SqlValue) -> String;

    /// Renders a single identifier part (database, table, column, alias).
    fn escape_identifier(&self, identifier: &str) -> String;
}

/// Identity escaping: values and identifiers pass through verbatim.
///
/// Mainly useful in tests and for pre-escaped input; production
/// configurations should pick a dialect escaper.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawEscaper;

impl Escaper for RawEscaper {
    fn escape_value(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => String::from("NULL"),
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Text(s) => s.clone(),
        }
    }

    fn escape_identifier(&self, identifier: &str) -> String {
        String::from(identifier)
    }
}

/// MySQL-style escaping: backtick-quoted identifiers, single-quoted text
/// with quote doubling.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlEscaper;

impl Escaper for MySqlEscaper {
    fn escape_value(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => String::from("NULL"),
            SqlValue::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Text(s) => {
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
        }
    }

    fn escape_identifier(&self, identifier: &str) -> String {
        let escaped = identifier.replace('`', "``");
        format!("`{escaped}`")
    }
}

/// ANSI-style escaping: double-quoted identifiers, single-quoted text.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiEscaper;

impl Escaper for AnsiEscaper {
    fn escape_value(&self, value: &SqlValue) -> String {
        MySqlEscaper.escape_value(value)
    }

    fn escape_identifier(&self, identifier: &str) -> String {
        let escaped = identifier.replace('"', "\"\"");
        format!("\"{escaped}\"")
    }
}
