//! Column type-string parsing.
//!
//! Servers report column types as strings like `int(10) unsigned` or
//! `varchar(255)`. This parser recovers the structured
//! `{type, args, nullable, unsigned}` form; over its domain it is the
//! inverse of [`crate::SqlBuilder::build_column_sql`]'s type rendering.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::TypeParseError;
use crate::value::SqlValue;

fn instruction_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_]+)(?:\(([^)]+)\))?(?: +|$)").expect("valid pattern")
    })
}

fn argument_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^("[^"]*"|'[^']*'|[\d.]+)(?:\s*,\s*|$)"#).expect("valid pattern")
    })
}

/// One keyword of a type string, with optional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInstruction {
    /// Uppercased keyword, e.g. `INT`, `UNSIGNED`, `NOT`.
    pub keyword: String,
    /// Parenthesized arguments, if any.
    pub args: Vec<SqlValue>,
}

/// The structured type portion of a column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    /// Base type keyword, uppercase.
    pub data_type: String,
    /// Type arguments.
    pub args: Vec<SqlValue>,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether the numeric type is unsigned.
    pub unsigned: bool,
}

/// Parses a comma-separated type argument list: numbers, and single- or
/// double-quoted strings.
#[must_use]
pub fn parse_type_arguments(value: &str) -> Vec<SqlValue> {
    let mut rest = value;
    let mut args = Vec::new();
    while !rest.is_empty() {
        let Some(captures) = argument_pattern().captures(rest) else {
            break;
        };
        let whole = captures.get(0).expect("whole match");
        let arg = &captures[1];
        if arg.starts_with('"') || arg.starts_with('\'') {
            args.push(SqlValue::Text(String::from(&arg[1..arg.len() - 1])));
        } else if arg.contains('.') {
            match arg.parse::<f64>() {
                Ok(f) => args.push(SqlValue::Float(f)),
                Err(_) => break,
            }
        } else {
            match arg.parse::<i64>() {
                Ok(n) => args.push(SqlValue::Int(n)),
                Err(_) => break,
            }
        }
        rest = &rest[whole.end()..];
    }
    args
}

/// Splits a type string into its keyword instructions.
#[must_use]
pub fn parse_type_instructions(value: &str) -> Vec<TypeInstruction> {
    let mut rest = value.trim();
    let mut instructions = Vec::new();
    while !rest.is_empty() {
        let Some(captures) = instruction_pattern().captures(rest) else {
            break;
        };
        let whole = captures.get(0).expect("whole match");
        let keyword = captures[1].to_uppercase();
        let args = captures
            .get(2)
            .map_or_else(Vec::new, |m| parse_type_arguments(m.as_str()));
        instructions.push(TypeInstruction { keyword, args });
        rest = &rest[whole.end()..];
    }
    instructions
}

/// Parses a full type string into a [`TypeInfo`].
///
/// The first instruction supplies the base type and arguments. A `NULL`
/// keyword marks the column nullable unless directly preceded by `NOT`;
/// an `UNSIGNED` keyword anywhere marks it unsigned.
pub fn parse_type_info(value: &str) -> Result<TypeInfo, TypeParseError> {
    let instructions = parse_type_instructions(value);
    let Some(first) = instructions.first() else {
        return Err(TypeParseError::Empty(String::from(value)));
    };
    let nullable = instructions
        .iter()
        .position(|i| i.keyword == "NULL")
        .is_some_and(|idx| idx == 0 || instructions[idx - 1].keyword != "NOT");
    let unsigned = instructions.iter().any(|i| i.keyword == "UNSIGNED");
    Ok(TypeInfo {
        data_type: first.keyword.clone(),
        args: first.args.clone(),
        nullable,
        unsigned,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::compile::SqlBuilder;
    use crate::escape::RawEscaper;
    use crate::options::SqlBuilderOptions;
    use crate::schema::Column;

    #[test]
    fn parses_plain_type() {
        let info = parse_type_info("text").unwrap();
        assert_eq!(info.data_type, "TEXT");
        assert!(info.args.is_empty());
        assert!(!info.nullable);
        assert!(!info.unsigned);
    }

    #[test]
    fn parses_type_with_arguments() {
        let info = parse_type_info("varchar(255)").unwrap();
        assert_eq!(info.data_type, "VARCHAR");
        assert_eq!(info.args, vec![SqlValue::Int(255)]);
    }

    #[test]
    fn parses_unsigned_int() {
        let info = parse_type_info("int(10) unsigned").unwrap();
        assert_eq!(info.data_type, "INT");
        assert_eq!(info.args, vec![SqlValue::Int(10)]);
        assert!(info.unsigned);
    }

    #[test]
    fn parses_decimal_arguments() {
        let info = parse_type_info("decimal(10,2)").unwrap();
        assert_eq!(info.args, vec![SqlValue::Int(10), SqlValue::Int(2)]);
    }

    #[test]
    fn parses_quoted_arguments() {
        let args = parse_type_arguments("\"a\", 'b', 3");
        assert_eq!(
            args,
            vec![
                SqlValue::Text(String::from("a")),
                SqlValue::Text(String::from("b")),
                SqlValue::Int(3)
            ]
        );
    }

    #[test]
    fn null_handling() {
        assert!(parse_type_info("text NULL").unwrap().nullable);
        assert!(!parse_type_info("text NOT NULL").unwrap().nullable);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(parse_type_info(""), Err(TypeParseError::Empty(_))));
    }

    #[test]
    fn column_rendering_round_trips() {
        // Rendering a column and re-parsing its type string must
        // reconstruct {type, args, nullable, unsigned}.
        let builder =
            SqlBuilder::new(SqlBuilderOptions::default().with_escaper(Arc::new(RawEscaper)));
        let column = Column::new("score", "decimal")
            .with_params(vec![SqlValue::Int(10), SqlValue::Int(2)])
            .unsigned();
        let rendered = builder.build_column_sql(&column);
        // Strip the leading column name before parsing.
        let type_string = rendered.split_once(' ').expect("name and type").1;
        let info = parse_type_info(type_string).unwrap();
        assert_eq!(info.data_type, column.data_type);
        assert_eq!(info.args, column.type_params);
        assert_eq!(info.nullable, column.nullable);
        assert_eq!(info.unsigned, column.unsigned);
    }

    #[test]
    fn nullable_column_round_trips() {
        let builder =
            SqlBuilder::new(SqlBuilderOptions::default().with_escaper(Arc::new(RawEscaper)));
        let column = Column::new("bio", "varchar")
            .with_params(vec![SqlValue::Int(500)])
            .nullable();
        let rendered = builder.build_column_sql(&column);
        let type_string = rendered.split_once(' ').expect("name and type").1;
        let info = parse_type_info(type_string).unwrap();
        assert!(info.nullable);
        assert_eq!(info.data_type, "VARCHAR");
    }
}
