//! The expression compiler.
//!
//! [`SqlBuilder`] turns one [`Expression`] tree into a SQL fragment,
//! given the query's named-parameter bindings. Compilation is a pure
//! function of its inputs: identical inputs yield identical SQL, and a
//! failure never leaves a partial fragment behind.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::CompileError;
use crate::expr::{Expression, FieldRef, Predicate, ProjectionEntry};
use crate::options::SqlBuilderOptions;
use crate::query::QueryParams;
use crate::value::SqlValue;

fn param_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[A-Za-z_][A-Za-z0-9_]+$").expect("valid pattern"))
}

/// Compiles expressions, queries, and DDL fragments into SQL text.
///
/// The builder is immutable after construction and safe to share across
/// threads; all state lives in [`SqlBuilderOptions`] plus the
/// precomputed alias-renaming sequence.
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    options: SqlBuilderOptions,
    param_names: Vec<String>,
}

impl Default for SqlBuilder {
    fn default() -> Self {
        Self::new(SqlBuilderOptions::default())
    }
}

impl SqlBuilder {
    /// Creates a builder and precomputes the alias sequence
    /// `[table_alias, join_alias(1), …, join_alias(max_join_params)]`.
    #[must_use]
    pub fn new(options: SqlBuilderOptions) -> Self {
        let mut param_names = Vec::with_capacity(options.max_join_params + 1);
        param_names.push(options.table_alias.clone());
        for index in 0..options.max_join_params {
            param_names.push(join_alias(&options.join_alias_pattern, index));
        }
        Self {
            options,
            param_names,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn options(&self) -> &SqlBuilderOptions {
        &self.options
    }

    /// Returns the alias assigned to the join at the given 0-based
    /// position (joins are numbered starting at 1 in the SQL).
    #[must_use]
    pub fn join_alias(&self, index: usize) -> String {
        join_alias(&self.options.join_alias_pattern, index)
    }

    /// Escapes a scalar value as an inline literal. NULL always renders
    /// as the `NULL` keyword, independent of the configured escaper.
    #[must_use]
    pub fn escape(&self, value: &SqlValue) -> String {
        if value.is_null() {
            return String::from("NULL");
        }
        self.options.escaper.escape_value(value)
    }

    /// Escapes one or more identifier parts and joins them with the
    /// configured delimiter.
    #[must_use]
    pub fn escape_identifier<'a, I>(&self, parts: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        parts
            .into_iter()
            .map(|part| self.options.escaper.escape_identifier(part))
            .collect::<Vec<_>>()
            .join(&self.options.identifier_delimiter)
    }

    /// Renames the predicate's positional parameters to the configured
    /// alias sequence and returns the rewritten body.
    ///
    /// This is a pure transform over a fresh tree: the primary table
    /// gets the table alias, the n-th join parameter the n-th join
    /// alias, up to `max_join_params`; parameters beyond that bound keep
    /// their caller-chosen names. Identifier references inside the body
    /// are substituted consistently, so alias stability in the emitted
    /// SQL never depends on caller naming.
    #[must_use]
    pub fn rename_params(&self, predicate: &Predicate) -> Expression {
        let count = predicate.params.len().min(self.param_names.len());
        let mapping: Vec<(&str, &str)> = predicate.params[..count]
            .iter()
            .map(String::as_str)
            .zip(self.param_names[..count].iter().map(String::as_str))
            .collect();
        rename_expr(&predicate.body, &mapping)
    }

    /// Compiles one expression node and its sub-tree into a SQL
    /// fragment.
    pub fn build_expression_sql(
        &self,
        expr: &Expression,
        params: &QueryParams,
    ) -> Result<String, CompileError> {
        match expr {
            Expression::Literal(value) => Ok(self.escape(value)),
            Expression::Identifier(field) => Ok(self.build_identifier_sql(field)),
            Expression::Binary { op, left, right } => {
                let operator = self
                    .options
                    .binary_operator_map
                    .get(op)
                    .ok_or_else(|| CompileError::InvalidOperator(op.clone()))?;
                let left = self.build_expression_sql(left, params)?;
                let right = self.build_expression_sql(right, params)?;
                Ok(format!("({left} {operator} {right})"))
            }
            Expression::Logical { op, left, right } => {
                let operator = self
                    .options
                    .logical_operator_map
                    .get(op)
                    .ok_or_else(|| CompileError::InvalidOperator(op.clone()))?;
                let left = self.build_expression_sql(left, params)?;
                let right = self.build_expression_sql(right, params)?;
                Ok(format!("({left} {operator} {right})"))
            }
            Expression::Array(elements) => {
                let parts = elements
                    .iter()
                    .map(|element| self.build_expression_sql(element, params))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.build_array_sql(&parts))
            }
            Expression::Projection(_) => Err(CompileError::UnsupportedNode(String::from(
                "object projections are only valid as SELECT selectors",
            ))),
            Expression::Param(name) => {
                if !param_name_pattern().is_match(name) {
                    return Err(CompileError::InvalidIdentifier(format!(
                        "parameter name `{name}` must match ^[A-Za-z_][A-Za-z0-9_]+$"
                    )));
                }
                let value = params
                    .get(name)
                    .ok_or_else(|| CompileError::UndefinedParameter(name.clone()))?;
                Ok(self.escape(value))
            }
        }
    }

    /// Compiles an `alias.field` reference.
    #[must_use]
    pub fn build_identifier_sql(&self, field: &FieldRef) -> String {
        self.escape_identifier([field.table.as_str(), field.name.as_str()])
    }

    /// Joins pre-rendered parts with the array brackets and delimiter.
    #[must_use]
    pub fn build_array_sql(&self, parts: &[String]) -> String {
        format!(
            "{}{}{}",
            self.options.array_open_bracket,
            parts.join(&self.options.array_delimiter),
            self.options.array_close_bracket
        )
    }

    /// Joins pre-rendered parts with the list brackets and delimiter.
    #[must_use]
    pub fn build_list_sql(&self, parts: &[String]) -> String {
        format!(
            "{}{}{}",
            self.options.list_open_bracket,
            parts.join(&self.options.list_delimiter),
            self.options.list_close_bracket
        )
    }

    /// Renders column/value pairs with the map brackets and delimiters,
    /// as used by the single-row INSERT form.
    #[must_use]
    pub fn build_map_sql(&self, pairs: &[(String, SqlValue)]) -> String {
        let rendered: Vec<String> = pairs
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}{}{}",
                    self.escape_identifier([name.as_str()]),
                    self.options.map_delimiter,
                    self.escape(value)
                )
            })
            .collect();
        format!(
            "{}{}{}",
            self.options.map_open_bracket,
            rendered.join(&self.options.map_pair_delimiter),
            self.options.map_close_bracket
        )
    }
}

fn join_alias(pattern: &str, index: usize) -> String {
    pattern.replace("{{ index }}", &(index + 1).to_string())
}

fn rename_expr(expr: &Expression, mapping: &[(&str, &str)]) -> Expression {
    match expr {
        Expression::Literal(_) | Expression::Param(_) => expr.clone(),
        Expression::Identifier(field) => {
            let table = mapping
                .iter()
                .find(|(old, _)| *old == field.table)
                .map_or(field.table.as_str(), |(_, new)| *new);
            Expression::Identifier(FieldRef {
                table: String::from(table),
                name: field.name.clone(),
            })
        }
        Expression::Binary { op, left, right } => Expression::Binary {
            op: op.clone(),
            left: Box::new(rename_expr(left, mapping)),
            right: Box::new(rename_expr(right, mapping)),
        },
        Expression::Logical { op, left, right } => Expression::Logical {
            op: op.clone(),
            left: Box::new(rename_expr(left, mapping)),
            right: Box::new(rename_expr(right, mapping)),
        },
        Expression::Array(elements) => Expression::Array(
            elements
                .iter()
                .map(|element| rename_expr(element, mapping))
                .collect(),
        ),
        Expression::Projection(entries) => Expression::Projection(
            entries
                .iter()
                .map(|entry| ProjectionEntry {
                    alias: entry.alias.clone(),
                    value: rename_expr(&entry.value, mapping),
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::escape::RawEscaper;
    use crate::expr::{field, lit, param, Predicate};

    fn raw_builder() -> SqlBuilder {
        SqlBuilder::new(SqlBuilderOptions::default().with_escaper(Arc::new(RawEscaper)))
    }

    fn no_params() -> QueryParams {
        QueryParams::new()
    }

    #[test]
    fn literal_null_renders_keyword() {
        let builder = SqlBuilder::default();
        let sql = builder
            .build_expression_sql(&lit(None::<i64>), &no_params())
            .unwrap();
        assert_eq!(sql, "NULL");
    }

    #[test]
    fn binary_expression_parenthesized() {
        let builder = raw_builder();
        let expr = field("__t", "age").ge(lit(21));
        let sql = builder.build_expression_sql(&expr, &no_params()).unwrap();
        assert_eq!(sql, "(__t.age >= 21)");
    }

    #[test]
    fn logical_nesting() {
        let builder = raw_builder();
        let expr = field("__t", "a")
            .eq(lit(1))
            .and(field("__t", "b").eq(lit(2)).or(field("__t", "c").eq(lit(3))));
        let sql = builder.build_expression_sql(&expr, &no_params()).unwrap();
        assert_eq!(sql, "((__t.a = 1) AND ((__t.b = 2) OR (__t.c = 3)))");
    }

    #[test]
    fn in_list_renders_array() {
        let builder = raw_builder();
        let expr = field("__t", "id").in_list(vec![lit(1), lit(2), lit(3)]);
        let sql = builder.build_expression_sql(&expr, &no_params()).unwrap();
        assert_eq!(sql, "(__t.id IN (1,2,3))");
    }

    #[test]
    fn unknown_operator_fails() {
        let builder = raw_builder();
        let expr = Expression::Binary {
            op: String::from("%"),
            left: Box::new(lit(1)),
            right: Box::new(lit(2)),
        };
        let err = builder.build_expression_sql(&expr, &no_params()).unwrap_err();
        assert_eq!(err, CompileError::InvalidOperator(String::from("%")));
    }

    #[test]
    fn parameter_is_escaped_as_literal() {
        let builder = SqlBuilder::default();
        let mut params = QueryParams::new();
        params.insert(String::from("who"), SqlValue::Text(String::from("Ada")));
        let sql = builder.build_expression_sql(&param("who"), &params).unwrap();
        assert_eq!(sql, "'Ada'");
    }

    #[test]
    fn missing_parameter_fails() {
        let builder = SqlBuilder::default();
        let err = builder
            .build_expression_sql(&param("missing"), &no_params())
            .unwrap_err();
        assert_eq!(err, CompileError::UndefinedParameter(String::from("missing")));
    }

    #[test]
    fn malformed_parameter_name_fails() {
        let builder = SqlBuilder::default();
        let mut params = QueryParams::new();
        params.insert(String::from("1bad"), SqlValue::Int(1));
        let err = builder
            .build_expression_sql(&param("1bad"), &params)
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidIdentifier(_)));
    }

    #[test]
    fn projection_rejected_outside_select() {
        let builder = SqlBuilder::default();
        let expr = crate::expr::projection([("uid", field("__t", "id"))]);
        let err = builder.build_expression_sql(&expr, &no_params()).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedNode(_)));
    }

    #[test]
    fn compilation_is_deterministic() {
        let builder = raw_builder();
        let expr = field("__t", "a").eq(param("x")).and(field("__t", "b").lt(lit(9)));
        let mut params = QueryParams::new();
        params.insert(String::from("x"), SqlValue::Int(5));
        let first = builder.build_expression_sql(&expr, &params).unwrap();
        let second = builder.build_expression_sql(&expr, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rename_maps_positional_params_to_aliases() {
        let builder = raw_builder();
        let pred = Predicate::new(["u", "p"], field("u", "id").eq(field("p", "user_id")));
        let renamed = builder.rename_params(&pred);
        let sql = builder.build_expression_sql(&renamed, &no_params()).unwrap();
        assert_eq!(sql, "(__t.id = __j1.user_id)");
    }

    #[test]
    fn rename_leaves_unrelated_aliases_alone() {
        let builder = raw_builder();
        let pred = Predicate::new(["u"], field("u", "id").eq(field("other", "id")));
        let renamed = builder.rename_params(&pred);
        let sql = builder.build_expression_sql(&renamed, &no_params()).unwrap();
        assert_eq!(sql, "(__t.id = other.id)");
    }

    #[test]
    fn rename_is_bounded_by_max_join_params() {
        let builder = raw_builder();
        let names: Vec<String> = (0..8).map(|i| format!("a{i}")).collect();
        let pred = Predicate::new(names.clone(), field("a7", "x").eq(lit(1)));
        // Only table alias + 5 join aliases are renamed; a6 and a7 keep
        // their caller-chosen names.
        let renamed = builder.rename_params(&pred);
        let sql = builder.build_expression_sql(&renamed, &no_params()).unwrap();
        assert_eq!(sql, "(a7.x = 1)");
    }

    #[test]
    fn join_alias_numbering_starts_at_one() {
        let builder = SqlBuilder::default();
        assert_eq!(builder.join_alias(0), "__j1");
        assert_eq!(builder.join_alias(4), "__j5");
    }
}
