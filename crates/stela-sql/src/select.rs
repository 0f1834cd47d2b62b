//! SELECT statement assembly.
//!
//! Clause order is fixed: JOIN clauses in declaration order, then WHERE,
//! ORDER BY, LIMIT, OFFSET. Omitted clauses are skipped entirely.

use crate::compile::SqlBuilder;
use crate::error::CompileError;
use crate::expr::{Expression, Predicate};
use crate::query::{Join, Order, Query, QueryParams};
use crate::value::SqlValue;

impl SqlBuilder {
    /// Compiles the projection of a SELECT.
    ///
    /// Without a selector the whole primary table is projected
    /// (`<table_alias>.*`). A selector body may be a single identifier,
    /// an array of identifiers, or an object projection
    /// (`identifier AS alias` pairs); any other shape fails with
    /// [`CompileError::UnsupportedNode`].
    pub fn build_selector_sql(&self, selector: Option<&Predicate>) -> Result<String, CompileError> {
        let Some(selector) = selector else {
            return Ok(format!("{}.*", self.options().table_alias));
        };
        let body = self.rename_params(selector);
        match body {
            Expression::Identifier(ref ident) => Ok(self.build_identifier_sql(ident)),
            Expression::Array(ref elements) => {
                let parts = elements
                    .iter()
                    .map(|element| match element {
                        Expression::Identifier(ident) => Ok(self.build_identifier_sql(ident)),
                        other => Err(CompileError::UnsupportedNode(format!(
                            "selector arrays may only contain identifiers, got {other:?}"
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.build_list_sql(&parts))
            }
            Expression::Projection(ref entries) => {
                let parts = entries
                    .iter()
                    .map(|entry| match &entry.value {
                        Expression::Identifier(ident) => Ok(format!(
                            "{} AS {}",
                            self.build_identifier_sql(ident),
                            self.escape_identifier([entry.alias.as_str()])
                        )),
                        other => Err(CompileError::UnsupportedNode(format!(
                            "projection entries must be identifiers, got {other:?}"
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.build_list_sql(&parts))
            }
            other => Err(CompileError::UnsupportedNode(format!(
                "selectors must be an identifier, an identifier array, \
                 or an object projection, got {other:?}"
            ))),
        }
    }

    /// Compiles a WHERE predicate body after alias renaming.
    pub fn build_where_sql(
        &self,
        predicate: &Predicate,
        params: &QueryParams,
    ) -> Result<String, CompileError> {
        let body = self.rename_params(predicate);
        self.build_expression_sql(&body, params)
    }

    /// Compiles the ORDER BY list.
    ///
    /// Each entry must resolve to one identifier or an array of
    /// identifiers; the direction keyword is appended per identifier.
    pub fn build_order_sql(&self, orders: &[Order]) -> Result<String, CompileError> {
        let parts = orders
            .iter()
            .map(|order| {
                let keyword = order.direction.keyword();
                let body = self.rename_params(&order.expression);
                match body {
                    Expression::Identifier(ref ident) => {
                        Ok(format!("{} {keyword}", self.build_identifier_sql(ident)))
                    }
                    Expression::Array(ref elements) => {
                        let rendered = elements
                            .iter()
                            .map(|element| match element {
                                Expression::Identifier(ident) => Ok(format!(
                                    "{} {keyword}",
                                    self.build_identifier_sql(ident)
                                )),
                                other => Err(CompileError::UnsupportedNode(format!(
                                    "order arrays may only contain identifiers, got {other:?}"
                                ))),
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(self.build_list_sql(&rendered))
                    }
                    other => Err(CompileError::UnsupportedNode(format!(
                        "order expressions must be identifiers, got {other:?}"
                    ))),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.build_list_sql(&parts))
    }

    /// Compiles one join clause. `index` is the 0-based position of the
    /// join in the declaration list; the alias is numbered from 1.
    pub fn build_join_sql(
        &self,
        join: &Join,
        index: usize,
        params: &QueryParams,
    ) -> Result<String, CompileError> {
        let body = self.rename_params(&join.on);
        let condition = self.build_expression_sql(&body, params)?;
        Ok(format!(
            "{} JOIN {} AS {} ON {}",
            join.kind.keyword(),
            self.escape_identifier([join.table_name.as_str()]),
            self.escape_identifier([self.join_alias(index).as_str()]),
            condition
        ))
    }

    /// Compiles the clause tail of a query (everything after the FROM),
    /// in the fixed clause order.
    pub fn build_query_sql(&self, query: &Query) -> Result<String, CompileError> {
        let mut parts = Vec::new();
        for (index, join) in query.joins.iter().enumerate() {
            parts.push(self.build_join_sql(join, index, &query.params)?);
        }
        if let Some(where_) = &query.where_ {
            parts.push(format!("WHERE {}", self.build_where_sql(where_, &query.params)?));
        }
        if !query.orders.is_empty() {
            parts.push(format!("ORDER BY {}", self.build_order_sql(&query.orders)?));
        }
        if let Some(limit) = &query.limit {
            parts.push(format!("LIMIT {}", parse_uint(limit, "LIMIT")?));
        }
        if let Some(offset) = &query.offset {
            parts.push(format!("OFFSET {}", parse_uint(offset, "OFFSET")?));
        }
        Ok(parts.join(" "))
    }

    /// Builds a full SELECT statement.
    pub fn build_select_sql(
        &self,
        database_name: &str,
        table_name: &str,
        query: &Query,
        selector: Option<&Predicate>,
    ) -> Result<String, CompileError> {
        let what = self.build_selector_sql(selector)?;
        let mut sql = format!(
            "SELECT {what} FROM {} AS {}",
            self.escape_identifier([database_name, table_name]),
            self.escape_identifier([self.options().table_alias.as_str()])
        );
        let tail = self.build_query_sql(query)?;
        if !tail.is_empty() {
            sql.push(' ');
            sql.push_str(&tail);
        }
        Ok(sql)
    }
}

/// Coerces a LIMIT/OFFSET value to an integer via base-10 parsing.
fn parse_uint(value: &SqlValue, clause: &str) -> Result<u64, CompileError> {
    match value {
        SqlValue::Int(n) if *n >= 0 => Ok(*n as u64),
        SqlValue::Text(s) => s.trim().parse::<u64>().map_err(|_| {
            CompileError::UnsupportedNode(format!("{clause} value `{s}` is not an integer"))
        }),
        other => Err(CompileError::UnsupportedNode(format!(
            "{clause} value {other:?} is not an integer"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::escape::RawEscaper;
    use crate::expr::{field, lit, projection, Expression, Predicate};
    use crate::options::SqlBuilderOptions;
    use crate::query::{OrderDirection, QueryBuilder};

    fn raw_builder() -> SqlBuilder {
        SqlBuilder::new(SqlBuilderOptions::default().with_escaper(Arc::new(RawEscaper)))
    }

    #[test]
    fn select_star_without_selector() {
        let builder = SqlBuilder::default();
        let query = QueryBuilder::new()
            .where_(Predicate::unary(|t| t.col("name").eq(lit("Ada"))))
            .build();
        let sql = builder
            .build_select_sql("app", "users", &query, None)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT __t.* FROM `app`.`users` AS `__t` WHERE (`__t`.`name` = 'Ada')"
        );
    }

    #[test]
    fn bare_query_has_no_trailing_clauses() {
        let builder = raw_builder();
        let sql = builder
            .build_select_sql("app", "users", &Query::default(), None)
            .unwrap();
        assert_eq!(sql, "SELECT __t.* FROM app.users AS __t");
    }

    #[test]
    fn clause_order_is_fixed() {
        // Construct clauses in scrambled order; emission order must
        // still be JOIN, WHERE, ORDER BY, LIMIT, OFFSET.
        let builder = raw_builder();
        let query = QueryBuilder::new()
            .skip(40)
            .order_by(Predicate::unary(|t| t.col("name")), OrderDirection::Asc)
            .take(20)
            .where_(Predicate::unary(|t| t.col("active").eq(lit(true))))
            .left_join(
                "user_profiles",
                Predicate::binary(|u, p| u.col("id").eq(p.col("user_id"))),
            )
            .build();
        let sql = builder
            .build_select_sql("app", "users", &query, None)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT __t.* FROM app.users AS __t \
             LEFT JOIN user_profiles AS __j1 ON (__t.id = __j1.user_id) \
             WHERE (__t.active = true) \
             ORDER BY __t.name ASC \
             LIMIT 20 OFFSET 40"
        );
    }

    #[test]
    fn join_aliases_are_numbered_in_declaration_order() {
        let builder = raw_builder();
        let query = QueryBuilder::new()
            .left_join("a", Predicate::binary(|t, j| t.col("a_id").eq(j.col("id"))))
            .inner_join("b", Predicate::binary(|t, j| t.col("b_id").eq(j.col("id"))))
            .build();
        let sql = builder.build_query_sql(&query).unwrap();
        assert_eq!(
            sql,
            "LEFT JOIN a AS __j1 ON (__t.a_id = __j1.id) \
             INNER JOIN b AS __j2 ON (__t.b_id = __j2.id)"
        );
    }

    #[test]
    fn selector_single_identifier() {
        let builder = raw_builder();
        let selector = Predicate::unary(|t| t.col("id"));
        assert_eq!(builder.build_selector_sql(Some(&selector)).unwrap(), "__t.id");
    }

    #[test]
    fn selector_identifier_array() {
        let builder = raw_builder();
        let selector = Predicate::new(
            ["u"],
            Expression::Array(vec![field("u", "id"), field("u", "name")]),
        );
        assert_eq!(
            builder.build_selector_sql(Some(&selector)).unwrap(),
            "__t.id,__t.name"
        );
    }

    #[test]
    fn selector_object_projection() {
        let builder = raw_builder();
        let selector = Predicate::new(
            ["u"],
            projection([("uid", field("u", "id")), ("who", field("u", "name"))]),
        );
        assert_eq!(
            builder.build_selector_sql(Some(&selector)).unwrap(),
            "__t.id AS uid,__t.name AS who"
        );
    }

    #[test]
    fn selector_rejects_other_shapes() {
        let builder = raw_builder();
        let selector = Predicate::unary(|t| t.col("id").eq(lit(1)));
        let err = builder.build_selector_sql(Some(&selector)).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedNode(_)));
    }

    #[test]
    fn order_by_multiple_entries() {
        let builder = raw_builder();
        let query = QueryBuilder::new()
            .order_by(Predicate::unary(|t| t.col("age")), OrderDirection::Desc)
            .order_by(Predicate::unary(|t| t.col("name")), OrderDirection::Asc)
            .build();
        let sql = builder.build_query_sql(&query).unwrap();
        assert_eq!(sql, "ORDER BY __t.age DESC,__t.name ASC");
    }

    #[test]
    fn limit_accepts_numeric_strings() {
        let builder = raw_builder();
        let query = QueryBuilder::new().take("12").build();
        assert_eq!(builder.build_query_sql(&query).unwrap(), "LIMIT 12");
    }

    #[test]
    fn limit_rejects_non_numeric_values() {
        let builder = raw_builder();
        let query = QueryBuilder::new().take("twelve").build();
        let err = builder.build_query_sql(&query).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedNode(_)));
    }

    #[test]
    fn named_parameters_resolve_inside_where() {
        let builder = raw_builder();
        let query = QueryBuilder::new()
            .where_(Predicate::unary(|t| t.col("age").ge(crate::expr::param("min"))))
            .with([("min", 21)])
            .build();
        let sql = builder.build_query_sql(&query).unwrap();
        assert_eq!(sql, "WHERE (__t.age >= 21)");
    }

    #[test]
    fn undefined_parameter_in_where_fails() {
        let builder = raw_builder();
        let query = QueryBuilder::new()
            .where_(Predicate::unary(|t| t.col("age").ge(crate::expr::param("min"))))
            .build();
        let err = builder.build_query_sql(&query).unwrap_err();
        assert_eq!(err, CompileError::UndefinedParameter(String::from("min")));
    }
}
