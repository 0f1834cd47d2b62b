//! # stela-sql
//!
//! A structured-query expression compiler and DDL builder with pluggable
//! escaping.
//!
//! This crate provides:
//! - A closed expression grammar (filters, projections, joins, orderings,
//!   named parameters) built through explicit combinators
//! - A compiler turning expression trees into SQL fragments with
//!   deterministic alias renaming
//! - A SELECT assembler with a fixed clause order
//! - Column, key, and INSERT DDL rendering
//! - A type-string parser recovering structured column types from server
//!   introspection output
//!
//! ## Compiling a query
//!
//! ```rust
//! use stela_sql::{lit, Predicate, QueryBuilder, SqlBuilder};
//!
//! let builder = SqlBuilder::default();
//! let query = QueryBuilder::new()
//!     .where_(Predicate::unary(|u| u.col("name").eq(lit("Ada"))))
//!     .build();
//! let sql = builder.build_select_sql("app", "users", &query, None).unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT __t.* FROM `app`.`users` AS `__t` WHERE (`__t`.`name` = 'Ada')"
//! );
//! ```
//!
//! Caller-chosen predicate parameter names never reach the SQL: the
//! primary table is always aliased `__t` and joins `__j1`, `__j2`, … by
//! default, so alias collisions are bounded by configuration rather than
//! caller discipline.

pub mod compile;
pub mod ddl;
pub mod error;
pub mod escape;
pub mod expr;
pub mod options;
pub mod query;
pub mod schema;
pub mod select;
pub mod types;
pub mod value;

pub use compile::SqlBuilder;
pub use error::{CompileError, TypeParseError};
pub use escape::{AnsiEscaper, Escaper, MySqlEscaper, RawEscaper};
pub use expr::{array, field, lit, param, projection, Alias, Expression, FieldRef, Predicate};
pub use options::SqlBuilderOptions;
pub use query::{Join, JoinKind, Order, OrderDirection, Query, QueryBuilder, QueryParams};
pub use schema::{Column, ForeignKey, ForeignKeyRule, Key, KeyBase, KeyKind, Table};
pub use types::{parse_type_info, TypeInfo};
pub use value::{Row, SqlValue, ToSqlValue};
