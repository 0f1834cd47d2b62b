//! The structured query value and its fluent builder.

use std::collections::BTreeMap;

use crate::expr::Predicate;
use crate::value::{SqlValue, ToSqlValue};

/// Named-parameter bindings for one query.
pub type QueryParams = BTreeMap<String, SqlValue>;

/// Sort direction of one ORDER BY entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl OrderDirection {
    /// The SQL keyword for this direction.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Sort direction.
    pub direction: OrderDirection,
    /// The ordered expression; must resolve to one identifier or an
    /// array of identifiers.
    pub expression: Predicate,
}

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// LEFT JOIN.
    Left,
    /// RIGHT JOIN.
    Right,
    /// INNER JOIN.
    Inner,
}

impl JoinKind {
    /// The SQL keyword for this join flavor.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Inner => "INNER",
        }
    }
}

/// One join declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Joined table name.
    pub table_name: String,
    /// Join flavor.
    pub kind: JoinKind,
    /// The ON condition.
    pub on: Predicate,
}

/// A structured query: every clause optional, assembled into SQL by
/// [`crate::SqlBuilder::build_select_sql`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    /// WHERE condition.
    pub where_: Option<Predicate>,
    /// ORDER BY entries, in declaration order.
    pub orders: Vec<Order>,
    /// LIMIT value; coerced to an integer at compile time.
    pub limit: Option<SqlValue>,
    /// OFFSET value; coerced to an integer at compile time.
    pub offset: Option<SqlValue>,
    /// Joins, in declaration order (numbered starting at 1).
    pub joins: Vec<Join>,
    /// Named-parameter bindings.
    pub params: QueryParams,
}

/// Fluent construction of a [`Query`].
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds named parameters, merging with previous bindings.
    #[must_use]
    pub fn with<S, T>(mut self, params: impl IntoIterator<Item = (S, T)>) -> Self
    where
        S: Into<String>,
        T: ToSqlValue,
    {
        for (name, value) in params {
            self.query.params.insert(name.into(), value.to_sql_value());
        }
        self
    }

    /// Sets the WHERE condition.
    #[must_use]
    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.query.where_ = Some(predicate);
        self
    }

    /// Appends an ORDER BY entry.
    #[must_use]
    pub fn order_by(mut self, expression: Predicate, direction: OrderDirection) -> Self {
        self.query.orders.push(Order {
            direction,
            expression,
        });
        self
    }

    /// Sets the LIMIT.
    #[must_use]
    pub fn take<T: ToSqlValue>(mut self, amount: T) -> Self {
        self.query.limit = Some(amount.to_sql_value());
        self
    }

    /// Sets the OFFSET.
    #[must_use]
    pub fn skip<T: ToSqlValue>(mut self, offset: T) -> Self {
        self.query.offset = Some(offset.to_sql_value());
        self
    }

    /// Appends a join of the given flavor.
    #[must_use]
    pub fn join(mut self, table_name: &str, kind: JoinKind, on: Predicate) -> Self {
        self.query.joins.push(Join {
            table_name: String::from(table_name),
            kind,
            on,
        });
        self
    }

    /// Appends a LEFT JOIN.
    #[must_use]
    pub fn left_join(self, table_name: &str, on: Predicate) -> Self {
        self.join(table_name, JoinKind::Left, on)
    }

    /// Appends a RIGHT JOIN.
    #[must_use]
    pub fn right_join(self, table_name: &str, on: Predicate) -> Self {
        self.join(table_name, JoinKind::Right, on)
    }

    /// Appends an INNER JOIN.
    #[must_use]
    pub fn inner_join(self, table_name: &str, on: Predicate) -> Self {
        self.join(table_name, JoinKind::Inner, on)
    }

    /// Returns the assembled query value.
    #[must_use]
    pub fn build(self) -> Query {
        self.query
    }
}
