//! The closed expression grammar and its builder API.
//!
//! Callers construct [`Expression`] values directly through the
//! combinators here; the compiler in [`crate::compile`] turns them into
//! SQL fragments. Operators are carried as source strings and resolved
//! through the configured operator maps at compile time, so an unknown
//! operator is a compile error rather than an unrepresentable state.

use crate::value::{SqlValue, ToSqlValue};

/// A reference to exactly one alias and one static field name.
///
/// Computed or dynamic member access is not representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    /// Table alias (a predicate parameter name before renaming).
    pub table: String,
    /// Field name.
    pub name: String,
}

/// One entry of a SELECT object projection: `expression AS alias`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionEntry {
    /// Output column alias.
    pub alias: String,
    /// The projected expression; must compile to an identifier.
    pub value: Expression,
}

/// One variant of the closed predicate/projection grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A scalar literal.
    Literal(SqlValue),
    /// An `alias.field` reference.
    Identifier(FieldRef),
    /// A binary operation such as `===` or `in`.
    Binary {
        /// Source operator, resolved via the binary operator map.
        op: String,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },
    /// A logical connective (`&&` or `||`).
    Logical {
        /// Source operator, resolved via the logical operator map.
        op: String,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },
    /// A parenthesized element list, used as the right-hand side of `in`.
    Array(Vec<Expression>),
    /// An object projection, valid only in SELECT position.
    Projection(Vec<ProjectionEntry>),
    /// A named parameter, bound at compile time through the query params.
    Param(String),
}

// Combinator names mirror the rendered operators, not std traits.
#[allow(clippy::should_implement_trait)]
impl Expression {
    fn binary(self, op: &str, right: Self) -> Self {
        Self::Binary {
            op: String::from(op),
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// Equality (`=`).
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.binary("===", right)
    }

    /// Inequality (`!=`).
    #[must_use]
    pub fn ne(self, right: Self) -> Self {
        self.binary("!==", right)
    }

    /// Less-than.
    #[must_use]
    pub fn lt(self, right: Self) -> Self {
        self.binary("<", right)
    }

    /// Less-than-or-equal.
    #[must_use]
    pub fn le(self, right: Self) -> Self {
        self.binary("<=", right)
    }

    /// Greater-than.
    #[must_use]
    pub fn gt(self, right: Self) -> Self {
        self.binary(">", right)
    }

    /// Greater-than-or-equal.
    #[must_use]
    pub fn ge(self, right: Self) -> Self {
        self.binary(">=", right)
    }

    /// Addition.
    #[must_use]
    pub fn add(self, right: Self) -> Self {
        self.binary("+", right)
    }

    /// Subtraction.
    #[must_use]
    pub fn sub(self, right: Self) -> Self {
        self.binary("-", right)
    }

    /// Multiplication.
    #[must_use]
    pub fn mul(self, right: Self) -> Self {
        self.binary("*", right)
    }

    /// Division.
    #[must_use]
    pub fn div(self, right: Self) -> Self {
        self.binary("/", right)
    }

    /// Membership test against an array of expressions.
    #[must_use]
    pub fn in_list(self, elements: Vec<Self>) -> Self {
        self.binary("in", Self::Array(elements))
    }

    /// Logical AND.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        Self::Logical {
            op: String::from("&&"),
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// Logical OR.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        Self::Logical {
            op: String::from("||"),
            left: Box::new(self),
            right: Box::new(right),
        }
    }
}

/// Creates an `alias.field` identifier expression.
#[must_use]
pub fn field(table: &str, name: &str) -> Expression {
    Expression::Identifier(FieldRef {
        table: String::from(table),
        name: String::from(name),
    })
}

/// Creates a literal expression.
#[must_use]
pub fn lit<T: ToSqlValue>(value: T) -> Expression {
    Expression::Literal(value.to_sql_value())
}

/// Creates a named-parameter expression; the value is bound at compile
/// time through the query's parameter map.
#[must_use]
pub fn param(name: &str) -> Expression {
    Expression::Param(String::from(name))
}

/// Creates an array expression from literal-convertible values.
#[must_use]
pub fn array<T: ToSqlValue>(values: Vec<T>) -> Expression {
    Expression::Array(values.into_iter().map(lit).collect())
}

/// Creates an object projection from `(alias, expression)` pairs.
#[must_use]
pub fn projection<I, S>(entries: I) -> Expression
where
    I: IntoIterator<Item = (S, Expression)>,
    S: Into<String>,
{
    Expression::Projection(
        entries
            .into_iter()
            .map(|(alias, value)| ProjectionEntry {
                alias: alias.into(),
                value,
            })
            .collect(),
    )
}

/// A handle to one positional predicate parameter, used by the closure
/// constructors on [`Predicate`].
#[derive(Debug, Clone)]
pub struct Alias(String);

impl Alias {
    /// Creates an alias handle with an explicit name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(String::from(name))
    }

    /// The alias name as it appears inside the predicate body.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// References a field of this alias.
    #[must_use]
    pub fn col(&self, name: &str) -> Expression {
        field(&self.0, name)
    }
}

/// A caller-supplied predicate, selector, join condition, or order
/// expression: positional parameter names plus a body referencing them.
///
/// Before compilation the builder renames the positional parameters to
/// its configured alias sequence (primary table alias, then one alias
/// per join); caller-chosen names never reach the emitted SQL.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Positional parameter names, in declaration order.
    pub params: Vec<String>,
    /// The predicate body.
    pub body: Expression,
}

impl Predicate {
    /// Creates a predicate from explicit parameter names and a body.
    #[must_use]
    pub fn new<I, S>(params: I, body: Expression) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            body,
        }
    }

    /// Creates a single-parameter predicate from a closure over the
    /// table alias.
    #[must_use]
    pub fn unary<F>(f: F) -> Self
    where
        F: FnOnce(&Alias) -> Expression,
    {
        let t = Alias::new("p0");
        let body = f(&t);
        Self::new([t.0], body)
    }

    /// Creates a two-parameter predicate from a closure over the table
    /// alias and the first join alias.
    #[must_use]
    pub fn binary<F>(f: F) -> Self
    where
        F: FnOnce(&Alias, &Alias) -> Expression,
    {
        let t = Alias::new("p0");
        let j = Alias::new("p1");
        let body = f(&t, &j);
        Self::new([t.0, j.0], body)
    }
}
