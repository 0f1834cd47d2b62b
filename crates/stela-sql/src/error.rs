//! Error types for expression compilation and type-string parsing.

/// Errors raised while compiling an expression or assembling a query.
///
/// Compilation never emits partial SQL: on any of these errors the whole
/// fragment is discarded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The expression shape is not part of the supported grammar at this
    /// position (e.g. a projection inside a WHERE clause).
    #[error("unsupported expression: {0}")]
    UnsupportedNode(String),

    /// An identifier or parameter name is malformed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A named parameter was referenced but not bound on the query.
    #[error("parameter `:{0}` is not defined; bind it with `with()`")]
    UndefinedParameter(String),

    /// A binary or logical operator with no entry in the operator map.
    #[error("invalid operator `{0}`")]
    InvalidOperator(String),
}

/// Errors raised while parsing a column type string such as
/// `int(10) unsigned`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeParseError {
    /// The input contained no type instruction at all.
    #[error("no type instructions found in `{0}`")]
    Empty(String),
}
