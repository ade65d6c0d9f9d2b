//! Lexical units produced by the tokenizer.
//!
//! Literal tokens carry a [`Scalar`] payload and their [`ValueType`] is
//! derived from that payload, so token classification and value-node types
//! share a single enumeration.

use std::fmt;

use cdl_common::types::Span;
use serde::Serialize;

/// Type tag of a literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueType {
    /// Quoted string, or a `Foo::class` name.
    String,
    /// Integer or decimal number.
    Number,
    /// The `true` keyword.
    BoolTrue,
    /// The `false` keyword.
    BoolFalse,
    /// The `null` keyword.
    Null,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::BoolTrue => "true",
            Self::BoolFalse => "false",
            Self::Null => "null",
        };
        f.write_str(name)
    }
}

/// A literal value as written in the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// String contents with escapes already applied.
    String(String),
    /// Number without a decimal point.
    Integer(i64),
    /// Number with a decimal point.
    Float(f64),
    /// Boolean keyword.
    Bool(bool),
    /// The `null` keyword.
    Null,
}

impl Scalar {
    /// Returns the type tag matching this value.
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::String(_) => ValueType::String,
            Self::Integer(_) | Self::Float(_) => ValueType::Number,
            Self::Bool(true) => ValueType::BoolTrue,
            Self::Bool(false) => ValueType::BoolFalse,
            Self::Null => ValueType::Null,
        }
    }

    /// Converts the value into a plain JSON value.
    pub fn to_native(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Integer(n) => serde_json::Value::from(*n),
            Self::Float(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Null => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
        }
    }
}

/// Kind and payload of a token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    /// A string, number, boolean, or `null` literal.
    Literal(Scalar),
    /// A bare identifier or class path (`Acme\Log`, `setLogger`).
    Identifier(String),
    /// `@name`, holding the name without the sigil.
    ServiceReference(String),
    /// `:name`, holding the name without the sigil.
    ParameterReference(String),
    /// `:` separator between a name and its definition or an array key.
    Colon,
    /// `,` separator.
    Comma,
    /// `-` introducing a method call.
    Dash,
    /// `{` opening a literal array.
    BraceOpen,
    /// `}` closing a literal array.
    BraceClose,
    /// `(` opening an argument list.
    ParenOpen,
    /// `)` closing an argument list.
    ParenClose,
}

impl TokenKind {
    /// Returns the value type of a literal token, `None` for anything else.
    pub const fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Literal(scalar) => Some(scalar.value_type()),
            _ => None,
        }
    }

    /// Returns `true` if a value node can be built from this token.
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(scalar) => write!(f, "{} literal {scalar}", scalar.value_type()),
            Self::Identifier(name) => write!(f, "identifier `{name}`"),
            Self::ServiceReference(name) => write!(f, "service reference `@{name}`"),
            Self::ParameterReference(name) => write!(f, "parameter reference `:{name}`"),
            Self::Colon => f.write_str("`:`"),
            Self::Comma => f.write_str("`,`"),
            Self::Dash => f.write_str("`-`"),
            Self::BraceOpen => f.write_str("`{`"),
            Self::BraceClose => f.write_str("`}`"),
            Self::ParenOpen => f.write_str("`(`"),
            Self::ParenClose => f.write_str("`)`"),
        }
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// What was lexed.
    pub kind: TokenKind,
    /// Where it was lexed.
    pub span: Span,
}

impl Token {
    /// Creates a token.
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns `true` if this token is a literal.
    pub const fn is_value(&self) -> bool {
        self.kind.is_value()
    }
}
