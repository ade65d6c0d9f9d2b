//! CDL parser built on `nom` tokens and recursive descent.
//!
//! Transforms raw CDL text into typed AST nodes. Every entry point
//! tokenizes the whole input, threads one [`TokenCursor`] through the
//! construct parsers, and rejects tokens left over after the root node.

pub mod ast;
pub mod lexer;
pub mod token;
pub mod validator;

mod arguments;
mod array;
mod scope;
mod service;

use cdl_common::config::ParserConfig;
use cdl_common::error::{CdlError, Result};
use cdl_common::types::Position;

use self::ast::{ArgumentArrayNode, ScopeNode, ServiceDefinitionNode};
use self::token::{Token, TokenKind};

/// Forward-only cursor into a token stream for recursive-descent parsing.
pub(crate) struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Position,
    max_nesting_depth: usize,
}

impl<'a> TokenCursor<'a> {
    const fn new(tokens: &'a [Token], eof: Position, config: &ParserConfig) -> Self {
        Self {
            tokens,
            pos: 0,
            eof,
            max_nesting_depth: config.max_nesting_depth,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|tok| &tok.kind)
    }

    fn peek_nth_kind(&self, n: usize) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos + n).map(|tok| &tok.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, expected: &TokenKind) -> bool {
        self.peek_kind() == Some(expected)
    }

    fn expect_token(&mut self, expected: &TokenKind) -> Result<&'a Token> {
        match self.peek() {
            Some(tok) if &tok.kind == expected => {
                self.pos += 1;
                Ok(tok)
            }
            _ => Err(self.unexpected(&expected.to_string())),
        }
    }

    /// Position of the next token, or of the end of input.
    fn position(&self) -> Position {
        self.peek().map_or(self.eof, |tok| tok.span.start)
    }

    /// End position of the last consumed token.
    fn last_end(&self) -> Position {
        self.pos
            .checked_sub(1)
            .and_then(|idx| self.tokens.get(idx))
            .map_or(Position::start(), |tok| tok.span.end)
    }

    const fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    const fn max_nesting_depth(&self) -> usize {
        self.max_nesting_depth
    }

    /// Syntax error at the next token.
    fn error(&self, message: impl Into<String>) -> CdlError {
        CdlError::syntax(self.position(), message)
    }

    /// Syntax error describing what was found instead of `expected`.
    fn unexpected(&self, expected: &str) -> CdlError {
        match self.peek_kind() {
            Some(kind) => self.error(format!("expected {expected}, found {kind}")),
            None => self.error(format!("expected {expected}, found end of input")),
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek_kind() {
            None => Ok(()),
            Some(kind) => Err(self.error(format!("unexpected trailing {kind}"))),
        }
    }
}

fn run<T>(
    input: &str,
    config: &ParserConfig,
    parse: impl FnOnce(&mut TokenCursor<'_>) -> Result<T>,
) -> Result<T> {
    let tokens = lexer::tokenize_with(input, config)?;
    let eof = Position::start().advance_str(input);
    let mut cursor = TokenCursor::new(&tokens, eof, config);
    let node = parse(&mut cursor)?;
    cursor.expect_end()?;
    Ok(node)
}

/// Parses a bare argument list such as `"a", @logger, {1, 2}`.
///
/// # Errors
///
/// Returns a lexical or syntax error if the input is malformed.
pub fn parse_arguments(input: &str) -> Result<ArgumentArrayNode> {
    parse_arguments_with(input, &ParserConfig::default())
}

/// Parses a bare argument list with explicit limits.
///
/// # Errors
///
/// Returns a lexical or syntax error if the input is malformed or exceeds
/// the configured limits.
pub fn parse_arguments_with(input: &str, config: &ParserConfig) -> Result<ArgumentArrayNode> {
    tracing::debug!(bytes = input.len(), "parsing CDL argument list");
    run(input, config, |cursor| arguments::parse_argument_list(cursor, None))
}

/// Parses a single `@name: Class\Path(args)` definition.
///
/// # Errors
///
/// Returns a lexical or syntax error if the input is malformed.
pub fn parse_service_definition(input: &str) -> Result<ServiceDefinitionNode> {
    parse_service_definition_with(input, &ParserConfig::default())
}

/// Parses a single service definition with explicit limits.
///
/// # Errors
///
/// Returns a lexical or syntax error if the input is malformed or exceeds
/// the configured limits.
pub fn parse_service_definition_with(
    input: &str,
    config: &ParserConfig,
) -> Result<ServiceDefinitionNode> {
    tracing::debug!(bytes = input.len(), "parsing CDL service definition");
    run(input, config, service::parse_service_definition)
}

/// Parses and validates a sequence of parameter and service definitions.
///
/// # Errors
///
/// Returns a lexical or syntax error if the input is malformed, or a
/// semantic error if validation fails.
pub fn parse_scope(input: &str) -> Result<ScopeNode> {
    parse_scope_with(input, &ParserConfig::default())
}

/// Parses and validates a scope with explicit limits.
///
/// # Errors
///
/// Returns a lexical or syntax error if the input is malformed or exceeds
/// the configured limits, or a semantic error if validation fails.
pub fn parse_scope_with(input: &str, config: &ParserConfig) -> Result<ScopeNode> {
    tracing::debug!(bytes = input.len(), "parsing CDL scope");
    let scope = run(input, config, scope::parse_scope)?;
    validator::validate(&scope)?;
    Ok(scope)
}

#[cfg(test)]
mod tests {
    use cdl_common::error::ErrorKind;

    use super::*;

    #[test]
    fn cursor_reports_eof_position() {
        let tokens = lexer::tokenize("@a\n").expect("should tokenize");
        let eof = Position::start().advance_str("@a\n");
        let mut cursor = TokenCursor::new(&tokens, eof, &ParserConfig::default());
        assert_eq!(cursor.position(), Position::new(0, 1, 1));
        let _ = cursor.advance();
        assert!(cursor.at_end());
        assert_eq!(cursor.position(), Position::new(3, 2, 1));
        assert_eq!(cursor.last_end(), Position::new(2, 1, 3));
    }

    #[test]
    fn cursor_expect_token_reports_found_kind() {
        let tokens = lexer::tokenize("@a").expect("should tokenize");
        let mut cursor = TokenCursor::new(&tokens, Position::start(), &ParserConfig::default());
        let err = cursor.expect_token(&TokenKind::Colon).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(
            err.to_string().contains("found service reference `@a`"),
            "got: {err}"
        );
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse_service_definition(r"@a: Foo() )").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.position(), Some(Position::new(10, 1, 11)));
    }

    #[test]
    fn lexical_errors_propagate() {
        let err = parse_arguments(r#""open"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lexical);
    }
}
