//! Argument lists and the per-argument dispatch shared with arrays.

use cdl_common::error::Result;

use super::TokenCursor;
use super::array::parse_array;
use super::ast::{
    ArgumentArrayNode, AssignableNode, ParameterReferenceNode, ServiceReferenceNode, ValueNode,
};
use super::token::TokenKind;

/// Parses comma-separated arguments up to `terminator`, or to the end of
/// input when there is none. The terminator itself is not consumed.
pub(super) fn parse_argument_list(
    cursor: &mut TokenCursor<'_>,
    terminator: Option<&TokenKind>,
) -> Result<ArgumentArrayNode> {
    let mut arguments = ArgumentArrayNode::new();
    if at_list_end(cursor, terminator) {
        return Ok(arguments);
    }

    loop {
        arguments.push_node(parse_assignable(cursor, 0)?);

        if at_list_end(cursor, terminator) {
            return Ok(arguments);
        }
        if !cursor.check(&TokenKind::Comma) {
            return Err(cursor.unexpected("`,` between arguments"));
        }
        let _ = cursor.advance();
        if at_list_end(cursor, terminator) || cursor.check(&TokenKind::Comma) {
            return Err(cursor.error("expected an argument after `,`"));
        }
    }
}

fn at_list_end(cursor: &TokenCursor<'_>, terminator: Option<&TokenKind>) -> bool {
    cursor.at_end() || terminator.is_some_and(|kind| cursor.check(kind))
}

/// Parses one value, array, or reference at `depth` levels of array nesting.
pub(super) fn parse_assignable(
    cursor: &mut TokenCursor<'_>,
    depth: usize,
) -> Result<AssignableNode> {
    let Some(token) = cursor.peek() else {
        return Err(cursor.unexpected("an argument"));
    };

    match &token.kind {
        TokenKind::Literal(_) => {
            let _ = cursor.advance();
            Ok(ValueNode::from_token(token)?.into())
        }
        TokenKind::ServiceReference(name) => {
            let _ = cursor.advance();
            Ok(ServiceReferenceNode::new(name.clone())
                .with_span(token.span)
                .into())
        }
        TokenKind::ParameterReference(name) => {
            let _ = cursor.advance();
            Ok(ParameterReferenceNode::new(name.clone())
                .with_span(token.span)
                .into())
        }
        TokenKind::BraceOpen => Ok(parse_array(cursor, depth + 1)?.into()),
        TokenKind::Identifier(name) => Err(cursor.error(format!(
            "invalid identifier `{name}`, expected a literal, a reference, an array, or `{name}::class`"
        ))),
        TokenKind::Colon
        | TokenKind::Comma
        | TokenKind::Dash
        | TokenKind::BraceClose
        | TokenKind::ParenOpen
        | TokenKind::ParenClose => Err(cursor.unexpected("an argument")),
    }
}
