//! Top-level sequences of `:name: value` and `@name: Class(...)` statements.

use cdl_common::error::{CdlError, Result};
use cdl_common::types::Span;

use super::TokenCursor;
use super::arguments::parse_assignable;
use super::ast::{AssignableNode, ParameterDefinitionNode, ScopeEntry, ScopeNode};
use super::service::parse_service_definition;
use super::token::TokenKind;

pub(super) fn parse_scope(cursor: &mut TokenCursor<'_>) -> Result<ScopeNode> {
    let mut scope = ScopeNode::new();

    while let Some(kind) = cursor.peek_kind() {
        let entry = match kind {
            TokenKind::ServiceReference(_) => ScopeEntry::Service(parse_service_definition(cursor)?),
            TokenKind::ParameterReference(_) => {
                ScopeEntry::Parameter(parse_parameter_definition(cursor)?)
            }
            _ => return Err(cursor.unexpected("a service or parameter definition")),
        };
        scope.push(entry);
    }

    tracing::debug!(statements = scope.len(), "parsed CDL scope");
    Ok(scope)
}

fn parse_parameter_definition(cursor: &mut TokenCursor<'_>) -> Result<ParameterDefinitionNode> {
    let start = cursor.position();
    let name = match cursor.peek_kind() {
        Some(TokenKind::ParameterReference(name)) => {
            let _ = cursor.advance();
            name
        }
        _ => return Err(cursor.unexpected("a parameter name (`:name`)")),
    };

    if !cursor.check(&TokenKind::Colon) {
        return Err(cursor.unexpected("`:` after the parameter name"));
    }
    let _ = cursor.advance();

    let value = parse_assignable(cursor, 0)?;
    if let Some((span, reference)) = first_reference(&value) {
        return Err(CdlError::syntax(
            span.start,
            format!("parameter `{name}` must be a literal value, found reference `{reference}`"),
        ));
    }

    Ok(ParameterDefinitionNode::new(name.clone(), value)?
        .with_span(Span::new(start, cursor.last_end())))
}

fn first_reference(node: &AssignableNode) -> Option<(Span, String)> {
    match node {
        AssignableNode::Value(_) => None,
        AssignableNode::Array(array) => array.values().find_map(first_reference),
        AssignableNode::ParameterReference(reference) => {
            Some((reference.span(), format!(":{}", reference.name())))
        }
        AssignableNode::ServiceReference(reference) => {
            Some((reference.span(), format!("@{}", reference.name())))
        }
    }
}
