//! `@name: Class\Path(args)` definitions and their `- method(args)` calls.

use cdl_common::constants::NAMESPACE_SEPARATOR;
use cdl_common::error::Result;
use cdl_common::types::Span;

use super::TokenCursor;
use super::arguments::parse_argument_list;
use super::ast::{ArgumentArrayNode, ServiceDefinitionNode, ServiceMethodCallNode};
use super::token::TokenKind;

pub(super) fn parse_service_definition(
    cursor: &mut TokenCursor<'_>,
) -> Result<ServiceDefinitionNode> {
    let start = cursor.position();

    let name = match cursor.peek_kind() {
        Some(TokenKind::ServiceReference(name)) => {
            let _ = cursor.advance();
            name
        }
        _ => return Err(cursor.unexpected("a service name (`@name`)")),
    };

    if !cursor.check(&TokenKind::Colon) {
        return Err(cursor.unexpected("`:` after the service name"));
    }
    let _ = cursor.advance();

    let class_name = match cursor.peek_kind() {
        Some(TokenKind::Identifier(class_name)) if is_class_path(class_name) => {
            let _ = cursor.advance();
            class_name
        }
        Some(TokenKind::Identifier(class_name)) => {
            return Err(cursor.error(format!(
                "malformed class name `{class_name}`, empty namespace segment"
            )));
        }
        _ => return Err(cursor.unexpected("a class name")),
    };

    let arguments = parse_call_arguments(cursor)?;
    let mut definition = ServiceDefinitionNode::new(name.clone(), class_name)
        .with_arguments(arguments);

    while cursor.check(&TokenKind::Dash) {
        definition.add_method_call(parse_method_call(cursor)?);
    }

    tracing::trace!(service = %name, class = %class_name, "parsed service definition");
    Ok(definition.with_span(Span::new(start, cursor.last_end())))
}

fn parse_method_call(cursor: &mut TokenCursor<'_>) -> Result<ServiceMethodCallNode> {
    let _ = cursor.expect_token(&TokenKind::Dash)?;
    let name = match cursor.peek_kind() {
        Some(TokenKind::Identifier(name)) if !name.contains(NAMESPACE_SEPARATOR) => {
            let _ = cursor.advance();
            name
        }
        _ => return Err(cursor.unexpected("a method name after `-`")),
    };
    let arguments = parse_call_arguments(cursor)?;
    Ok(ServiceMethodCallNode::new(name.clone(), arguments))
}

/// `Acme\Log` or `\Acme\Log`: one optional leading separator, no empty segment.
fn is_class_path(name: &str) -> bool {
    let path = name.strip_prefix(NAMESPACE_SEPARATOR).unwrap_or(name);
    path.split(NAMESPACE_SEPARATOR).all(|segment| !segment.is_empty())
}

/// Parses `(` arguments `)`.
fn parse_call_arguments(cursor: &mut TokenCursor<'_>) -> Result<ArgumentArrayNode> {
    if !cursor.check(&TokenKind::ParenOpen) {
        return Err(cursor.unexpected("`(`"));
    }
    let _ = cursor.advance();
    let arguments = parse_argument_list(cursor, Some(&TokenKind::ParenClose))?;
    let _ = cursor.expect_token(&TokenKind::ParenClose)?;
    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use cdl_common::error::ErrorKind;
    use cdl_common::types::Position;

    use super::super::parse_service_definition;
    use super::super::token::Scalar;

    #[test]
    fn simple_definition() {
        let def = parse_service_definition(r"@logger: Acme\Log()").expect("should parse");
        assert_eq!(def.name(), "logger");
        assert_eq!(def.class_name(), r"Acme\Log");
        assert_eq!(def.qualified_class_name(), r"\Acme\Log");
        assert!(!def.has_arguments());
        assert!(def.method_calls().is_empty());
        assert_eq!(def.span().start, Position::start());
        assert_eq!(def.span().end, Position::new(19, 1, 20));
    }

    #[test]
    fn leading_separator_is_normalized() {
        let def = parse_service_definition(r"@logger: \Acme\Log()").expect("should parse");
        assert_eq!(def.class_name(), r"Acme\Log");
    }

    #[test]
    fn definition_with_arguments() {
        let def = parse_service_definition(
            r#"@car: Acme\Car(@engine, :car.color, {"sunroof": true}, Acme\Wheel::class)"#,
        )
        .expect("should parse");
        assert!(def.has_arguments());
        let args = def.arguments().arguments();
        assert_eq!(args.len(), 4);
        assert_eq!(
            args[0].as_service_reference().map(|r| r.name()),
            Some("engine")
        );
        assert_eq!(
            args[1].as_parameter_reference().map(|r| r.name()),
            Some("car.color")
        );
        assert!(args[2].as_array().is_some());
        assert_eq!(
            args[3].as_value().map(|v| v.raw_value()),
            Some(&Scalar::String(r"\Acme\Wheel".into()))
        );
    }

    #[test]
    fn multiline_definition_with_method_calls() {
        let input = r#"@mailer: Acme\Mailer(
    :mail.host,
    25
)
    - setLogger(@logger)
    - setFrom("noreply@example.com", "Acme")"#;
        let def = parse_service_definition(input).expect("should parse");
        assert_eq!(def.arguments().len(), 2);
        let calls = def.method_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name(), "setLogger");
        assert_eq!(calls[0].arguments().len(), 1);
        assert_eq!(calls[1].name(), "setFrom");
        assert_eq!(calls[1].arguments().len(), 2);
    }

    #[test]
    fn missing_colon() {
        let err = parse_service_definition(r"@logger Acme\Log()").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.position(), Some(Position::new(8, 1, 9)));
    }

    #[test]
    fn missing_parentheses() {
        let err = parse_service_definition(r"@logger: Acme\Log").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.to_string().contains("expected `(`"), "got: {err}");

        let err = parse_service_definition(r"@logger: Acme\Log(1").unwrap_err();
        assert!(err.to_string().contains("expected `)`"), "got: {err}");
    }

    #[test]
    fn malformed_name() {
        let err = parse_service_definition(r"logger: Acme\Log()").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.position(), Some(Position::start()));
    }

    #[test]
    fn class_literal_is_not_a_class_name() {
        let err = parse_service_definition(r"@logger: Acme\Log::class()").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.to_string().contains("a class name"), "got: {err}");
    }

    #[test]
    fn empty_namespace_segment_is_rejected() {
        for input in [
            r"@logger: Acme\()",
            r"@logger: Acme\\Log()",
            r"@logger: \()",
            r"@logger: \\Acme()",
        ] {
            let err = parse_service_definition(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Syntax, "input: {input}");
            assert_eq!(err.position(), Some(Position::new(9, 1, 10)), "input: {input}");
            assert!(err.to_string().contains("malformed class name"), "got: {err}");
        }
    }

    #[test]
    fn colon_must_not_touch_class_name_after_space() {
        assert!(parse_service_definition(r"@logger : Acme\Log()").is_ok());
        assert!(parse_service_definition(r"@logger:Acme\Log()").is_ok());

        let err = parse_service_definition(r"@logger :Acme\Log()").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.position(), Some(Position::new(8, 1, 9)));
        assert!(
            err.to_string().contains("found parameter reference `:Acme`"),
            "got: {err}"
        );
    }

    #[test]
    fn namespaced_method_name_is_rejected() {
        let err = parse_service_definition(r"@a: Foo() - Bar\baz()").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = parse_service_definition("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.to_string().contains("end of input"), "got: {err}");
    }
}
