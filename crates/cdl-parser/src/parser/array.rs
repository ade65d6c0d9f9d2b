//! `{ ... }` literal arrays with optional `key:` prefixes.

use cdl_common::error::{CdlError, Result};

use super::TokenCursor;
use super::arguments::parse_assignable;
use super::ast::{ArrayElementNode, ArrayKey, ArrayNode};
use super::token::{Scalar, TokenKind};

/// Parses an array opened at nesting level `depth` (1 for an outermost array).
pub(super) fn parse_array(cursor: &mut TokenCursor<'_>, depth: usize) -> Result<ArrayNode> {
    let open = cursor.expect_token(&TokenKind::BraceOpen)?;
    if depth > cursor.max_nesting_depth() {
        return Err(CdlError::syntax(
            open.span.start,
            format!(
                "array nesting exceeds the maximum depth of {}",
                cursor.max_nesting_depth()
            ),
        ));
    }

    let mut array = ArrayNode::new();
    if cursor.check(&TokenKind::BraceClose) {
        let _ = cursor.advance();
        return Ok(array);
    }

    loop {
        array.push_element(parse_element(cursor, depth)?);

        match cursor.peek_kind() {
            Some(TokenKind::BraceClose) => {
                let _ = cursor.advance();
                return Ok(array);
            }
            Some(TokenKind::Comma) => {
                let _ = cursor.advance();
                if cursor.at_end()
                    || cursor.check(&TokenKind::BraceClose)
                    || cursor.check(&TokenKind::Comma)
                {
                    return Err(cursor.error("expected an array element after `,`"));
                }
            }
            _ => return Err(cursor.unexpected("`,` or `}` in array")),
        }
    }
}

fn parse_element(cursor: &mut TokenCursor<'_>, depth: usize) -> Result<ArrayElementNode> {
    let key = if cursor.peek_nth_kind(1) == Some(&TokenKind::Colon) {
        Some(parse_key(cursor)?)
    } else {
        None
    };
    let value = parse_assignable(cursor, depth)?;
    Ok(ArrayElementNode { key, value })
}

fn parse_key(cursor: &mut TokenCursor<'_>) -> Result<ArrayKey> {
    let position = cursor.position();
    let key = match cursor.advance().map(|tok| &tok.kind) {
        Some(TokenKind::Literal(Scalar::String(key))) => ArrayKey::String(key.clone()),
        Some(TokenKind::Literal(Scalar::Integer(key))) => ArrayKey::Integer(*key),
        Some(other) => {
            return Err(CdlError::syntax(
                position,
                format!("invalid array key {other}, expected a string or integer"),
            ));
        }
        None => return Err(cursor.unexpected("an array key")),
    };
    let _ = cursor.expect_token(&TokenKind::Colon)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use cdl_common::config::ParserConfig;
    use cdl_common::error::ErrorKind;
    use cdl_common::types::Position;
    use serde_json::json;

    use super::super::ast::AssignableNode;
    use super::super::{parse_arguments, parse_arguments_with};

    fn first_array(input: &str) -> serde_json::Value {
        let args = parse_arguments(input).expect("should parse");
        args.arguments()[0]
            .as_array()
            .expect("array argument")
            .convert_to_native_array()
            .expect("static array")
    }

    #[test]
    fn empty_array() {
        assert_eq!(first_array("{}"), json!([]));
    }

    #[test]
    fn nested_arrays() {
        assert_eq!(
            first_array(r#"{"a", {1, {true, null}}, 2.5}"#),
            json!(["a", [1, [true, null]], 2.5])
        );
    }

    #[test]
    fn keyed_elements() {
        assert_eq!(
            first_array(r#"{"host": "localhost", "port": 6379, 3: "x", "y"}"#),
            json!({"host": "localhost", "port": 6379, "3": "x", "4": "y"})
        );
    }

    #[test]
    fn numeric_string_keys_number_following_elements() {
        assert_eq!(first_array(r#"{"0": "a", "b"}"#), json!({"0": "a", "1": "b"}));
        assert_eq!(first_array(r#"{"5": "x", "y"}"#), json!({"5": "x", "6": "y"}));
        assert_eq!(
            first_array(r#"{"5": "x", "y"}"#),
            first_array(r#"{5: "x", "y"}"#)
        );
    }

    #[test]
    fn duplicate_keys_keep_last_value() {
        assert_eq!(
            first_array(r#"{"a": 1, "b": 2, "a": 3, "c"}"#),
            json!({"a": 3, "b": 2, "0": "c"})
        );
    }

    #[test]
    fn multiline_array() {
        assert_eq!(first_array("{\n  1,\n  2,\n  3\n}"), json!([1, 2, 3]));
    }

    #[test]
    fn references_inside_arrays_parse() {
        let args = parse_arguments("{@logger, :level}").expect("should parse");
        let array = args.arguments()[0].as_array().expect("array argument");
        let values: Vec<&AssignableNode> = array.values().collect();
        assert_eq!(
            values[0].as_service_reference().map(|r| r.name()),
            Some("logger")
        );
        assert_eq!(
            values[1].as_parameter_reference().map(|r| r.name()),
            Some("level")
        );
        assert!(array.convert_to_native_array().is_err());
    }

    #[test]
    fn trailing_comma_is_rejected() {
        let err = parse_arguments("{1, 2,}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.position(), Some(Position::new(6, 1, 7)));
    }

    #[test]
    fn unclosed_array_is_rejected() {
        let err = parse_arguments("{1, 2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.to_string().contains("end of input"), "got: {err}");
    }

    #[test]
    fn invalid_key_is_rejected() {
        let err = parse_arguments(r#"{true: "x"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.to_string().contains("invalid array key"), "got: {err}");
    }

    #[test]
    fn nesting_limit_is_enforced() {
        let config = ParserConfig {
            max_nesting_depth: 2,
            ..ParserConfig::default()
        };
        assert!(parse_arguments_with("{{1}}", &config).is_ok());
        let err = parse_arguments_with("{{{1}}}", &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.position(), Some(Position::new(2, 1, 3)));
    }
}
