//! Integration tests for argument list parsing.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use cdl_common::error::ErrorKind;
use cdl_common::types::Position;
use cdl_parser::parser::ast::{AssignableNode, NodeKind};
use cdl_parser::parser::parse_arguments;
use cdl_parser::parser::token::{Scalar, ValueType};
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn kinds(nodes: &[AssignableNode]) -> Vec<NodeKind> {
    nodes.iter().map(AssignableNode::kind).collect()
}

#[test]
fn string_arguments() {
    init_tracing();
    let args = parse_arguments(r#""hello", "world""#).expect("should parse");
    let values: Vec<&Scalar> = args
        .arguments()
        .iter()
        .filter_map(|node| node.as_value().map(|v| v.raw_value()))
        .collect();
    assert_eq!(
        values,
        vec![&Scalar::String("hello".into()), &Scalar::String("world".into())]
    );
}

#[test]
fn mixed_scalar_arguments() {
    let args = parse_arguments(r#""galaxy", 42, true, false, null"#).expect("should parse");
    let types: Vec<ValueType> = args
        .arguments()
        .iter()
        .filter_map(|node| node.as_value().map(|v| v.value_type()))
        .collect();
    assert_eq!(
        types,
        vec![
            ValueType::String,
            ValueType::Number,
            ValueType::BoolTrue,
            ValueType::BoolFalse,
            ValueType::Null,
        ]
    );
    assert_eq!(
        args.arguments()[1].to_native().expect("literal"),
        json!(42)
    );
}

#[test]
fn parameter_reference_arguments() {
    for input in [":hello, :world", ":hello,\n:world"] {
        let args = parse_arguments(input).expect("should parse");
        assert_eq!(
            kinds(args.arguments()),
            vec![NodeKind::ParameterReference, NodeKind::ParameterReference]
        );
        let names: Vec<&str> = args
            .arguments()
            .iter()
            .filter_map(|node| node.as_parameter_reference().map(|r| r.name()))
            .collect();
        assert_eq!(names, vec!["hello", "world"]);
    }
}

#[test]
fn service_reference_arguments() {
    let args = parse_arguments("@hello, @world").expect("should parse");
    assert_eq!(
        kinds(args.arguments()),
        vec![NodeKind::ServiceReference, NodeKind::ServiceReference]
    );

    let single = parse_arguments("@hello").expect("should parse");
    assert_eq!(single.len(), 1);
    assert_eq!(
        single.arguments()[0].as_service_reference().map(|r| r.name()),
        Some("hello")
    );
}

#[test]
fn empty_argument_list() {
    let args = parse_arguments("").expect("should parse");
    assert!(args.is_empty());

    let args = parse_arguments("  // just a comment\n").expect("should parse");
    assert!(args.is_empty());
}

#[test]
fn array_arguments() {
    let args = parse_arguments(r#"{"A"}"#).expect("should parse");
    assert_eq!(kinds(args.arguments()), vec![NodeKind::Array]);
    assert_eq!(args.arguments()[0].to_native().expect("literal"), json!(["A"]));

    let args = parse_arguments(r#"{"A"}, {1, 2, 3}"#).expect("should parse");
    assert_eq!(args.len(), 2);
    let second = args.arguments()[1].as_array().expect("array");
    assert_eq!(second.len(), 3);
    assert_eq!(
        args.arguments()[1].to_native().expect("literal"),
        json!([1, 2, 3])
    );
}

#[test]
fn class_name_arguments() {
    let args = parse_arguments("Foo::class, Bar::class").expect("should parse");
    let values: Vec<serde_json::Value> = args
        .arguments()
        .iter()
        .map(|node| node.to_native().expect("literal"))
        .collect();
    assert_eq!(values, vec![json!(r"\Foo"), json!(r"\Bar")]);
}

#[test]
fn double_comma_is_a_syntax_error() {
    let err = parse_arguments("@foo,,").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.position(), Some(Position::new(5, 1, 6)));
}

#[test]
fn bare_identifier_is_a_syntax_error() {
    let err = parse_arguments("@foo,bar").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.to_string().contains("invalid identifier `bar`"), "got: {err}");
}

#[test]
fn unterminated_array_is_a_syntax_error() {
    let err = parse_arguments("{1, 2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.to_string().contains("end of input"), "got: {err}");
}

#[test]
fn references_cannot_be_converted_to_native() {
    let args = parse_arguments("{1, @logger}").expect("should parse");
    let err = args.arguments()[0].to_native().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Logical);
}
