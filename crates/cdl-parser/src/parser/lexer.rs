//! Tokenization of CDL source text using `nom`.
//!
//! Produces a stream of [`Token`]s from raw input for the parser to consume.
//! Whitespace, newlines, and `//` line comments are discarded between tokens.

use cdl_common::config::ParserConfig;
use cdl_common::constants::{CLASS_SUFFIX, COMMENT_PREFIX, PARAMETER_SIGIL, SERVICE_SIGIL};
use cdl_common::error::{CdlError, Result};
use cdl_common::types::{Position, Span};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, not_line_ending, one_of, satisfy},
    combinator::{opt, recognize, value},
    multi::many0,
    sequence::preceded,
};

use super::ast::qualify_class_name;
use super::token::{Scalar, Token, TokenKind};

/// Skippable items: whitespace or line comments.
fn skip_trivia(input: &str) -> IResult<&str, ()> {
    let comment = value((), preceded(tag(COMMENT_PREFIX), not_line_ending));
    let ws = value((), multispace1);
    let (input, _) = many0(alt((ws, comment))).parse(input)?;
    Ok((input, ()))
}

/// Parses a single- or double-quoted string literal with basic escape support.
fn quoted_string(input: &str) -> IResult<&str, TokenKind> {
    let (input, quote) = one_of("\"'")(input)?;
    let mut result = String::new();
    let mut chars = input.char_indices();
    loop {
        match chars.next() {
            Some((idx, c)) if c == quote => {
                let remaining = &input[idx + c.len_utf8()..];
                return Ok((remaining, TokenKind::Literal(Scalar::String(result))));
            }
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => result.push('\n'),
                Some((_, 't')) => result.push('\t'),
                Some((_, '\\')) => result.push('\\'),
                Some((_, '"')) => result.push('"'),
                Some((_, '\'')) => result.push('\''),
                Some((_, c)) => {
                    result.push('\\');
                    result.push(c);
                }
                None => {
                    return Err(nom::Err::Failure(nom::error::Error::new(
                        input,
                        nom::error::ErrorKind::Char,
                    )));
                }
            },
            Some((_, c)) => result.push(c),
            None => {
                return Err(nom::Err::Failure(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Char,
                )));
            }
        }
    }
}

/// Parses an integer or decimal literal with an optional leading minus.
fn number_literal(input: &str) -> IResult<&str, TokenKind> {
    let (rest, text) =
        recognize((opt(char('-')), digit1, opt((char('.'), digit1)))).parse(input)?;
    let out_of_range =
        || nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::Digit));
    let scalar = if text.contains('.') {
        let float = text.parse::<f64>().map_err(|_| out_of_range())?;
        if !float.is_finite() {
            return Err(out_of_range());
        }
        Scalar::Float(float)
    } else {
        Scalar::Integer(text.parse::<i64>().map_err(|_| out_of_range())?)
    };
    Ok((rest, TokenKind::Literal(scalar)))
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '\\'
}

const fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\\'
}

const fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Parses a keyword literal, a `Foo::class` name, or an identifier.
fn word(input: &str) -> IResult<&str, TokenKind> {
    let (rest, _) = take_while1(is_ident_start)(input)?;
    let (rest, _) = take_while(is_ident_continue)(rest)?;
    let word = &input[..input.len() - rest.len()];

    if let Some(after) = rest.strip_prefix(CLASS_SUFFIX) {
        if !after.starts_with(is_ident_continue) {
            let class = Scalar::String(qualify_class_name(word));
            return Ok((after, TokenKind::Literal(class)));
        }
    }

    let token = match word {
        "true" => TokenKind::Literal(Scalar::Bool(true)),
        "false" => TokenKind::Literal(Scalar::Bool(false)),
        "null" => TokenKind::Literal(Scalar::Null),
        _ => TokenKind::Identifier(word.to_owned()),
    };
    Ok((rest, token))
}

/// Parses `@name`.
fn service_reference(input: &str) -> IResult<&str, TokenKind> {
    let (rest, name) = preceded(
        char(SERVICE_SIGIL),
        recognize((satisfy(is_name_start), take_while(is_name_char))),
    )
    .parse(input)?;
    Ok((rest, TokenKind::ServiceReference(name.to_owned())))
}

/// Parses `:name`.
fn parameter_reference(input: &str) -> IResult<&str, TokenKind> {
    let (rest, name) = preceded(
        char(PARAMETER_SIGIL),
        recognize((satisfy(is_name_start), take_while(is_name_char))),
    )
    .parse(input)?;
    Ok((rest, TokenKind::ParameterReference(name.to_owned())))
}

/// Parses a punctuation token.
fn symbol(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::Colon, char(':')),
        value(TokenKind::Comma, char(',')),
        value(TokenKind::Dash, char('-')),
        value(TokenKind::BraceOpen, char('{')),
        value(TokenKind::BraceClose, char('}')),
        value(TokenKind::ParenOpen, char('(')),
        value(TokenKind::ParenClose, char(')')),
    ))
    .parse(input)
}

/// Parses a single token (after trivia has been skipped).
fn single_token(input: &str) -> IResult<&str, TokenKind> {
    alt((
        quoted_string,
        number_literal,
        word,
        service_reference,
        parameter_reference,
        symbol,
    ))
    .parse(input)
}

/// A `:` written directly after a name or literal separates a definition
/// or array key from its value instead of starting a parameter reference.
fn is_separator_colon(remaining: &str, previous: Option<&Token>, pos: Position) -> bool {
    remaining.starts_with(PARAMETER_SIGIL)
        && previous.is_some_and(|prev| {
            prev.span.end == pos
                && matches!(
                    prev.kind,
                    TokenKind::ServiceReference(_)
                        | TokenKind::ParameterReference(_)
                        | TokenKind::Literal(_)
                )
        })
}

fn describe_failure(remaining: &str) -> String {
    let cut = remaining
        .char_indices()
        .nth(20)
        .map_or(remaining.len(), |(idx, _)| idx);
    let snippet = &remaining[..cut];
    match remaining.chars().next() {
        Some('"' | '\'') => "unterminated string literal".to_owned(),
        Some('@') => "expected a service name after `@`".to_owned(),
        Some(c) if c.is_ascii_digit() || c == '-' => {
            format!("number literal out of range: \"{snippet}\"")
        }
        Some(c) => format!("unexpected character '{c}' at: \"{snippet}\""),
        None => "unexpected end of input".to_owned(),
    }
}

/// Tokenizes CDL source with the default configuration.
///
/// # Errors
///
/// Returns a lexical error if the input contains text that cannot be
/// tokenized.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    tokenize_with(input, &ParserConfig::default())
}

/// Tokenizes CDL source into a vector of positioned tokens.
///
/// Whitespace, newlines, and `//` line comments are discarded.
///
/// # Errors
///
/// Returns a lexical error if the input exceeds the configured size or
/// contains text that cannot be tokenized.
pub fn tokenize_with(input: &str, config: &ParserConfig) -> Result<Vec<Token>> {
    if let Some(limit) = config.max_source_bytes {
        if input.len() > limit {
            return Err(CdlError::lexical(
                Position::start(),
                format!(
                    "source is {} bytes, exceeding the limit of {limit}",
                    input.len()
                ),
            ));
        }
    }

    let mut tokens: Vec<Token> = Vec::new();
    let mut remaining = input;
    let mut pos = Position::start();

    loop {
        let (rest, ()) = skip_trivia(remaining).map_err(|e| {
            CdlError::lexical(pos, format!("lexer error skipping whitespace: {e}"))
        })?;
        pos = pos.advance_str(&remaining[..remaining.len() - rest.len()]);
        remaining = rest;

        if remaining.is_empty() {
            break;
        }

        let (rest, kind) = if is_separator_colon(remaining, tokens.last(), pos) {
            (&remaining[1..], TokenKind::Colon)
        } else {
            single_token(remaining)
                .map_err(|_| CdlError::lexical(pos, describe_failure(remaining)))?
        };
        let end = pos.advance_str(&remaining[..remaining.len() - rest.len()]);
        tokens.push(Token::new(kind, Span::new(pos, end)));
        pos = end;
        remaining = rest;
    }

    tracing::trace!(count = tokens.len(), "tokenized CDL source");
    Ok(tokens)
}
