//! OData query-string parser using nom.
//!
//! Turns a raw client query string into [`QueryOptions`]. This is the
//! front-end used by the CLI and the tests; the translator itself only ever
//! sees the parsed tree.
//!
//! # Filter precedence (lowest first)
//!
//! ```text
//! or
//! and
//! eq ne gt ge lt le
//! add sub
//! mul div mod
//! not, unary minus        -> kept as unsupported nodes
//! ( expr ) | literal | func(args) | property/path
//! ```

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while},
    character::complete::{char, digit1, multispace0, one_of, satisfy},
    combinator::{map, not, opt, peek, recognize},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use tracing::debug;
use url::form_urlencoded;

use crate::ast::*;
use crate::error::{RemapError, RemapResult};
use crate::transpiler::DEFAULT_MAX_DEPTH;

/// Deepest parenthesis nesting the parser accepts, whatever the configured
/// depth. Every level costs a dozen nom frames, and 64 levels fit on a 2 MiB
/// thread stack.
pub const MAX_PAREN_NESTING: usize = 64;

/// Parse a complete query string (`?$filter=...&$orderby=...&$top=10`).
pub fn parse_query(input: &str) -> RemapResult<QueryOptions> {
    parse_query_with_limit(input, DEFAULT_MAX_DEPTH)
}

/// [`parse_query`] with an explicit nesting bound for `$filter`.
pub fn parse_query_with_limit(input: &str, max_depth: usize) -> RemapResult<QueryOptions> {
    // Raw text is accepted unencoded, so `+` is a literal plus, not a space.
    let raw = input.trim().trim_start_matches('?').replace('+', "%2B");
    let mut options = QueryOptions::default();
    let mut seen: Vec<String> = Vec::new();

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        let key = key.trim().to_string();
        if key.is_empty() {
            continue;
        }
        if seen.contains(&key) {
            return Err(RemapError::parse(0, format!("Duplicate query option '{}'", key)));
        }

        match key.as_str() {
            "$filter" => options.filter = Some(parse_filter_with_limit(&value, max_depth)?),
            "$orderby" => options.order = Some(parse_orderby(&value)?),
            "$skip" => options.skip = Some(parse_count(&key, &value)?),
            "$top" => options.top = Some(parse_count(&key, &value)?),
            "$inlinecount" => options.inline_count = Some(value.trim().to_string()),
            _ => debug!(option = %key, "ignoring query option"),
        }
        seen.push(key);
    }

    Ok(options)
}

/// Parse a `$filter` expression.
pub fn parse_filter(input: &str) -> RemapResult<Expr> {
    parse_filter_with_limit(input, DEFAULT_MAX_DEPTH)
}

/// [`parse_filter`] with an explicit nesting bound, capped at
/// [`MAX_PAREN_NESTING`].
pub fn parse_filter_with_limit(input: &str, max_depth: usize) -> RemapResult<Expr> {
    let input = input.trim();
    let max = max_depth.min(MAX_PAREN_NESTING);
    if nesting_depth(input) > max {
        return Err(RemapError::DepthExceeded { max });
    }

    match parse_or(input) {
        Ok((rest, expr)) if rest.trim().is_empty() => Ok(expr),
        Ok((rest, _)) => Err(RemapError::parse(
            input.len() - rest.trim_start().len(),
            format!("Unexpected trailing content: '{}'", rest.trim()),
        )),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(RemapError::parse(
            input.len() - e.input.len(),
            format!("Invalid filter expression near '{}'", e.input),
        )),
        Err(nom::Err::Incomplete(_)) => Err(RemapError::parse(input.len(), "Incomplete filter")),
    }
}

/// Parse an `$orderby` list into a chain.
pub fn parse_orderby(input: &str) -> RemapResult<OrderStep> {
    let input = input.trim();
    let keys = match separated_list0(
        delimited(multispace0, char(','), multispace0),
        parse_order_key,
    )(input)
    {
        Ok((rest, keys)) if rest.trim().is_empty() => keys,
        Ok((rest, _)) => {
            return Err(RemapError::parse(
                input.len() - rest.len(),
                format!("Unexpected trailing content in $orderby: '{}'", rest.trim()),
            ));
        }
        Err(e) => return Err(RemapError::parse(0, format!("Parse failed: {:?}", e))),
    };

    OrderStep::from_keys(keys)
        .ok_or_else(|| RemapError::parse(0, "Empty $orderby"))
}

fn parse_count(key: &str, value: &str) -> RemapResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| RemapError::parse(0, format!("{} expects a non-negative integer, got '{}'", key, value)))
}

/// Deepest parenthesis nesting outside string literals.
fn nesting_depth(input: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    let mut in_string = false;
    for c in input.chars() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => {
                depth += 1;
                max = max.max(depth);
            }
            ')' if !in_string => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// Parse one sort key: `path [asc|desc]`.
fn parse_order_key(input: &str) -> IResult<&str, (String, bool)> {
    let (input, path) = parse_path(input)?;
    let (input, dir) = opt(preceded(
        multispace0,
        alt((keyword("asc"), keyword("desc"))),
    ))(input)?;
    Ok((input, (path.to_string(), dir == Some("desc"))))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Match a word that is not the prefix of a longer identifier.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag(word), not(peek(satisfy(is_ident_char))))
}

/// Parse an identifier (field or function name).
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_ident_char),
    ))(input)
}

/// Parse a property path (`Name`, `Address/City`).
fn parse_path(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        parse_identifier,
        many0(pair(char('/'), parse_identifier)),
    ))(input)
}

/// Fold `operand (op operand)*` left-associatively.
fn binary_chain<'a>(
    input: &'a str,
    operand: fn(&'a str) -> IResult<&'a str, Expr>,
    operators: &[(&'static str, BinaryOperator)],
) -> IResult<&'a str, Expr> {
    let (mut input, mut left) = operand(input)?;
    loop {
        let (after_ws, _) = multispace0(input)?;
        let matched = operators
            .iter()
            .find_map(|&(word, op)| keyword(word)(after_ws).ok().map(|(rest, _)| (rest, op)));
        let Some((rest, op)) = matched else {
            break;
        };
        let (rest, _) = multispace0(rest)?;
        let (rest, right) = operand(rest)?;
        left = Expr::binary(op, left, right);
        input = rest;
    }
    Ok((input, left))
}

fn parse_or(input: &str) -> IResult<&str, Expr> {
    binary_chain(input, parse_and, &[("or", BinaryOperator::Or)])
}

fn parse_and(input: &str) -> IResult<&str, Expr> {
    binary_chain(input, parse_comparison, &[("and", BinaryOperator::And)])
}

fn parse_comparison(input: &str) -> IResult<&str, Expr> {
    binary_chain(
        input,
        parse_additive,
        &[
            ("eq", BinaryOperator::Eq),
            ("ne", BinaryOperator::Ne),
            ("gt", BinaryOperator::Gt),
            ("ge", BinaryOperator::Ge),
            ("lt", BinaryOperator::Lt),
            ("le", BinaryOperator::Le),
        ],
    )
}

fn parse_additive(input: &str) -> IResult<&str, Expr> {
    binary_chain(
        input,
        parse_multiplicative,
        &[("add", BinaryOperator::Add), ("sub", BinaryOperator::Sub)],
    )
}

fn parse_multiplicative(input: &str) -> IResult<&str, Expr> {
    binary_chain(
        input,
        parse_unary,
        &[
            ("mul", BinaryOperator::Mul),
            ("div", BinaryOperator::Div),
            ("mod", BinaryOperator::Mod),
        ],
    )
}

/// Unary operators have no rendering; the operand is parsed and the whole
/// node is kept as [`Expr::Unsupported`] so translation rejects it.
fn parse_unary(input: &str) -> IResult<&str, Expr> {
    let start = input;
    let (input, prefixes) = many0(terminated(
        alt((keyword("not"), terminated(tag("-"), not(digit1)))),
        multispace0,
    ))(input)?;
    let (input, operand) = parse_primary(input)?;
    if prefixes.is_empty() {
        return Ok((input, operand));
    }
    let consumed = &start[..start.len() - input.len()];
    Ok((input, Expr::unsupported(format!("unary: {}", consumed.trim()))))
}

fn parse_primary(input: &str) -> IResult<&str, Expr> {
    alt((
        delimited(
            pair(char('('), multispace0),
            parse_or,
            pair(multispace0, char(')')),
        ),
        map(parse_literal, |s: &str| Expr::constant(s)),
        parse_function_call,
        map(parse_path, |s: &str| Expr::property(s)),
    ))(input)
}

/// Parse `name(arg, arg, ...)`.
fn parse_function_call(input: &str) -> IResult<&str, Expr> {
    let (input, name) = parse_identifier(input)?;
    let (input, _) = pair(multispace0, char('('))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, args) = separated_list0(
        delimited(multispace0, char(','), multispace0),
        parse_or,
    )(input)?;
    let (input, _) = pair(multispace0, char(')'))(input)?;
    Ok((input, Expr::call(name, args)))
}

/// Parse a literal, returning its exact source text.
fn parse_literal(input: &str) -> IResult<&str, &str> {
    alt((
        parse_quoted_string,
        // Typed literal: datetime'...', guid'...', X'...'
        recognize(pair(parse_identifier, parse_quoted_string)),
        parse_number,
        keyword("true"),
        keyword("false"),
        keyword("null"),
    ))(input)
}

/// Parse a quoted string with `''` escapes.
fn parse_quoted_string(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('\''),
        many0(alt((tag("''"), is_not("'")))),
        char('\''),
    ))(input)
}

/// Parse a number (integer, decimal, exponent, type suffix).
fn parse_number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        opt(one_of("mMdDfFlL")),
        not(peek(satisfy(is_ident_char))),
    )))(input)
}
