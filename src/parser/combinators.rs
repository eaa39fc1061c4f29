//! Primitive parsers and the combinators that compose them.
//!
//! Every parser is a pure function from a code-point slice to a
//! [`ParseResult`]. Nothing is mutated between calls, so the same parser can
//! probe the same input any number of times; [`any`] and [`take_until`] rely on
//! that for their speculative matching.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::outcome::{ParseError, ParseOutcome, ParseResult};

// ============================================================================
// PARSER VALUE
// ============================================================================

type ParseFn = dyn for<'a> Fn(&'a [char]) -> ParseResult<'a> + Send + Sync;

/// A composable parser. Cloning is cheap; clones share the same function.
#[derive(Clone)]
pub struct Parser {
    name: Arc<str>,
    run: Arc<ParseFn>,
}

impl Parser {
    /// Wrap a parsing function. `name` only shows up in diagnostics.
    pub fn new<F>(name: impl Into<Arc<str>>, run: F) -> Self
    where
        F: for<'a> Fn(&'a [char]) -> ParseResult<'a> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(run),
        }
    }

    pub fn parse<'a>(&self, input: &'a [char]) -> ParseResult<'a> {
        (self.run)(input)
    }

    /// Whether this parser matches at the start of `input`, without keeping
    /// the result.
    pub fn matches(&self, input: &[char]) -> bool {
        self.parse(input).is_ok()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parser({})", self.name)
    }
}

// ============================================================================
// PRIMITIVES
// ============================================================================

/// Matches exactly one code point.
pub fn literal(expected: char) -> Parser {
    Parser::new(format!("{expected:?}"), move |input| match input.first() {
        Some(&c) if c == expected => Ok(ParseOutcome::leaf(input, 1)),
        Some(&c) => Err(ParseError::no_match(format!(
            "unmatched literal: expected {expected:?}, found {c:?}"
        ))),
        None => Err(ParseError::no_match(format!(
            "unmatched literal: expected {expected:?}, found end of input"
        ))),
    })
}

/// Matches one code point for which `predicate` holds. `name` describes the
/// class in error messages.
pub fn satisfy<F>(name: &str, predicate: F) -> Parser
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    let class = name.to_string();
    Parser::new(name, move |input| match input.first() {
        Some(&c) if predicate(c) => Ok(ParseOutcome::leaf(input, 1)),
        Some(&c) => Err(ParseError::no_match(format!("expected {class}, found {c:?}"))),
        None => Err(ParseError::no_match(format!(
            "expected {class}, found end of input"
        ))),
    })
}

/// Matches any one of the code points in `set`. Duplicates are ignored and
/// alternatives are tried in first-seen order.
pub fn one_of(set: &str) -> Parser {
    let mut seen: Vec<char> = Vec::new();
    for c in set.chars() {
        if !seen.contains(&c) {
            seen.push(c);
        }
    }
    let parsers = seen.into_iter().map(literal).collect();
    let mut parser = any(parsers);
    parser.name = format!("one_of({set:?})").into();
    parser
}

/// Matches `expected` as an exact prefix of the input.
pub fn tag(expected: &str) -> Parser {
    let wanted: Vec<char> = expected.chars().collect();
    let display = expected.to_string();
    Parser::new(format!("tag({expected:?})"), move |input| {
        if input.len() < wanted.len() {
            let found: String = input.iter().collect();
            return Err(ParseError::no_match(format!(
                "input {found:?} shorter than tag {display:?}"
            )));
        }
        if let Some(pos) = wanted.iter().zip(input).position(|(w, c)| w != c) {
            let found: String = input[..=pos].iter().collect();
            return Err(ParseError::no_match(format!(
                "{found:?} does not match {display:?} at position {pos}"
            )));
        }
        Ok(ParseOutcome::leaf(input, wanted.len()))
    })
}

/// Like [`regex`], but reports an invalid pattern instead of panicking.
///
/// The regex engine needs a `&str`, so every call copies the remaining input.
/// Prefer the character parsers for anything probed at many positions.
pub fn try_regex(pattern: &str) -> Result<Parser, regex::Error> {
    let re = Regex::new(&format!("^(?:{pattern})"))?;
    let display = pattern.to_string();
    Ok(Parser::new(format!("/{pattern}/"), move |input| {
        let haystack: String = input.iter().collect();
        match re.find(&haystack) {
            // The match is in bytes; `remaining` has to stay in code points.
            Some(m) => {
                let consumed = haystack[..m.end()].chars().count();
                Ok(ParseOutcome::leaf(input, consumed))
            }
            None => Err(ParseError::no_match(format!("no match for /{display}/"))),
        }
    }))
}

/// Matches `pattern` anchored at the start of the input.
///
/// # Panics
///
/// Panics if `pattern` is not a valid regular expression. Patterns are part of
/// the grammar, so a bad one is a bug in the grammar, not in the input.
pub fn regex(pattern: &str) -> Parser {
    try_regex(pattern).unwrap_or_else(|e| panic!("invalid grammar pattern /{pattern}/: {e}"))
}

/// Succeeds with zero width when no input is left.
pub fn end_of_input() -> Parser {
    Parser::new("end_of_input", |input| {
        if input.is_empty() {
            Ok(ParseOutcome::empty(input))
        } else {
            Err(ParseError::no_match(format!(
                "expected end of input, {} code points remain",
                input.len()
            )))
        }
    })
}

// ============================================================================
// COMBINATORS
// ============================================================================

/// Runs each parser on the remainder of the previous one.
///
/// On failure the error carries the children matched so far, with
/// `remaining` set to the input the failing parser was given.
pub fn sequence(parsers: Vec<Parser>) -> Parser {
    let name = join_names("sequence", &parsers);
    Parser::new(name, move |input| {
        let mut children = Vec::with_capacity(parsers.len());
        let mut rest = input;
        for parser in &parsers {
            match parser.parse(rest) {
                Ok(outcome) => {
                    rest = outcome.remaining;
                    children.push(outcome);
                }
                Err(err) => {
                    let partial = ParseOutcome::branch(children, rest);
                    return Err(ParseError {
                        partial: Some(Box::new(partial)),
                        ..err
                    });
                }
            }
        }
        Ok(ParseOutcome::branch(children, rest))
    })
}

/// Ordered alternation: the first parser that matches the original input wins.
pub fn any(parsers: Vec<Parser>) -> Parser {
    let name = join_names("any", &parsers);
    Parser::new(name, move |input| {
        parsers
            .iter()
            .find_map(|p| p.parse(input).ok())
            .ok_or_else(|| {
                ParseError::exhausted(format!("none of {} alternatives matched", parsers.len()))
            })
    })
}

/// Never fails: `parser`'s result, or a zero-width success.
pub fn optional(parser: Parser) -> Parser {
    Parser::new(format!("optional({})", parser.name), move |input| {
        Ok(parser
            .parse(input)
            .unwrap_or_else(|_| ParseOutcome::empty(input)))
    })
}

/// Zero or more repetitions of `parser`.
pub fn many0(parser: Parser) -> Parser {
    Parser::new(format!("many0({})", parser.name), move |input| {
        Ok(repeat(&parser, input))
    })
}

/// One or more repetitions of `parser`.
pub fn many1(parser: Parser) -> Parser {
    let name = format!("many1({})", parser.name);
    Parser::new(name.clone(), move |input| {
        let outcome = repeat(&parser, input);
        if outcome.children.is_empty() {
            Err(ParseError::no_match(format!("{name} matched nothing")))
        } else {
            Ok(outcome)
        }
    })
}

// A zero-width match would repeat forever, so it ends the loop. The input
// length also bounds the number of iterations.
fn repeat<'a>(parser: &Parser, input: &'a [char]) -> ParseOutcome<'a> {
    let mut children = Vec::new();
    let mut rest = input;
    for _ in 0..input.len() {
        let Ok(outcome) = parser.parse(rest) else {
            break;
        };
        let stalled = outcome.remaining.len() >= rest.len();
        rest = outcome.remaining;
        children.push(outcome);
        if stalled || rest.is_empty() {
            break;
        }
    }
    ParseOutcome::branch(children, rest)
}

/// `open`, `middle`, `close` in order, keeping only `middle`'s result.
pub fn delimited(open: Parser, middle: Parser, close: Parser) -> Parser {
    let name = format!("delimited({}, {}, {})", open.name, middle.name, close.name);
    Parser::new(name, move |input| {
        let opened = open.parse(input)?;
        let mut inner = middle.parse(opened.remaining)?;
        let closed = close.parse(inner.remaining)?;
        inner.remaining = closed.remaining;
        Ok(inner)
    })
}

/// Everything before the first position where `stop` would match. `stop` is
/// only probed, never consumed.
pub fn take_until(stop: Parser) -> Parser {
    let name = format!("take_until({})", stop.name);
    Parser::new(name.clone(), move |input| {
        (0..=input.len())
            .find(|&i| stop.matches(&input[i..]))
            .map(|i| ParseOutcome::leaf(input, i))
            .ok_or_else(|| ParseError::no_match(format!("{name} never reached its stop")))
    })
}

/// Negative lookahead: zero-width success iff `parser` fails.
pub fn not(parser: Parser) -> Parser {
    let name = format!("not({})", parser.name);
    Parser::new(name.clone(), move |input| match parser.parse(input) {
        Ok(_) => Err(ParseError::no_match(format!("{name}: unexpected match"))),
        Err(_) => Ok(ParseOutcome::empty(input)),
    })
}

/// Labels `parser`'s result with `label`.
///
/// # Panics
///
/// Panics on an empty label.
pub fn marked(label: &'static str) -> impl Fn(Parser) -> Parser {
    assert!(!label.is_empty(), "parser labels must not be empty");
    move |parser: Parser| {
        Parser::new(label, move |input| match parser.parse(input) {
            Ok(outcome) => Ok(outcome.with_kind(label)),
            Err(mut err) => {
                err.partial = err.partial.map(|p| Box::new(p.with_kind(label)));
                Err(err)
            }
        })
    }
}

fn join_names(combinator: &str, parsers: &[Parser]) -> String {
    let names: Vec<&str> = parsers.iter().map(Parser::name).collect();
    format!("{combinator}({})", names.join(", "))
}
