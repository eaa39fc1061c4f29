//! Grammar-agnostic parser combinators over Unicode code points.
//!
//! Parsers are values built by composing the functions in
//! [`combinators`]; each one maps an input slice to a [`ParseOutcome`] tree or
//! a [`ParseError`]. There is no cursor: the unconsumed input travels in
//! [`ParseOutcome::remaining`].

pub mod combinators;
pub mod outcome;

pub use combinators::{
    any, delimited, end_of_input, literal, many0, many1, marked, not, one_of, optional, regex,
    satisfy, sequence, tag, take_until, try_regex, Parser,
};
pub use outcome::{FailureKind, ParseError, ParseOutcome, ParseResult};

/// Split `text` into the code points the parsers operate on.
pub fn code_points(text: &str) -> Vec<char> {
    text.chars().collect()
}
