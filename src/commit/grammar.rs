//! The conventional-commit grammar, composed from the engine primitives:
//!
//! ```text
//! type ["(" scope ")"] ["!"] ":" [" "] description ["\n\n" body] ["\n\n" footer ("\n" footer)*]
//! ```
//!
//! Each rule is a function returning a fresh [`Parser`]; the two entry points
//! used at runtime are cached in [`MESSAGE`] and [`BREAKING_CHANGE`].

use once_cell::sync::Lazy;

use crate::parser::{
    any, delimited, end_of_input, literal, many0, many1, marked, one_of, optional, regex,
    satisfy, sequence, tag, take_until, Parser,
};

// ============================================================================
// NODE LABELS
// ============================================================================

pub const TYPE: &str = "type";
pub const SCOPE: &str = "scope";
pub const BANG: &str = "bang";
pub const DESCRIPTION: &str = "description";
pub const HEADER: &str = "header";
pub const BODY: &str = "body";
pub const FOOTER: &str = "footer";
pub const FOOTERS: &str = "footers";
pub const BREAKING_CHANGE_MARKER: &str = "breaking_change";

/// A whole commit message, header through footers, up to end of input.
pub static MESSAGE: Lazy<Parser> = Lazy::new(message);

/// A single `BREAKING CHANGE:` footer; see [`breaking_change`].
pub static BREAKING_CHANGE: Lazy<Parser> = Lazy::new(breaking_change);

// ============================================================================
// HEADER
// ============================================================================

pub fn commit_type() -> Parser {
    marked(TYPE)(regex(r"[\w-]+"))
}

/// `(scope)`, or nothing.
pub fn scope() -> Parser {
    optional(delimited(
        literal('('),
        marked(SCOPE)(regex(r"[^()\r\n]*")),
        literal(')'),
    ))
}

pub fn breaking_bang() -> Parser {
    optional(marked(BANG)(literal('!')))
}

pub fn separator() -> Parser {
    regex(r":[ \t]*")
}

/// The rest of the header line. Missing descriptions are left for the
/// caller to report.
pub fn description() -> Parser {
    optional(marked(DESCRIPTION)(regex(r"[^\r\n]+")))
}

pub fn header() -> Parser {
    marked(HEADER)(sequence(vec![
        commit_type(),
        scope(),
        breaking_bang(),
        separator(),
        description(),
    ]))
}

// ============================================================================
// BODY AND FOOTERS
// ============================================================================

// The rules below are probed at every position of the body, so they are built
// from character parsers only. A regex would copy the rest of the message on
// each probe.

fn newline() -> Parser {
    sequence(vec![optional(literal('\r')), literal('\n')])
}

/// One or more empty (or whitespace-only) lines after a line break.
fn blank_line() -> Parser {
    sequence(vec![
        newline(),
        many1(sequence(vec![many0(one_of(" \t")), newline()])),
    ])
}

/// Trailing whitespace, then nothing.
fn trailing() -> Parser {
    sequence(vec![
        many0(satisfy("whitespace", char::is_whitespace)),
        end_of_input(),
    ])
}

/// A footer key: `BREAKING CHANGE`, `BREAKING-CHANGE`, or a word that starts
/// with an ASCII letter.
pub fn footer_token() -> Parser {
    let word = sequence(vec![
        satisfy("ASCII letter", |c| c.is_ascii_alphabetic()),
        many0(satisfy("word character", |c| {
            c.is_alphanumeric() || c == '_' || c == '-'
        })),
    ]);
    any(vec![tag("BREAKING CHANGE"), tag("BREAKING-CHANGE"), word])
}

fn footer_start() -> Parser {
    sequence(vec![footer_token(), any(vec![tag(": "), tag(" #")])])
}

/// `Token: value` or `Token #value`. The value runs over continuation lines
/// until the next footer line, a blank line, or the end of the message.
pub fn footer() -> Parser {
    let value_end = any(vec![
        sequence(vec![newline(), footer_start()]),
        blank_line(),
        trailing(),
    ]);
    marked(FOOTER)(sequence(vec![footer_start(), take_until(value_end)]))
}

pub fn footers() -> Parser {
    marked(FOOTERS)(sequence(vec![
        footer(),
        many0(sequence(vec![newline(), footer()])),
    ]))
}

fn footers_to_end() -> Parser {
    sequence(vec![blank_line(), footers(), trailing()])
}

/// Free text up to the footer paragraph, or up to trailing whitespace.
pub fn body() -> Parser {
    marked(BODY)(take_until(any(vec![footers_to_end(), trailing()])))
}

pub fn message() -> Parser {
    let after_header = any(vec![
        footers_to_end(),
        sequence(vec![
            blank_line(),
            body(),
            optional(sequence(vec![blank_line(), footers()])),
            trailing(),
        ]),
        trailing(),
    ]);
    sequence(vec![header(), after_header])
}

/// Matches the `BREAKING CHANGE:` (or `BREAKING-CHANGE:`) marker of a single
/// footer line. On success `remaining` holds the footer's value.
pub fn breaking_change() -> Parser {
    marked(BREAKING_CHANGE_MARKER)(any(vec![
        tag("BREAKING CHANGE:"),
        tag("BREAKING-CHANGE:"),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::code_points;

    fn texts(parser: &Parser, input: &str, kind: &str) -> Vec<String> {
        let input = code_points(input);
        let tree = parser.parse(&input).expect("grammar should match");
        tree.find_all(kind).iter().map(|n| n.text.clone()).collect()
    }

    #[test]
    fn header_labels_each_part() {
        let input = code_points("feat(parser)!: add engine");
        let tree = header().parse(&input).unwrap();
        assert_eq!(tree.find(TYPE).unwrap().text, "feat");
        assert_eq!(tree.find(SCOPE).unwrap().text, "parser");
        assert_eq!(tree.find(BANG).unwrap().text, "!");
        assert_eq!(tree.find(DESCRIPTION).unwrap().text, "add engine");
        assert!(tree.remaining.is_empty());
    }

    #[test]
    fn header_without_scope_or_bang() {
        let input = code_points("fix: typo");
        let tree = header().parse(&input).unwrap();
        assert!(tree.find(SCOPE).is_none());
        assert!(tree.find(BANG).is_none());
        assert_eq!(tree.find(DESCRIPTION).unwrap().text, "typo");
    }

    #[test]
    fn header_needs_separator() {
        let input = code_points("just some text");
        let err = header().parse(&input).unwrap_err();
        let partial = err.partial.unwrap();
        assert_eq!(partial.find(TYPE).unwrap().text, "just");
    }

    #[test]
    fn footers_split_on_tokens() {
        let found = texts(
            &footers(),
            "Refs #12\nBREAKING CHANGE: gone\nReviewed-by: Z",
            FOOTER,
        );
        assert_eq!(found, ["Refs #12", "BREAKING CHANGE: gone", "Reviewed-by: Z"]);
    }

    #[test]
    fn footer_value_continues_over_lines() {
        let found = texts(&footers(), "BREAKING CHANGE: first\n  second", FOOTER);
        assert_eq!(found, ["BREAKING CHANGE: first\n  second"]);
    }

    #[test]
    fn body_stops_before_footers() {
        let found = texts(&message(), "fix: x\n\nline one\nline two\n\nCloses #3\n", BODY);
        assert_eq!(found, ["line one\nline two"]);
    }

    #[test]
    fn footers_may_follow_header_directly() {
        let input = code_points("fix: x\n\nCloses #3");
        let tree = message().parse(&input).unwrap();
        assert!(tree.find(BODY).is_none());
        assert_eq!(tree.find(FOOTER).unwrap().text, "Closes #3");
    }

    #[test]
    fn breaking_change_leaves_value_as_remaining() {
        let input = code_points("BREAKING CHANGE: removed X");
        let outcome = BREAKING_CHANGE.parse(&input).unwrap();
        assert_eq!(outcome.remaining.iter().collect::<String>(), " removed X");

        let hyphenated = code_points("BREAKING-CHANGE: y");
        assert!(BREAKING_CHANGE.parse(&hyphenated).is_ok());

        let other = code_points("fix: y");
        assert!(BREAKING_CHANGE.parse(&other).is_err());
    }
}
