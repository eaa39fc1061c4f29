//! Conventional-commit messages: best-effort parsing and formatting.
//!
//! [`parse_as_much_as_possible`] never fails. Whatever part of the input fits
//! the grammar is extracted into its field; whatever doesn't is kept in
//! `description` or `body` so the user can repair it instead of retyping it.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::parser::{code_points, ParseOutcome};

pub mod grammar;
pub mod validate;

use grammar::{BANG, BODY, DESCRIPTION, FOOTER, HEADER, SCOPE, TYPE};

/// A commit message split into its conventional-commit parts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommitMessage {
    #[serde(rename = "type")]
    pub commit_type: String,
    pub scope: String,
    pub breaking_change: bool,
    pub description: String,
    pub body: String,
    pub footers: Vec<String>,
}

impl CommitMessage {
    /// Same as [`parse_as_much_as_possible`].
    pub fn parse(raw: &str) -> Self {
        parse_as_much_as_possible(raw)
    }

    /// Parse several `-m` values; like `git commit`, each one becomes its own
    /// paragraph.
    pub fn from_paragraphs<S: AsRef<str>>(paragraphs: &[S]) -> Self {
        let joined = paragraphs
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n\n");
        parse_as_much_as_possible(&joined)
    }

    /// `type(scope)!: description`, as it would appear on the first line.
    pub fn header(&self) -> String {
        let mut header = self.commit_type.clone();
        if !self.scope.is_empty() {
            header.push('(');
            header.push_str(&self.scope);
            header.push(')');
        }
        if self.breaking_change {
            header.push('!');
        }
        header.push_str(": ");
        header.push_str(&self.description);
        header
    }

    /// Values of every breaking-change footer, one per line.
    pub fn breaking_change_notes(&self) -> String {
        self.footers
            .iter()
            .filter_map(|footer| breaking_change_text(footer))
            .map(|note| note + "\n")
            .collect()
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header())?;
        if !self.body.is_empty() {
            write!(f, "\n\n{}", self.body)?;
        }
        if !self.footers.is_empty() {
            write!(f, "\n\n{}", self.footers.join("\n"))?;
        }
        Ok(())
    }
}

impl FromStr for CommitMessage {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_as_much_as_possible(s))
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse as much of `raw` as fits the conventional-commit grammar.
pub fn parse_as_much_as_possible(raw: &str) -> CommitMessage {
    let input = code_points(raw);
    match grammar::MESSAGE.parse(&input) {
        Ok(tree) => {
            trace!(?tree, "commit message matched the full grammar");
            from_tree(&tree)
        }
        Err(err) => match err.partial.as_deref() {
            Some(partial) if partial.find(HEADER).is_some() => {
                let mut message = from_tree(partial);
                let leftover: String = partial.remaining.iter().collect();
                debug!(reason = %err, leftover = %leftover, "folding unmatched text into body");
                message.body = join_paragraphs(&message.body, leftover.trim());
                message
            }
            _ => {
                debug!(reason = %err, "no conventional-commit header; keeping raw text");
                unstructured(raw)
            }
        },
    }
}

/// The value of a `BREAKING CHANGE:` footer, or `None` for any other line.
pub fn breaking_change_text(footer: &str) -> Option<String> {
    let input = code_points(footer);
    let outcome = grammar::BREAKING_CHANGE.parse(&input).ok()?;
    Some(outcome.remaining.iter().collect::<String>().trim().to_string())
}

fn from_tree(tree: &ParseOutcome<'_>) -> CommitMessage {
    let text_of = |kind: &str| {
        tree.find(kind)
            .map(|node| node.text.trim().to_string())
            .unwrap_or_default()
    };
    let footers: Vec<String> = tree
        .find_all(FOOTER)
        .iter()
        .map(|node| node.text.trim_end().to_string())
        .collect();
    let breaking_change = tree.find(BANG).is_some()
        || footers.iter().any(|f| breaking_change_text(f).is_some());

    CommitMessage {
        commit_type: text_of(TYPE),
        scope: text_of(SCOPE),
        breaking_change,
        description: text_of(DESCRIPTION),
        body: text_of(BODY),
        footers,
    }
}

// No header at all: the first line is the best guess at a description.
fn unstructured(raw: &str) -> CommitMessage {
    let trimmed = raw.trim();
    let (first, rest) = trimmed.split_once('\n').unwrap_or((trimmed, ""));
    CommitMessage {
        description: first.trim().to_string(),
        body: rest.trim().to_string(),
        ..CommitMessage::default()
    }
}

fn join_paragraphs(first: &str, second: &str) -> String {
    match (first.is_empty(), second.is_empty()) {
        (_, true) => first.to_string(),
        (true, false) => second.to_string(),
        (false, false) => format!("{first}\n\n{second}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_header() {
        let msg = parse_as_much_as_possible("feat(parser)!: add combinator engine");
        assert_eq!(
            msg,
            CommitMessage {
                commit_type: "feat".into(),
                scope: "parser".into(),
                breaking_change: true,
                description: "add combinator engine".into(),
                body: String::new(),
                footers: vec![],
            }
        );
    }

    #[test]
    fn no_separator_keeps_raw_text() {
        let msg = parse_as_much_as_possible("just some text");
        assert_eq!(msg.commit_type, "");
        assert_eq!(msg.scope, "");
        assert_eq!(msg.description, "just some text");
    }

    #[test]
    fn single_newline_after_header_becomes_body() {
        let msg = parse_as_much_as_possible("fix: x\nmore detail");
        assert_eq!(msg.commit_type, "fix");
        assert_eq!(msg.description, "x");
        assert_eq!(msg.body, "more detail");
    }

    #[test]
    fn missing_description_is_empty() {
        let msg = parse_as_much_as_possible("docs(readme): ");
        assert_eq!(msg.commit_type, "docs");
        assert_eq!(msg.scope, "readme");
        assert_eq!(msg.description, "");
    }

    #[test]
    fn breaking_footer_sets_flag() {
        let msg = parse_as_much_as_possible("refactor: drop v1\n\nBREAKING CHANGE: v1 API removed");
        assert!(msg.breaking_change);
        assert_eq!(msg.footers, ["BREAKING CHANGE: v1 API removed"]);
        assert_eq!(msg.breaking_change_notes(), "v1 API removed\n");
    }

    #[test]
    fn breaking_change_text_only_for_marker_lines() {
        assert_eq!(
            breaking_change_text("BREAKING CHANGE: removed X").as_deref(),
            Some("removed X")
        );
        assert_eq!(breaking_change_text("fix: y"), None);
    }

    #[test]
    fn paragraphs_are_joined_with_blank_lines() {
        let msg = CommitMessage::from_paragraphs(&["fix: a", "the body", "Refs #1"]);
        assert_eq!(msg.description, "a");
        assert_eq!(msg.body, "the body");
        assert_eq!(msg.footers, ["Refs #1"]);
    }

    #[test]
    fn display_round_trips() {
        let msg = CommitMessage {
            commit_type: "feat".into(),
            scope: "api".into(),
            breaking_change: true,
            description: "new endpoint".into(),
            body: "Longer explanation.".into(),
            footers: vec!["BREAKING CHANGE: old endpoint gone".into()],
        };
        let text = msg.to_string();
        assert_eq!(
            text,
            "feat(api)!: new endpoint\n\nLonger explanation.\n\nBREAKING CHANGE: old endpoint gone"
        );
        assert_eq!(parse_as_much_as_possible(&text), msg);
    }

    #[test]
    fn from_str_is_infallible() {
        let msg: CommitMessage = "chore: bump".parse().unwrap();
        assert_eq!(msg.commit_type, "chore");
    }
}
