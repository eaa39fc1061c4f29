//! Parse results shared by every combinator.
//!
//! A [`ParseOutcome`] borrows the unconsumed suffix of the input it was run on,
//! so `remaining` is always a suffix of the caller's slice. Failures are plain
//! values: a [`ParseError`] may still carry the partial tree that was built
//! before the failing step.

use thiserror::Error;

/// A node of the parse tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseOutcome<'a> {
    /// Grammar rule that produced this node, if it was [`marked`](super::marked).
    pub kind: Option<&'static str>,
    /// Exact text consumed by this node.
    pub text: String,
    /// Sub-matches, in the order their parsers ran.
    pub children: Vec<ParseOutcome<'a>>,
    /// Unconsumed input after this node.
    pub remaining: &'a [char],
}

impl<'a> ParseOutcome<'a> {
    /// A leaf that consumed `consumed` code points from the front of `input`.
    pub fn leaf(input: &'a [char], consumed: usize) -> Self {
        Self {
            kind: None,
            text: input[..consumed].iter().collect(),
            children: vec![],
            remaining: &input[consumed..],
        }
    }

    /// A zero-width success that leaves `input` untouched.
    pub fn empty(input: &'a [char]) -> Self {
        Self {
            kind: None,
            text: String::new(),
            children: vec![],
            remaining: input,
        }
    }

    /// A branch node whose text is the concatenation of its children.
    pub fn branch(children: Vec<ParseOutcome<'a>>, remaining: &'a [char]) -> Self {
        let text = children.iter().map(|c| c.text.as_str()).collect();
        Self {
            kind: None,
            text,
            children,
            remaining,
        }
    }

    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Number of code points this node consumed.
    pub fn consumed_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_zero_width(&self) -> bool {
        self.text.is_empty()
    }

    /// First node labelled `kind`, searching depth-first (self included).
    pub fn find(&self, kind: &str) -> Option<&ParseOutcome<'a>> {
        if self.kind == Some(kind) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(kind))
    }

    /// Every node labelled `kind`, in document order. Matches are not
    /// searched for nested nodes of the same kind.
    pub fn find_all(&self, kind: &str) -> Vec<&ParseOutcome<'a>> {
        let mut found = Vec::new();
        self.collect_kind(kind, &mut found);
        found
    }

    fn collect_kind<'s>(&'s self, kind: &str, found: &mut Vec<&'s ParseOutcome<'a>>) {
        if self.kind == Some(kind) {
            found.push(self);
            return;
        }
        for child in &self.children {
            child.collect_kind(kind, found);
        }
    }
}

/// Why a parser did not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A primitive's precondition on the current input was not met.
    NoMatch,
    /// Every branch of an [`any`](super::any) failed.
    ExhaustedAlternatives,
}

/// A local, recoverable parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ParseError<'a> {
    pub kind: FailureKind,
    pub reason: String,
    /// What had been matched before the failure, when the failing
    /// combinator builds trees (e.g. [`sequence`](super::sequence)).
    pub partial: Option<Box<ParseOutcome<'a>>>,
}

impl<'a> ParseError<'a> {
    pub fn no_match(reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::NoMatch,
            reason: reason.into(),
            partial: None,
        }
    }

    pub fn exhausted(reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::ExhaustedAlternatives,
            reason: reason.into(),
            partial: None,
        }
    }

    pub fn with_partial(mut self, partial: ParseOutcome<'a>) -> Self {
        self.partial = Some(Box::new(partial));
        self
    }
}

pub type ParseResult<'a> = Result<ParseOutcome<'a>, ParseError<'a>>;
