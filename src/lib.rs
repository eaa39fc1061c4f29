//! Lenient parsing of conventional commit messages.
//!
//! Two layers:
//!
//! - [`parser`]: a small, grammar-agnostic parser-combinator engine over
//!   Unicode code points, whose failures can still carry a partial parse tree.
//! - [`commit`]: the conventional-commit grammar built from those combinators,
//!   with a best-effort entry point that always yields a [`CommitMessage`],
//!   plus validation against the allowed types and scopes in a [`Config`].
//!
//! ```
//! use gitcc::parse_as_much_as_possible;
//!
//! let message = parse_as_much_as_possible("feat(parser)!: add combinator engine");
//! assert_eq!(message.commit_type, "feat");
//! assert_eq!(message.scope, "parser");
//! assert!(message.breaking_change);
//! ```

pub use crate::commit::validate::{AllowedValues, ValidationIssue};
pub use crate::commit::{breaking_change_text, parse_as_much_as_possible, CommitMessage};
pub use crate::config::{Config, ConfigError};

pub mod cli;
pub mod commit;
pub mod config;
pub mod parser;
