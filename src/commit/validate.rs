//! Policy checks over an already-parsed [`CommitMessage`].
//!
//! Parsing never consults configuration; these predicates take the allowed
//! tables as arguments so a message can be checked against any policy.

use std::fmt;

use miette::Diagnostic;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use super::CommitMessage;
use crate::config::Config;

// ============================================================================
// ALLOWED VALUES
// ============================================================================

/// An ordered table of allowed names and their descriptions.
///
/// Deserializes from a YAML mapping (`name: description`) in file order, or
/// from a plain list of names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedValues(Vec<(String, String)>);

impl AllowedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name`, replacing the description if it is already present.
    pub fn insert(&mut self, name: impl Into<String>, description: impl Into<String>) {
        let name = name.into();
        let description = description.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = description,
            None => self.0.push((name, description)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, d)| (n.as_str(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, D: Into<String>> FromIterator<(N, D)> for AllowedValues {
    fn from_iter<I: IntoIterator<Item = (N, D)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, description) in iter {
            table.insert(name, description);
        }
        table
    }
}

impl Serialize for AllowedValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, description) in &self.0 {
            map.serialize_entry(name, description)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AllowedValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = AllowedValues;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of names to descriptions, or a list of names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut table = AllowedValues::new();
                while let Some((name, description)) =
                    map.next_entry::<String, Option<String>>()?
                {
                    table.insert(name, description.unwrap_or_default());
                }
                Ok(table)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut table = AllowedValues::new();
                while let Some(name) = seq.next_element::<String>()? {
                    table.insert(name, "");
                }
                Ok(table)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(AllowedValues::new())
            }
        }

        deserializer.deserialize_any(TableVisitor)
    }
}

// ============================================================================
// PREDICATES
// ============================================================================

/// The type is non-empty and listed in `types`.
pub fn has_valid_type(message: &CommitMessage, types: &AllowedValues) -> bool {
    !message.commit_type.is_empty() && types.contains(&message.commit_type)
}

/// The scope is empty or listed in `scopes`.
pub fn has_valid_scope(message: &CommitMessage, scopes: &AllowedValues) -> bool {
    message.scope.is_empty() || scopes.contains(&message.scope)
}

pub fn has_description(message: &CommitMessage) -> bool {
    !message.description.trim().is_empty()
}

// ============================================================================
// VALIDATION REPORT
// ============================================================================

/// A field that needs repair before the message can be committed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationIssue {
    #[error("missing commit type")]
    #[diagnostic(code(gitcc::validate::missing_type))]
    MissingType {
        #[help]
        help: Option<String>,
    },

    #[error("unknown commit type `{commit_type}`")]
    #[diagnostic(code(gitcc::validate::invalid_type))]
    InvalidType {
        commit_type: String,
        #[help]
        help: Option<String>,
    },

    #[error("unknown scope `{scope}`")]
    #[diagnostic(code(gitcc::validate::invalid_scope))]
    InvalidScope {
        scope: String,
        #[help]
        help: Option<String>,
    },

    #[error("missing description")]
    #[diagnostic(
        code(gitcc::validate::missing_description),
        help("add a short summary after the `: ` separator")
    )]
    MissingDescription,

    #[error("header is {width} columns wide; the limit is {max}")]
    #[diagnostic(code(gitcc::validate::header_too_long))]
    HeaderTooLong { width: usize, max: usize },
}

fn one_of_help(table: &AllowedValues) -> Option<String> {
    if table.is_empty() {
        return None;
    }
    let names: Vec<&str> = table.names().collect();
    Some(format!("expected one of: {}", names.join(", ")))
}

/// Every problem `message` has under `config`, in header order.
pub fn validate(message: &CommitMessage, config: &Config) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if message.commit_type.is_empty() {
        issues.push(ValidationIssue::MissingType {
            help: one_of_help(&config.commit_types),
        });
    } else if !has_valid_type(message, &config.commit_types) {
        issues.push(ValidationIssue::InvalidType {
            commit_type: message.commit_type.clone(),
            help: one_of_help(&config.commit_types),
        });
    }

    if !has_valid_scope(message, &config.scopes) {
        issues.push(ValidationIssue::InvalidScope {
            scope: message.scope.clone(),
            help: one_of_help(&config.scopes)
                .or_else(|| Some("no scopes are configured".to_string())),
        });
    }

    if !has_description(message) {
        issues.push(ValidationIssue::MissingDescription);
    }

    if config.enforce_max_length {
        let width = message.header().width();
        if width > config.header_max_length {
            issues.push(ValidationIssue::HeaderTooLong {
                width,
                max: config.header_max_length,
            });
        }
    }

    issues
}

impl CommitMessage {
    pub fn validate(&self, config: &Config) -> Vec<ValidationIssue> {
        validate(self, config)
    }

    pub fn is_valid(&self, config: &Config) -> bool {
        validate(self, config).is_empty()
    }
}
