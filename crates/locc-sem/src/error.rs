//! Semantic errors.
//!
//! Message prefixes are stable interface: `unresolved`, `duplicate
//! definition`, `type error`, and `target error`, plus the specific type
//! error phrases the checker produces (`expressions are not comparable`,
//! `expression is not callable`, and so on). Tools and tests match on
//! these substrings.
//!
//! Every error copies the range of the node that provoked it; duplicate
//! definitions additionally carry the range of the original definition so
//! messages can point at both sites.

use std::fmt;

use locc_util::{Range, Ranged};
use thiserror::Error;

/// What kind of name failed to resolve; selects the wording of
/// [`SemanticError::Resolve`] messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolvable {
    Import,
    Target,
    Type,
    Fn,
    Const,
}

impl fmt::Display for Resolvable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resolvable::Import => "import",
            Resolvable::Target => "target",
            Resolvable::Type => "type",
            Resolvable::Fn => "fn",
            Resolvable::Const => "const",
        };
        f.write_str(name)
    }
}

/// An error produced during semantic analysis.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SemanticError {
    /// A name that did not resolve: an unknown import, an undeclared
    /// target tag, an unknown type, fn, or const reference.
    #[error("unresolved {kind}: {value}")]
    Resolve {
        kind: Resolvable,
        value: String,
        range: Range,
    },

    /// A name registered twice. `original` points at the first site.
    #[error("duplicate definition: '{name}' is already defined here {original}")]
    Duplicate {
        name: String,
        original: Range,
        range: Range,
    },

    /// An attempt to redefine a builtin type.
    #[error("type error: '{name}' is a builtin type you cannot override")]
    BuiltinOverride { name: String, range: Range },

    /// A failed type check; the message carries the specific phrase.
    #[error("type error: {message}")]
    Type { message: String, range: Range },

    /// A declared locale with no field on a key or template entry.
    #[error("target error: target '{target}' is declared but '{entry}' has no field for it")]
    MissingTarget {
        target: String,
        entry: String,
        range: Range,
    },

    /// A declaration name the catalog cannot carry.
    #[error("invalid declaration name: '{name}'")]
    InvalidDeclName { name: String, range: Range },
}

impl SemanticError {
    /// Helper for [`SemanticError::Type`] with a formatted message.
    pub fn type_error(message: impl Into<String>, range: Range) -> Self {
        SemanticError::Type {
            message: message.into(),
            range,
        }
    }
}

impl Ranged for SemanticError {
    fn range(&self) -> Range {
        match self {
            SemanticError::Resolve { range, .. } => *range,
            SemanticError::Duplicate { range, .. } => *range,
            SemanticError::BuiltinOverride { range, .. } => *range,
            SemanticError::Type { range, .. } => *range,
            SemanticError::MissingTarget { range, .. } => *range,
            SemanticError::InvalidDeclName { range, .. } => *range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locc_util::Position;

    fn range(line: u32) -> Range {
        Range::new(Position::new(line, 1), Position::new(line, 5))
    }

    #[test]
    fn test_resolve_message() {
        let err = SemanticError::Resolve {
            kind: Resolvable::Const,
            value: "undefined".into(),
            range: range(1),
        };
        assert_eq!(err.to_string(), "unresolved const: undefined");
    }

    #[test]
    fn test_duplicate_points_at_original() {
        let err = SemanticError::Duplicate {
            name: "Test".into(),
            original: range(2),
            range: range(7),
        };
        assert_eq!(
            err.to_string(),
            "duplicate definition: 'Test' is already defined here 2:1 - 2:5"
        );
        assert_eq!(err.range(), range(7));
    }

    #[test]
    fn test_builtin_override_phrase() {
        let err = SemanticError::BuiltinOverride {
            name: "string".into(),
            range: range(1),
        };
        assert!(err.to_string().contains("is a builtin type you cannot override"));
        assert!(err.to_string().starts_with("type error"));
    }

    #[test]
    fn test_target_error_names_both() {
        let err = SemanticError::MissingTarget {
            target: "de".into(),
            entry: "title".into(),
            range: range(4),
        };
        let message = err.to_string();
        assert!(message.starts_with("target error"));
        assert!(message.contains("'de'"));
        assert!(message.contains("'title'"));
    }
}
