//! Syntax errors.
//!
//! The parser records these and keeps going; the batch comes back as an
//! [`locc_util::ErrorSet`]. Message prefixes (`unexpected token`,
//! `unterminated`, `number error`) are stable interface: tests and tools
//! match on them.

use locc_lex::Kind;
use locc_util::{Range, Ranged};
use thiserror::Error;

/// An error produced while parsing.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SyntaxError {
    /// A token that does not fit the grammar at this point.
    #[error("{}", unexpected_message(.found, .expected, .details.as_deref()))]
    UnexpectedToken {
        found: Kind,
        expected: Vec<Kind>,
        /// Context-sensitive hint, drawn from the parser's context stack.
        details: Option<String>,
        range: Range,
    },

    /// A string, template, or template expression with no ending.
    #[error("unterminated {kind}: token does not have an ending")]
    UntermConstruct { kind: Kind, range: Range },

    /// A number literal whose text does not form a value.
    #[error("number error: malformed number literal '{literal}'")]
    MalformedNumber { literal: String, range: Range },
}

impl Ranged for SyntaxError {
    fn range(&self) -> Range {
        match self {
            SyntaxError::UnexpectedToken { range, .. } => *range,
            SyntaxError::UntermConstruct { range, .. } => *range,
            SyntaxError::MalformedNumber { range, .. } => *range,
        }
    }
}

fn unexpected_message(found: &Kind, expected: &[Kind], details: Option<&str>) -> String {
    let details = match details {
        Some(details) => format!(", {details}"),
        None => String::new(),
    };

    match expected {
        [] => format!("unexpected token: '{found}'{details}"),
        [kind] => format!("unexpected token: '{found}', was expecting a '{kind}'{details}"),
        kinds => {
            let list = kinds
                .iter()
                .map(|k| format!("'{k}'"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("unexpected token '{found}', was expecting any of {list}{details}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locc_util::Position;

    fn range() -> Range {
        Range::new(Position::new(1, 1), Position::new(1, 2))
    }

    #[test]
    fn test_unexpected_single() {
        let err = SyntaxError::UnexpectedToken {
            found: Kind::Comma,
            expected: vec![Kind::Ident],
            details: None,
            range: range(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected token: ',', was expecting a 'identifier'"
        );
    }

    #[test]
    fn test_unexpected_many_with_details() {
        let err = SyntaxError::UnexpectedToken {
            found: Kind::Import,
            expected: vec![Kind::Type, Kind::Fn, Kind::Section],
            details: Some("import is a top level statement, try moving it up".into()),
            range: range(),
        };
        let message = err.to_string();
        assert!(message.starts_with("unexpected token 'import', was expecting any of 'type', 'fn', 'section'"));
        assert!(message.contains("try moving it up"));
    }

    #[test]
    fn test_unterminated() {
        let err = SyntaxError::UntermConstruct {
            kind: Kind::UntermTemplateExpr,
            range: range(),
        };
        assert_eq!(
            err.to_string(),
            "unterminated template expression: token does not have an ending"
        );
    }

    #[test]
    fn test_malformed_number() {
        let err = SyntaxError::MalformedNumber {
            literal: "12..".into(),
            range: range(),
        };
        assert!(err.to_string().starts_with("number error"));
    }
}
