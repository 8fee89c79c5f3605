//! Error Mapper & Result Envelope
//!
//! Classifies a failure into the envelope's two error channels and bundles
//! everything one call produces for transmission.

use serde::Serialize;

use crate::error::Error;

use super::pos::map_pos;
use super::types::{File, Position};

/// Structured wire form of a grammar failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    pub message: String,
    pub pos: Position,
}

/// Everything one parse invocation sends back: the tagged tree (present
/// even when parsing failed, possibly partial), the original source text,
/// the structured error if the grammar produced one, and the error message
/// as plain text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub file: File,
    pub text: String,
    pub parse_error: Option<ParseError>,
    pub message: String,
}

/// Classify a failure. Grammar errors keep their position and double as
/// the plain-text message; any other failure is message-only; no failure
/// is an empty message. There is no third case.
pub fn classify_error(error: Option<&Error>) -> (Option<ParseError>, String) {
    match error {
        None => (None, String::new()),
        Some(Error::Parse(parse_error)) => {
            let message = parse_error.to_string();
            (
                Some(ParseError {
                    message: message.clone(),
                    pos: map_pos(parse_error.pos),
                }),
                message,
            )
        }
        Some(other) => (None, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{self, ast::Pos};

    #[test]
    fn test_no_error_yields_empty_message() {
        let (structured, message) = classify_error(None);
        assert!(structured.is_none());
        assert!(message.is_empty());
    }

    #[test]
    fn test_grammar_error_is_structured() {
        let error = Error::Parse(syntax::ParseError {
            filename: "x.sh".into(),
            pos: Pos::new(10, 1, 11),
            message: "expected \"fi\"".into(),
            incomplete: true,
        });
        let (structured, message) = classify_error(Some(&error));
        let structured = structured.expect("structured error");
        assert_eq!(structured.pos.offset, 10);
        assert_eq!(structured.message, message);
        assert!(message.contains("expected"));
    }

    #[test]
    fn test_other_errors_are_message_only() {
        let error = Error::UnknownVariant(9);
        let (structured, message) = classify_error(Some(&error));
        assert!(structured.is_none());
        assert_eq!(message, "unknown language variant 9");
    }
}
