//! Shell Grammar Recognition
//!
//! The vendored recognizer behind one contract: `parse` takes source text,
//! a file name for diagnostics and per-call options, and always yields a
//! syntax tree (possibly partial) plus an optional structured error. The
//! rest of the crate only consumes the tree; it never looks at source text.

use std::fmt;

use thiserror::Error;

pub mod ast;
mod lexer;
mod parser;
mod word;

use ast::{File, Pos};

/// Shell dialects understood by the parser. The discriminants match the
/// integers accepted at the binary boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LangVariant {
    #[default]
    Bash,
    Posix,
    MirBSDKorn,
    Bats,
}

impl TryFrom<i32> for LangVariant {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        match value {
            0 => Ok(Self::Bash),
            1 => Ok(Self::Posix),
            2 => Ok(Self::MirBSDKorn),
            3 => Ok(Self::Bats),
            other => Err(other),
        }
    }
}

impl fmt::Display for LangVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bash => "bash",
            Self::Posix => "posix",
            Self::MirBSDKorn => "mksh",
            Self::Bats => "bats",
        };
        write!(f, "{}", name)
    }
}

/// Parser configuration, assembled fresh for every call.
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Keep comments in the tree instead of discarding them.
    pub keep_comments: bool,
    pub variant: LangVariant,
    /// Stop parsing at the first word beginning with this marker.
    pub stop_at: Option<String>,
    /// Skip up to this many malformed statements before giving up.
    pub recover_errors: u32,
}

/// A structured parse failure at a known position.
#[derive(Debug, Clone, Error)]
pub struct ParseError {
    pub filename: String,
    pub pos: Pos,
    pub message: String,
    /// True when the input ended in the middle of a construct.
    pub incomplete: bool,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.filename.is_empty() {
            write!(f, "{}:{}: {}", self.pos.line(), self.pos.col(), self.message)
        } else {
            write!(
                f,
                "{}:{}:{}: {}",
                self.filename,
                self.pos.line(),
                self.pos.col(),
                self.message
            )
        }
    }
}

/// Parse shell source into a syntax tree.
///
/// Always returns a `File`; when parsing fails the file holds the
/// statements completed before the error, so callers can keep working with
/// a partial tree. With `recover_errors` set, up to that many malformed
/// statements are skipped before an error is reported at all.
pub fn parse(src: &str, name: &str, options: &ParserOptions) -> (File, Option<ParseError>) {
    parser::parse_file(src, name, options)
}
