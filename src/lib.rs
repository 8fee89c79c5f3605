//! sh-ast - shell syntax trees for an embedding host
//!
//! This library parses shell source through a vendored grammar, flattens
//! the resulting tree into uniform tagged nodes, and serializes it as JSON
//! across a guest/host binary boundary with manually managed buffers.

pub mod boundary;
pub mod error;
pub mod flatten;
pub mod syntax;

pub use error::Error;
pub use syntax::{parse, LangVariant, ParseError, ParserOptions};
