//! Crate Error Type
//!
//! Everything a boundary call can fail with. Grammar failures keep their
//! structure; the rest carry only a message.

use thiserror::Error;

use crate::syntax;

#[derive(Debug, Error)]
pub enum Error {
    /// The grammar reported a malformed construct at a known position.
    #[error(transparent)]
    Parse(#[from] syntax::ParseError),

    /// The boundary was handed a dialect selector it does not know.
    #[error("unknown language variant {0}")]
    UnknownVariant(i32),
}
