//! AST Flattening
//!
//! Turns the recursive, polymorphic syntax tree into a single uniform,
//! tagged, position-annotated representation that serializes losslessly to
//! JSON for a caller with no knowledge of the source type system.

pub mod mapper;
pub mod pos;
pub mod result;
pub mod types;

pub use mapper::map_file;
pub use result::{classify_error, ParseResult};
