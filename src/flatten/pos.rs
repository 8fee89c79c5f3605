//! Position Codec
//!
//! Converts the grammar's opaque source locations into plain wire records.

use crate::syntax::ast::Pos;

use super::types::Position;

/// Map a grammar position to its wire record. Total, and deliberately free
/// of any renumbering: the grammar's 0-based offsets and 1-based line and
/// column values pass through untouched, and the zero "no position" value
/// maps to an all-zero record.
pub fn map_pos(pos: Pos) -> Position {
    Position {
        offset: pos.offset(),
        line: pos.line(),
        col: pos.col(),
    }
}
