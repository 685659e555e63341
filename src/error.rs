//! Error types for malformed input and malformed requests against a grid.
//!
//! Running out of fills is not an error in this sense; see `solver::FillFailure`.

use thiserror::Error;

use crate::geometry::Slot;

/// Errors that can occur while reading grid templates or word lists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The template had no rows.
    #[error("grid template is empty")]
    EmptyGrid,

    /// A template cell was neither a block, an open cell nor a letter.
    #[error("invalid cell {found:?} at row {row}, column {col}")]
    InvalidCell {
        /// Zero-indexed row of the offending cell.
        row: usize,
        /// Zero-indexed column of the offending cell.
        col: usize,
        /// The character that was found.
        found: char,
    },

    /// A word list entry contained something other than letters and apostrophes.
    #[error("invalid word {word:?} on line {line}")]
    InvalidWord {
        /// One-indexed line number in the word list.
        line: usize,
        /// The rejected entry.
        word: String,
    },
}

/// Errors returned when a caller asks to write into a slot it shouldn't.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The slot isn't part of the grid's geometry.
    #[error("slot {0:?} is not part of this grid")]
    UnknownSlot(Slot),

    /// The word doesn't have the same number of letters as the slot has cells.
    #[error("slot {slot:?} has {expected} cells but the word has {found} letters")]
    LengthMismatch {
        /// The slot that was addressed.
        slot: Slot,
        /// The slot's length.
        expected: usize,
        /// The word's length.
        found: usize,
    },
}
