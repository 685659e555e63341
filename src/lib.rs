//! Crossword filling as a constraint satisfaction problem.
//!
//! Each slot (a maximal run of open cells) is a variable whose domain is the set of words of the
//! right length, and every cell shared by two slots is an equality constraint between them. A fill
//! is found by backtracking search over slots, with domains kept consistent by forward checking
//! and (optionally) arc consistency after every assignment.
//!
//! ```
//! use gridfill::{solve, FillOptions, Grid};
//!
//! let grid = Grid::from_template("   \n ##\n ##").unwrap();
//! let result = solve(&grid, &["cat", "car", "dog"], &FillOptions::default()).unwrap();
//! assert_eq!(result.grid.get((0, 0)), Some(gridfill::Cell::Letter('c')));
//! ```

pub mod error;
pub mod geometry;
pub mod grid;
pub mod propagation;
pub mod solver;
pub mod state;
pub mod words;

pub use error::{ParseError, WriteError};
pub use geometry::{Direction, Slot, SlotGeometry};
pub use grid::{parse_grids, Cell, Grid};
pub use solver::{
    solve, Choice, FillFailure, FillOptions, FillSuccess, Filler, Statistics, ValueHeuristic,
    VariableHeuristic,
};
pub use state::{Checkpoint, CrosswordState, Domain};
pub use words::{parse_word_list, Word, WordIndex};

/// The expected maximum length for a single slot. Longer slots work, they just spill out of
/// inline storage.
pub const MAX_SLOT_LENGTH: usize = 21;

/// An identifier for a given slot, based on its index in the `SlotGeometry`'s slot list.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the word list the `WordIndex` was built
/// from.
pub type WordId = usize;

/// The position of a word among the words of the same length, in word id order.
pub type Rank = usize;

/// Zero-indexed (row, col) coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);
