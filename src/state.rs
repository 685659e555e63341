//! The mutable side of a fill: cell contents and per-slot domains.
//!
//! Speculative changes are recorded on an undo trail instead of deep-copying the state at every
//! search node. A `Checkpoint` is just a position on that trail; restoring pops and reverts
//! everything recorded after it, which leaves the cells and domains exactly as they were when the
//! checkpoint was taken.

use bit_set::BitSet;

use crate::error::WriteError;
use crate::geometry::{Slot, SlotGeometry};
use crate::grid::{Cell, Grid, BLANK};
use crate::words::WordIndex;
use crate::{GridCoord, SlotId, WordId};

/// The set of words still considered possible for one slot, stored as ranks within the slot's
/// length bucket of the `WordIndex`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Domain {
    ranks: BitSet,
}

impl Domain {
    pub(crate) fn from_ranks(ranks: BitSet) -> Domain {
        Domain { ranks }
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub(crate) fn ranks(&self) -> &BitSet {
        &self.ranks
    }
}

/// A single reversible change.
#[derive(Debug, Clone)]
enum Change {
    Cell { coord: GridCoord, previous: Cell },
    Domain { slot_id: SlotId, previous: Domain },
}

/// A position on the undo trail, returned by `CrosswordState::snapshot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(usize);

/// Grid contents and domains for a puzzle being filled.
#[derive(Debug, Clone)]
pub struct CrosswordState<'a> {
    geometry: &'a SlotGeometry,
    index: &'a WordIndex,
    grid: Grid,
    domains: Vec<Domain>,
    trail: Vec<Change>,
}

impl<'a> CrosswordState<'a> {
    /// Set up the state for a grid. Each slot starts out with every word of its length, filtered
    /// by whatever letters the grid already has in that slot's cells.
    pub fn new(
        grid: &Grid,
        geometry: &'a SlotGeometry,
        index: &'a WordIndex,
    ) -> CrosswordState<'a> {
        let domains = geometry.slots().iter().map(|slot| {
            let mut ranks = index.all_ranks(slot.length);
            for (position, coord) in slot.cells().enumerate() {
                if let Some(Cell::Letter(letter)) = grid.get(coord) {
                    ranks.intersect_with(index.bucket(slot.length, position, letter));
                }
            }
            Domain::from_ranks(ranks)
        }).collect();

        CrosswordState {
            geometry,
            index,
            grid: grid.clone(),
            domains,
            trail: vec![],
        }
    }

    pub fn geometry(&self) -> &'a SlotGeometry {
        self.geometry
    }

    pub fn index(&self) -> &'a WordIndex {
        self.index
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn domain(&self, slot_id: SlotId) -> &Domain {
        &self.domains[slot_id]
    }

    /// Word ids remaining in a slot's domain, in increasing order.
    pub fn domain_words(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        let length = self.geometry.slot(slot_id).length;
        self.domains[slot_id].ranks().iter().map(move |rank| self.index.word_id(length, rank))
    }

    /// Sum of the sizes of every slot's domain.
    pub fn total_domain_size(&self) -> usize {
        self.domains.iter().map(|domain| domain.len()).sum()
    }

    /// Read the slot's cells as a string, with `BLANK` standing in for unfilled cells. Returns
    /// `None` for slots that aren't part of this grid.
    pub fn text_at(&self, slot: &Slot) -> Option<String> {
        self.geometry.id_of(slot).map(|slot_id| self.text_at_id(slot_id))
    }

    pub fn text_at_id(&self, slot_id: SlotId) -> String {
        self.geometry.slot(slot_id).cells().map(|coord| {
            match self.grid.get(coord) {
                Some(Cell::Letter(letter)) => letter,
                _ => BLANK,
            }
        }).collect()
    }

    /// Does the slot still have an unfilled cell?
    pub fn is_unfilled(&self, slot_id: SlotId) -> bool {
        self.geometry.slot(slot_id).cells().any(|coord| self.grid.get(coord) == Some(Cell::Empty))
    }

    /// Check whether the word fits the slot: same length, and every cell is either unfilled or
    /// already holds the word's letter at that position. This is the only legality check for
    /// writing; domains just narrow down what's worth trying.
    pub fn can_write(&self, slot: &Slot, word: &str) -> bool {
        self.geometry.id_of(slot).map_or(false, |slot_id| self.can_write_id(slot_id, word))
    }

    pub fn can_write_id(&self, slot_id: SlotId, word: &str) -> bool {
        let slot = self.geometry.slot(slot_id);
        if word.chars().count() != slot.length {
            return false;
        }

        slot.cells().zip(word.chars()).all(|(coord, letter)| {
            match self.grid.get(coord) {
                Some(Cell::Empty) => true,
                Some(Cell::Letter(existing)) => existing == letter,
                _ => false,
            }
        })
    }

    /// Overwrite the slot's cells with the word's letters. This doesn't check for conflicts with
    /// letters already in the grid; callers are expected to check `can_write` first. Addressing
    /// an unknown slot or passing a word of the wrong length is rejected.
    pub fn write(&mut self, slot: &Slot, word: &str) -> Result<(), WriteError> {
        let slot_id = self.geometry.id_of(slot).ok_or(WriteError::UnknownSlot(*slot))?;
        let found = word.chars().count();
        if found != slot.length {
            return Err(WriteError::LengthMismatch { slot: *slot, expected: slot.length, found });
        }

        self.write_id(slot_id, word);
        Ok(())
    }

    /// Id-based `write` for callers that already know the word has the right length.
    pub(crate) fn write_id(&mut self, slot_id: SlotId, word: &str) {
        let geometry = self.geometry;
        for (coord, letter) in geometry.slot(slot_id).cells().zip(word.chars()) {
            self.set_cell(coord, Cell::Letter(letter));
        }
    }

    /// Write a word from the index into a slot and narrow the slot's own domain to the words
    /// spelled exactly the same, so the slot's domain agrees with its letters.
    pub(crate) fn assign(&mut self, slot_id: SlotId, word_id: WordId) {
        let index = self.index;
        let word = index.word(word_id);
        self.write_id(slot_id, &word.string);

        let length = word.len();
        let mut ranks = self.domains[slot_id].ranks().clone();
        for (position, &letter) in word.letters.iter().enumerate() {
            ranks.intersect_with(index.bucket(length, position, letter));
        }
        self.set_domain(slot_id, Domain::from_ranks(ranks));
    }

    fn set_cell(&mut self, coord: GridCoord, cell: Cell) {
        if self.grid.get(coord) == Some(cell) {
            return;
        }
        if let Some(previous) = self.grid.set(coord, cell) {
            self.trail.push(Change::Cell { coord, previous });
        }
    }

    /// Replace a slot's domain. Domains only ever shrink between a snapshot and its restore.
    pub(crate) fn set_domain(&mut self, slot_id: SlotId, domain: Domain) {
        debug_assert!(
            domain.ranks().is_subset(self.domains[slot_id].ranks()),
            "domains must not grow",
        );

        if domain == self.domains[slot_id] {
            return;
        }
        let previous = std::mem::replace(&mut self.domains[slot_id], domain);
        self.trail.push(Change::Domain { slot_id, previous });
    }

    /// Mark the current state so that it can be restored later. Checkpoints nest: restoring an
    /// older checkpoint also undoes everything after any newer one.
    pub fn snapshot(&self) -> Checkpoint {
        Checkpoint(self.trail.len())
    }

    /// Undo every change made since the checkpoint was taken.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        while self.trail.len() > checkpoint.0 {
            match self.trail.pop() {
                Some(Change::Cell { coord, previous }) => {
                    self.grid.set(coord, previous);
                }
                Some(Change::Domain { slot_id, previous }) => {
                    self.domains[slot_id] = previous;
                }
                None => break,
            }
        }
    }

    /// Consume the state, returning the filled grid.
    pub fn into_grid(self) -> Grid {
        self.grid
    }
}
