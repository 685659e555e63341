//! Slot geometry: which runs of open cells can hold words, and where those runs cross.
//!
//! Everything in here is computed once from the grid skeleton and never changes afterwards, so
//! it can be shared freely by the state, the propagator and the solver.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::grid::Grid;
use crate::{GridCoord, SlotId, MAX_SLOT_LENGTH};

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    /// (delta_row, delta_col) for one step along a slot.
    fn step(self) -> (usize, usize) {
        match self {
            Direction::Across => (0, 1),
            Direction::Down => (1, 0),
        }
    }
}

/// A maximal run of at least two open cells in one direction. Slots are compared and hashed by
/// value, so the same run always maps to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub start_row: usize,
    pub start_col: usize,
    pub length: usize,
    pub direction: Direction,
}

impl Slot {
    /// Generate the coords for each cell of this slot.
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> {
        let (dr, dc) = self.direction.step();
        let (row, col) = (self.start_row, self.start_col);
        (0..self.length).map(move |idx| (row + idx * dr, col + idx * dc))
    }

    /// The index of the given cell within this slot, if the slot covers it.
    pub fn index_of(&self, (row, col): GridCoord) -> Option<usize> {
        let idx = match self.direction {
            Direction::Across if row == self.start_row => col.checked_sub(self.start_col)?,
            Direction::Down if col == self.start_col => row.checked_sub(self.start_row)?,
            _ => return None,
        };
        (idx < self.length).then_some(idx)
    }
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within both slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub cell: GridCoord,
    pub slot_cell: usize,
    pub other_slot_cell: usize,
}

/// For each slot, the slots it shares a cell with.
pub type NeighborMap = Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>>;

/// For each unordered pair of crossing slots (stored with the smaller id first), the shared cell.
pub type OverlapMap = HashMap<(SlotId, SlotId), GridCoord>;

/// Scan every row and every column for maximal runs of open cells. Runs of length 1 are dropped,
/// since a single cell can't hold a word. Across slots come first in row-major order, followed by
/// down slots in column-major order; that order defines each slot's `SlotId`.
pub fn derive_slots(grid: &Grid) -> Vec<Slot> {
    fn runs(line: impl Iterator<Item = bool>) -> Vec<(usize, usize)> {
        let mut result = vec![];
        let mut start: Option<usize> = None;
        let mut end = 0;

        for (idx, open) in line.enumerate() {
            end = idx + 1;
            match (open, start) {
                (true, None) => start = Some(idx),
                (false, Some(run_start)) => {
                    if idx - run_start > 1 {
                        result.push((run_start, idx - run_start));
                    }
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(run_start) = start {
            if end - run_start > 1 {
                result.push((run_start, end - run_start));
            }
        }

        result
    }

    let mut slots = vec![];

    for (row, cells) in grid.rows().enumerate() {
        for (start_col, length) in runs(cells.iter().map(|cell| !cell.is_blocked())) {
            slots.push(Slot { start_row: row, start_col, length, direction: Direction::Across });
        }
    }
    for col in 0..grid.width() {
        for (start_row, length) in runs(grid.column(col).map(|cell| !cell.is_blocked())) {
            slots.push(Slot { start_row, start_col: col, length, direction: Direction::Down });
        }
    }

    slots
}

/// Work out which slots share a cell. We build a map from cell location to the slots covering it,
/// then every cell covered by more than one slot contributes a crossing for each pair. With only
/// two straight directions a pair of slots can share at most one cell; if a caller hands us
/// slots that overlap along a line, the first shared cell in row-major order is recorded.
pub fn compute_overlaps(slots: &[Slot]) -> (NeighborMap, OverlapMap) {
    let mut slots_by_cell: HashMap<GridCoord, SmallVec<[SlotId; 2]>> = HashMap::new();
    for (slot_id, slot) in slots.iter().enumerate() {
        for cell in slot.cells() {
            slots_by_cell.entry(cell).or_default().push(slot_id);
        }
    }

    let mut cells: Vec<(&GridCoord, &SmallVec<[SlotId; 2]>)> =
        slots_by_cell.iter().filter(|(_, slot_ids)| slot_ids.len() > 1).collect();
    cells.sort_unstable_by_key(|&(&cell, _)| cell);

    let mut overlaps: OverlapMap = HashMap::new();
    for (&cell, slot_ids) in cells {
        for (i, &a) in slot_ids.iter().enumerate() {
            for &b in &slot_ids[i + 1..] {
                overlaps.entry((a.min(b), a.max(b))).or_insert(cell);
            }
        }
    }

    let mut neighbors: NeighborMap = slots.iter().map(|_| SmallVec::new()).collect();
    for &(a, b) in overlaps.keys() {
        neighbors[a].push(b);
        neighbors[b].push(a);
    }
    for slot_neighbors in &mut neighbors {
        slot_neighbors.sort_unstable();
    }

    (neighbors, overlaps)
}

/// The static shape of a puzzle: its slots, their ids, and their crossings.
#[derive(Debug, Clone)]
pub struct SlotGeometry {
    slots: Vec<Slot>,
    ids: HashMap<Slot, SlotId>,
    neighbors: NeighborMap,
    overlaps: OverlapMap,
    crossings: Vec<SmallVec<[Crossing; MAX_SLOT_LENGTH]>>,
}

impl SlotGeometry {
    pub fn new(grid: &Grid) -> SlotGeometry {
        SlotGeometry::from_slots(derive_slots(grid))
    }

    /// Build the geometry for an explicit list of slots.
    pub fn from_slots(slots: Vec<Slot>) -> SlotGeometry {
        let (neighbors, overlaps) = compute_overlaps(&slots);
        let ids = slots.iter().enumerate().map(|(slot_id, &slot)| (slot, slot_id)).collect();

        let crossings = neighbors.iter().enumerate().map(|(slot_id, slot_neighbors)| {
            slot_neighbors.iter().map(|&other_slot_id| {
                let cell = overlaps[&(slot_id.min(other_slot_id), slot_id.max(other_slot_id))];
                Crossing {
                    other_slot_id,
                    cell,
                    slot_cell: cell_index(&slots[slot_id], cell),
                    other_slot_cell: cell_index(&slots[other_slot_id], cell),
                }
            }).collect()
        }).collect();

        SlotGeometry { slots, ids, neighbors, overlaps, crossings }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slots[slot_id]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Look up a slot's id, or `None` if it isn't part of this geometry.
    pub fn id_of(&self, slot: &Slot) -> Option<SlotId> {
        self.ids.get(slot).copied()
    }

    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors[slot_id]
    }

    pub fn crossings(&self, slot_id: SlotId) -> &[Crossing] {
        &self.crossings[slot_id]
    }

    /// The cell shared by two slots, in either order.
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<GridCoord> {
        self.overlaps.get(&(a.min(b), a.max(b))).copied()
    }

    /// The crossing from `slot_id` into `other_slot_id`, if they cross.
    pub fn crossing(&self, slot_id: SlotId, other_slot_id: SlotId) -> Option<&Crossing> {
        self.crossings[slot_id].iter().find(|crossing| crossing.other_slot_id == other_slot_id)
    }
}

/// Every overlap cell comes from the slot's own cells, so the lookup can't miss.
fn cell_index(slot: &Slot, cell: GridCoord) -> usize {
    slot.index_of(cell).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::grid::Cell;

    fn slot(start_row: usize, start_col: usize, length: usize, direction: Direction) -> Slot {
        Slot { start_row, start_col, length, direction }
    }

    #[test]
    fn test_derive_slots_skips_single_cells() {
        let grid = Grid::from_template("   \n ##\n ##").unwrap();

        assert_eq!(
            derive_slots(&grid),
            vec![slot(0, 0, 3, Direction::Across), slot(0, 0, 3, Direction::Down)],
        );
    }

    #[test]
    fn test_derive_slots_finds_runs_touching_both_edges() {
        let grid = Grid::from_template("  #  \n#####\n  #  ").unwrap();

        assert_eq!(
            derive_slots(&grid),
            vec![
                slot(0, 0, 2, Direction::Across),
                slot(0, 3, 2, Direction::Across),
                slot(2, 0, 2, Direction::Across),
                slot(2, 3, 2, Direction::Across),
            ],
        );
    }

    #[test]
    fn test_prefilled_letters_are_part_of_slots() {
        let grid = Grid::from_template("ca.\n#.#").unwrap();

        assert_eq!(
            derive_slots(&grid),
            vec![slot(0, 0, 3, Direction::Across), slot(0, 1, 2, Direction::Down)],
        );
    }

    #[test]
    fn test_overlaps_for_open_square() {
        let grid = Grid::from_template("   \n   \n   ").unwrap();
        let geometry = SlotGeometry::new(&grid);

        assert_eq!(geometry.len(), 6);
        let across_1 = geometry.id_of(&slot(1, 0, 3, Direction::Across)).unwrap();
        let down_2 = geometry.id_of(&slot(0, 2, 3, Direction::Down)).unwrap();

        assert_eq!(geometry.overlap(across_1, down_2), Some((1, 2)));
        assert_eq!(geometry.neighbors(across_1), &[3, 4, 5]);

        let crossing = geometry.crossing(across_1, down_2).unwrap();
        assert_eq!(crossing.slot_cell, 2);
        assert_eq!(crossing.other_slot_cell, 1);

        // Parallel slots never cross.
        assert_eq!(geometry.overlap(0, 1), None);
        assert_eq!(geometry.id_of(&slot(1, 1, 2, Direction::Across)), None);
    }

    #[test]
    fn test_index_of() {
        let down = slot(2, 4, 3, Direction::Down);

        assert_eq!(down.index_of((2, 4)), Some(0));
        assert_eq!(down.index_of((4, 4)), Some(2));
        assert_eq!(down.index_of((5, 4)), None);
        assert_eq!(down.index_of((1, 4)), None);
        assert_eq!(down.index_of((3, 3)), None);
    }

    fn arb_grid() -> impl Strategy<Value = Grid> {
        (1usize..7, 1usize..7).prop_flat_map(|(height, width)| {
            prop::collection::vec(prop::collection::vec(prop::bool::weighted(0.25), width), height)
                .prop_map(|rows| {
                    Grid::new(rows.into_iter().map(|row| {
                        row.into_iter().map(|blocked| if blocked { Cell::Blocked } else { Cell::Empty }).collect()
                    }).collect())
                })
        })
    }

    proptest! {
        #[test]
        fn prop_slots_are_in_bounds_unblocked_and_long_enough(grid in arb_grid()) {
            for slot in derive_slots(&grid) {
                prop_assert!(slot.length >= 2);
                for cell in slot.cells() {
                    prop_assert_eq!(grid.get(cell).map(|c| c.is_blocked()), Some(false));
                }
            }
        }

        #[test]
        fn prop_overlaps_are_symmetric(grid in arb_grid()) {
            let geometry = SlotGeometry::new(&grid);

            for a in 0..geometry.len() {
                for &b in geometry.neighbors(a) {
                    prop_assert!(geometry.neighbors(b).contains(&a));
                    prop_assert_eq!(geometry.overlap(a, b), geometry.overlap(b, a));

                    let cell = geometry.overlap(a, b).unwrap();
                    prop_assert_eq!(geometry.crossing(a, b).unwrap().cell, cell);
                    prop_assert_eq!(geometry.crossing(b, a).unwrap().cell, cell);
                    prop_assert!(geometry.slot(a).index_of(cell).is_some());
                    prop_assert!(geometry.slot(b).index_of(cell).is_some());
                }
            }
        }

        #[test]
        fn prop_overlaps_dont_depend_on_slot_order(grid in arb_grid()) {
            let slots = derive_slots(&grid);
            let mut reversed = slots.clone();
            reversed.reverse();

            let forward = SlotGeometry::from_slots(slots);
            let backward = SlotGeometry::from_slots(reversed);

            for a in 0..forward.len() {
                for b in 0..forward.len() {
                    let ra = backward.id_of(forward.slot(a)).unwrap();
                    let rb = backward.id_of(forward.slot(b)).unwrap();
                    prop_assert_eq!(forward.overlap(a, b), backward.overlap(ra, rb));
                }
            }
        }
    }
}
