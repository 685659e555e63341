//! Backtracking search over slot assignments, interleaved with constraint propagation.

use std::cmp::Reverse;
use std::ops::ControlFlow;

use instant::{Duration, Instant};
use log::{debug, info};
use thiserror::Error;

use crate::geometry::{Slot, SlotGeometry};
use crate::grid::Grid;
use crate::propagation::{all_arcs, arc_consistency, update_domains};
use crate::state::CrosswordState;
use crate::words::WordIndex;
use crate::{SlotId, WordId};

/// How to choose the next slot to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum VariableHeuristic {
    /// The slot crossing the most other unfilled slots.
    #[default]
    Degree,
    /// The slot with the fewest remaining options.
    Mrv,
    /// The first unfilled slot in slot order.
    #[value(name = "none")]
    FirstUnfilled,
}

/// How to order the candidate words for the chosen slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueHeuristic {
    /// Increasing word id.
    #[default]
    Natural,
    /// Try the words that eliminate the fewest options from other slots first. If `sample` is
    /// set, only that many randomly chosen candidates are scored per node; they go first, and the
    /// rest follow in natural order.
    LeastConstraining { sample: Option<usize> },
}

/// Settings for a fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillOptions {
    /// Run full arc consistency after every assignment (and once before searching), rather than
    /// only pruning the slots that cross the assigned one.
    pub arc_consistency: bool,
    pub variable_heuristic: VariableHeuristic,
    pub value_heuristic: ValueHeuristic,
    /// Seed for the sampler used by `ValueHeuristic::LeastConstraining`.
    pub seed: u64,
}

impl Default for FillOptions {
    fn default() -> Self {
        FillOptions {
            arc_consistency: true,
            variable_heuristic: VariableHeuristic::default(),
            value_heuristic: ValueHeuristic::default(),
            seed: 0,
        }
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Search nodes visited.
    pub states: u64,
    /// Candidates undone after the search below them failed.
    pub backtracks: u64,
    /// Candidates rejected because propagation emptied some slot's domain.
    pub wipeouts: u64,
    pub duration: Duration,
}

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot: Slot,
    pub word_id: WordId,
}

#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub grid: Grid,
    /// The decisions made by the search, in order. Slots that were completed by their crossings
    /// don't appear here.
    pub choices: Vec<Choice>,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FillFailure {
    /// Some slot had no candidate words at all before searching.
    #[error("no words fit slot {slot:?}")]
    NoCandidates { slot: Slot },

    /// Propagation or an exhaustive search proved that there is no fill.
    #[error("no fill exists (searched {} states)", .statistics.states)]
    Unsolvable { statistics: Statistics },

    /// The node hook stopped the search before it finished.
    #[error("search aborted after {} states", .statistics.states)]
    Aborted { statistics: Statistics },
}

impl FillFailure {
    /// Is this a proof that the grid can't be filled, as opposed to giving up?
    pub fn is_unsolvable(&self) -> bool {
        !matches!(self, FillFailure::Aborted { .. })
    }
}

/// Outcome of searching below one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Search {
    Solved,
    Exhausted,
    Aborted,
}

type NodeHook<'h> = Box<dyn FnMut(&Statistics) -> ControlFlow<()> + 'h>;

/// Depth-first backtracking filler. Reusable across grids; each call to `fill` starts from
/// fresh statistics and a freshly seeded sampler, so identical inputs give identical results.
pub struct Filler<'h> {
    options: FillOptions,
    rng: fastrand::Rng,
    statistics: Statistics,
    choices: Vec<Choice>,
    node_hook: Option<NodeHook<'h>>,
}

impl<'h> Filler<'h> {
    pub fn new(options: FillOptions) -> Filler<'h> {
        let rng = fastrand::Rng::with_seed(options.seed);
        Filler { options, rng, statistics: Statistics::default(), choices: vec![], node_hook: None }
    }

    /// Install a callback that runs once per search node. Returning `ControlFlow::Break` stops
    /// the search with `FillFailure::Aborted`, which is how callers impose time or node budgets.
    pub fn with_node_hook<F>(mut self, hook: F) -> Filler<'h>
    where
        F: FnMut(&Statistics) -> ControlFlow<()> + 'h,
    {
        self.node_hook = Some(Box::new(hook));
        self
    }

    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    /// Search for a fill of the given grid using words from the index.
    pub fn fill(&mut self, grid: &Grid, index: &WordIndex) -> Result<FillSuccess, FillFailure> {
        let start = Instant::now();
        self.statistics = Statistics::default();
        self.choices.clear();
        self.rng = fastrand::Rng::with_seed(self.options.seed);

        let geometry = SlotGeometry::new(grid);
        let mut state = CrosswordState::new(grid, &geometry, index);

        let empty = (0..geometry.len()).find(|&slot_id| state.domain(slot_id).is_empty());
        if let Some(slot_id) = empty {
            let slot = *geometry.slot(slot_id);
            info!("no candidates for {:?}", slot);
            return Err(FillFailure::NoCandidates { slot });
        }

        let initially_consistent = !self.options.arc_consistency || {
            let arcs = all_arcs(&state);
            arc_consistency(&mut state, arcs).is_ok()
        };
        let outcome = if initially_consistent {
            self.search(&mut state, 0)
        } else {
            Search::Exhausted
        };

        self.statistics.duration = start.elapsed();
        info!("fill finished: {:?} {:?}", outcome, self.statistics);

        let statistics = self.statistics.clone();
        match outcome {
            Search::Solved => Ok(FillSuccess {
                grid: state.into_grid(),
                choices: std::mem::take(&mut self.choices),
                statistics,
            }),
            Search::Exhausted => Err(FillFailure::Unsolvable { statistics }),
            Search::Aborted => Err(FillFailure::Aborted { statistics }),
        }
    }

    fn search(&mut self, state: &mut CrosswordState, depth: usize) -> Search {
        self.statistics.states += 1;

        if let Some(hook) = self.node_hook.as_mut() {
            if hook(&self.statistics).is_break() {
                return Search::Aborted;
            }
        }

        let geometry = state.geometry();
        let index = state.index();

        let unfilled: Vec<bool> =
            (0..geometry.len()).map(|slot_id| state.is_unfilled(slot_id)).collect();
        let slot_id = match self.select_slot(state, &unfilled) {
            Some(slot_id) => slot_id,
            None => return Search::Solved,
        };

        let candidates = self.order_candidates(state, slot_id);
        debug!(
            "depth {}: filling {:?} with {} candidates",
            depth, geometry.slot(slot_id), candidates.len(),
        );

        let checkpoint = state.snapshot();

        for word_id in candidates {
            // The domain should already guarantee this.
            if !state.can_write_id(slot_id, &index.word(word_id).string) {
                continue;
            }

            state.assign(slot_id, word_id);
            if update_domains(state, slot_id, self.options.arc_consistency).is_err() {
                self.statistics.wipeouts += 1;
                state.restore(checkpoint);
                continue;
            }

            self.choices.push(Choice { slot: *geometry.slot(slot_id), word_id });
            match self.search(state, depth + 1) {
                Search::Solved => return Search::Solved,
                Search::Aborted => {
                    self.choices.pop();
                    state.restore(checkpoint);
                    return Search::Aborted;
                }
                Search::Exhausted => {}
            }

            self.choices.pop();
            self.statistics.backtracks += 1;
            state.restore(checkpoint);
        }

        Search::Exhausted
    }

    /// Pick the next slot to fill, or `None` if every slot is filled. Ties go to the lowest slot
    /// id, i.e. across slots before down slots, each in reading order.
    fn select_slot(&self, state: &CrosswordState, unfilled: &[bool]) -> Option<SlotId> {
        let geometry = state.geometry();
        let mut remaining = (0..geometry.len()).filter(|&slot_id| unfilled[slot_id]);

        match self.options.variable_heuristic {
            VariableHeuristic::Degree => remaining.min_by_key(|&slot_id| {
                let neighbors = geometry.neighbors(slot_id);
                Reverse(neighbors.iter().filter(|&&other| unfilled[other]).count())
            }),
            VariableHeuristic::Mrv => remaining.min_by_key(|&slot_id| state.domain(slot_id).len()),
            VariableHeuristic::FirstUnfilled => remaining.next(),
        }
    }

    /// The chosen slot's remaining words, in the order they should be tried.
    fn order_candidates(&mut self, state: &mut CrosswordState, slot_id: SlotId) -> Vec<WordId> {
        let domain: Vec<WordId> = state.domain_words(slot_id).collect();

        let sample = match self.options.value_heuristic {
            ValueHeuristic::Natural => return domain,
            ValueHeuristic::LeastConstraining { sample } => sample,
        };

        let sample_size = sample.map_or(domain.len(), |size| size.min(domain.len()));
        let mut sampled: Vec<WordId> = if sample_size == domain.len() {
            domain.clone()
        } else {
            self.rng.choose_multiple(domain.iter().copied(), sample_size)
        };
        sampled.sort_unstable();

        let mut scored: Vec<(usize, WordId)> = sampled.iter()
            .map(|&word_id| (self.eliminated_options(state, slot_id, word_id), word_id))
            .collect();
        scored.sort_unstable();

        let mut ordered: Vec<WordId> = scored.into_iter().map(|(_, word_id)| word_id).collect();
        ordered.extend(
            domain.into_iter().filter(|word_id| sampled.binary_search(word_id).is_err()),
        );
        ordered
    }

    /// How many options, summed over every slot, would disappear if `word_id` went into the
    /// slot? A word that makes propagation fail counts as eliminating everything. The state is
    /// left exactly as it was.
    fn eliminated_options(
        &self,
        state: &mut CrosswordState,
        slot_id: SlotId,
        word_id: WordId,
    ) -> usize {
        let before = state.total_domain_size();
        if !state.can_write_id(slot_id, &state.index().word(word_id).string) {
            return before;
        }

        let checkpoint = state.snapshot();
        state.assign(slot_id, word_id);
        let eliminated = match update_domains(state, slot_id, self.options.arc_consistency) {
            Ok(()) => before - state.total_domain_size(),
            Err(_) => before,
        };
        state.restore(checkpoint);

        eliminated
    }
}

/// Fill a grid from a word list. This builds a fresh `WordIndex`; to fill several grids from the
/// same list, build the index once and use `Filler::fill`.
pub fn solve<S: AsRef<str>>(
    grid: &Grid,
    words: &[S],
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    let index = WordIndex::build(words);
    Filler::new(options.clone()).fill(grid, &index)
}
