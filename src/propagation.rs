//! Constraint propagation: forward checking after an assignment, and AC-3 style arc consistency.

use std::collections::{HashSet, VecDeque};

use bit_set::BitSet;
use log::trace;
use smallvec::SmallVec;

use crate::grid::Cell;
use crate::state::{CrosswordState, Domain};
use crate::SlotId;

/// A directed arc: prune `target`'s domain using `source`'s domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectedArc {
    pub target: SlotId,
    pub source: SlotId,
}

/// Returned when propagation leaves a slot with no options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainWipeout {
    pub slot_id: SlotId,
}

pub type PropagationResult = Result<(), DomainWipeout>;

/// Worklist of arcs still to be revised. An arc that's already waiting isn't queued twice.
#[derive(Debug, Default)]
struct ArcQueue {
    queue: VecDeque<DirectedArc>,
    queued: HashSet<DirectedArc>,
}

impl ArcQueue {
    fn with_initial_queue<Arcs: IntoIterator<Item = DirectedArc>>(arcs: Arcs) -> ArcQueue {
        let mut queue = ArcQueue::default();
        for arc in arcs {
            queue.enqueue(arc);
        }
        queue
    }

    fn enqueue(&mut self, arc: DirectedArc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }

    fn pop_front(&mut self) -> Option<DirectedArc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }
}

/// Every directed arc in the grid, for an initial global consistency pass.
pub fn all_arcs(state: &CrosswordState) -> Vec<DirectedArc> {
    let geometry = state.geometry();
    (0..geometry.len())
        .flat_map(|target| {
            geometry.neighbors(target).iter().map(move |&source| DirectedArc { target, source })
        })
        .collect()
}

/// Prune the domains of every slot crossing `assigned_slot_id`, which has just had a word written
/// into it. Each crossing now has a fixed letter, so each neighbor keeps only the words with that
/// letter in the right position. If `maintain_arc_consistency` is set, the effects are then
/// propagated through the rest of the grid with `arc_consistency`.
pub fn update_domains(
    state: &mut CrosswordState,
    assigned_slot_id: SlotId,
    maintain_arc_consistency: bool,
) -> PropagationResult {
    let geometry = state.geometry();
    let index = state.index();
    let mut affected: SmallVec<[SlotId; 16]> = SmallVec::new();

    for crossing in geometry.crossings(assigned_slot_id) {
        let neighbor_id = crossing.other_slot_id;
        let letter = match state.grid().get(crossing.cell) {
            Some(Cell::Letter(letter)) => letter,
            _ => continue,
        };
        let neighbor_length = geometry.slot(neighbor_id).length;

        let mut ranks = state.domain(neighbor_id).ranks().clone();
        ranks.intersect_with(index.bucket(neighbor_length, crossing.other_slot_cell, letter));

        if ranks.is_empty() {
            trace!(
                "slot {} wiped out by letter {:?} from slot {}",
                neighbor_id, letter, assigned_slot_id,
            );
            return Err(DomainWipeout { slot_id: neighbor_id });
        }
        if ranks.len() < state.domain(neighbor_id).len() {
            state.set_domain(neighbor_id, Domain::from_ranks(ranks));
            affected.push(neighbor_id);
        }
    }

    if !maintain_arc_consistency || affected.is_empty() {
        return Ok(());
    }

    let mut arcs: Vec<DirectedArc> = Vec::with_capacity(affected.len() * 4);
    for &neighbor_id in &affected {
        arcs.push(DirectedArc { target: neighbor_id, source: assigned_slot_id });
        for &other_id in geometry.neighbors(neighbor_id) {
            if other_id != assigned_slot_id {
                arcs.push(DirectedArc { target: other_id, source: neighbor_id });
            }
        }
    }

    arc_consistency(state, arcs)
}

/// Run arc consistency to a fixed point starting from the given arcs. For each arc, any word in
/// the target's domain that has no compatible word in the source's domain (matching letter at
/// the shared cell) is removed. Whenever a domain shrinks, the arcs pointing into it from its
/// other neighbors are revisited. Fails as soon as any domain becomes empty; success only means
/// that no domain is empty, not that a fill exists.
pub fn arc_consistency<Arcs>(state: &mut CrosswordState, arcs: Arcs) -> PropagationResult
where
    Arcs: IntoIterator<Item = DirectedArc>,
{
    let geometry = state.geometry();
    let mut queue = ArcQueue::with_initial_queue(arcs);

    while let Some(DirectedArc { target, source }) = queue.pop_front() {
        let Some(revised) = revise(state, target, source) else {
            continue;
        };

        if revised.is_empty() {
            trace!("slot {} wiped out by arc from slot {}", target, source);
            return Err(DomainWipeout { slot_id: target });
        }
        state.set_domain(target, revised);

        for &other_id in geometry.neighbors(target) {
            if other_id != source {
                queue.enqueue(DirectedArc { target: other_id, source: target });
            }
        }
    }

    Ok(())
}

/// Revise one arc, returning the target's new domain if anything was removed.
fn revise(state: &CrosswordState, target: SlotId, source: SlotId) -> Option<Domain> {
    let geometry = state.geometry();
    let index = state.index();
    let crossing = geometry.crossing(target, source)?;
    let target_length = geometry.slot(target).length;
    let source_length = geometry.slot(source).length;

    // Letters the source can still put in the shared cell.
    let mut supported: SmallVec<[char; 32]> = SmallVec::new();
    for rank in state.domain(source).ranks() {
        let letter = index.letter(source_length, rank, crossing.other_slot_cell);
        if !supported.contains(&letter) {
            supported.push(letter);
        }
    }

    let target_domain = state.domain(target);
    let ranks: BitSet = target_domain.ranks().iter()
        .filter(|&rank| supported.contains(&index.letter(target_length, rank, crossing.slot_cell)))
        .collect();

    (ranks.len() < target_domain.len()).then(|| Domain::from_ranks(ranks))
}
