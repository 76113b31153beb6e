//! Hunt/target core shared by the Medium and Hard tiers.
//!
//! Two-phase targeting: broad coverage scanning until a hit lands, then
//! localized probing around unresolved hits until the ship is confirmed
//! sunk. Mode is derived from the knowledge each turn rather than stored,
//! so the state machine cannot drift out of sync with the tracker.

use crate::board::BoardKnowledge;
use crate::core::Coord;

/// Probe around unresolved hits.
///
/// Hits are visited in (row, col) order; each hit's four orthogonal
/// neighbors are tried in the fixed up/right/down/left order. The first
/// valid target wins. `None` means no hit is pending resolution (or all
/// neighbors are spent) and the caller should hunt instead.
#[must_use]
pub(crate) fn probe_unresolved_hits(knowledge: &BoardKnowledge) -> Option<Coord> {
    for hit in knowledge.unresolved_hits() {
        for neighbor in hit.neighbors(knowledge.size()) {
            if knowledge.is_valid_target(neighbor) {
                return Some(neighbor);
            }
        }
    }
    None
}

/// Hunt-mode candidates: the even-parity checkerboard subset of valid cells.
///
/// With a minimum ship length of 2 every ship crosses the even-parity
/// subset, so scanning it alone guarantees coverage with half the shots.
/// Once the subset is spent, every remaining valid cell is a candidate.
#[must_use]
pub(crate) fn checkerboard_targets(knowledge: &BoardKnowledge) -> Vec<Coord> {
    let valid = knowledge.valid_targets();
    let parity: Vec<Coord> = valid
        .iter()
        .copied()
        .filter(|c| c.is_even_parity())
        .collect();

    if parity.is_empty() {
        valid
    } else {
        parity
    }
}
