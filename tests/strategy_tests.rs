//! Tier behavior integration tests.

use std::sync::Arc;

use broadside::board::{BoardKnowledge, ShotOutcome};
use broadside::core::Coord;
use broadside::policy::{UniformPolicy, UntrainedPolicy};
use broadside::strategy::{Difficulty, StrategySelector};
use broadside::model::PlacementModel;
use broadside::placement::{Heatmap, PlacedShip, Placement, PlacementSampler};
use broadside::{EngineRng, Orientation};

fn standard_knowledge() -> BoardKnowledge {
    BoardKnowledge::new(10, &[5, 4, 3, 3, 2])
}

fn selector(difficulty: Difficulty, seed: u64) -> StrategySelector {
    StrategySelector::new(difficulty, difficulty.preset().with_seed(seed))
}

// =============================================================================
// Easy
// =============================================================================

#[test]
fn test_easy_fresh_board_seeded_equality() {
    let knowledge = standard_knowledge();

    let mut a = selector(Difficulty::Easy, 42);
    let mut b = selector(Difficulty::Easy, 42);

    let coord_a = a.decide(&knowledge).unwrap();
    let coord_b = b.decide(&knowledge).unwrap();

    assert_eq!(coord_a, coord_b);
    assert!(knowledge.is_valid_target(coord_a));
}

#[test]
fn test_easy_never_repeats_resolved_cells() {
    let mut knowledge = standard_knowledge();
    let mut s = selector(Difficulty::Easy, 8);

    for _ in 0..60 {
        let coord = s.decide(&knowledge).unwrap();
        assert!(knowledge.is_valid_target(coord), "chose resolved {coord}");
        knowledge.record_result(coord, ShotOutcome::Miss).unwrap();
    }
}

// =============================================================================
// Medium: hunt/target state machine
// =============================================================================

#[test]
fn test_medium_hunts_parity_until_first_hit() {
    let mut knowledge = standard_knowledge();
    let mut s = selector(Difficulty::Medium, 13);

    for _ in 0..15 {
        let coord = s.decide(&knowledge).unwrap();
        assert!(
            coord.is_even_parity(),
            "hunt-mode shot off the checkerboard: {coord}"
        );
        knowledge.record_result(coord, ShotOutcome::Miss).unwrap();
    }
}

#[test]
fn test_medium_switches_to_target_mode_on_hit() {
    let mut knowledge = standard_knowledge();
    let mut s = selector(Difficulty::Medium, 13);

    // A few hunting misses first
    for _ in 0..5 {
        let coord = s.decide(&knowledge).unwrap();
        knowledge.record_result(coord, ShotOutcome::Miss).unwrap();
    }

    // Land a hit somewhere untouched
    let hit = knowledge
        .valid_targets()
        .into_iter()
        .find(|c| c.row > 0 && c.row < 9 && c.col > 0 && c.col < 9)
        .unwrap();
    knowledge.record_result(hit, ShotOutcome::Hit).unwrap();

    // Every subsequent shot must neighbor some unresolved hit until the
    // ship is reported sunk.
    let next = s.decide(&knowledge).unwrap();
    let neighbors: Vec<Coord> = hit.neighbors(10).collect();
    assert!(
        neighbors.contains(&next),
        "target-mode shot {next} does not neighbor the hit {hit}"
    );
}

#[test]
fn test_medium_full_sink_cycle() {
    // Walk the state machine through hunt -> target -> sunk -> hunt against
    // a scripted destroyer at (6,4)-(6,5).
    let mut knowledge = standard_knowledge();
    let mut s = selector(Difficulty::Medium, 4);
    let destroyer = [Coord::new(6, 4), Coord::new(6, 5)];

    knowledge
        .record_result(Coord::new(6, 4), ShotOutcome::Hit)
        .unwrap();

    // Probe until the second half is found, scoring misses for wrong probes.
    let mut sunk = false;
    for _ in 0..4 {
        let coord = s.decide(&knowledge).unwrap();
        let neighbors: Vec<Coord> = Coord::new(6, 4).neighbors(10).collect();
        assert!(neighbors.contains(&coord));

        if destroyer.contains(&coord) {
            knowledge.record_result(coord, ShotOutcome::Sunk(2)).unwrap();
            sunk = true;
            break;
        }
        knowledge.record_result(coord, ShotOutcome::Miss).unwrap();
    }
    assert!(sunk, "probing never found the destroyer");

    // Back to hunting on the checkerboard.
    let coord = s.decide(&knowledge).unwrap();
    assert!(coord.is_even_parity());
    assert!(knowledge.is_valid_target(coord));
}

// =============================================================================
// Hard: biased heatmap hunting
// =============================================================================

#[test]
fn test_hard_prefers_modeled_region_when_hunting() {
    // A model trained exclusively on top-left horizontal fleets should pull
    // the first hunting shot into that region.
    let mut model = PlacementModel::new();
    for _ in 0..200 {
        let fleet = Placement::new(vec![
            PlacedShip::new(5, Coord::new(0, 0), Orientation::Horizontal),
            PlacedShip::new(4, Coord::new(1, 0), Orientation::Horizontal),
            PlacedShip::new(3, Coord::new(2, 0), Orientation::Horizontal),
            PlacedShip::new(3, Coord::new(3, 0), Orientation::Horizontal),
            PlacedShip::new(2, Coord::new(0, 6), Orientation::Horizontal),
        ]);
        model.record_fleet(&fleet, 10);
    }

    let knowledge = standard_knowledge();
    let config = Difficulty::Hard
        .preset()
        .with_seed(31)
        .with_bias_strength(1.0);
    let mut s = StrategySelector::new(Difficulty::Hard, config).with_model(model.shared());

    let coord = s.decide(&knowledge).unwrap();
    assert!(
        coord.row <= 4,
        "hunting shot {coord} ignored the model's top-heavy prior"
    );
}

#[test]
fn test_hard_without_model_still_decides() {
    let knowledge = standard_knowledge();
    let mut s = selector(Difficulty::Hard, 17);

    let coord = s.decide(&knowledge).unwrap();
    assert!(knowledge.is_valid_target(coord));
}

// =============================================================================
// Expert / Master / Nightmare
// =============================================================================

#[test]
fn test_expert_and_nightmare_return_valid_targets() {
    let knowledge = standard_knowledge();

    for (difficulty, seed) in [(Difficulty::Expert, 5), (Difficulty::Nightmare, 5)] {
        let mut s = selector(difficulty, seed);
        let coord = s.decide(&knowledge).unwrap();
        assert!(knowledge.is_valid_target(coord), "{difficulty} chose {coord}");
    }
}

#[test]
fn test_master_fallback_is_expert_exactly() {
    let knowledge = standard_knowledge();

    let mut bare = selector(Difficulty::Master, 77);
    let mut unready = selector(Difficulty::Master, 77).with_policy(Arc::new(UntrainedPolicy));
    let mut expert = selector(Difficulty::Expert, 77);

    let expected = expert.decide(&knowledge).unwrap();
    assert_eq!(bare.decide(&knowledge).unwrap(), expected);
    assert_eq!(unready.decide(&knowledge).unwrap(), expected);
}

#[test]
fn test_master_with_policy_bypasses_search() {
    let knowledge = standard_knowledge();

    let mut s = selector(Difficulty::Master, 77).with_policy(Arc::new(UniformPolicy));
    let coord = s.decide(&knowledge).unwrap();

    // Uniform scores leave the deterministic preference in charge.
    assert_eq!(coord, Coord::new(0, 0));
}

// =============================================================================
// Standalone heatmap query (hint path)
// =============================================================================

#[test]
fn test_heatmap_standalone_query() {
    // The rendering layer can request a heatmap without going through any
    // tier, e.g. for hints about the remote opponent's board.
    let mut knowledge = standard_knowledge();
    knowledge
        .record_result(Coord::new(0, 0), ShotOutcome::Miss)
        .unwrap();

    let sampler = PlacementSampler::new(32, 48, 0.0);
    let mut rng = EngineRng::new(2);
    let placements = sampler.sample(&knowledge, 64, None, &mut rng).unwrap();

    let heat = Heatmap::build(10, &placements);
    assert_eq!(heat.probability(Coord::new(0, 0)), 0.0);
    let best = heat.best_cell(&knowledge).unwrap();
    assert!(knowledge.is_valid_target(best));
}
