//! Placement sampler property tests.

use proptest::prelude::*;
use rustc_hash::FxHashSet;

use broadside::board::{BoardKnowledge, CellState, ShotOutcome};
use broadside::core::{Coord, EngineRng};
use broadside::model::PlacementModel;
use broadside::placement::{PlacedShip, Placement, PlacementSampler};
use broadside::Orientation;

fn assert_placement_consistent(placement: &Placement, knowledge: &BoardKnowledge) {
    let size = knowledge.size();
    let mut seen: FxHashSet<Coord> = FxHashSet::default();

    for ship in placement.ships() {
        assert!(ship.in_bounds(size), "ship out of bounds: {ship:?}");
        for cell in ship.cells() {
            assert!(seen.insert(cell), "ships overlap at {cell}");
            assert_ne!(
                knowledge.cell(cell),
                CellState::Miss,
                "ship placed on a miss at {cell}"
            );
            assert_ne!(
                knowledge.cell(cell),
                CellState::SunkPart,
                "ship placed on a sunk cell at {cell}"
            );
        }
    }

    for hit in knowledge.unresolved_hits() {
        assert!(seen.contains(&hit), "unresolved hit {hit} left uncovered");
    }
}

proptest! {
    #[test]
    fn sampled_placements_satisfy_invariants(
        seed in any::<u64>(),
        misses in prop::collection::hash_set((0u8..10, 0u8..10), 0..25),
    ) {
        let mut knowledge = BoardKnowledge::new(10, &[5, 4, 3, 3, 2]);
        for &(row, col) in &misses {
            knowledge
                .record_result(Coord::new(row, col), ShotOutcome::Miss)
                .unwrap();
        }

        let sampler = PlacementSampler::new(32, 48, 0.0);
        let mut rng = EngineRng::new(seed);

        // Exhaustion is a legal outcome; invariants must hold whenever
        // anything is produced.
        if let Ok(placements) = sampler.sample(&knowledge, 8, None, &mut rng) {
            prop_assert!(!placements.is_empty());
            for placement in &placements {
                assert_placement_consistent(placement, &knowledge);
                prop_assert_eq!(placement.cell_count(), 17);
            }
        }
    }

    #[test]
    fn biased_sampling_satisfies_invariants(seed in any::<u64>()) {
        let mut model = PlacementModel::new();
        // A model that has only ever seen top-left horizontal fleets.
        for _ in 0..25 {
            let fleet = Placement::new(smallvec::smallvec![
                PlacedShip::new(5, Coord::new(0, 0), Orientation::Horizontal),
                PlacedShip::new(4, Coord::new(1, 0), Orientation::Horizontal),
                PlacedShip::new(3, Coord::new(2, 0), Orientation::Horizontal),
            ]);
            model.record_fleet(&fleet, 10);
        }

        let knowledge = BoardKnowledge::new(10, &[5, 4, 3, 3, 2]);
        let sampler = PlacementSampler::new(32, 48, 0.9);
        let mut rng = EngineRng::new(seed);

        let placements = sampler.sample(&knowledge, 8, Some(&model), &mut rng).unwrap();
        for placement in &placements {
            assert_placement_consistent(placement, &knowledge);
        }
    }

    #[test]
    fn hits_are_always_covered(seed in any::<u64>(), row in 1u8..9, col in 1u8..9) {
        let mut knowledge = BoardKnowledge::new(10, &[5, 4, 3, 3, 2]);
        knowledge
            .record_result(Coord::new(row, col), ShotOutcome::Hit)
            .unwrap();

        let sampler = PlacementSampler::new(32, 48, 0.0);
        let mut rng = EngineRng::new(seed);

        let placements = sampler.sample(&knowledge, 4, None, &mut rng).unwrap();
        for placement in &placements {
            prop_assert!(placement.covers(Coord::new(row, col)));
        }
    }
}

#[test]
fn biased_sampling_skews_toward_observed_buckets() {
    // With a strongly biased model trained on top-left horizontal carriers,
    // the carrier should start in the top-left bucket more often than the
    // uniform rate.
    let mut model = PlacementModel::new();
    for _ in 0..100 {
        let fleet = Placement::new(smallvec::smallvec![PlacedShip::new(
            5,
            Coord::new(0, 0),
            Orientation::Horizontal
        )]);
        model.record_fleet(&fleet, 10);
    }

    let knowledge = BoardKnowledge::new(10, &[5]);
    let sampler = PlacementSampler::new(32, 48, 1.0);
    let mut rng = EngineRng::new(4242);

    let placements = sampler.sample(&knowledge, 200, Some(&model), &mut rng).unwrap();
    let in_bucket = placements
        .iter()
        .filter(|p| {
            let ship = &p.ships()[0];
            ship.orientation == Orientation::Horizontal && ship.start.row <= 3 && ship.start.col <= 3
        })
        .count();

    // Uniform rate for that bucket is well under a quarter of all carrier
    // positions; the biased rate should clear a third comfortably.
    assert!(
        in_bucket * 3 > placements.len(),
        "only {in_bucket}/{} samples landed in the observed bucket",
        placements.len()
    );
}
