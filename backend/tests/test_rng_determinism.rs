//! Tests for the deterministic random stream
//!
//! Determinism is sacred here: every recorded trace must be reproducible
//! from its parameters and seed alone, so the generator is pinned down to
//! exact outputs, not just statistical behavior.

use traffic_simulator_core_rs::RngManager;

#[test]
fn test_same_seed_same_stream() {
    let mut left = RngManager::new(12345);
    let mut right = RngManager::new(12345);

    for draw in 0..100 {
        assert_eq!(left.next(), right.next(), "streams diverged at draw {}", draw);
    }
}

#[test]
fn test_first_draws_are_pinned() {
    // Golden values for seed 12345; any change to the update or the
    // output multiplier breaks reproducibility of old traces.
    let mut rng = RngManager::new(12345);
    assert_eq!(rng.next(), 10977518812293740004);
    assert_eq!(rng.next(), 13893246733018840292);
    assert_eq!(rng.next(), 1412386850724336324);
    assert_eq!(rng.next(), 13578198927181985541);
}

#[test]
fn test_different_seeds_diverge() {
    let mut left = RngManager::new(12345);
    let mut right = RngManager::new(54321);

    assert_ne!(left.next(), right.next());
}

#[test]
fn test_range_stays_within_bounds() {
    let mut rng = RngManager::new(12345);

    for _ in 0..100 {
        let draw = rng.range(0, 100);
        assert!((0..100).contains(&draw), "draw {} escaped [0, 100)", draw);
    }
}

#[test]
fn test_singleton_range_has_one_outcome() {
    // [5, 6) leaves no room: the draw is consumed but the result is fixed
    let mut rng = RngManager::new(12345);
    assert_eq!(rng.range(5, 6), 5);
}

#[test]
fn test_range_is_deterministic() {
    let mut left = RngManager::new(777);
    let mut right = RngManager::new(777);

    for _ in 0..100 {
        assert_eq!(left.range(0, 3), right.range(0, 3));
    }
}

#[test]
fn test_small_draw_space_is_covered() {
    // A three-sided draw should hit each outcome well before 1000 tries
    let mut rng = RngManager::new(2024);
    let mut seen = [false; 3];
    for _ in 0..1000 {
        seen[rng.range(0, 3) as usize] = true;
    }
    assert_eq!(seen, [true, true, true]);
}
