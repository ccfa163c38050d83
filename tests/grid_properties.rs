use photo_grid::grid::{
    GridState, RotatingGrid, TickOutcome, initialize, simulate_rotation,
};
use rand::{SeedableRng, rngs::StdRng};
use std::collections::HashSet;

fn universe(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("/content/img/{i:02}.jpg")).collect()
}

fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn assert_distinct(window: &[String]) {
    let unique: HashSet<&String> = window.iter().collect();
    assert_eq!(unique.len(), window.len(), "duplicate tile in {window:?}");
}

#[test]
fn window_never_shows_duplicates() {
    for seed in 0..16 {
        let all = universe(14);
        let mut grid = RotatingGrid::new(all.clone(), 9, StdRng::seed_from_u64(seed));
        assert_distinct(grid.window());
        for _ in 0..500 {
            grid.tick();
            assert_distinct(grid.window());
        }
    }
}

#[test]
fn window_size_is_min_of_slots_and_universe() {
    for (images, slots) in [(0, 9), (1, 9), (5, 9), (9, 9), (20, 9), (4, 0), (12, 3)] {
        let mut grid = RotatingGrid::new(universe(images), slots, StdRng::seed_from_u64(7));
        let expected = images.min(slots);
        assert_eq!(grid.window().len(), expected, "{images} images / {slots} slots");
        for _ in 0..50 {
            grid.tick();
            assert_eq!(grid.window().len(), expected);
        }
    }
}

#[test]
fn a_tick_changes_at_most_one_slot() {
    let mut grid = RotatingGrid::new(universe(11), 9, StdRng::seed_from_u64(42));
    for _ in 0..300 {
        let before = grid.window().to_vec();
        let outcome = grid.tick();
        let after = grid.window();
        let changed: Vec<usize> = (0..before.len()).filter(|&i| before[i] != after[i]).collect();
        match outcome {
            TickOutcome::Replaced {
                slot,
                ref evicted,
                ref inserted,
                ..
            } => {
                assert_eq!(changed, vec![slot]);
                assert_eq!(&before[slot], evicted);
                assert_eq!(&after[slot], inserted);
                assert!(!before.contains(inserted), "inserted tile was already visible");
            }
            _ => assert!(changed.is_empty()),
        }
    }
}

#[test]
fn slots_are_visited_round_robin() {
    let slots = 9;
    let rounds = 6;
    let mut grid = RotatingGrid::new(universe(30), slots, StdRng::seed_from_u64(5));
    let mut hits = vec![0usize; slots];
    let mut order = Vec::new();
    for _ in 0..rounds * slots {
        let slot = grid
            .tick()
            .replaced_slot()
            .expect("enough images to never starve");
        hits[slot] += 1;
        order.push(slot);
    }
    assert!(hits.iter().all(|&h| h == rounds), "uneven hits: {hits:?}");
    let expected: Vec<usize> = (0..rounds * slots).map(|i| i % slots).collect();
    assert_eq!(order, expected);
}

#[test]
fn saturated_grid_never_changes() {
    let all = universe(9);
    let mut grid = RotatingGrid::new(all.clone(), 9, StdRng::seed_from_u64(9));
    let initial = grid.window().to_vec();
    for i in 0..40 {
        assert_eq!(grid.tick(), TickOutcome::Saturated { slot: i % 9 });
        assert_eq!(grid.window(), initial.as_slice());
    }
    let shown: HashSet<&String> = initial.iter().collect();
    assert_eq!(shown, all.iter().collect());
}

#[test]
fn four_images_three_slots() {
    let all = ids(&["A", "B", "C", "D"]);
    let mut rng = StdRng::seed_from_u64(11);
    let mut state = initialize(&all, 3, &mut rng);

    assert_eq!(state.window().len(), 3);
    assert_distinct(state.window());
    assert_eq!(state.pool().len(), 1);
    assert!(!state.window().contains(&state.pool()[0]));

    let before = state.window().to_vec();
    let leftover = state.pool()[0].clone();
    let outcome = state.tick(&all, &mut rng);

    assert_eq!(
        outcome,
        TickOutcome::Replaced {
            slot: 0,
            evicted: before[0].clone(),
            inserted: leftover.clone(),
            refilled: false,
        }
    );
    assert_eq!(state.window()[0], leftover);
    assert_eq!(&state.window()[1..], &before[1..]);
    assert_distinct(state.window());
    assert!(state.window().iter().all(|id| all.contains(id)));
    assert!(state.pool().is_empty());

    // Second tick has to refill from whatever is not on screen: only the evicted tile.
    let outcome = state.tick(&all, &mut rng);
    assert_eq!(
        outcome,
        TickOutcome::Replaced {
            slot: 1,
            evicted: before[1].clone(),
            inserted: before[0].clone(),
            refilled: true,
        }
    );
    assert_distinct(state.window());
}

#[test]
fn empty_universe_stays_empty() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut state: GridState<String> = initialize(&[], 9, &mut rng);
    assert!(state.window().is_empty());
    assert!(state.pool().is_empty());
    for _ in 0..10 {
        assert_eq!(state.tick(&[], &mut rng), TickOutcome::Idle);
        assert!(state.window().is_empty());
    }
    assert_eq!(state.cursor(), 0);
}

#[test]
fn single_image_is_a_permanent_no_op() {
    let all = ids(&["A"]);
    let mut grid = RotatingGrid::new(all.clone(), 9, StdRng::seed_from_u64(3));
    assert_eq!(grid.window(), all.as_slice());
    assert!(grid.is_active());
    for _ in 0..10 {
        assert_eq!(grid.tick(), TickOutcome::Saturated { slot: 0 });
        assert_eq!(grid.window(), all.as_slice());
    }
}

#[test]
fn zero_slots_never_rotate() {
    let mut grid = RotatingGrid::new(universe(5), 0, StdRng::seed_from_u64(3));
    assert!(grid.window().is_empty());
    assert!(!grid.is_active());
    assert_eq!(grid.tick(), TickOutcome::Idle);
}

#[test]
fn pool_and_window_stay_inside_universe() {
    let all = universe(13);
    let mut rng = StdRng::seed_from_u64(21);
    let mut state = initialize(&all, 9, &mut rng);
    for _ in 0..200 {
        state.tick(&all, &mut rng);
        assert!(state.window().iter().all(|id| all.contains(id)));
        assert!(state.pool().iter().all(|id| all.contains(id)));
        assert!(state.pool().iter().all(|id| !state.window().contains(id)));
    }
}

#[test]
fn every_image_shows_up_before_the_pool_refills() {
    let all = universe(18);
    let mut rng = StdRng::seed_from_u64(8);
    let mut state = initialize(&all, 9, &mut rng);
    let mut seen: HashSet<String> = state.window().iter().cloned().collect();
    // Nine hidden images are drawn without replacement before any refill.
    for _ in 0..9 {
        match state.tick(&all, &mut rng) {
            TickOutcome::Replaced {
                inserted, refilled, ..
            } => {
                assert!(!refilled);
                assert!(seen.insert(inserted), "image drawn twice before refill");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!(seen.len(), all.len());
    match state.tick(&all, &mut rng) {
        TickOutcome::Replaced { refilled, .. } => assert!(refilled),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let a = simulate_rotation(universe(20), 9, 100, Some(1234));
    let b = simulate_rotation(universe(20), 9, 100, Some(1234));
    assert_eq!(a, b);
    assert_eq!(a.steps.len(), 100);
    assert_eq!(a.steps.last().unwrap().window.len(), 9);
}
