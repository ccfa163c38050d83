use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::hash::Hash;

/// Number of tiles shown by the grid unless configured otherwise.
pub const DEFAULT_SLOT_COUNT: usize = 9;

/// Visible window, draw pool and round-robin cursor of one grid session.
///
/// Rules:
/// - The window holds `min(slots, universe)` identifiers and never changes length.
/// - The pool is drawn from without replacement and recomputed from
///   "everything not visible" once it runs dry.
/// - Each successful tick replaces exactly one slot; slots are visited in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState<T> {
    window: Vec<T>,
    pool: Vec<T>,
    cursor: u64,
}

/// Result of a single [`GridState::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome<T> {
    /// Nothing to rotate: the universe or the window is empty. The cursor does not move.
    Idle,
    /// Every identifier in the universe is already visible. The cursor still advances.
    Saturated { slot: usize },
    /// `slot` now shows `inserted` instead of `evicted`.
    Replaced {
        slot: usize,
        evicted: T,
        inserted: T,
        /// The pool was exhausted and had to be rebuilt from the universe.
        refilled: bool,
    },
}

impl<T> TickOutcome<T> {
    pub fn replaced_slot(&self) -> Option<usize> {
        match self {
            TickOutcome::Replaced { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}

/// Pick the starting window with a Fisher–Yates shuffle of the universe and
/// leave everything else in the pool (universe order preserved).
pub fn initialize<T, R>(universe: &[T], slot_count: usize, rng: &mut R) -> GridState<T>
where
    T: Clone + Eq + Hash,
    R: Rng,
{
    let mut shuffled = universe.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(slot_count.min(universe.len()));
    let window = shuffled;

    let pool = {
        let visible: HashSet<&T> = window.iter().collect();
        universe
            .iter()
            .filter(|id| !visible.contains(id))
            .cloned()
            .collect()
    };

    GridState {
        window,
        pool,
        cursor: 0,
    }
}

impl<T> GridState<T>
where
    T: Clone + Eq + Hash,
{
    /// Rebuild a state from its parts, e.g. one saved by a caller between ticks.
    pub fn from_parts(window: Vec<T>, pool: Vec<T>, cursor: u64) -> Self {
        Self {
            window,
            pool,
            cursor,
        }
    }

    pub fn window(&self) -> &[T] {
        &self.window
    }

    pub fn pool(&self) -> &[T] {
        &self.pool
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Replace the slot under the cursor with an identifier that is not visible.
    pub fn tick<R>(&mut self, universe: &[T], rng: &mut R) -> TickOutcome<T>
    where
        R: Rng,
    {
        if universe.is_empty() || self.window.is_empty() {
            return TickOutcome::Idle;
        }

        let slot = (self.cursor % self.window.len() as u64) as usize;
        self.cursor += 1;

        let (mut candidates, refilled) = {
            let visible: HashSet<&T> = self.window.iter().collect();
            let not_visible = |id: &&T| !visible.contains(id);
            let from_pool: Vec<T> = self.pool.iter().filter(not_visible).cloned().collect();
            if from_pool.is_empty() {
                let refill: Vec<T> = universe.iter().filter(not_visible).cloned().collect();
                (refill, true)
            } else {
                (from_pool, false)
            }
        };

        if candidates.is_empty() {
            return TickOutcome::Saturated { slot };
        }

        let pick = rng.random_range(0..candidates.len());
        let inserted = candidates.remove(pick);
        let evicted = std::mem::replace(&mut self.window[slot], inserted.clone());
        self.pool = candidates;

        TickOutcome::Replaced {
            slot,
            evicted,
            inserted,
            refilled,
        }
    }
}

/// One grid session: the universe it was built from, its state and its random source.
pub struct RotatingGrid<T, R = StdRng> {
    universe: Vec<T>,
    slot_count: usize,
    state: GridState<T>,
    rng: R,
}

impl<T, R> RotatingGrid<T, R>
where
    T: Clone + Eq + Hash,
    R: Rng,
{
    pub fn new(universe: Vec<T>, slot_count: usize, mut rng: R) -> Self {
        let state = initialize(&universe, slot_count, &mut rng);
        Self {
            universe,
            slot_count,
            state,
            rng,
        }
    }

    /// Identifiers currently on screen, in slot order. Shorter than
    /// [`Self::slot_count`] when the universe is smaller than the grid.
    pub fn window(&self) -> &[T] {
        self.state.window()
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn universe_len(&self) -> usize {
        self.universe.len()
    }

    /// Whether ticking can ever do anything for this session.
    pub fn is_active(&self) -> bool {
        !self.universe.is_empty() && !self.state.window().is_empty()
    }

    pub fn state(&self) -> &GridState<T> {
        &self.state
    }

    pub fn tick(&mut self) -> TickOutcome<T> {
        self.state.tick(&self.universe, &mut self.rng)
    }
}

impl<T> RotatingGrid<T, StdRng>
where
    T: Clone + Eq + Hash,
{
    pub fn seeded(universe: Vec<T>, slot_count: usize, seed: Option<u64>) -> Self {
        Self::new(universe, slot_count, rng_from_seed(seed))
    }
}

pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationStep<T> {
    pub tick: usize,
    pub outcome: TickOutcome<T>,
    pub window: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPlan<T> {
    pub initial: Vec<T>,
    pub steps: Vec<RotationStep<T>>,
}

/// Run a grid synchronously for `ticks` steps and record the window after each one.
pub fn simulate_rotation<T>(
    universe: Vec<T>,
    slot_count: usize,
    ticks: usize,
    seed: Option<u64>,
) -> RotationPlan<T>
where
    T: Clone + Eq + Hash,
{
    let mut grid = RotatingGrid::seeded(universe, slot_count, seed);
    let initial = grid.window().to_vec();

    let mut steps = Vec::with_capacity(ticks);
    for tick in 1..=ticks {
        let outcome = grid.tick();
        steps.push(RotationStep {
            tick,
            outcome,
            window: grid.window().to_vec(),
        });
    }

    RotationPlan { initial, steps }
}
