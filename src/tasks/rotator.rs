use crate::config::GridOptions;
use crate::events::{GridCommand, GridSnapshot};
use crate::grid::{RotatingGrid, TickOutcome, rng_from_seed};
use crate::source::{ImageSource, load_universe};
use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::select;
use tokio::sync::{mpsc::Receiver, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Drives the grid: one fetch per session, then one tile per period.
///
/// Rules:
/// - Until the first fetch resolves the published window stays empty.
/// - The timer is only armed for sessions that have something on screen.
/// - `Reload` throws the session away, refetches and arms a fresh timer.
/// - Once cancelled, no further tick runs.
#[instrument(
    skip_all,
    fields(slots = options.slot_count, period = %humantime::format_duration(options.replace_every))
)]
pub async fn run<S: ImageSource + 'static>(
    source: Arc<S>,
    options: GridOptions,
    mut commands: Receiver<GridCommand>,
    snapshots: watch::Sender<GridSnapshot>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut master_rng = rng_from_seed(options.seed);
    let mut commands_open = true;
    let mut session: u64 = 0;

    'sessions: loop {
        session += 1;

        let universe = select! {
            _ = cancel.cancelled() => break 'sessions,
            universe = load_universe(source.as_ref()) => universe,
        };

        let rng = StdRng::from_rng(&mut master_rng);
        let mut grid = RotatingGrid::new(universe, options.slot_count, rng);
        let mut revision: u64 = 0;
        publish(&snapshots, &grid, session, revision, None);
        info!(
            session,
            images = grid.universe_len(),
            visible = grid.window().len(),
            "grid session started"
        );

        let mut timer = if grid.is_active() {
            Some(arm_timer(&options))
        } else {
            info!(session, "nothing to rotate; timer not armed");
            None
        };

        loop {
            select! {
                _ = cancel.cancelled() => break 'sessions,

                cmd = commands.recv(), if commands_open => match cmd {
                    Some(GridCommand::Reload) => {
                        info!(session, "reload requested; disarming timer");
                        continue 'sessions;
                    }
                    None => {
                        // Command producer ended; keep rotating what we have.
                        commands_open = false;
                    }
                },

                _ = next_tick(&mut timer) => match grid.tick() {
                    TickOutcome::Replaced { slot, evicted, inserted, refilled } => {
                        revision += 1;
                        debug!(slot, %evicted, %inserted, refilled, "tile replaced");
                        publish(&snapshots, &grid, session, revision, Some(slot));
                    }
                    TickOutcome::Saturated { slot } => {
                        debug!(slot, "every image already visible; tile kept");
                    }
                    TickOutcome::Idle => {}
                },
            }
        }
    }

    info!("cancel received; exiting rotator task");
    Ok(())
}

fn arm_timer(options: &GridOptions) -> Interval {
    let period = options.replace_every;
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn publish(
    snapshots: &watch::Sender<GridSnapshot>,
    grid: &RotatingGrid<String>,
    session: u64,
    revision: u64,
    last_replaced: Option<usize>,
) {
    snapshots.send_replace(GridSnapshot {
        slots: grid.slot_count(),
        window: grid.window().to_vec(),
        session,
        revision,
        last_replaced,
    });
}
