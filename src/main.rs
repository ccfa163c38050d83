//! Binary entrypoint for the rotating photo grid.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use photo_grid::config::Configuration;
use photo_grid::events::{GridCommand, GridSnapshot};
use photo_grid::grid::{TickOutcome, simulate_rotation};
use photo_grid::source::{ConfiguredSource, load_universe};
use photo_grid::{tasks, web};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

#[derive(Debug, Parser)]
#[command(
    name = "photo-grid",
    version,
    about = "Rotating photo grid: one tile at a time, no duplicates on screen"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Deterministic RNG seed for the initial shuffle and every draw
    #[arg(long = "seed", value_name = "SEED")]
    seed: Option<u64>,
    /// Print the grid after each of N ticks without starting the timer or server
    #[arg(long = "dry-run", value_name = "TICKS")]
    dry_run: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // init tracing (RUST_LOG controls level, default = info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let Args {
        config,
        seed,
        dry_run,
    } = Args::parse();

    let mut cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    if seed.is_some() {
        cfg.grid.seed = seed;
    }
    tracing::info!(
        "Loaded configuration from {}:\n{:#?}",
        config.display(),
        cfg
    );

    let source = Arc::new(ConfiguredSource::from(&cfg.source));

    if let Some(ticks) = dry_run {
        run_dry_run(source.as_ref(), &cfg, ticks).await;
        return Ok(());
    }

    let (command_tx, command_rx) = mpsc::channel::<GridCommand>(8); // Signals -> Rotator
    let (snapshot_tx, snapshot_rx) = watch::channel(GridSnapshot::empty(cfg.grid.slot_count)); // Rotator -> Web

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    #[cfg(unix)]
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = sigterm.recv() => {
                            tracing::info!("SIGTERM received; initiating shutdown");
                            cancel.cancel();
                        }
                    }
                }
                Err(err) => tracing::warn!("failed to register SIGTERM handler: {err}"),
            }
        });
    }

    #[cfg(unix)]
    {
        let cancel = cancel.clone();
        let control = command_tx.clone();
        tokio::spawn(async move {
            match signal(SignalKind::hangup()) {
                Ok(mut sighup) => loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        received = sighup.recv() => {
                            if received.is_none() {
                                break;
                            }
                            tracing::info!("SIGHUP received; reloading images");
                            if let Err(err) = control.send(GridCommand::Reload).await {
                                tracing::warn!("failed to forward reload request: {err}");
                                break;
                            }
                        }
                    }
                },
                Err(err) => tracing::warn!("failed to register SIGHUP handler: {err}"),
            }
        });
    }
    drop(command_tx);

    let mut tasks = JoinSet::new();

    // Rotator
    tasks.spawn({
        let source = Arc::clone(&source);
        let options = cfg.grid.clone();
        let cancel = cancel.clone();
        async move {
            tasks::rotator::run(source, options, command_rx, snapshot_tx, cancel)
                .await
                .context("rotator task failed")
        }
    });

    // Listing + grid endpoints
    if cfg.web.enabled {
        let bind_addr = cfg.web.socket_addr()?;
        tasks.spawn({
            let source = Arc::clone(&source);
            let cancel = cancel.clone();
            async move {
                web::serve(source, snapshot_rx, bind_addr, cancel)
                    .await
                    .context("web task failed")
            }
        });
    } else {
        tracing::info!("web endpoints disabled");
    }

    // Drain JoinSet; any failure takes the rest down with it
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!("task error: {e:?}");
                cancel.cancel();
            }
            Err(e) => {
                tracing::error!("join error: {e}");
                cancel.cancel();
            }
        }
    }

    Ok(())
}

async fn run_dry_run(source: &ConfiguredSource, cfg: &Configuration, ticks: usize) {
    let universe = load_universe(source).await;
    let seed = cfg.grid.seed;

    println!(
        "# grid dry run\n# images: {}\n# slots: {}\n# ticks: {}\n# seed: {}\n",
        universe.len(),
        cfg.grid.slot_count,
        ticks,
        seed.map_or_else(|| "(random)".to_string(), |s| s.to_string())
    );

    if universe.is_empty() {
        println!("(no images available; the grid shows placeholders)");
        return;
    }

    let plan = simulate_rotation(universe, cfg.grid.slot_count, ticks, seed);

    println!("# initial window:");
    for (slot, id) in plan.initial.iter().enumerate() {
        println!("  {:>3}: {}", slot, id);
    }

    println!("\n# rotation:");
    for step in &plan.steps {
        match &step.outcome {
            TickOutcome::Replaced {
                slot,
                evicted,
                inserted,
                refilled,
            } => println!(
                "  {:>4}: slot {:>2} {} -> {}{}",
                step.tick,
                slot,
                evicted,
                inserted,
                if *refilled { " (pool refilled)" } else { "" }
            ),
            TickOutcome::Saturated { slot } => println!(
                "  {:>4}: slot {:>2} kept (every image already visible)",
                step.tick, slot
            ),
            TickOutcome::Idle => println!("  {:>4}: idle", step.tick),
        }
    }
}
