//! Load simulator for keyed candidate pools.
//!
//! Spawns worker threads that block on a random group until a candidate is
//! free, then report success, a throttle (hold) or a hard failure. A sweeper
//! thread plays the part of an external health checker and clears failures.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use dashmap::DashMap;
use rand::Rng;

use rotating_pool::config::{load_config, GroupConfig, HoldConfig, RegistryConfig};
use rotating_pool::observability::{logging, metrics};
use rotating_pool::PoolRegistry;

#[derive(Parser)]
#[command(name = "rotating-pool")]
#[command(about = "Simulate traffic against keyed candidate pools", long_about = None)]
struct Cli {
    /// TOML registry configuration. A small demo setup is used if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Concurrent workers.
    #[arg(short, long, default_value_t = 8)]
    workers: usize,

    /// Selections per worker.
    #[arg(short, long, default_value_t = 500)]
    iterations: usize,

    /// Probability that a selection ends in a sticky failure.
    #[arg(long, default_value_t = 0.02)]
    failure_rate: f64,

    /// Probability that a selection ends in a hold.
    #[arg(long, default_value_t = 0.10)]
    throttle_rate: f64,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    metrics_address: Option<SocketAddr>,
}

#[derive(Default)]
struct Counters {
    successes: AtomicU64,
    holds: AtomicU64,
    failures: AtomicU64,
}

fn demo_config() -> RegistryConfig {
    RegistryConfig {
        poll_interval_ms: 5,
        hold: HoldConfig {
            base_ms: 10,
            max_ms: 200,
        },
        groups: vec![
            GroupConfig {
                key: String::new(),
                members: vec!["key-a".into(), "key-b".into(), "key-c".into()],
            },
            GroupConfig {
                key: "backup".into(),
                members: vec!["key-x".into(), "key-y".into()],
            },
        ],
        ..RegistryConfig::default()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => demo_config(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("rotating-pool v0.1.0 starting");

    let metrics_address = match cli.metrics_address {
        Some(addr) => Some(addr),
        None if config.observability.metrics_enabled => Some(config.observability.metrics_address.parse()?),
        None => None,
    };
    if let Some(addr) = metrics_address {
        metrics::init_metrics(addr)?;
    }

    let registry = Arc::new(PoolRegistry::from_config(&config));
    // The empty key exercises the default-group alias.
    let mut keys = registry.keys();
    keys.push(String::new());
    let keys = Arc::new(keys);

    tracing::info!(
        workers = cli.workers,
        iterations = cli.iterations,
        groups = registry.len(),
        "Simulation starting"
    );

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let sweeper = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || sweep_failures(&registry, shutdown_rx))
    };

    let counters = Arc::new(Counters::default());
    let throttles: Arc<DashMap<String, u32>> = Arc::new(DashMap::new());
    let started = Instant::now();

    let mut workers = Vec::with_capacity(cli.workers);
    for _ in 0..cli.workers {
        let registry = Arc::clone(&registry);
        let keys = Arc::clone(&keys);
        let counters = Arc::clone(&counters);
        let throttles = Arc::clone(&throttles);
        let hold = config.hold.clone();
        let poll = config.poll_interval();
        let iterations = cli.iterations;
        let (failure_rate, throttle_rate) = (cli.failure_rate, cli.throttle_rate);

        workers.push(thread::spawn(move || {
            let mut rng = rand::thread_rng();
            for _ in 0..iterations {
                let key = &keys[rng.gen_range(0..keys.len())];
                let Some(candidate) = registry.must_get(key, poll) else {
                    tracing::warn!(group = %key, "Group has no candidates");
                    continue;
                };

                let roll: f64 = rng.gen();
                let value = candidate.value();
                if roll < failure_rate {
                    candidate.mark_as_failure();
                    counters.failures.fetch_add(1, Ordering::Relaxed);
                } else if roll < failure_rate + throttle_rate {
                    let attempt = {
                        let mut entry = throttles.entry(value.clone()).or_insert(0);
                        *entry += 1;
                        *entry
                    };
                    candidate.mark_as_hold(hold.duration_for(attempt));
                    counters.holds.fetch_add(1, Ordering::Relaxed);
                } else {
                    throttles.remove(value);
                    counters.successes.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }

    for worker in workers {
        worker.join().map_err(|_| "worker thread panicked")?;
    }
    drop(shutdown_tx);
    sweeper.join().map_err(|_| "sweeper thread panicked")?;

    let report = serde_json::json!({
        "elapsed_ms": started.elapsed().as_millis() as u64,
        "successes": counters.successes.load(Ordering::Relaxed),
        "holds": counters.holds.load(Ordering::Relaxed),
        "failures": counters.failures.load(Ordering::Relaxed),
        "pools": registry.stats(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!("Simulation complete");
    Ok(())
}

/// Clear sticky failures every 50ms until the shutdown sender is dropped.
fn sweep_failures(registry: &PoolRegistry<String>, shutdown: Receiver<()>) {
    while let Err(RecvTimeoutError::Timeout) = shutdown.recv_timeout(Duration::from_millis(50)) {
        for key in registry.keys() {
            let Some(pool) = registry.pool(&key) else { continue };
            for candidate in pool.candidates().iter().filter(|c| c.is_failed()) {
                tracing::debug!(group = %key, value = %candidate.value(), "Recovering failed candidate");
                candidate.mark_as_available();
            }
        }
    }
    tracing::debug!("Failure sweeper received shutdown signal, exiting loop");
}
