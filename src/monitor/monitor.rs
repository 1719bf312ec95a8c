use crate::cluster::node::{NodeId, Role};
use crate::cluster::registry::Registry;
use crate::config::Config;
use crate::error::Error;
use crate::monitor::redirect::redirect;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::warn;

const BACKOFF_TICKS: u32 = 5;
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// One per node: synthesizes a fresh reading each tick, commits it under the
/// node's lock and, for an overloaded primary, triggers a redirection.
pub struct NodeMonitor {
    id: NodeId,
    role: Role,
    registry: Arc<Registry>,
    shutdown: Arc<AtomicBool>,
    threshold: f64,
    tick: Duration,
    rng: StdRng,
}

impl NodeMonitor {
    pub fn new(
        id: NodeId,
        role: Role,
        registry: Arc<Registry>,
        shutdown: Arc<AtomicBool>,
        threshold: f64,
        tick: Duration,
        seed: u64,
    ) -> Self {
        Self {
            id,
            role,
            registry,
            shutdown,
            threshold,
            tick,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn run(mut self) {
        while !self.shutdown.load(Ordering::Relaxed) {
            let pause = match self.step() {
                Ok(()) => self.tick,
                Err(err) => {
                    warn!(node = self.id.index(), %err, "monitor iteration failed");
                    self.tick * BACKOFF_TICKS
                }
            };
            self.idle(pause);
        }
    }

    fn step(&mut self) -> Result<(), Error> {
        let now = epoch_seconds();
        let threshold = self.threshold;
        let role = self.role;
        let rng = &mut self.rng;

        let load = self.registry.update(self.id, |state| {
            let cpu = (state.cpu() + rng.gen_range(-15..=20) as f64).clamp(10.0, 100.0);
            let memory = (state.memory() + rng.gen_range(-10..=15) as f64).clamp(30.0, 90.0);
            let temperature = 25.0 + 0.3 * cpu + rng.gen_range(-3..=5) as f64;
            state.observe(role, now, cpu, memory, temperature, threshold)
        })?;

        if role == Role::Primary && load > threshold {
            redirect(&self.registry, self.id, load - threshold)?;
        }
        Ok(())
    }

    // Sliced sleep so a shutdown lands within one tick.
    fn idle(&self, total: Duration) {
        let deadline = Instant::now() + total;
        while !self.shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

/// Spawns one named monitor thread per registered node. Each thread gets its
/// own rng stream derived from the run seed, so a seeded run is reproducible.
pub fn spawn_monitors(
    registry: &Arc<Registry>,
    config: &Config,
    shutdown: &Arc<AtomicBool>,
    seed: u64,
) -> io::Result<Vec<JoinHandle<()>>> {
    registry
        .nodes()
        .iter()
        .map(|node| {
            let monitor = NodeMonitor::new(
                node.id(),
                node.role(),
                Arc::clone(registry),
                Arc::clone(shutdown),
                config.threshold,
                config.tick(),
                seed.wrapping_add(node.id().index() as u64 + 1),
            );
            thread::Builder::new()
                .name(format!("monitor-{}", node.name()))
                .spawn(move || monitor.run())
        })
        .collect()
}

fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
