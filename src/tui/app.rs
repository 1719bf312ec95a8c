use crate::cluster::registry::Registry;
use crate::config::Config;
use std::sync::Arc;
use std::time::Instant;

pub struct App {
    registry: Arc<Registry>,
    threshold: f64,
    primaries: usize,
    backups: usize,
    started: Instant,
}

impl App {
    pub fn new(registry: Arc<Registry>, config: &Config) -> Self {
        Self {
            registry,
            threshold: config.threshold,
            primaries: config.primaries,
            backups: config.backups,
            started: Instant::now(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn primaries(&self) -> usize {
        self.primaries
    }

    pub fn backups(&self) -> usize {
        self.backups
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        ratatui::restore();
    }
}
