use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "loadwatch",
    about = "Simulated data-center monitoring and load-redirection dashboard"
)]
pub struct Config {
    /// Number of primary nodes
    #[arg(long, default_value_t = 8)]
    pub primaries: usize,

    /// Number of backup nodes
    #[arg(long, default_value_t = 2)]
    pub backups: usize,

    /// Load score above which a node counts as overloaded
    #[arg(long, default_value_t = 70.0)]
    pub threshold: f64,

    /// Milliseconds between metric updates on each node
    #[arg(long, default_value_t = 1000)]
    pub tick_ms: u64,

    /// Seed for the metric generators; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log file; the terminal itself belongs to the dashboard
    #[arg(long, default_value = "loadwatch.log")]
    pub log_file: PathBuf,
}

impl Config {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
