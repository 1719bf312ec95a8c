use crate::cluster::registry::Registry;
use crate::config::Config;
use crate::monitor::monitor::spawn_monitors;
use crate::tui::app::App;
use crate::tui::draw::draw_app;
use anyhow::Context;
use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cluster;
mod config;
mod error;
mod forecast;
mod monitor;
mod state;
mod tui;

const EVENT_POLL: Duration = Duration::from_millis(250);

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_logging(&config.log_file)?;

    let seed = config.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        primaries = config.primaries,
        backups = config.backups,
        threshold = config.threshold,
        "starting cluster simulation"
    );

    let registry = Arc::new(Registry::build(config.primaries, config.backups, seed));
    let shutdown = Arc::new(AtomicBool::new(false));
    let monitors = spawn_monitors(&registry, &config, &shutdown, seed)
        .context("failed to spawn monitor threads")?;

    let mut terminal = ratatui::try_init().context("failed to initialize the terminal")?;
    let app = App::new(Arc::clone(&registry), &config);
    let result = run(&mut terminal, &app);

    shutdown.store(true, Ordering::Relaxed);
    drop(app); // restores the terminal
    for handle in monitors {
        let _ = handle.join();
    }
    info!("cluster simulation stopped");
    result.map_err(Into::into)
}

fn run(terminal: &mut DefaultTerminal, app: &App) -> io::Result<()> {
    loop {
        let _ = terminal.draw(|frame| draw_app(frame, app));

        if crossterm::event::poll(EVENT_POLL)? {
            match crossterm::event::read()? {
                Event::Key(key)
                    if key.kind == KeyEventKind::Press
                        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) =>
                {
                    break;
                }
                _ => continue,
            }
        }
    }
    Ok(())
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
