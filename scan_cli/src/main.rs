//! `switchscan`: a two-switch scanning keyboard driven from the terminal.
//!
//! The switches are virtual: each input line is a switch gesture
//! (`tap scan`, `hold select 1200`, `wait 600`, ...) applied on a virtual
//! clock, so a script replays identically every time.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use scan_core::Announcer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod config;
mod console;
mod keyboard;
mod script;

use app::App;
use config::AppConfig;
use console::ConsoleSpeech;

#[derive(Parser)]
#[command(name = "switchscan")]
#[command(about = "Two-switch scanning keyboard with word prediction", long_about = None)]
struct Cli {
    /// TOML file with [scan], [prediction] and [store] tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// N-gram store file (overrides [store].path)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Remote word predictor URL (overrides [prediction.remote].url)
    #[arg(long)]
    remote: Option<String>,

    /// Read switch commands from a file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = AppConfig::load(cli.config.as_deref())?
        .store_path(cli.store)
        .remote_url(cli.remote);
    let announcer = Announcer::spawn(ConsoleSpeech).context("starting announcer")?;
    let mut app = App::new(config, announcer)?;

    // Not locked for the whole run: the announcer thread prints too.
    let mut out = io::stdout();
    app.start(&mut out)?;
    match cli.script {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("opening script {}", path.display()))?;
            app.run(BufReader::new(file), &mut out, false)
        }
        None => {
            writeln!(out, "{}", script::HELP)?;
            app.run(io::stdin().lock(), &mut out, true)
        }
    }
}

/// Logs go to stderr; stdout carries the focus transcript. `RUST_LOG` wins
/// over `--verbose`.
fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "switchscan={level},scan_core={level},scan_ngram={level},scan_predict={level}"
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(verbose > 0),
        )
        .try_init()?;
    Ok(())
}
