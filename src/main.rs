//! vscrub command-line entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vscrub::link::ShareState;
use vscrub::settings::Settings;
use vscrub::shell::Shell;
use vscrub::video::extract_video_id;

mod ui;

#[derive(Parser)]
#[command(name = "vscrub", version, about = "Frame-accurate video scrub control")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive scrub console against a synthetic timeline
    Console {
        /// Timeline length in seconds
        #[arg(long, default_value_t = 600.0)]
        duration: f64,
        /// Deep link (query string or full URL) to restore state from
        #[arg(long)]
        link: Option<String>,
        /// Settings file override
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Resolve a pasted link to its video identifier
    Resolve {
        /// Watch, share, shorts, or embed link (or a bare identifier)
        reference: String,
    },
    /// Build a shareable query string for a video reference
    Link {
        reference: String,
        /// Start position in seconds
        #[arg(long)]
        time: Option<f64>,
        #[arg(long)]
        speed: Option<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command.unwrap_or(Command::Console {
        duration: 600.0,
        link: None,
        settings: None,
    }) {
        Command::Console {
            duration,
            link,
            settings,
        } => run_console(duration, link, settings),
        Command::Resolve { reference } => {
            let id = extract_video_id(&reference)
                .ok_or_else(|| anyhow::anyhow!("no video found in {reference:?}"))?;
            println!("{}", id.watch_url());
            Ok(())
        }
        Command::Link {
            reference,
            time,
            speed,
        } => {
            let id = extract_video_id(&reference)
                .ok_or_else(|| anyhow::anyhow!("no video found in {reference:?}"))?;
            let state = ShareState {
                video_id: Some(id),
                time,
                speed,
                ..Default::default()
            };
            println!("?{}", state.build_query());
            Ok(())
        }
    }
}

fn run_console(duration: f64, link: Option<String>, settings_path: Option<PathBuf>) -> Result<()> {
    let settings = match &settings_path {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let mut shell = Shell::new(settings);
    if let Some(path) = settings_path {
        shell = shell.with_store(path);
    }
    if let Some(link) = &link {
        shell.apply_share_state(&ShareState::parse_query(query_of(link)));
    }
    ui::ConsoleApp::new(shell, duration).run()
}

/// Accept either a bare query string or a full URL carrying one.
fn query_of(link: &str) -> &str {
    link.split_once('?').map_or(link, |(_, query)| query)
}
