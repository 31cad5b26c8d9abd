// SPDX-License-Identifier: MIT
//
// termframe — play a pixel-frame engine in the terminal.
//
// This binary wires the presentation layer to an engine:
//
//   tf-term → terminal control, glyph rendering, key decoding, session loop
//   demo    → the built-in plasma engine
//
// Each tick flows through:
//
//   stdin → reader thread → decoder → synthesizer → engine.tick
//   engine frame → scale → glyph encode → stdout
//
// Logging goes to a file, never the terminal: stdout *is* the display.
// Set RUST_LOG to change the filter (default `info`).

mod demo;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use tf_term::session::{Session, SessionConfig};

use crate::demo::{DemoOptions, Plasma};

// ─── Command line ───────────────────────────────────────────────────────────

/// Render a frame-based engine as colored ASCII in the terminal.
#[derive(Debug, Parser)]
#[command(name = "termframe", version, about)]
struct Cli {
    /// Window title.
    #[arg(long, default_value = "termframe")]
    title: String,

    /// Engine ticks per second.
    #[arg(long, default_value_t = 35, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Milliseconds a key stays down after its last press.
    #[arg(long = "dwell-ms", default_value_t = 60)]
    dwell_ms: u64,

    /// Log file path.
    #[arg(long, env = "TERMFRAME_LOG_FILE", default_value = "/tmp/termframe.log")]
    log_file: PathBuf,

    /// Arguments passed through to the engine.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ENGINE_ARGS")]
    engine_args: Vec<String>,
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            tick_interval: SessionConfig::interval_for_hz(self.fps),
            dwell: Duration::from_millis(self.dwell_ms),
            title: Some(self.title.clone()),
        }
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

fn init_logging(path: &Path) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .try_init()
        .context("failed to install logger")
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn run(cli: &Cli) -> Result<()> {
    init_logging(&cli.log_file)?;
    info!(
        "starting termframe: {} fps, {} ms dwell, engine args {:?}",
        cli.fps, cli.dwell_ms, cli.engine_args
    );

    let mut engine = Plasma::new(DemoOptions::from_args(&cli.engine_args));
    Session::new(cli.session_config())
        .run(&mut engine)
        .context("terminal session failed")?;

    info!("termframe exited cleanly");
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("termframe: {e:#}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("termframe").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.title, "termframe");
        assert_eq!(cli.fps, 35);
        assert_eq!(cli.dwell_ms, 60);
        assert!(cli.engine_args.is_empty());
    }

    #[test]
    fn engine_args_pass_through_verbatim() {
        let cli = parse(&["--fps", "60", "--", "--size", "640x400", "-warp", "1"]);
        assert_eq!(cli.fps, 60);
        assert_eq!(cli.engine_args, vec!["--size", "640x400", "-warp", "1"]);
    }

    #[test]
    fn everything_after_first_engine_arg_is_forwarded() {
        let cli = parse(&["doom1.wad", "-warp", "1", "--fps", "10"]);
        assert_eq!(cli.fps, 35);
        assert_eq!(cli.engine_args, vec!["doom1.wad", "-warp", "1", "--fps", "10"]);
    }

    #[test]
    fn fps_out_of_range_is_rejected() {
        let parse_fps = |v: &str| Cli::try_parse_from(["termframe", "--fps", v]);
        assert!(parse_fps("0").is_err());
        assert!(parse_fps("241").is_err());
        assert!(parse_fps("240").is_ok());
    }

    #[test]
    fn session_config_from_flags() {
        let cli = parse(&["--title", "E1M1", "--fps", "70", "--dwell-ms", "90"]);
        let config = cli.session_config();
        assert_eq!(config.tick_interval, Duration::from_secs(1) / 70);
        assert_eq!(config.dwell, Duration::from_millis(90));
        assert_eq!(config.title.as_deref(), Some("E1M1"));
    }

    #[test]
    fn unwritable_log_file_is_an_error() {
        let err = init_logging(Path::new("/nonexistent-dir/termframe.log")).unwrap_err();
        assert!(err.to_string().contains("failed to open log file"));
    }
}
