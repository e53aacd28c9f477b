mod replay;
mod trace;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use satan_core::{KeyboardConfig, Keymap};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(name = "satan-cli")]
#[command(about = "Satan GH60 keyboard core tools")]
struct Cli {
    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the built-in keymap and configuration
    Check {
        #[command(flatten)]
        timing: Timing,
    },
    /// Feed a recorded scan trace through the keyboard core
    Replay {
        /// Trace file, one scan pass per line
        trace: PathBuf,
        #[command(flatten)]
        timing: Timing,
    },
}

/// Overrides for the timing configuration.
#[derive(Args)]
struct Timing {
    /// Quiet scan passes before a change is committed
    #[arg(long)]
    debounce: Option<u8>,
    /// Ticks after which a dual-role key counts as held
    #[arg(long)]
    tapping_term: Option<u16>,
    /// Max ticks between taps of a tap-toggle streak
    #[arg(long)]
    tap_window: Option<u16>,
}

impl Timing {
    fn config(&self) -> KeyboardConfig {
        let mut config = KeyboardConfig::DEFAULT;
        if let Some(debounce) = self.debounce {
            config.debounce = debounce;
        }
        if let Some(term) = self.tapping_term {
            config.tapping_term = term;
        }
        if let Some(window) = self.tap_window {
            config.tap_window = window;
        }
        config
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // Also installs the log bridge, so records from satan-core show up here
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Check { timing } => {
            let config = timing.config();
            let keymap = Keymap::builtin().context("invalid built-in keymap")?;
            config
                .validate_for(&keymap)
                .context("invalid configuration")?;

            println!(
                "Keymap OK: {} layers, {} function slots",
                keymap.num_layers(),
                keymap.num_actions()
            );
            println!("Default layer: {}", config.default_layer);
            println!(
                "Debounce: {} passes, tapping term: {} ticks, tap window: {} ticks",
                config.debounce, config.tapping_term, config.tap_window
            );
            let backlight = config.backlight;
            println!(
                "Backlight: {:?}, level {}..={}, boost {}",
                backlight.mode, backlight.lower, backlight.upper, backlight.boost
            );
        }
        Command::Replay {
            trace: path,
            timing,
        } => {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            let steps = trace::parse_trace(&contents).context("parsing scan trace")?;
            tracing::info!(
                steps = steps.len(),
                passes = trace::total_passes(&steps),
                "loaded trace"
            );

            let keymap = Keymap::builtin().context("invalid built-in keymap")?;
            let result = replay::replay(&steps, keymap, &timing.config())?;

            for event in &result.events {
                println!("{}", event);
            }
            println!(
                "{} passes, backlight {:?} level {} duty {}",
                result.passes, result.mode, result.level, result.duty
            );
        }
    }

    Ok(())
}
