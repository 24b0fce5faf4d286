mod board;
mod replay;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use esc_matrix::config::{mux_lines_for, MAX_ADDRESSED_UNITS};
use esc_matrix::Thresholds;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use board::BoardFile;
use replay::Edge;

#[derive(Parser)]
#[command(name = "esc-cli")]
#[command(about = "Electrostatic capacitive matrix tools")]
struct Cli {
    /// More logging (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a JSON board description
    Check {
        /// Path to the board file
        board: PathBuf,
    },
    /// Print how many mux address lines each matrix size needs
    MuxTable,
    /// Run recorded ADC samples for one key through the hysteresis rule
    Replay {
        /// Latch threshold (overrides the board file)
        #[arg(long)]
        latch: Option<u16>,
        /// Unlatch threshold (overrides the board file)
        #[arg(long)]
        unlatch: Option<u16>,
        /// Take thresholds from this board file
        #[arg(long)]
        board: Option<PathBuf>,
        /// Samples in capture order
        #[arg(required = true, value_delimiter = ',')]
        samples: Vec<u16>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Check { board } => {
            let file = BoardFile::load(&board)?;
            debug!(name = %file.name, "loaded board file");

            let summary = file
                .validate()
                .with_context(|| format!("board {} is not valid", file.name))?;

            println!("Board:       {}", file.name);
            println!("Topology:    {}", summary.topology.name());
            println!(
                "Matrix:      {} rows x {} columns",
                file.rows, file.cols
            );
            println!(
                "Multiplexed: {} unit(s) on {} address line(s)",
                summary.addressed, summary.mux_lines
            );
            println!("Sensed:      {} line(s)", summary.sensed);
            println!(
                "Hysteresis:  latch > {}, unlatch <= {} (ADC max {})",
                summary.thresholds.latch(),
                summary.thresholds.unlatch(),
                summary.adc_max
            );
            info!("board {} is valid", file.name);
        }
        Command::MuxTable => {
            println!("units  address lines");
            for units in 1..=MAX_ADDRESSED_UNITS {
                if let Some(lines) = mux_lines_for(units) {
                    println!("{units:>5}  {lines}");
                }
            }
        }
        Command::Replay {
            latch,
            unlatch,
            board,
            samples,
        } => {
            let from_board = match &board {
                Some(path) => Some(BoardFile::load(path)?.thresholds()?),
                None => None,
            };
            let latch = latch.or(from_board.map(|t| t.latch()));
            let unlatch = unlatch.or(from_board.map(|t| t.unlatch()));
            let (Some(latch), Some(unlatch)) = (latch, unlatch) else {
                bail!("give --latch and --unlatch, or a --board file");
            };
            let thresholds = Thresholds::try_new(latch, unlatch)?;
            debug!(latch, unlatch, count = samples.len(), "replaying samples");

            let steps = replay::replay(thresholds, &samples);
            println!("  #  sample  threshold  state");
            for (i, step) in steps.iter().enumerate() {
                let state = if step.active { "on" } else { "off" };
                let edge = match step.edge {
                    Some(Edge::Press) => "  <- press",
                    Some(Edge::Release) => "  <- release",
                    None => "",
                };
                println!(
                    "{i:>3}  {:>6}  {:>9}  {state:<5}{edge}",
                    step.sample, step.threshold
                );
            }

            let (presses, releases) = replay::edge_counts(&steps);
            info!(presses, releases, "replay finished");
            println!("{presses} press(es), {releases} release(s)");
        }
    }

    Ok(())
}
