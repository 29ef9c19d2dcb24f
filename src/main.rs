//! Memory Scramble - Main Binary
//!
//! Inspect board files and run concurrent random-player simulations

use clap::{Parser, Subcommand};
use memory_scramble::{
    loader::load_board_async,
    logger::{BoardLogger, OutputFormat, OutputMode, VerbosityLevel},
    sim::{run_simulation, SimulationConfig},
    Result,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Verbosity level for board output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "memory")]
#[command(about = "Memory Scramble - concurrent multiplayer memory board", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a board file and print a player's view of the fresh board
    Look {
        /// Board file (first line ROWSxCOLS, then one card per line)
        #[arg(value_name = "BOARD")]
        board: PathBuf,

        /// Player whose view to print
        #[arg(long, default_value = "viewer")]
        player: String,
    },

    /// Run random players concurrently against one board
    Simulate {
        /// Board file
        #[arg(value_name = "BOARD")]
        board: PathBuf,

        /// Number of concurrent players
        #[arg(long, short = 'p', default_value_t = 4)]
        players: usize,

        /// Turns each player attempts
        #[arg(long, short = 't', default_value_t = 100)]
        turns: usize,

        /// Set random seed for reproducible player choices
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum random pause before each flip, in milliseconds
        #[arg(long, default_value_t = 2)]
        max_delay_ms: u64,

        /// Verbosity level for board events (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "minimal", short = 'v')]
        verbosity: VerbosityArg,

        /// Print board events and the summary as JSON lines
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Look { board, player } => run_look(board, player).await?,
        Commands::Simulate {
            board,
            players,
            turns,
            seed,
            max_delay_ms,
            verbosity,
            json,
        } => {
            let config = SimulationConfig {
                players,
                turns,
                seed,
                max_delay_ms,
            };
            run_simulate(board, config, verbosity.into(), json).await?
        }
    }

    Ok(())
}

async fn run_look(path: PathBuf, player: String) -> Result<()> {
    let board = load_board_async(&path).await?.into_board()?;
    print!("{}", board.look(&player));
    Ok(())
}

async fn run_simulate(
    path: PathBuf,
    config: SimulationConfig,
    verbosity: VerbosityLevel,
    json: bool,
) -> Result<()> {
    let definition = load_board_async(&path).await?;
    let format = if json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let logger = BoardLogger::with_verbosity(verbosity)
        .output_mode(OutputMode::Stdout)
        .output_format(format);
    let board = Arc::new(definition.into_board()?.with_logger(logger));

    if !json {
        println!("=== Memory Scramble - Simulation ===\n");
        println!("Board: {}", path.display());
        println!("Players: {}, turns each: {}", config.players, config.turns);
        if let Some(seed) = config.seed {
            println!("Seed: {seed}");
        }
        println!();
    }

    let stats = run_simulation(Arc::clone(&board), &config).await?;

    if json {
        match serde_json::to_string(&stats) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("failed to encode stats: {e}"),
        }
        return Ok(());
    }

    println!("\n=== Results ({:.2}ms) ===", stats.duration.as_secs_f64() * 1000.0);
    for (id, player) in &stats.players {
        println!(
            "  {id}: {} turns, {} flips, {} matches, {} mismatches, {} empty, {} contended",
            player.turns,
            player.flips,
            player.matches,
            player.mismatches,
            player.no_card,
            player.contended
        );
    }
    println!(
        "  total: {} flips, {} matches",
        stats.totals.flips, stats.totals.matches
    );
    println!("\nFinal board:");
    print!("{}", board.look("viewer"));
    Ok(())
}
