mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use praxis_common::store::ProblemStore;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "praxis")]
#[command(about = "Praxis - local coding practice with an embedded test runner", long_about = None)]
struct Cli {
    /// Directory holding problem and solution state
    #[arg(long, default_value = ".praxis", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a solution against the active problem's test cases
    Run {
        /// Solution file; defaults to the stored solution, then the
        /// problem's starter code
        #[arg(short, long)]
        solution: Option<PathBuf>,

        /// Wall-clock budget for the run in milliseconds (0 disables)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Import a problem JSON file and make it the active problem
    Import {
        /// Problem file to import
        file: PathBuf,
    },

    /// Export the active problem to a JSON file named after its title
    Export {
        /// Directory to write the export into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Show the active problem
    Show,

    /// Reset the stored solution back to the problem's starter code
    ResetSolution,

    /// Restore the bundled default problem and discard its solution
    FactoryReset,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let store = ProblemStore::open(&cli.data_dir)?;

    match cli.command {
        Commands::Run { solution, timeout_ms } => {
            commands::run(&store, solution.as_deref(), timeout_ms).await?;
        }
        Commands::Import { file } => {
            commands::import(&store, &file)?;
        }
        Commands::Export { out_dir } => {
            commands::export(&store, &out_dir)?;
        }
        Commands::Show => {
            commands::show(&store);
        }
        Commands::ResetSolution => {
            commands::reset_solution(&store)?;
        }
        Commands::FactoryReset => {
            commands::factory_reset(&store)?;
        }
    }

    Ok(())
}
