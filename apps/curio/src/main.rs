//! Curio CLI - query the recommender families from the command line
//!
//! Provides a `curio` command that opens an artifact root and runs
//! title-based, genre-based and diagnostic requests against it.

mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{genres, probe, recommend};

/// Curio - book and movie recommendations from offline-built models
#[derive(Parser, Debug)]
#[command(name = "curio", author, version, about = "Curio - book and movie recommendations")]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Artifact root holding the model directories and `.curio/config.toml`
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend items similar to each given title
    ///
    /// Prints a JSON object mapping every requested title to its
    /// recommendations or to a status message.
    Recommend {
        /// Family id, e.g. `books.knn` or `movies.embeddings`
        family: String,

        /// Titles to recommend for
        #[arg(required = true)]
        titles: Vec<String>,

        /// Results per title (defaults to the configured `default_n`)
        #[arg(short, long)]
        n: Option<usize>,

        /// Candidate pool size for sampled families
        #[arg(long)]
        pool_size: Option<usize>,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Recommend top-rated movies carrying every given genre
    Genres {
        /// Genre names, e.g. `Comedy Horror`
        #[arg(required = true)]
        genres: Vec<String>,

        /// Number of results (defaults to the configured `default_n`)
        #[arg(short, long)]
        n: Option<usize>,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show which families have artifacts on disk and current memory usage
    Probe {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // stdout carries command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Recommend { family, titles, n, pool_size, seed } => {
            recommend::execute(&args.root, &family, &titles, n, pool_size, seed)?;
        }
        Command::Genres { genres, n, seed } => {
            genres::execute(&args.root, &genres, n, seed)?;
        }
        Command::Probe { json } => {
            probe::execute(&args.root, json)?;
        }
    }

    Ok(())
}
