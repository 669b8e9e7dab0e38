use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use archipelago::cli::commands;
use archipelago::config::generation::GenerationParams;
use archipelago::config::runtime::RuntimeConfig;

#[derive(Parser)]
#[command(name = "archipelago")]
#[command(about = "Deterministic island and terrain generator for tiled globes")]
#[command(version)]
struct Cli {
    /// Path to the runtime configuration file
    #[arg(short, long, default_value = "archipelago.toml")]
    config: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new globe and save it as a snapshot
    Generate {
        /// Path to a globe generation config file
        #[arg(short, long)]
        globe: Option<String>,

        /// Seed, overriding the config file
        #[arg(long)]
        seed: Option<u64>,

        /// Subdivision level (1-7), overriding the config file
        #[arg(long)]
        level: Option<u32>,

        /// Island count; zero or less uses the level default
        #[arg(long, allow_negative_numbers = true)]
        islands: Option<i32>,

        /// Target island size; zero or less uses the level default
        #[arg(long, allow_negative_numbers = true)]
        island_size: Option<i32>,

        /// Output snapshot directory
        #[arg(short, long)]
        output: Option<String>,

        /// Place this model (relative to the asset directory) on every land tile
        #[arg(long)]
        test_model: Option<String>,
    },

    /// Inspect a tile of a saved globe
    Inspect {
        /// Tile index
        #[arg(short, long)]
        tile: usize,

        /// Snapshot file; defaults to the newest valid snapshot
        #[arg(short, long)]
        snapshot: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Cast a ray at a saved globe and report the selected tile
    Pick {
        /// Ray origin as x,y,z
        #[arg(long, value_parser = commands::parse_vec3, allow_hyphen_values = true)]
        origin: Vec3,

        /// Ray direction as x,y,z
        #[arg(long, value_parser = commands::parse_vec3, allow_hyphen_values = true)]
        direction: Vec3,

        /// Snapshot file; defaults to the newest valid snapshot
        #[arg(short, long)]
        snapshot: Option<String>,
    },

    /// Regenerate a snapshot from its parameters and check it matches
    Verify {
        /// Path to the snapshot file
        file: String,
    },

    /// Manage globe snapshots
    Snapshots {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// List available snapshots
    List {
        /// Snapshot directory; defaults to the configured one
        #[arg(short, long)]
        dir: Option<String>,
    },
}

fn init_logging(config: &RuntimeConfig, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json || config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn exit_on_error<T>(result: Result<T, String>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match RuntimeConfig::from_file_or_default(Path::new(&cli.config)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&config, cli.log_json);

    match cli.command {
        Commands::Generate {
            globe,
            seed,
            level,
            islands,
            island_size,
            output,
            test_model,
        } => {
            let mut params = match globe {
                Some(path) => exit_on_error(GenerationParams::from_file(Path::new(&path))),
                None => GenerationParams::default(),
            };
            if let Some(seed) = seed {
                params.seed = seed;
            }
            if let Some(level) = level {
                params.subdivision_level = level;
            }
            if let Some(islands) = islands {
                params.islands = islands;
            }
            if let Some(size) = island_size {
                params.island_size = size;
            }
            exit_on_error(commands::generate(
                &config,
                &params,
                output.as_deref(),
                test_model.as_deref(),
            ));
        }

        Commands::Inspect {
            tile,
            snapshot,
            json,
        } => {
            exit_on_error(commands::inspect(&config, snapshot.as_deref(), tile, json));
        }

        Commands::Pick {
            origin,
            direction,
            snapshot,
        } => {
            exit_on_error(commands::pick(&config, snapshot.as_deref(), origin, direction));
        }

        Commands::Verify { file } => {
            exit_on_error(commands::verify(&file));
        }

        Commands::Snapshots { action } => match action {
            SnapshotAction::List { dir } => {
                let dir = dir.unwrap_or_else(|| config.snapshot_directory.clone());
                exit_on_error(commands::list_snapshots(Path::new(&dir)));
            }
        },
    }
}
