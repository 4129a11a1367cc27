//! Verdure CLI: run, validate and inspect vegetation scenes.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "verdure")]
#[command(version, about = "Verdure: position-based dynamics for breakable vegetation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scene file to completion.
    Simulate {
        /// Path to scene file (TOML).
        #[arg(short, long, default_value = "scene.toml")]
        config: String,

        /// Write a state snapshot of the final timestep here.
        #[arg(short, long)]
        snapshot: Option<String>,

        /// Print a progress line every N steps (0 = only the summary).
        #[arg(short, long, default_value_t = 0)]
        report_every: u32,
    },

    /// Check a scene file without running it.
    Validate {
        /// Path to scene file.
        path: String,
    },

    /// Inspect a state snapshot file.
    Inspect {
        /// Path to snapshot file.
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            config,
            snapshot,
            report_every,
        } => commands::simulate(&config, snapshot.as_deref(), report_every),
        Commands::Validate { path } => commands::validate(&path),
        Commands::Inspect { path } => commands::inspect(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
