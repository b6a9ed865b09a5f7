//! replicator CLI — rehearse a character's lines from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod frontend;
mod render;

#[derive(Parser)]
#[command(name = "replicator", version, about = "Theatre line memorization trainer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drill one character's lines in one scene
    Drill {
        /// Play configuration file
        #[arg(long, default_value = "replicator.toml")]
        play: PathBuf,

        /// Character to rehearse (any of its labels)
        #[arg(long)]
        character: String,

        /// Scene number, as listed by `replicator scenes`
        #[arg(long)]
        scene: usize,

        /// Write the session report as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print a whole scene
    Read {
        /// Play configuration file
        #[arg(long, default_value = "replicator.toml")]
        play: PathBuf,

        /// Scene number, as listed by `replicator scenes`
        #[arg(long)]
        scene: usize,
    },

    /// List the scenes of a play
    Scenes {
        /// Play configuration file
        #[arg(long, default_value = "replicator.toml")]
        play: PathBuf,

        /// Only scenes where this character speaks
        #[arg(long)]
        character: Option<String>,
    },

    /// Show lines, words and characters to learn per scene
    Stats {
        /// Play configuration file
        #[arg(long, default_value = "replicator.toml")]
        play: PathBuf,
    },

    /// Check the play configuration and every scene script
    Validate {
        /// Play configuration file
        #[arg(long, default_value = "replicator.toml")]
        play: PathBuf,
    },

    /// Create a starter play configuration and scene
    Init,
}

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "replicator=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Drill {
            play,
            character,
            scene,
            output,
        } => commands::drill::execute(play, character, scene, output).await,
        Commands::Read { play, scene } => commands::read::execute(play, scene),
        Commands::Scenes { play, character } => commands::scenes::execute(play, character),
        Commands::Stats { play } => commands::stats::execute(play),
        Commands::Validate { play } => commands::validate::execute(play),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
