//! timbre CLI - play or render the synth voice from a step pattern.

mod commands;
mod pattern;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "timbre")]
#[command(author, version, about = "Monophonic subtractive synth voice", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a step pattern on an output device
    Play(commands::play::PlayArgs),

    /// Render a step pattern to a WAV file
    Render(commands::render::RenderArgs),

    /// List output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
