use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "swaratune", about = "Real-time instrument tuner with Western, swara and solfège note names")]
pub struct Cli {
    /// Config file (defaults to ./swaratune.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List audio input devices
    Devices,
    /// Listen to an input and show the detected note
    Listen(ListenArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListenArgs {
    /// Stop after this many seconds
    #[arg(short, long, default_value_t = 10.0)]
    pub seconds: f32,

    /// Record note changes while listening
    #[arg(short, long)]
    pub record: bool,

    /// Write the recorded notes as JSON to this file (implies --record)
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Target pitch for the tuning indicator, as a note name (A4) or Hz (440)
    #[arg(short, long, default_value = "A4")]
    pub target: String,

    /// Use a synthetic sine tone at this frequency instead of a microphone
    #[arg(long)]
    pub simulate: Option<f32>,

    /// Input device name
    #[arg(short, long)]
    pub device: Option<String>,

    /// Report raw smoothed frequencies without snapping to equal temperament
    #[arg(long)]
    pub no_quantize: bool,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 16)]
    pub tick_ms: u64,
}
