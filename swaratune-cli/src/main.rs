//! # swaratune - command-line tuner
//!
//! Drives a [`Tuner`] from a fixed-cadence loop, prints each reading with
//! its distance from a target pitch, and optionally records and exports the
//! notes played.

mod cli;
mod config;
mod display;
mod export;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::{Duration, Instant};
use swaratune_core::audio::{default_input_device_name, list_input_devices};
use swaratune_core::{AudioSource, CpalSource, ToneSource, Tuner, TunerError};

use cli::{Cli, Command, ListenArgs};
use config::Config;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config = match config::locate_config(cli.config.as_deref()) {
        Some(path) => {
            let config = config::load_config(&path)?;
            log::info!("Loaded config from {}", path.display());
            config
        }
        None => Config::default(),
    };

    match cli.command {
        Command::Devices => list_devices(),
        Command::Listen(args) => listen(args, config),
    }
}

fn list_devices() -> Result<()> {
    let default = default_input_device_name();
    let devices = list_input_devices().context("listing input devices")?;
    if devices.is_empty() {
        println!("No input devices found");
    }
    for name in devices {
        let marker = if Some(&name) == default.as_ref() { "*" } else { " " };
        println!("{marker} {name}");
    }
    Ok(())
}

/// Merges flags into the file config: a flag wins unless it is still at
/// its default value.
fn apply_overrides(args: &ListenArgs, config: &mut Config) {
    if args.target != "A4" {
        config.display.target = args.target.clone();
    }
    if args.tick_ms != 16 {
        config.display.tick_ms = args.tick_ms;
    }
    if args.no_quantize {
        config.tuner.quantize = false;
    }
    if args.device.is_some() {
        config.tuner.device = args.device.clone();
    }
}

/// Negative and NaN durations mean "stop at once"; infinite or huge ones
/// are rejected.
fn listen_duration(seconds: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(seconds.max(0.0))
        .with_context(|| format!("invalid listening time {seconds}s"))
}

fn listen(args: ListenArgs, mut config: Config) -> Result<()> {
    apply_overrides(&args, &mut config);
    let target = display::parse_target(&config.display.target)?;
    let tolerance = config.display.in_tune_cents;
    let tick = Duration::from_millis(config.display.tick_ms.max(1));
    let duration = listen_duration(args.seconds)?;
    let record = args.record || args.export.is_some();

    let mut source: Box<dyn AudioSource> = match (args.simulate, &config.tuner.device) {
        (Some(freq), _) => Box::new(ToneSource::new(freq, 0.5, config.tuner.preferred_sample_rate)),
        (None, Some(name)) => Box::new(CpalSource::with_device(name, config.tuner.preferred_sample_rate)),
        (None, None) => Box::new(CpalSource::new(config.tuner.preferred_sample_rate)),
    };

    let mut tuner = Tuner::new(config.tuner.clone()).context("invalid tuner configuration")?;
    tuner
        .start_listening(source.as_mut())
        .context("could not open the audio input")?;
    if record {
        tuner.start_recording();
    }
    log::info!("Listening for {:.1}s, target {:.2} Hz", duration.as_secs_f32(), target);

    let started = Instant::now();
    let mut stdout = std::io::stdout();
    while started.elapsed() < duration {
        match tuner.tick(started.elapsed()) {
            Ok(Some(reading)) => {
                print!("\r{}", display::format_reading(&reading, target, tolerance));
                stdout.flush()?;
            }
            Ok(None) => {}
            Err(e @ TunerError::DeviceUnavailable(_)) => {
                println!();
                log::error!("{}", e);
                break;
            }
            Err(e) => log::warn!("Skipping frame: {}", e),
        }
        std::thread::sleep(tick);
    }
    println!();

    tuner.stop_recording();
    tuner.stop_listening();

    if record {
        report_recording(&tuner, target, args.export.as_deref())?;
    }
    Ok(())
}

fn report_recording(tuner: &Tuner, target: f32, export: Option<&std::path::Path>) -> Result<()> {
    let Some(events) = tuner.export_events() else {
        return Ok(());
    };
    println!("Recorded {} notes:", events.len());
    for event in events {
        println!(
            "  {:>7} ms  {:<4} {:<4} {}",
            event.timestamp.as_millis(),
            event.note.to_string(),
            event.note.swara(),
            event.note.solfege()
        );
    }
    if let Some(path) = export {
        export::save_events(events, target, path)?;
        log::info!("Recording saved to {}", path.display());
    }
    Ok(())
}
