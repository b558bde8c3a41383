use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use swaratune_core::TunerConfig;

/// File name looked up in the working directory when `--config` is absent.
pub const LOCAL_CONFIG: &str = "swaratune.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tuner: TunerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Deviation in cents still counted as in tune.
    #[serde(default = "default_in_tune_cents")]
    pub in_tune_cents: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            tick_ms: default_tick_ms(),
            in_tune_cents: default_in_tune_cents(),
        }
    }
}

fn default_target() -> String { "A4".into() }
fn default_tick_ms() -> u64 { 16 }
fn default_in_tune_cents() -> f32 { 5.0 }

/// Explicit path, else `./swaratune.toml` if it exists.
pub fn locate_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(LOCAL_CONFIG);
    local.exists().then_some(local)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&content).with_context(|| format!("parsing config {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}
