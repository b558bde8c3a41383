use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use swaratune_core::NoteEvent;

/// Document handed to whatever renders the recording.
#[derive(Debug, Serialize)]
struct Recording<'a> {
    #[serde(rename = "targetHz")]
    target_hz: f32,
    events: &'a [NoteEvent],
}

/// Saves a frozen recording as pretty-printed JSON.
///
/// # Arguments
/// * `events` - The exported event list, oldest first
/// * `target_hz` - Target pitch the session was tuned against
/// * `path` - Destination file
pub fn save_events(events: &[NoteEvent], target_hz: f32, path: &Path) -> Result<()> {
    let json_string = events_to_json(events, target_hz)?;
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

fn events_to_json(events: &[NoteEvent], target_hz: f32) -> Result<String> {
    Ok(serde_json::to_string_pretty(&Recording { target_hz, events })?)
}
