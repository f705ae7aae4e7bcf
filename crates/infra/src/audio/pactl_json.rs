//! Decoding of `pactl --format=json` output
//!
//! Only the fields needed to build a [`Snapshot`] are read; everything else
//! pactl prints is ignored so newer server versions keep working.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use smart_volume_core::domain::audio::{Device, GatewayError, Result, Snapshot, Stream, Volume};

/// Raw volume that corresponds to 100% (`PA_VOLUME_NORM`)
pub const VOLUME_NORM: u32 = 0x10000;

/// Stream properties tried in order to find a human readable label
const LABEL_PROPERTIES: [&str; 3] = [
    "application.name",
    "application.process.binary",
    "media.name",
];

#[derive(Debug, Deserialize)]
struct ServerInfo {
    #[serde(default)]
    default_sink_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelVolume {
    value: u32,
}

#[derive(Debug, Deserialize)]
struct SinkEntry {
    index: u32,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    volume: BTreeMap<String, ChannelVolume>,
}

#[derive(Debug, Deserialize)]
struct SinkInputEntry {
    index: u32,
    #[serde(default)]
    corked: bool,
    #[serde(default)]
    volume: BTreeMap<String, ChannelVolume>,
    #[serde(default)]
    properties: HashMap<String, serde_json::Value>,
}

fn decode<'de, T: Deserialize<'de>>(what: &str, json: &'de str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| GatewayError::Malformed(format!("{what}: {e}")))
}

/// Mean of all channel volumes, `None` for streams without volume control
fn mean_volume(channels: &BTreeMap<String, ChannelVolume>) -> Option<Volume> {
    if channels.is_empty() {
        return None;
    }
    let sum: u64 = channels.values().map(|c| u64::from(c.value)).sum();
    let mean = sum as f64 / channels.len() as f64;
    Some(Volume::new(mean / f64::from(VOLUME_NORM)))
}

fn stream_label(entry: &SinkInputEntry) -> String {
    LABEL_PROPERTIES
        .iter()
        .filter_map(|key| entry.properties.get(*key))
        .filter_map(|value| value.as_str())
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("stream #{}", entry.index))
}

/// Raw integer volume pactl expects for a fraction of nominal volume
pub fn to_raw(volume: Volume) -> u32 {
    (volume.fraction().max(0.0) * f64::from(VOLUME_NORM)).round() as u32
}

/// Build a snapshot from `pactl -f json info`, `list sinks` and `list sink-inputs`.
pub fn parse_snapshot(info: &str, sinks: &str, sink_inputs: &str) -> Result<Snapshot> {
    let info: ServerInfo = decode("server info", info)?;
    let sinks: Vec<SinkEntry> = decode("sink list", sinks)?;
    let sink_inputs: Vec<SinkInputEntry> = decode("sink input list", sink_inputs)?;

    let default_sink = info.default_sink_name.unwrap_or_default();

    let devices = sinks
        .into_iter()
        .map(|sink| Device {
            index: sink.index,
            is_default: sink.name == default_sink,
            volume: mean_volume(&sink.volume).unwrap_or(Volume::SILENT),
            label: if sink.description.is_empty() {
                sink.name
            } else {
                sink.description
            },
        })
        .collect();

    let streams = sink_inputs
        .into_iter()
        .filter_map(|entry| {
            let Some(volume) = mean_volume(&entry.volume) else {
                debug!(index = entry.index, "Skipping stream without volume control");
                return None;
            };
            Some(Stream {
                index: entry.index,
                label: stream_label(&entry),
                is_playing: !entry.corked,
                volume,
            })
        })
        .collect();

    Ok(Snapshot::new(streams, devices))
}
