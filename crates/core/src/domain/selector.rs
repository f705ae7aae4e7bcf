//! Target selection
//!
//! Patterns are tried strictly in the order given. The first pattern that
//! matches any candidate stream decides, and the first matching stream in
//! enumeration order is chosen. When nothing matches, the default device is
//! used if fallback is enabled, otherwise nothing is selected.

use crate::domain::audio::{Device, Snapshot, Stream, TargetId, Volume};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Errors that abort selection
#[derive(Debug, Error)]
pub enum SelectError {
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("fallback to the default device requested, but the audio server reports no default device")]
    NoDefaultDevice,
}

pub type Result<T> = std::result::Result<T, SelectError>;

/// Ordered, compiled pattern list
///
/// Order is significant and duplicates are kept as given.
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    patterns: Vec<Regex>,
}

impl PatternList {
    /// Compile every pattern, failing on the first invalid one.
    pub fn compile<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| SelectError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Regex> {
        self.patterns.iter()
    }
}

/// Switches controlling how candidates are considered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOptions {
    /// Only consider streams that are currently playing
    pub filter_active: bool,
    /// Fall back to the default device when no stream matches
    pub default_fallback: bool,
}

/// Result of a selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    Stream(&'a Stream),
    Device(&'a Device),
    /// Nothing matched and fallback was not enabled
    NoneFound,
}

impl Selection<'_> {
    pub fn target(&self) -> Option<Target> {
        match self {
            Selection::Stream(stream) => Some(Target::from(*stream)),
            Selection::Device(device) => Some(Target::from(*device)),
            Selection::NoneFound => None,
        }
    }
}

/// Owned description of the chosen stream or device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Target {
    pub id: TargetId,
    pub label: String,
    pub volume: Volume,
}

impl From<&Stream> for Target {
    fn from(stream: &Stream) -> Self {
        Self {
            id: stream.id(),
            label: stream.label.clone(),
            volume: stream.volume,
        }
    }
}

impl From<&Device> for Target {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id(),
            label: device.label.clone(),
            volume: device.volume,
        }
    }
}

/// Labels claimed by one pattern, used to debug pattern lists in dry runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternMatch {
    pub pattern: String,
    pub labels: Vec<String>,
}

fn candidate_pool(streams: &[Stream], filter_active: bool) -> Vec<&Stream> {
    streams
        .iter()
        .filter(|stream| !filter_active || stream.is_playing)
        .collect()
}

/// Choose the target for a volume change.
pub fn select<'a>(
    snapshot: &'a Snapshot,
    patterns: &PatternList,
    options: SelectOptions,
) -> Result<Selection<'a>> {
    let pool = candidate_pool(&snapshot.streams, options.filter_active);
    debug!(
        candidates = pool.len(),
        streams = snapshot.streams.len(),
        filter_active = options.filter_active,
        "Selecting target"
    );

    for pattern in patterns.iter() {
        debug!(pattern = %pattern, "Trying pattern");
        for &stream in &pool {
            if pattern.is_match(&stream.label) {
                debug!(pattern = %pattern, label = %stream.label, "Stream matched");
                return Ok(Selection::Stream(stream));
            }
            trace!(pattern = %pattern, label = %stream.label, "Stream skipped");
        }
    }

    if !options.default_fallback {
        debug!("No stream matched and fallback is disabled");
        return Ok(Selection::NoneFound);
    }

    let mut defaults = snapshot.devices.iter().filter(|device| device.is_default);
    let device = defaults.next().ok_or(SelectError::NoDefaultDevice)?;
    if defaults.next().is_some() {
        warn!(label = %device.label, "Several devices flagged as default, using the first");
    }

    debug!(label = %device.label, "Falling back to default device");
    Ok(Selection::Device(device))
}

/// Report which candidates each pattern claims, in pattern order.
///
/// A stream claimed by an earlier pattern is not listed again for later
/// patterns, so the output reads as a priority ranking.
pub fn explain(snapshot: &Snapshot, patterns: &PatternList, options: SelectOptions) -> Vec<PatternMatch> {
    let mut remaining = candidate_pool(&snapshot.streams, options.filter_active);

    patterns
        .iter()
        .map(|pattern| {
            let (claimed, rest): (Vec<&Stream>, Vec<&Stream>) = remaining
                .iter()
                .partition(|stream| pattern.is_match(&stream.label));
            remaining = rest;

            PatternMatch {
                pattern: pattern.as_str().to_string(),
                labels: claimed.into_iter().map(|stream| stream.label.clone()).collect(),
            }
        })
        .collect()
}
