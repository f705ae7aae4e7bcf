//! Audio server snapshot model and the gateway capability
//!
//! This module defines the platform-agnostic view of an audio server: the
//! streams (playback clients) and devices (output sinks) it reports, and the
//! narrow interface used to read them and to set a volume. The concrete
//! implementation talking to a live server lives in the `infra` crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors reported by an audio server gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The control tool could not be started or the server could not be reached
    #[error("audio server unavailable ({command}): {source}")]
    Unavailable {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The control tool ran but reported a failure
    #[error("`{command}` failed with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The server answered with something we could not interpret
    #[error("malformed answer from audio server: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Volume as a fraction of the server's nominal (100%) level
///
/// Values above 1.0 are amplification ("overdrive"). The type itself does not
/// clamp; bounds are enforced by [`VolumeLimit`](crate::domain::volume::VolumeLimit).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Volume(f64);

impl Volume {
    pub const SILENT: Volume = Volume(0.0);
    pub const NOMINAL: Volume = Volume(1.0);

    pub fn new(fraction: f64) -> Self {
        Self(fraction)
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    /// Volume expressed in percent, rounded to the nearest integer
    pub fn percent(&self) -> i64 {
        (self.0 * 100.0).round() as i64
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Identifies the object a volume command is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetId {
    Stream(u32),
    Device(u32),
}

impl TargetId {
    pub fn index(&self) -> u32 {
        match self {
            TargetId::Stream(index) | TargetId::Device(index) => *index,
        }
    }

    /// Short lowercase kind name, used in file names and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            TargetId::Stream(_) => "stream",
            TargetId::Device(_) => "device",
        }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind(), self.index())
    }
}

/// A client connected to the audio server that plays sound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub index: u32,
    pub label: String,
    pub is_playing: bool,
    pub volume: Volume,
}

impl Stream {
    pub fn id(&self) -> TargetId {
        TargetId::Stream(self.index)
    }
}

/// An output endpoint (sink) streams are routed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub index: u32,
    pub label: String,
    pub is_default: bool,
    pub volume: Volume,
}

impl Device {
    pub fn id(&self) -> TargetId {
        TargetId::Device(self.index)
    }
}

/// One invocation's view of the server, in the order the server enumerated it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub streams: Vec<Stream>,
    pub devices: Vec<Device>,
}

impl Snapshot {
    pub fn new(streams: Vec<Stream>, devices: Vec<Device>) -> Self {
        Self { streams, devices }
    }

    /// The device flagged as system default, first one wins if several are
    pub fn default_device(&self) -> Option<&Device> {
        self.devices.iter().find(|device| device.is_default)
    }
}

/// Capability to read from and write to a running audio server
///
/// The selector and the volume calculator never call this; only the one-shot
/// [`VolumeAdjuster`](crate::domain::adjust::VolumeAdjuster) does.
#[async_trait]
pub trait AudioGateway: Send + Sync {
    /// Enumerate streams and devices fresh from the server
    async fn snapshot(&self) -> Result<Snapshot>;

    /// Set the volume of one stream or device on all of its channels
    async fn set_volume(&self, target: TargetId, volume: Volume) -> Result<()>;
}
