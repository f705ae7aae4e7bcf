//! Outcome of one invocation and the notification contract
//!
//! The core only produces data here: which target was changed, from which
//! volume to which, and in which mode. Rendering to stdout and delivering
//! desktop notifications is done by the callers.

use crate::domain::audio::{TargetId, Volume};
use crate::domain::selector::{PatternMatch, Target};
use crate::domain::volume::{ChangeMode, VolumeLimit};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// A volume change that was computed, and applied unless this was a dry run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adjustment {
    pub target: Target,
    pub previous: Volume,
    pub volume: Volume,
    pub mode: ChangeMode,
    pub applied: bool,
}

impl Adjustment {
    /// Signed difference between the new and the previous volume
    pub fn delta(&self) -> f64 {
        self.volume.fraction() - self.previous.fraction()
    }

    /// False when the clamped result equals the current volume
    pub fn is_audible(&self) -> bool {
        self.volume != self.previous
    }

    /// One line description, e.g. `Spotify: +5%` or `Spotify: 42%`
    pub fn message(&self, absolute: bool) -> String {
        if absolute {
            format!("{}: {}", self.target.label, self.volume)
        } else {
            let percent = (self.delta() * 100.0).round() as i64;
            format!("{}: {:+}%", self.target.label, percent)
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Per pattern matches, only collected for dry runs
    pub matches: Vec<PatternMatch>,
    /// `None` when nothing matched and no fallback was configured
    pub adjustment: Option<Adjustment>,
}

/// Errors from a notification surface
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification service unavailable: {0}")]
    Unavailable(String),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Data handed to a notification surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub summary: String,
    pub body: String,
    /// Resulting volume as a share of the configured bound, 0 to 100
    pub progress: i32,
    /// Set when a repeated notice for the same target should replace the last one
    pub replace_key: Option<TargetId>,
}

impl Notice {
    /// Build the notice for an adjustment.
    ///
    /// With `absolute` the body shows the resulting volume rather than the
    /// change, and the notice replaces the previous one for the same target.
    pub fn for_adjustment(adjustment: &Adjustment, absolute: bool, limit: VolumeLimit) -> Self {
        let summary = match adjustment.target.id {
            TargetId::Stream(_) => "Stream Volume",
            TargetId::Device(_) => "Device Volume",
        };

        Self {
            summary: summary.to_string(),
            body: adjustment.message(absolute),
            progress: limit.percent_of_bound(adjustment.volume),
            replace_key: absolute.then_some(adjustment.target.id),
        }
    }
}

/// A surface that can show a [`Notice`] to the user
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError>;
}
