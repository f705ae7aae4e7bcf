//! Volume requests and the volume calculator
//!
//! A request is either a signed delta added to the current volume or an
//! absolute level. The result is always clamped to `[0, upper bound]`.

use crate::domain::audio::Volume;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while reading a volume token or a bound
#[derive(Debug, Error, PartialEq)]
pub enum VolumeParseError {
    #[error("invalid volume change `{0}`: expected a number such as -0.05, +0.1, 5% or -10%")]
    InvalidToken(String),

    #[error("invalid volume bound {0}: must be greater than 0 and at most {max}", max = VolumeLimit::MAX_CEILING)]
    InvalidBound(f64),
}

/// Upper bound applied to every computed volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeLimit(f64);

impl VolumeLimit {
    /// 100%, no amplification
    pub const UNITY: f64 = 1.0;
    /// Highest bound a configuration may ask for (200%)
    pub const MAX_CEILING: f64 = 2.0;

    pub fn new(upper: f64) -> Result<Self, VolumeParseError> {
        if upper.is_finite() && upper > 0.0 && upper <= Self::MAX_CEILING {
            Ok(Self(upper))
        } else {
            Err(VolumeParseError::InvalidBound(upper))
        }
    }

    pub fn upper(&self) -> f64 {
        self.0
    }

    pub fn clamp(&self, fraction: f64) -> Volume {
        // NaN compares false everywhere; treat it as silence
        if fraction.is_nan() {
            return Volume::SILENT;
        }
        Volume::new(fraction.clamp(0.0, self.0))
    }

    /// Share of the bound a volume occupies, in percent (progress bars)
    pub fn percent_of_bound(&self, volume: Volume) -> i32 {
        ((volume.fraction() / self.0) * 100.0).round().clamp(0.0, 100.0) as i32
    }
}

impl Default for VolumeLimit {
    fn default() -> Self {
        Self(Self::UNITY)
    }
}

/// Whether a request moves the volume or replaces it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeMode {
    Relative,
    Absolute,
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeMode::Relative => f.write_str("relative"),
            ChangeMode::Absolute => f.write_str("absolute"),
        }
    }
}

/// Requested change, as fractions of nominal volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VolumeRequest {
    /// Signed delta, e.g. `+0.05`
    Relative(f64),
    /// Target level, e.g. `0.42`
    Absolute(f64),
}

impl VolumeRequest {
    /// Parse a command line token.
    ///
    /// Accepts plain fractions (`0.05`, `+0.05`, `-0.05`) and percentages
    /// (`5%`, `-10%`). With `absolute` the value is the target level and a
    /// leading sign is not allowed to be negative.
    pub fn parse(token: &str, absolute: bool) -> Result<Self, VolumeParseError> {
        let invalid = || VolumeParseError::InvalidToken(token.to_string());

        let trimmed = token.trim();
        let value = match trimmed.strip_suffix('%') {
            Some(percent) => parse_number(percent).ok_or_else(invalid)? / 100.0,
            None => parse_number(trimmed).ok_or_else(invalid)?,
        };

        if !value.is_finite() {
            return Err(invalid());
        }

        if absolute {
            if value < 0.0 {
                return Err(invalid());
            }
            Ok(VolumeRequest::Absolute(value))
        } else {
            Ok(VolumeRequest::Relative(value))
        }
    }

    pub fn mode(&self) -> ChangeMode {
        match self {
            VolumeRequest::Relative(_) => ChangeMode::Relative,
            VolumeRequest::Absolute(_) => ChangeMode::Absolute,
        }
    }

    /// Compute the new volume without touching anything.
    pub fn apply_to(&self, current: Volume, limit: VolumeLimit) -> Volume {
        match *self {
            VolumeRequest::Relative(delta) => limit.clamp(current.fraction() + delta),
            VolumeRequest::Absolute(level) => limit.clamp(level),
        }
    }
}

impl FromStr for VolumeRequest {
    type Err = VolumeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, false)
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    // `f64::from_str` rejects a leading '+', which users type for increases
    let unsigned = match text.strip_prefix('+') {
        Some(rest) if rest.starts_with(['+', '-']) => return None,
        Some(rest) => rest,
        None => text,
    };
    unsigned.parse::<f64>().ok()
}
