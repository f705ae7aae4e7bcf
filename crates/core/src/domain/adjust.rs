//! One-shot volume adjustment
//!
//! Enumerate, select, compute, apply (unless dry run), report. Each call works
//! on a fresh snapshot and performs at most one mutating gateway call.

use crate::domain::audio::{AudioGateway, GatewayError};
use crate::domain::config::ConfigError;
use crate::domain::outcome::{Adjustment, Outcome};
use crate::domain::selector::{self, PatternList, SelectError, SelectOptions};
use crate::domain::volume::{VolumeLimit, VolumeParseError, VolumeRequest};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Process exit status for a successful run
pub const EXIT_OK: i32 = 0;
/// Nothing matched and no fallback was configured
pub const EXIT_NOTHING_MATCHED: i32 = 1;
/// Bad pattern, volume token or configuration
pub const EXIT_INVALID_INPUT: i32 = 2;
/// Audio server unreachable, failing, or without a default device
pub const EXIT_ENVIRONMENT: i32 = 3;

/// Errors that terminate a run
#[derive(Debug, Error)]
pub enum AdjustError {
    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Volume(#[from] VolumeParseError),
}

impl AdjustError {
    /// Exit status distinguishing bad input from a broken environment
    pub fn exit_code(&self) -> i32 {
        match self {
            AdjustError::Select(SelectError::InvalidPattern { .. })
            | AdjustError::Config(_)
            | AdjustError::Volume(_) => EXIT_INVALID_INPUT,
            AdjustError::Select(SelectError::NoDefaultDevice) | AdjustError::Gateway(_) => {
                EXIT_ENVIRONMENT
            }
        }
    }
}

impl Outcome {
    /// Zero when a target was resolved, whether or not it was applied
    pub fn exit_code(&self) -> i32 {
        if self.adjustment.is_some() {
            EXIT_OK
        } else {
            EXIT_NOTHING_MATCHED
        }
    }
}

/// Everything needed for one run, validated up front
#[derive(Debug, Clone)]
pub struct AdjustPlan {
    pub patterns: PatternList,
    pub options: SelectOptions,
    pub request: VolumeRequest,
    pub limit: VolumeLimit,
    pub dry_run: bool,
}

impl AdjustPlan {
    /// Compile patterns before anything talks to the audio server.
    pub fn new<I, S>(
        patterns: I,
        options: SelectOptions,
        request: VolumeRequest,
        limit: VolumeLimit,
    ) -> Result<Self, AdjustError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            patterns: PatternList::compile(patterns)?,
            options,
            request,
            limit,
            dry_run: false,
        })
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Runs plans against an audio server
pub struct VolumeAdjuster<G> {
    gateway: G,
}

impl<G: AudioGateway> VolumeAdjuster<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    #[instrument(skip(self, plan), fields(dry_run = plan.dry_run, mode = %plan.request.mode()))]
    pub async fn run(&self, plan: &AdjustPlan) -> Result<Outcome, AdjustError> {
        let snapshot = self.gateway.snapshot().await?;
        debug!(
            streams = snapshot.streams.len(),
            devices = snapshot.devices.len(),
            "Snapshot taken"
        );

        let matches = if plan.dry_run {
            selector::explain(&snapshot, &plan.patterns, plan.options)
        } else {
            Vec::new()
        };

        let selection = selector::select(&snapshot, &plan.patterns, plan.options)?;
        let Some(target) = selection.target() else {
            info!("No matching stream found");
            return Ok(Outcome {
                matches,
                adjustment: None,
            });
        };

        let previous = target.volume;
        let volume = plan.request.apply_to(previous, plan.limit);

        if plan.dry_run {
            info!(target = %target.id, label = %target.label, %previous, %volume, "Dry run, not applying");
        } else {
            self.gateway.set_volume(target.id, volume).await?;
            info!(target = %target.id, label = %target.label, %previous, %volume, "Volume set");
        }

        if previous == volume {
            debug!(label = %target.label, "No audible change");
        }

        Ok(Outcome {
            matches,
            adjustment: Some(Adjustment {
                target,
                previous,
                volume,
                mode: plan.request.mode(),
                applied: !plan.dry_run,
            }),
        })
    }
}
