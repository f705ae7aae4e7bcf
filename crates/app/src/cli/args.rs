//! Command line arguments and their merge with the configuration file

use clap::{ArgAction, Parser};
use smart_volume_core::domain::{
    AdjustConfig, AdjustError, AdjustPlan, VolumeLimit, VolumeRequest,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "smart-volume-adjust", version)]
#[command(
    about = "Change the volume of the stream that is playing, or of the default output device",
    long_about = None
)]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// Volume change such as -0.05, +0.1, 5% or -10%.
    /// With --set this is the target volume instead
    #[arg(allow_hyphen_values = true)]
    pub volume_change: String,

    /// Regex patterns matched against stream names, highest priority first.
    /// End with "" to fall back to any stream
    pub patterns: Vec<String>,

    /// Change the default device when no stream matches
    #[arg(long)]
    pub default_to_sink: bool,

    /// Only consider streams that are currently playing
    #[arg(long)]
    pub filter_active: bool,

    /// Treat the volume as an absolute level instead of a change
    #[arg(long)]
    pub set: bool,

    /// Upper bound for the resulting volume, up to 2.0 (default 1.0)
    #[arg(long, value_name = "FRACTION")]
    pub max_volume: Option<f64>,

    /// Show what would change, and what each pattern matches, without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Send a desktop notification describing the change
    #[arg(long)]
    pub notify: bool,

    /// Report the resulting volume instead of the change
    #[arg(long)]
    pub notify_absolute: bool,

    /// Do not print the outcome on stdout
    #[arg(short, long)]
    pub quiet: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (default: ~/.config/smart-volume-adjust/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Effective settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub plan: AdjustPlan,
    pub notify: bool,
    pub absolute_report: bool,
    pub quiet: bool,
}

impl Cli {
    /// Log level used when `RUST_LOG` is not set
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Combine arguments with the configuration file. Flags only ever enable.
    pub fn resolve(&self, mut config: AdjustConfig) -> Result<Settings, AdjustError> {
        if let Some(max_volume) = self.max_volume {
            config.max_volume = max_volume;
        }
        if !self.patterns.is_empty() {
            config.patterns = self.patterns.clone();
        }
        config.filter_active |= self.filter_active;
        config.default_to_sink |= self.default_to_sink;
        config.notify.enabled |= self.notify;
        config.notify.absolute |= self.notify_absolute;

        let limit: VolumeLimit = config.limit()?;
        let request = VolumeRequest::parse(&self.volume_change, self.set)?;
        let plan = AdjustPlan::new(&config.patterns, config.select_options(), request, limit)?
            .dry_run(self.dry_run);

        Ok(Settings {
            plan,
            notify: config.notify.enabled,
            absolute_report: config.notify.absolute,
            quiet: self.quiet,
        })
    }
}
