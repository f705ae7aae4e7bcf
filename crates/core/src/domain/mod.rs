//! Domain entities and business rules

pub mod adjust;
pub mod audio;
pub mod config;
pub mod outcome;
pub mod selector;
pub mod volume;

pub use adjust::{
    AdjustError, AdjustPlan, VolumeAdjuster, EXIT_ENVIRONMENT, EXIT_INVALID_INPUT,
    EXIT_NOTHING_MATCHED, EXIT_OK,
};
pub use audio::{AudioGateway, Device, GatewayError, Snapshot, Stream, TargetId, Volume};
pub use config::{AdjustConfig, ConfigError, NotifyConfig, PulseConfig};
pub use outcome::{Adjustment, Notice, Notifier, NotifyError, Outcome};
pub use selector::{PatternList, PatternMatch, SelectError, SelectOptions, Selection, Target};
pub use volume::{ChangeMode, VolumeLimit, VolumeParseError, VolumeRequest};
