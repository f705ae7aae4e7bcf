//! Audio server access through the PulseAudio control tool
//!
//! `pactl` speaks to PulseAudio directly and to PipeWire through its
//! pipewire-pulse compatibility server, so one gateway covers both.

pub mod pactl;
pub mod pactl_json;

pub use pactl::PactlGateway;
