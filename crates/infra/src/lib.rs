//! Collaborators of smart-volume-adjust that touch the outside world
//!
//! - [`audio`]: the audio server gateway (`pactl`)
//! - [`notification`]: desktop notifications over D-Bus

pub mod audio;
pub mod notification;

pub use audio::PactlGateway;
pub use notification::{DesktopNotifier, NotificationIdStore};
