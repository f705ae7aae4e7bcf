//! Desktop notification delivery

pub mod desktop;
pub mod id_store;

pub use desktop::DesktopNotifier;
pub use id_store::NotificationIdStore;
