//! Persistence of notification ids between invocations
//!
//! Each run is a separate process, so the id the notification server handed
//! out last time is kept in a small file per target. Passing it back as
//! `replaces_id` updates the visible bubble instead of stacking a new one.

use smart_volume_core::domain::audio::TargetId;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const FILE_PREFIX: &str = "smart-volume-adjust";

#[derive(Debug, Clone)]
pub struct NotificationIdStore {
    dir: PathBuf,
}

impl Default for NotificationIdStore {
    /// Uses `$XDG_RUNTIME_DIR`, or the temp directory when it is not set
    fn default() -> Self {
        Self::new(dirs::runtime_dir().unwrap_or_else(std::env::temp_dir))
    }
}

impl NotificationIdStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, target: TargetId) -> PathBuf {
        self.dir
            .join(format!("{FILE_PREFIX}-{}-{}", target.kind(), target.index()))
    }

    /// Last id shown for this target, if any
    pub async fn load(&self, target: TargetId) -> Option<u32> {
        let path = self.path_for(target);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read notification id file");
                return None;
            }
        };

        match contents.trim().parse::<u32>() {
            Ok(id) => {
                debug!(path = %path.display(), id, "Loaded notification id");
                Some(id)
            }
            Err(_) => {
                warn!(path = %path.display(), "Notification id file malformed, ignoring");
                None
            }
        }
    }

    /// Remember the id for the next invocation. Failures are only logged.
    pub async fn save(&self, target: TargetId, id: u32) {
        let path = self.path_for(target);
        if let Err(e) = fs::write(&path, id.to_string()).await {
            warn!(path = %path.display(), error = %e, "Failed to save notification id");
        }
    }
}
