//! Desktop notifications through `org.freedesktop.Notifications`

use async_trait::async_trait;
use smart_volume_core::domain::outcome::{Notice, Notifier, NotifyError};
use std::collections::HashMap;
use tracing::{debug, instrument};
use zbus::{proxy, zvariant::Value, Connection};

use super::id_store::NotificationIdStore;

#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    /// Show a notification, replacing `replaces_id` when it is still on screen
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: HashMap<&str, Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;
}

/// Notifier talking to the session bus notification server
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
    icon: String,
    timeout_ms: i32,
    ids: NotificationIdStore,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>, timeout_ms: i32, ids: NotificationIdStore) -> Self {
        Self {
            app_name: app_name.into(),
            icon: "audio-volume-medium".to_string(),
            timeout_ms,
            ids,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    fn hints(notice: &Notice) -> HashMap<&'static str, Value<'static>> {
        let mut hints = HashMap::new();
        // rendered as a progress bar by most notification servers
        hints.insert("value", Value::I32(notice.progress));
        hints
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    #[instrument(skip(self, notice), fields(summary = %notice.summary))]
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        let connection = Connection::session()
            .await
            .map_err(|e| NotifyError::Unavailable(e.to_string()))?;
        let proxy = NotificationsProxy::new(&connection)
            .await
            .map_err(|e| NotifyError::Unavailable(e.to_string()))?;

        let replaces_id = match notice.replace_key {
            Some(key) => self.ids.load(key).await.unwrap_or(0),
            None => 0,
        };

        let id = proxy
            .notify(
                &self.app_name,
                replaces_id,
                &self.icon,
                &notice.summary,
                &notice.body,
                &[],
                Self::hints(notice),
                self.timeout_ms,
            )
            .await
            .map_err(|e| NotifyError::Rejected(e.to_string()))?;
        debug!(id, replaces_id, "Notification shown");

        // the server hands out a new id when the old bubble is already gone
        if let Some(key) = notice.replace_key {
            if id != replaces_id {
                self.ids.save(key, id).await;
            }
        }

        Ok(())
    }
}
