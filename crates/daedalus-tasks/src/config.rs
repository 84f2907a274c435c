//! Background job configuration.

use serde::{Deserialize, Serialize};

/// Which queue manager variant to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueMode {
    /// Run jobs in-process as they are submitted.
    #[default]
    Local,
    /// Ship jobs to a network queue.
    Remote,
}

/// Addresses of the network queue and its wake-up notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteQueueSettings {
    /// Queue that receives serialized job entries.
    pub queue_url: String,
    /// Channel that receives start-processing notifications.
    pub notification_address: String,
}

/// Background job settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackgroundConfig {
    /// Queue manager variant.
    pub mode: QueueMode,
    /// Prefix for job storage paths.
    pub path_prefix: Option<String>,
    /// Remote queue addresses; required in remote mode.
    pub remote: Option<RemoteQueueSettings>,
}

impl BackgroundConfig {
    /// Returns every problem with this configuration for the given
    /// processor type names. An empty list means the configuration is usable.
    pub fn validate(&self, process_names: &[String]) -> Vec<String> {
        let mut errors = Vec::new();
        if process_names.is_empty() {
            errors.push("No processes specified".to_string());
        }
        if self.mode == QueueMode::Remote {
            match &self.remote {
                None => errors.push("Remote queue config not defined".to_string()),
                Some(remote) => {
                    if remote.notification_address.trim().is_empty() {
                        errors.push("Remote queue config missing notification address".to_string());
                    }
                    if remote.queue_url.trim().is_empty() {
                        errors.push("Remote queue config missing queue url".to_string());
                    }
                }
            }
        }
        errors
    }
}
