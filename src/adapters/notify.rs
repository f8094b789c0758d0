//! Notification dispatcher - posts a failure summary to a chat webhook
//!
//! Delivery is best effort: a missing webhook, a non-2xx answer or a network
//! error is logged and reported as `false`, never as an error.

use std::time::Duration;

use log::{debug, warn};
use serde_json::{Value, json};

use crate::config::{NotificationsConfig, Provider};
use crate::core::models::Commit;

/// Per-request timeout for webhook delivery
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The commit a notification points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suspect {
    /// Author name
    pub author: String,
    /// Abbreviated hash
    pub sha: String,
}

impl From<&Commit> for Suspect {
    fn from(commit: &Commit) -> Self {
        Self {
            author: commit.author.clone(),
            sha: commit.sha.clone(),
        }
    }
}

/// Text of the failure notification
#[must_use]
pub fn format_message(message: &str, branch: &str, suspect: Option<&Suspect>) -> String {
    let mut text = format!("[P5] ❌ {message} on branch {branch}.");
    if let Some(suspect) = suspect {
        text.push_str(&format!(" Likely: @{} ({})", suspect.author, suspect.sha));
    }
    text
}

/// JSON body for a provider, `None` when the provider takes no messages
#[must_use]
pub fn payload(provider: Provider, text: &str) -> Option<Value> {
    match provider {
        Provider::None => None,
        Provider::Slack => Some(json!({ "text": text })),
        Provider::Discord => Some(json!({ "content": text })),
    }
}

/// Post a failure summary to the configured webhook
///
/// Returns whether the message was delivered.
pub async fn notify(
    config: &NotificationsConfig,
    message: &str,
    branch: &str,
    suspect: Option<&Suspect>,
) -> bool {
    let Some(webhook) = config.webhook.as_deref().filter(|w| !w.trim().is_empty()) else {
        debug!("No webhook configured, skipping notification");
        return false;
    };
    let text = format_message(message, branch, suspect);
    let Some(body) = payload(config.provider, &text) else {
        debug!("Notifications disabled, skipping");
        return false;
    };

    let client = match reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            warn!("Failed to build HTTP client: {e}");
            return false;
        },
    };

    match client.post(webhook).json(&body).send().await {
        Ok(response) if response.status().is_success() => {
            debug!("Notification delivered ({})", response.status());
            true
        },
        Ok(response) => {
            warn!("Notification rejected by {} webhook: {}", config.provider, response.status());
            false
        },
        Err(e) => {
            warn!("Failed to send notification: {e}");
            false
        },
    }
}
