//! Outbound delivery of activities back to the channel.

use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::activity::Activity;
use crate::error::ChannelError;

/// Sends activities to the channel a turn came from.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Deliver one outgoing activity.
    async fn send_activity(&self, activity: &Activity) -> Result<(), ChannelError>;
}

/// Connector that POSTs activities to the channel's `serviceUrl`.
pub struct HttpConnector {
    client: reqwest::Client,
    /// Bearer credential attached to outgoing requests, if configured.
    token: Option<SecretString>,
}

impl HttpConnector {
    pub fn new(token: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    /// Conversations API URL for an outgoing activity.
    pub fn activity_url(activity: &Activity) -> Result<String, ChannelError> {
        let service_url = activity
            .service_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ChannelError::InvalidMessage("activity has no serviceUrl".into()))?;
        let conversation = activity
            .conversation
            .as_ref()
            .filter(|c| !c.id.is_empty())
            .ok_or_else(|| ChannelError::InvalidMessage("activity has no conversation".into()))?;

        let base = format!(
            "{}/v3/conversations/{}/activities",
            service_url.trim_end_matches('/'),
            conversation.id
        );
        Ok(match activity.reply_to_id.as_deref() {
            Some(reply_to) if !reply_to.is_empty() => format!("{base}/{reply_to}"),
            _ => base,
        })
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn send_activity(&self, activity: &Activity) -> Result<(), ChannelError> {
        let url = Self::activity_url(activity)?;
        let channel = activity.channel_id.clone().unwrap_or_default();

        let mut request = self.client.post(&url).json(activity);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request.send().await.map_err(|e| ChannelError::SendFailed {
            name: channel.clone(),
            reason: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: channel,
                reason: format!("{url} returned {status}: {body}"),
            });
        }

        debug!(url = %url, activity_type = %activity.activity_type, "Activity sent");
        Ok(())
    }
}

/// Connector that keeps sent activities in memory.
#[derive(Default)]
pub struct RecordingConnector {
    sent: Mutex<Vec<Activity>>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<Activity> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Remove and return everything sent so far.
    pub fn drain(&self) -> Vec<Activity> {
        self.sent
            .lock()
            .map(|mut s| std::mem::take(&mut *s))
            .unwrap_or_default()
    }
}

#[async_trait]
impl Connector for RecordingConnector {
    async fn send_activity(&self, activity: &Activity) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .map_err(|_| ChannelError::SendFailed {
                name: "recording".into(),
                reason: "lock poisoned".into(),
            })?
            .push(activity.clone());
        Ok(())
    }
}
