//! Activity payloads exchanged with a channel.
//!
//! Only the fields the bot reads or writes are typed. Everything else is
//! kept in `extra` so a payload survives a deserialize/serialize cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Activity `type` values the bot understands.
pub mod activity_types {
    pub const MESSAGE: &str = "message";
    pub const CONVERSATION_UPDATE: &str = "conversationUpdate";
    pub const INVOKE: &str = "invoke";
    pub const TRACE: &str = "trace";
}

/// Value type attached to turn-error trace activities.
pub const ERROR_VALUE_TYPE: &str = "https://www.botframework.com/schemas/error";

/// A user, bot, or conversation reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelAccount {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChannelAccount {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// A single activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Activity {
    /// A bare message activity carrying `text`.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            activity_type: activity_types::MESSAGE.to_string(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// A trace activity (shown by the emulator, ignored by real channels).
    pub fn trace(
        label: impl Into<String>,
        name: impl Into<String>,
        value: serde_json::Value,
        value_type: impl Into<String>,
    ) -> Self {
        Self {
            activity_type: activity_types::TRACE.to_string(),
            timestamp: Some(Utc::now()),
            label: Some(label.into()),
            name: Some(name.into()),
            value: Some(value),
            value_type: Some(value_type.into()),
            ..Default::default()
        }
    }

    pub fn is_type(&self, activity_type: &str) -> bool {
        self.activity_type == activity_type
    }

    /// Build a message replying to this activity: sender and recipient are
    /// swapped and the conversation is kept.
    pub fn create_reply(&self, text: impl Into<String>) -> Self {
        let mut reply = Self::message(text);
        self.address_reply(&mut reply);
        reply
    }

    /// Fill routing fields of an outgoing activity from this inbound one.
    /// Fields already set on `outgoing` are left alone.
    pub fn address_reply(&self, outgoing: &mut Activity) {
        if outgoing.id.is_none() {
            outgoing.id = Some(Uuid::new_v4().to_string());
        }
        if outgoing.timestamp.is_none() {
            outgoing.timestamp = Some(Utc::now());
        }
        if outgoing.channel_id.is_none() {
            outgoing.channel_id = self.channel_id.clone();
        }
        if outgoing.service_url.is_none() {
            outgoing.service_url = self.service_url.clone();
        }
        if outgoing.from.is_none() {
            outgoing.from = self.recipient.clone();
        }
        if outgoing.recipient.is_none() {
            outgoing.recipient = self.from.clone();
        }
        if outgoing.conversation.is_none() {
            outgoing.conversation = self.conversation.clone();
        }
        if outgoing.reply_to_id.is_none() {
            outgoing.reply_to_id = self.id.clone();
        }
    }
}

/// Synchronous response returned for invoke activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub status: u16,
    #[serde(default)]
    pub body: serde_json::Value,
}
