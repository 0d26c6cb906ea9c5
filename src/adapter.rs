//! Channel adapter — authenticates inbound activities, runs the bot for one
//! turn, and recovers from turn errors.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info, warn};

use crate::activity::{Activity, ERROR_VALUE_TYPE, InvokeResponse, activity_types};
use crate::config::BotConfig;
use crate::connector::Connector;
use crate::error::{ChannelError, TurnError};

/// First apology sent when a turn fails.
pub const TURN_ERROR_MESSAGE: &str = "The bot encountered an error or bug.";
/// Second apology sent when a turn fails.
pub const TURN_ERROR_FOLLOWUP: &str = "To continue to run this bot, please fix the bot source code.";
/// Channel that also receives a trace activity describing the error.
pub const DIAGNOSTIC_CHANNEL: &str = "emulator";

// ── Authentication ──────────────────────────────────────────────────────

/// Validates the `Authorization` header of inbound requests.
pub struct ChannelAuthenticator {
    app_id: String,
    app_password: SecretString,
}

impl ChannelAuthenticator {
    pub fn new(app_id: impl Into<String>, app_password: SecretString) -> Self {
        Self {
            app_id: app_id.into(),
            app_password,
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.app_id.clone(), config.app_password.clone())
    }

    /// Whether credentials are configured. Without them anonymous traffic
    /// is accepted.
    pub fn is_enabled(&self) -> bool {
        !self.app_id.is_empty()
    }

    /// Check an `Authorization` header value.
    pub fn authenticate(&self, auth_header: &str, channel: &str) -> Result<(), ChannelError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let fail = |reason: &str| ChannelError::AuthFailed {
            name: channel.to_string(),
            reason: reason.to_string(),
        };

        let token = auth_header
            .trim()
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| fail("missing bearer token"))?;

        if !constant_time_eq(token.as_bytes(), self.app_password.expose_secret().as_bytes()) {
            return Err(fail("invalid credentials"));
        }

        Ok(())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ── Turn context ────────────────────────────────────────────────────────

/// State for one turn: the inbound activity plus a way to reply.
pub struct TurnContext {
    activity: Activity,
    connector: Arc<dyn Connector>,
    responded: Mutex<bool>,
}

impl TurnContext {
    pub fn new(activity: Activity, connector: Arc<dyn Connector>) -> Self {
        Self {
            activity,
            connector,
            responded: Mutex::new(false),
        }
    }

    /// The inbound activity.
    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Whether anything has been sent during this turn.
    pub fn responded(&self) -> bool {
        self.responded.lock().map(|r| *r).unwrap_or(false)
    }

    /// Send a text message back to the conversation.
    pub async fn send_text(&self, text: &str) -> Result<(), ChannelError> {
        self.send_activity(self.activity.create_reply(text)).await
    }

    /// Send an activity, addressed back to the conversation.
    pub async fn send_activity(&self, mut outgoing: Activity) -> Result<(), ChannelError> {
        self.activity.address_reply(&mut outgoing);
        self.connector.send_activity(&outgoing).await?;
        if let Ok(mut responded) = self.responded.lock() {
            *responded = true;
        }
        Ok(())
    }
}

/// Bot logic invoked once per turn.
#[async_trait]
pub trait TurnHandler: Send + Sync {
    /// Handle the turn. Invoke activities may return a synchronous response.
    async fn on_turn(&self, ctx: &TurnContext) -> Result<Option<InvokeResponse>, TurnError>;
}

// ── Adapter ─────────────────────────────────────────────────────────────

/// Runs turns for authenticated inbound activities.
pub struct Adapter {
    auth: ChannelAuthenticator,
    connector: Arc<dyn Connector>,
}

impl Adapter {
    pub fn new(auth: ChannelAuthenticator, connector: Arc<dyn Connector>) -> Self {
        Self { auth, connector }
    }

    /// Authenticate `activity` and run `handler` for it.
    ///
    /// Returns `Some` only for invoke activities. Handler errors are handled
    /// by [`Adapter::on_turn_error`] and do not surface here; only auth
    /// failures do.
    pub async fn process_activity(
        &self,
        auth_header: &str,
        activity: Activity,
        handler: &dyn TurnHandler,
    ) -> Result<Option<InvokeResponse>, ChannelError> {
        let channel = activity.channel_id.clone().unwrap_or_default();
        self.auth.authenticate(auth_header, &channel)?;

        let is_invoke = activity.is_type(activity_types::INVOKE);
        let ctx = TurnContext::new(activity, Arc::clone(&self.connector));

        let response = match handler.on_turn(&ctx).await {
            Ok(response) => response,
            Err(e) => {
                self.on_turn_error(&ctx, &e).await;
                None
            }
        };

        if is_invoke {
            return Ok(Some(response.unwrap_or(InvokeResponse {
                status: 501,
                body: serde_json::Value::Null,
            })));
        }
        Ok(None)
    }

    /// Catch-all for errors raised while handling a turn.
    pub async fn on_turn_error(&self, ctx: &TurnContext, err: &TurnError) {
        error!(error = %err, "[on_turn_error] unhandled error");

        for text in [TURN_ERROR_MESSAGE, TURN_ERROR_FOLLOWUP] {
            if let Err(e) = ctx.send_text(text).await {
                warn!(error = %e, "Failed to send turn error message");
            }
        }

        if ctx.activity().channel_id.as_deref() == Some(DIAGNOSTIC_CHANNEL) {
            let trace = Activity::trace(
                "TurnError",
                "on_turn_error Trace",
                serde_json::Value::String(err.to_string()),
                ERROR_VALUE_TYPE,
            );
            if let Err(e) = ctx.send_activity(trace).await {
                warn!(error = %e, "Failed to send turn error trace");
            } else {
                info!("Turn error trace sent to emulator");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::connector::RecordingConnector;

    struct Failing;

    #[async_trait]
    impl TurnHandler for Failing {
        async fn on_turn(&self, _ctx: &TurnContext) -> Result<Option<InvokeResponse>, TurnError> {
            Err(TurnError::Handler("boom".into()))
        }
    }

    struct Replying;

    #[async_trait]
    impl TurnHandler for Replying {
        async fn on_turn(&self, ctx: &TurnContext) -> Result<Option<InvokeResponse>, TurnError> {
            ctx.send_text("pong").await?;
            Ok(None)
        }
    }

    fn activity(channel: &str, activity_type: &str) -> Activity {
        serde_json::from_value(json!({
            "type": activity_type,
            "id": "act-1",
            "channelId": channel,
            "serviceUrl": "http://localhost:50000",
            "from": {"id": "user-1"},
            "recipient": {"id": "bot-1"},
            "conversation": {"id": "conv-1"},
            "text": "ping"
        }))
        .unwrap()
    }

    fn adapter(auth: ChannelAuthenticator) -> (Adapter, Arc<RecordingConnector>) {
        let connector = Arc::new(RecordingConnector::new());
        let adapter = Adapter::new(auth, connector.clone());
        (adapter, connector)
    }

    fn anonymous() -> ChannelAuthenticator {
        ChannelAuthenticator::new("", SecretString::from(""))
    }

    fn secured() -> ChannelAuthenticator {
        ChannelAuthenticator::new("app-1", SecretString::from("s3cret"))
    }

    #[test]
    fn anonymous_accepts_anything() {
        let auth = anonymous();
        assert!(!auth.is_enabled());
        assert!(auth.authenticate("", "emulator").is_ok());
        assert!(auth.authenticate("Bearer whatever", "emulator").is_ok());
    }

    #[test]
    fn secured_requires_matching_bearer() {
        let auth = secured();
        assert!(auth.authenticate("Bearer s3cret", "webchat").is_ok());
        assert!(matches!(
            auth.authenticate("", "webchat"),
            Err(ChannelError::AuthFailed { .. })
        ));
        assert!(matches!(
            auth.authenticate("Bearer nope", "webchat"),
            Err(ChannelError::AuthFailed { .. })
        ));
        assert!(matches!(
            auth.authenticate("Basic s3cret", "webchat"),
            Err(ChannelError::AuthFailed { .. })
        ));
    }

    #[test]
    fn constant_time_eq_compares_bytes() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[tokio::test]
    async fn replies_are_addressed_to_sender() {
        let (adapter, connector) = adapter(anonymous());
        let result = adapter
            .process_activity("", activity("webchat", "message"), &Replying)
            .await
            .unwrap();
        assert!(result.is_none());

        let sent = connector.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text.as_deref(), Some("pong"));
        assert_eq!(sent[0].recipient.as_ref().unwrap().id, "user-1");
        assert_eq!(sent[0].reply_to_id.as_deref(), Some("act-1"));
    }

    #[tokio::test]
    async fn auth_failure_skips_handler() {
        let (adapter, connector) = adapter(secured());
        let err = adapter
            .process_activity("Bearer wrong", activity("webchat", "message"), &Replying)
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::AuthFailed { .. }));
        assert!(connector.sent().is_empty());
    }

    #[tokio::test]
    async fn turn_error_sends_two_apologies() {
        let (adapter, connector) = adapter(anonymous());
        let result = adapter
            .process_activity("", activity("webchat", "message"), &Failing)
            .await;
        assert!(matches!(result, Ok(None)));

        let texts: Vec<_> = connector.sent().into_iter().filter_map(|a| a.text).collect();
        assert_eq!(texts, [TURN_ERROR_MESSAGE, TURN_ERROR_FOLLOWUP]);
    }

    #[tokio::test]
    async fn turn_error_on_emulator_adds_trace() {
        let (adapter, connector) = adapter(anonymous());
        adapter
            .process_activity("", activity("emulator", "message"), &Failing)
            .await
            .unwrap();

        let sent = connector.sent();
        assert_eq!(sent.len(), 3);
        let trace = &sent[2];
        assert!(trace.is_type(activity_types::TRACE));
        assert_eq!(trace.label.as_deref(), Some("TurnError"));
        assert_eq!(trace.name.as_deref(), Some("on_turn_error Trace"));
        assert_eq!(trace.value_type.as_deref(), Some(ERROR_VALUE_TYPE));
        assert_eq!(trace.value, Some(json!("Handler failed: boom")));
    }

    #[tokio::test]
    async fn invoke_without_response_is_not_implemented() {
        let (adapter, _connector) = adapter(anonymous());
        let result = adapter
            .process_activity("", activity("webchat", "invoke"), &Replying)
            .await
            .unwrap();
        assert_eq!(result.map(|r| r.status), Some(501));
    }

    #[tokio::test]
    async fn context_tracks_responded() {
        let connector: Arc<dyn Connector> = Arc::new(RecordingConnector::new());
        let ctx = TurnContext::new(activity("webchat", "message"), connector);
        assert!(!ctx.responded());
        ctx.send_text("hi").await.unwrap();
        assert!(ctx.responded());
    }
}
