//! Echo bot — sends the (already classified) activity text back.

use async_trait::async_trait;
use tracing::debug;

use crate::activity::{InvokeResponse, activity_types};
use crate::adapter::{TurnContext, TurnHandler};
use crate::error::TurnError;

/// Greeting sent to members joining a conversation.
pub const WELCOME_MESSAGE: &str = "Hello and welcome!";

/// Turn handler that echoes message text and welcomes new members.
#[derive(Debug, Default, Clone)]
pub struct EchoBot;

impl EchoBot {
    pub fn new() -> Self {
        Self
    }

    async fn on_message(&self, ctx: &TurnContext) -> Result<(), TurnError> {
        let text = ctx.activity().text.clone().unwrap_or_default();
        ctx.send_text(&text).await?;
        Ok(())
    }

    async fn on_members_added(&self, ctx: &TurnContext) -> Result<(), TurnError> {
        let activity = ctx.activity();
        let bot_id = activity.recipient.as_ref().map(|r| r.id.as_str());

        for member in &activity.members_added {
            if Some(member.id.as_str()) != bot_id {
                ctx.send_text(WELCOME_MESSAGE).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TurnHandler for EchoBot {
    async fn on_turn(&self, ctx: &TurnContext) -> Result<Option<InvokeResponse>, TurnError> {
        let activity = ctx.activity();
        match activity.activity_type.as_str() {
            activity_types::MESSAGE => self.on_message(ctx).await?,
            activity_types::CONVERSATION_UPDATE => self.on_members_added(ctx).await?,
            other => debug!(activity_type = %other, "Ignoring activity"),
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::activity::Activity;
    use crate::connector::RecordingConnector;

    fn context(value: serde_json::Value) -> (TurnContext, Arc<RecordingConnector>) {
        let activity: Activity = serde_json::from_value(value).unwrap();
        let connector = Arc::new(RecordingConnector::new());
        (TurnContext::new(activity, connector.clone()), connector)
    }

    #[tokio::test]
    async fn echoes_message_text() {
        let (ctx, connector) = context(json!({
            "type": "message",
            "from": {"id": "user-1"},
            "recipient": {"id": "bot-1"},
            "conversation": {"id": "conv-1"},
            "text": "ananab"
        }));
        EchoBot::new().on_turn(&ctx).await.unwrap();

        let sent = connector.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text.as_deref(), Some("ananab"));
    }

    #[tokio::test]
    async fn welcomes_everyone_but_the_bot() {
        let (ctx, connector) = context(json!({
            "type": "conversationUpdate",
            "recipient": {"id": "bot-1"},
            "conversation": {"id": "conv-1"},
            "membersAdded": [{"id": "bot-1"}, {"id": "user-1"}, {"id": "user-2"}]
        }));
        EchoBot::new().on_turn(&ctx).await.unwrap();

        let sent = connector.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|a| a.text.as_deref() == Some(WELCOME_MESSAGE)));
    }

    #[tokio::test]
    async fn ignores_other_activity_types() {
        let (ctx, connector) = context(json!({"type": "typing"}));
        let result = EchoBot::new().on_turn(&ctx).await.unwrap();
        assert!(result.is_none());
        assert!(connector.sent().is_empty());
    }
}
