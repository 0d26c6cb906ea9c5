//! HTTP boundary — `POST /api/messages` and `GET /health`.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::activity::Activity;
use crate::adapter::{Adapter, ChannelAuthenticator, TurnHandler};
use crate::bot::EchoBot;
use crate::classifier::Classifier;
use crate::config::BotConfig;
use crate::connector::{Connector, HttpConnector};
use crate::error::ChannelError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
    pub adapter: Arc<Adapter>,
    pub bot: Arc<dyn TurnHandler>,
}

impl AppState {
    pub fn new(classifier: Classifier, adapter: Adapter, bot: Arc<dyn TurnHandler>) -> Self {
        Self {
            classifier: Arc::new(classifier),
            adapter: Arc::new(adapter),
            bot,
        }
    }

    /// Standard wiring: default classifier, echo bot, HTTP connector.
    pub fn from_config(config: &BotConfig) -> Self {
        let auth = ChannelAuthenticator::from_config(config);
        let token = auth.is_enabled().then(|| config.app_password.clone());
        let connector: Arc<dyn Connector> = Arc::new(HttpConnector::new(token));

        Self::new(
            Classifier::new(),
            Adapter::new(auth, connector),
            Arc::new(EchoBot::new()),
        )
    }
}

/// Build the Axum router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/messages", post(messages))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until the process exits.
pub async fn serve(config: &BotConfig, state: AppState) -> crate::error::Result<()> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, "Bot listening on /api/messages");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "echo-bot"
    }))
}

// ── Messages ────────────────────────────────────────────────────────────

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

async fn messages(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if !header_str(&headers, header::CONTENT_TYPE).contains("application/json") {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    }

    let mut payload = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return bad_request("payload must be a JSON object".to_string()),
        Err(e) => return bad_request(format!("invalid JSON: {e}")),
    };

    let user_text = payload
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    info!(text = %user_text, "User input");

    let classification = state.classifier.classify_with_rule(&user_text);
    info!(rule = classification.rule, reply = %classification.reply, "Bot response");
    payload.insert("text".to_string(), Value::String(classification.reply));

    let activity: Activity = match serde_json::from_value(Value::Object(payload)) {
        Ok(activity) => activity,
        Err(e) => return bad_request(format!("invalid activity: {e}")),
    };

    let auth_header = header_str(&headers, header::AUTHORIZATION);

    match state
        .adapter
        .process_activity(auth_header, activity, state.bot.as_ref())
        .await
    {
        Ok(Some(response)) => {
            debug!(status = response.status, "Returning invoke response");
            let status =
                StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(response.body)).into_response()
        }
        Ok(None) => StatusCode::OK.into_response(),
        Err(e @ ChannelError::AuthFailed { .. }) => {
            warn!(error = %e, "Rejected unauthenticated request");
            StatusCode::UNAUTHORIZED.into_response()
        }
        Err(e) => {
            warn!(error = %e, "Failed to process activity");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
