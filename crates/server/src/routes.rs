use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use highfive_slack::blocks::{self, MessageTemplate, MESSAGE_BLOCK_ID};
use highfive_slack::commands::{
    normalize_highfive_command, CommandReply, CommandRouter, SlashCommandPayload,
};
use highfive_slack::interactions::{
    parse_interaction_payload, InteractionError, InteractionPayload, ViewSubmissionResponse,
};
use highfive_slack::signature::{verify_slack_signature, SIGNATURE_HEADER, TIMESTAMP_HEADER};

use crate::health::{self, HealthState};
use crate::service::RecognitionService;

const MAX_SLACK_BODY_BYTES: usize = 256 * 1024;

#[derive(Clone)]
pub struct AppState {
    service: RecognitionService,
    commands: Arc<CommandRouter<RecognitionService>>,
    signing_secret: Option<Arc<SecretString>>,
}

impl AppState {
    pub fn new(service: RecognitionService, signing_secret: Option<SecretString>) -> Self {
        Self {
            commands: Arc::new(CommandRouter::new(service.clone())),
            service,
            signing_secret: signing_secret.map(Arc::new),
        }
    }
}

#[derive(Deserialize)]
struct InteractionForm {
    payload: String,
}

pub fn router(state: AppState) -> Router {
    let slack = Router::new()
        .route("/slack/commands", post(slash_command))
        .route("/slack/interactions", post(interaction))
        .route_layer(middleware::from_fn_with_state(state.clone(), verify_slack_request));

    let health = health::router(HealthState::new(Arc::clone(state.service.store())));

    Router::new()
        .merge(slack)
        .route("/test-post", get(test_post))
        .with_state(state)
        .merge(health)
}

async fn verify_slack_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(secret) = state.signing_secret.as_ref() else {
        return next.run(request).await;
    };

    let (parts, body) = request.into_parts();
    let Ok(bytes) = axum::body::to_bytes(body, MAX_SLACK_BODY_BYTES).await else {
        return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
    };

    let header = |name: &str| parts.headers.get(name).and_then(|value| value.to_str().ok());
    let verified = verify_slack_signature(
        secret.expose_secret().as_bytes(),
        header(TIMESTAMP_HEADER),
        header(SIGNATURE_HEADER),
        &bytes,
        Utc::now().timestamp(),
    );
    if let Err(error) = verified {
        warn!(
            event_name = "slack.signature.rejected",
            correlation_id = "unassigned",
            path = %parts.uri.path(),
            error = %error,
            "rejected unsigned or mis-signed slack request"
        );
        return (StatusCode::UNAUTHORIZED, "invalid slack signature").into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn slash_command(
    State(state): State<AppState>,
    Form(payload): Form<SlashCommandPayload>,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    info!(
        event_name = "slack.command.received",
        correlation_id = %correlation_id,
        user_id = %payload.user_id,
        channel_id = %payload.channel_id,
        text = %payload.text,
        "slash command received"
    );

    let envelope = match normalize_highfive_command(payload, correlation_id.clone()) {
        Ok(envelope) => envelope,
        Err(error) => {
            return ephemeral(&blocks::error_message(&error.to_string(), &correlation_id));
        }
    };

    match state.commands.route(envelope).await {
        Ok(CommandReply::Acknowledged) => StatusCode::OK.into_response(),
        Ok(CommandReply::Ephemeral(message)) => ephemeral(&message),
        Err(error) => {
            warn!(
                event_name = "slack.command.failed",
                correlation_id = %correlation_id,
                error = %error,
                "slash command could not be completed"
            );
            ephemeral(&blocks::error_message(
                "High-Five could not complete that command. Please retry shortly.",
                &correlation_id,
            ))
        }
    }
}

async fn interaction(State(state): State<AppState>, Form(form): Form<InteractionForm>) -> Response {
    let correlation_id = Uuid::new_v4().to_string();

    let (user, view) = match parse_interaction_payload(&form.payload) {
        Ok(InteractionPayload::ViewSubmission { user, view }) => (user, view),
        Ok(InteractionPayload::Unsupported) => return StatusCode::OK.into_response(),
        Err(error) => {
            warn!(
                event_name = "slack.interaction.malformed",
                correlation_id = %correlation_id,
                error = %error,
                "interaction payload could not be decoded"
            );
            return (StatusCode::BAD_REQUEST, "malformed interaction payload").into_response();
        }
    };

    let event = match view.recognition(&user.id) {
        Ok(event) => event,
        Err(InteractionError::UnexpectedCallback(callback_id)) => {
            info!(
                event_name = "slack.interaction.ignored",
                correlation_id = %correlation_id,
                callback_id = %callback_id,
                "ignoring submission for another view"
            );
            return StatusCode::OK.into_response();
        }
        Err(error) => {
            let message = match &error {
                InteractionError::MissingField { .. } => "This field is required.".to_owned(),
                other => other.to_string(),
            };
            let block_id = error.block_id().unwrap_or(MESSAGE_BLOCK_ID);
            return Json(ViewSubmissionResponse::field_error(block_id, message)).into_response();
        }
    };

    match state.service.submit(&event, &correlation_id).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(error) => {
            let interface = error.into_interface(correlation_id.clone());
            let message =
                format!("{} (reference {})", interface.user_message(), interface.correlation_id());
            Json(ViewSubmissionResponse::field_error(MESSAGE_BLOCK_ID, message)).into_response()
        }
    }
}

async fn test_post(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.service.post_test_message().await {
        Ok(_) => (StatusCode::OK, "Test message sent!"),
        Err(error) => {
            error!(
                event_name = "slack.test_post.failed",
                correlation_id = "test-post",
                error = %error,
                "test message could not be posted"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send test message")
        }
    }
}

fn ephemeral(message: &MessageTemplate) -> Response {
    Json(json!({
        "response_type": "ephemeral",
        "text": message.fallback_text,
        "blocks": message.blocks,
    }))
    .into_response()
}
