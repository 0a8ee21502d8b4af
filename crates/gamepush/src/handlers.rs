// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the management surface.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use gamepush_channels::{CallbackKind, CallbackMessage, verify_signature};
use gamepush_core::{
    ConfirmAction, ContactType, GameInfo, GamepushError, HealthStatus, NewSubscriber,
    PromotionWindow, PushLog, Subscriber,
};
use gamepush_notify::{ConfirmOutcome, InboundReply, WELCOME_TEXT};
use gamepush_scheduler::{JobId, JobStatus, TriggerOutcome};
use gamepush_storage::PushLogFilter;
use gamepush_storage::queries::{push_logs, subscribers};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::server::AppState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error: a rejected request or a core failure.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Extractor rejection, keeping axum's status and message.
    Rejected { status: StatusCode, message: String },
    Forbidden(String),
    Core(GamepushError),
}

impl From<GamepushError> for ApiError {
    fn from(e: GamepushError) -> Self {
        Self::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Rejected { status, message } => (status, message),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            Self::Core(e) => {
                let status = match &e {
                    GamepushError::NotFound { .. } => StatusCode::NOT_FOUND,
                    GamepushError::Conflict(_) => StatusCode::CONFLICT,
                    GamepushError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!(error = %e, "request failed");
                }
                (status, e.to_string())
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Health of one channel sender.
#[derive(Debug, Serialize)]
pub struct ChannelHealth {
    pub contact_type: ContactType,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when storage is reachable, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub database: &'static str,
    pub channels: Vec<ChannelHealth>,
}

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_ok = state.app.db.ping().await.is_ok();
    let channels = state
        .app
        .router
        .health()
        .into_iter()
        .map(|(contact_type, health)| ChannelHealth {
            contact_type,
            status: health.label(),
            detail: match health {
                HealthStatus::Healthy => None,
                HealthStatus::Degraded(d) | HealthStatus::Unhealthy(d) => Some(d),
            },
        })
        .collect();
    Json(HealthResponse {
        status: if database_ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
        database: if database_ok { "ok" } else { "unreachable" },
        channels,
    })
}

/// GET /games/{window}
pub async fn get_games(
    State(state): State<AppState>,
    ApiPath(window): ApiPath<PromotionWindow>,
) -> ApiResult<Vec<GameInfo>> {
    Ok(Json(state.app.cache.list(window).await?))
}

/// Runs a job through the scheduler so manual runs respect the per-job lock.
async fn run_job(state: &AppState, id: JobId) -> Result<Response, ApiError> {
    let outcome = state.app.scheduler.trigger(id).await?;
    let status = match outcome {
        TriggerOutcome::Completed { .. } => StatusCode::OK,
        TriggerOutcome::Busy => StatusCode::CONFLICT,
    };
    Ok((status, Json(outcome)).into_response())
}

/// POST /games/refresh
pub async fn post_refresh(State(state): State<AppState>) -> Result<Response, ApiError> {
    run_job(&state, JobId::Refresh).await
}

/// POST /push/{window}
pub async fn post_push_window(
    State(state): State<AppState>,
    ApiPath(window): ApiPath<PromotionWindow>,
) -> Result<Response, ApiError> {
    run_job(&state, JobId::dispatch(window)).await
}

/// POST /jobs/{id}/run
pub async fn post_run_job(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<JobId>,
) -> Result<Response, ApiError> {
    run_job(&state, id).await
}

/// GET /jobs
pub async fn get_jobs(State(state): State<AppState>) -> Json<Vec<JobStatus>> {
    Json(state.app.scheduler.status().await)
}

/// Request body for POST /push.
#[derive(Debug, Deserialize)]
pub struct PushRequest {
    #[serde(default = "default_window")]
    pub window: PromotionWindow,
    pub subscriber_id: i64,
    pub slug: String,
}

fn default_window() -> PromotionWindow {
    PromotionWindow::Current
}

/// POST /push
///
/// Holds the window's dispatch job lock so a manual push cannot race a
/// scheduled pass over the same pair. Answers 409 while that job runs.
pub async fn post_push_one(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PushRequest>,
) -> Result<Response, ApiError> {
    let app = &state.app;
    let push = app
        .dispatcher
        .dispatch_one(body.window, body.subscriber_id, &body.slug);
    match app
        .scheduler
        .run_exclusive(JobId::dispatch(body.window), push)
        .await?
    {
        Some(result) => Ok(Json(result?).into_response()),
        None => Ok((StatusCode::CONFLICT, Json(TriggerOutcome::Busy)).into_response()),
    }
}

/// Request body for POST /confirmation.
///
/// Without `slug`, the most recent eligible push of any game is used.
#[derive(Debug, Deserialize)]
pub struct ConfirmationRequest {
    pub subscriber_id: i64,
    #[serde(default)]
    pub slug: Option<String>,
    pub action: ConfirmAction,
}

/// POST /confirmation
pub async fn post_confirmation(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ConfirmationRequest>,
) -> ApiResult<ConfirmOutcome> {
    let confirmations = &state.app.confirmations;
    let outcome = match body.slug.as_deref() {
        Some(slug) => {
            confirmations
                .apply(body.subscriber_id, slug, body.action)
                .await?
        }
        None => {
            confirmations
                .apply_latest(body.subscriber_id, body.action)
                .await?
        }
    };
    Ok(Json(outcome))
}

/// Request body for POST /inbound/{contact_type}.
#[derive(Debug, Deserialize)]
pub struct InboundRequest {
    pub contact_id: String,
    pub text: String,
}

/// POST /inbound/{contact_type}
///
/// Entry point for channel relays forwarding a subscriber's text reply.
pub async fn post_inbound(
    State(state): State<AppState>,
    ApiPath(contact_type): ApiPath<ContactType>,
    ApiJson(body): ApiJson<InboundRequest>,
) -> ApiResult<InboundReply> {
    let reply = state
        .app
        .inbound
        .handle(contact_type, &body.contact_id, &body.text)
        .await?;
    Ok(Json(reply))
}

/// GET /subscribers
pub async fn get_subscribers(State(state): State<AppState>) -> ApiResult<Vec<Subscriber>> {
    Ok(Json(subscribers::list_subscribers(&state.app.db).await?))
}

/// POST /subscribers
pub async fn post_subscriber(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewSubscriber>,
) -> Result<(StatusCode, Json<Subscriber>), ApiError> {
    if body.epic_account.trim().is_empty() || body.contact_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "epic_account and contact_id must not be empty".to_string(),
        ));
    }
    let subscriber = subscribers::create_subscriber(&state.app.db, &body).await?;
    Ok((StatusCode::CREATED, Json(subscriber)))
}

/// GET /subscribers/{id}
pub async fn get_subscriber(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Subscriber> {
    subscribers::get_subscriber(&state.app.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| subscriber_not_found(id))
}

/// DELETE /subscribers/{id}
pub async fn delete_subscriber(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    if subscribers::delete_subscriber(&state.app.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(subscriber_not_found(id))
    }
}

fn subscriber_not_found(id: i64) -> ApiError {
    ApiError::Core(GamepushError::NotFound {
        entity: "subscriber",
        id: id.to_string(),
    })
}

/// GET /logs
pub async fn get_logs(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PushLogFilter>,
) -> ApiResult<Vec<PushLog>> {
    Ok(Json(push_logs::list_push_logs(&state.app.db, &filter).await?))
}

/// GET /logs/subscriber/{id}
pub async fn get_subscriber_logs(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(mut filter): ApiQuery<PushLogFilter>,
) -> ApiResult<Vec<PushLog>> {
    filter.subscriber_id = Some(id);
    Ok(Json(push_logs::list_push_logs(&state.app.db, &filter).await?))
}

/// Query string the official account platform appends to every callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub signature: String,
    pub timestamp: String,
    pub nonce: String,
    /// Present only on the URL verification request.
    #[serde(default)]
    pub echostr: Option<String>,
    /// `aes` in safe mode; only plaintext mode is accepted.
    #[serde(default)]
    pub encrypt_type: Option<String>,
}

fn verify_callback(state: &AppState, query: &CallbackQuery) -> Result<(), ApiError> {
    let token = &state.app.wechat_token;
    if token.is_empty() {
        return Err(ApiError::Core(GamepushError::Config(
            "wechat.token is not configured".to_string(),
        )));
    }
    if !verify_signature(token, &query.signature, &query.timestamp, &query.nonce) {
        warn!(timestamp = %query.timestamp, "wechat callback signature mismatch");
        return Err(ApiError::Forbidden("invalid signature".to_string()));
    }
    Ok(())
}

/// GET /wechat/callback
///
/// URL verification: echoes `echostr` back when the signature checks out.
pub async fn get_wechat_callback(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CallbackQuery>,
) -> Result<String, ApiError> {
    verify_callback(&state, &query)?;
    query
        .echostr
        .ok_or_else(|| ApiError::BadRequest("missing echostr".to_string()))
}

/// POST /wechat/callback
///
/// Text messages go through the inbound reply handler and the reply text is
/// returned as a passive XML reply. A follow event gets the welcome text.
/// Anything else is acknowledged with `success`.
pub async fn post_wechat_callback(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CallbackQuery>,
    body: String,
) -> Result<Response, ApiError> {
    verify_callback(&state, &query)?;
    if query
        .encrypt_type
        .as_deref()
        .is_some_and(|mode| !mode.eq_ignore_ascii_case("raw"))
    {
        return Err(ApiError::BadRequest(
            "encrypted callbacks are not supported, switch the account to plaintext mode"
                .to_string(),
        ));
    }
    let message = CallbackMessage::parse(&body)
        .map_err(|e| ApiError::BadRequest(format!("malformed callback body: {e}")))?;

    let reply_text = match message.kind() {
        CallbackKind::Text(text) => {
            state
                .app
                .inbound
                .handle(ContactType::WechatOfficial, &message.from_user_name, text)
                .await?
                .reply_text
        }
        CallbackKind::Subscribe => WELCOME_TEXT.to_string(),
        CallbackKind::Other => return Ok("success".into_response()),
    };
    let xml = message.text_reply(&reply_text, chrono::Utc::now().timestamp());
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml).into_response())
}
