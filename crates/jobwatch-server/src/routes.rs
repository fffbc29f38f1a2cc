use std::sync::Arc;

use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use jobwatch_core::error::AppError;
use jobwatch_core::platform::Platform;
use jobwatch_core::traits::{ChatSurface, FilterStore, MessageRef};

use crate::auth::verify_token;
use crate::dto::{ActionForm, ActionPayload, HealthResponse, SlashCommandForm};
use crate::error::ApiError;
use crate::state::AppState;

/// Build the router for the Slack command surface.
pub fn router<F, C>(state: Arc<AppState<F, C>>) -> Router
where
    F: FilterStore + 'static,
    C: ChatSurface + 'static,
{
    Router::new()
        .route("/health", get(health::<F, C>))
        .route("/categories/{platform}", post(categories::<F, C>))
        .route("/keywords/{platform}", post(keywords::<F, C>))
        .route("/action", post(action::<F, C>))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// 200 when the database answers, 503 otherwise.
pub async fn health<F, C>(State(state): State<Arc<AppState<F, C>>>) -> impl IntoResponse
where
    F: FilterStore,
    C: ChatSurface,
{
    let (status, response) = match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            HealthResponse {
                status: "healthy",
                database: "ok",
                version: env!("CARGO_PKG_VERSION"),
            },
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthResponse {
                    status: "unhealthy",
                    database: "error",
                    version: env!("CARGO_PKG_VERSION"),
                },
            )
        }
    };

    (status, Json(response))
}

// ---------------------------------------------------------------------------
// Slash commands
// ---------------------------------------------------------------------------

/// `/categories`: post the category list for a platform.
pub async fn categories<F, C>(
    State(state): State<Arc<AppState<F, C>>>,
    Path(platform): Path<String>,
    Form(form): Form<SlashCommandForm>,
) -> Result<StatusCode, ApiError>
where
    F: FilterStore,
    C: ChatSurface,
{
    verify_token(&state.verification_token, &form.token)?;
    let platform: Platform = platform.parse()?;
    tracing::info!(%platform, user = %form.user_name, "Categories requested");

    state.commands.show_categories(platform).await;
    Ok(StatusCode::OK)
}

/// `/keywords`: open the keyword dialog for a platform.
pub async fn keywords<F, C>(
    State(state): State<Arc<AppState<F, C>>>,
    Path(platform): Path<String>,
    Form(form): Form<SlashCommandForm>,
) -> Result<StatusCode, ApiError>
where
    F: FilterStore,
    C: ChatSurface,
{
    verify_token(&state.verification_token, &form.token)?;
    let platform: Platform = platform.parse()?;
    if form.trigger_id.is_empty() {
        return Err(ApiError::BadRequest("missing trigger_id".into()));
    }
    tracing::info!(%platform, user = %form.user_name, "Keywords dialog requested");

    state
        .commands
        .show_keywords(platform, &form.trigger_id)
        .await;
    Ok(StatusCode::OK)
}

// ---------------------------------------------------------------------------
// Interactive callbacks
// ---------------------------------------------------------------------------

/// Button clicks (`{platform}_category`) and dialog submissions (`{platform}_keywords`).
pub async fn action<F, C>(
    State(state): State<Arc<AppState<F, C>>>,
    Form(form): Form<ActionForm>,
) -> Result<StatusCode, ApiError>
where
    F: FilterStore,
    C: ChatSurface,
{
    let payload: ActionPayload = serde_json::from_str(&form.payload).map_err(AppError::from)?;
    verify_token(&state.verification_token, &payload.token)?;

    let (platform, callback) = payload.callback_id.rsplit_once('_').ok_or_else(|| {
        ApiError::BadRequest(format!("unrecognised callback_id '{}'", payload.callback_id))
    })?;
    let platform: Platform = platform.parse()?;

    match callback {
        "category" => {
            let key = payload
                .actions
                .first()
                .map(|a| a.value.as_str())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ApiError::BadRequest("category action without a value".into()))?;
            let message = MessageRef {
                channel: payload
                    .channel
                    .as_ref()
                    .map(|c| c.id.clone())
                    .ok_or_else(|| ApiError::BadRequest("missing channel".into()))?,
                ts: payload
                    .message_ts()
                    .ok_or_else(|| ApiError::BadRequest("missing message timestamp".into()))?
                    .to_string(),
            };
            state
                .commands
                .toggle_category(platform, key, &message)
                .await;
        }
        "keywords" => {
            let raw = payload
                .submission
                .as_ref()
                .and_then(|s| s.keywords.as_deref())
                .unwrap_or_default();
            state.commands.submit_keywords(platform, raw).await;
        }
        other => {
            return Err(ApiError::BadRequest(format!(
                "unsupported callback '{other}'"
            )));
        }
    }

    Ok(StatusCode::OK)
}
