use axum::extract::{Extension, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::client::DaemonConfig;
use crate::error::AppError;
use crate::observability::correlation::RequestContext;
use crate::observability::sanitize_password;
use crate::router::handlers::InContext;
use crate::state::AppState;
use crate::teams::{ConnectionStatus, Permission};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub base_url: String,
    /// Empty or missing keeps the stored password
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Daemon connection as shown to the front-end; the password never leaves
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub base_url: String,
    pub is_active: bool,
    pub has_password: bool,
}

impl From<&DaemonConfig> for ConfigView {
    fn from(config: &DaemonConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            is_active: config.is_active,
            has_password: !config.password.is_empty(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub config: Option<ConfigView>,
    pub status: Option<ConnectionStatus>,
}

async fn read_config(state: &AppState, team_id: &str) -> Result<ConfigResponse, AppError> {
    let config = state.store.get_config(team_id).await.map_err(|e| {
        error!(team_id = %team_id, error = %e, "Failed to read daemon config");
        AppError::store_error(format!("Failed to read daemon config: {}", e))
    })?;
    let status = state.store.get_status(team_id).await.map_err(|e| {
        error!(team_id = %team_id, error = %e, "Failed to read connection status");
        AppError::store_error(format!("Failed to read connection status: {}", e))
    })?;

    Ok(ConfigResponse {
        config: config.as_ref().map(ConfigView::from),
        status,
    })
}

#[instrument(skip_all, fields(team_id = %team_id, base_url = %update.base_url))]
async fn _update_config(
    state: &AppState,
    team_id: &str,
    update: ConfigUpdate,
) -> Result<ConfigResponse, AppError> {
    let existing = state.store.get_config(team_id).await.map_err(|e| {
        AppError::store_error(format!("Failed to read daemon config: {}", e))
    })?;

    let password = match update.password.filter(|password| !password.is_empty()) {
        Some(password) => password,
        None => existing.map(|config| config.password).unwrap_or_default(),
    };

    let config = DaemonConfig {
        base_url: update.base_url,
        password,
        is_active: update.is_active,
    }
    .normalized()?;

    info!(
        base_url = %config.base_url,
        password = %sanitize_password(&config.password),
        is_active = config.is_active,
        "Saving daemon config"
    );

    state
        .store
        .set_config(team_id, config)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to save daemon config");
            AppError::store_error(format!("Failed to save daemon config: {}", e))
        })?;

    read_config(state, team_id).await
}

#[axum_macros::debug_handler]
pub async fn handle_get(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ConfigResponse>, AppError> {
    state
        .authorize(&headers, &team_id, Permission::View)
        .await
        .in_context(&context)?;
    let response = read_config(&state, &team_id).await.in_context(&context)?;
    Ok(Json(response))
}

#[axum_macros::debug_handler]
pub async fn handle_put(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<ConfigUpdate>,
) -> Result<Json<ConfigResponse>, AppError> {
    state
        .authorize(&headers, &team_id, Permission::Manage)
        .await
        .in_context(&context)?;
    let response = _update_config(&state, &team_id, update)
        .await
        .in_context(&context)?;
    Ok(Json(response))
}
