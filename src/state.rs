use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::{error, info};

use crate::auth::{self, TeamAccess};
use crate::client::{DaemonConfig, FmcdClient};
use crate::error::AppError;
use crate::teams::{ConfigStore, ConnectionStatus, Permission, TeamDirectory};

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

/// Shared handles built once at startup and cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub client: FmcdClient,
    pub store: Arc<dyn ConfigStore>,
    pub directory: Arc<dyn TeamDirectory>,
}

impl AppState {
    pub fn new(
        client: FmcdClient,
        store: Arc<dyn ConfigStore>,
        directory: Arc<dyn TeamDirectory>,
    ) -> Self {
        info!(policy = ?client.policy(), "Application state initialized");
        Self {
            client,
            store,
            directory,
        }
    }

    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        team_id: &str,
        permission: Permission,
    ) -> Result<TeamAccess, AppError> {
        auth::authorize(self.directory.as_ref(), headers, team_id, permission).await
    }

    /// The team's daemon config; missing and inactive configs are both
    /// reported as not configured
    pub async fn daemon_config(&self, team_id: &str) -> Result<DaemonConfig, AppError> {
        let config = self.store.get_config(team_id).await.map_err(|e| {
            error!(team_id = %team_id, error = %e, "Failed to read daemon config");
            AppError::store_error(format!("Failed to read daemon config: {}", e))
        })?;

        match config {
            Some(config) if config.is_active => Ok(config),
            _ => Err(AppError::not_configured(team_id)),
        }
    }

    /// Authorize the caller, then load the team's daemon config
    pub async fn authorized_daemon(
        &self,
        headers: &HeaderMap,
        team_id: &str,
        permission: Permission,
    ) -> Result<DaemonConfig, AppError> {
        self.authorize(headers, team_id, permission).await?;
        self.daemon_config(team_id).await
    }

    pub async fn record_status(
        &self,
        team_id: &str,
        status: ConnectionStatus,
    ) -> Result<(), AppError> {
        self.store.set_status(team_id, status).await.map_err(|e| {
            error!(team_id = %team_id, error = %e, "Failed to record connection status");
            AppError::store_error(format!("Failed to record connection status: {}", e))
        })
    }
}
