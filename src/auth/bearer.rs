use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::observability::sanitization::sanitize_token;
use crate::teams::{Permission, Team, TeamDirectory, User};

#[cfg(test)]
#[path = "bearer_tests.rs"]
mod tests;

pub const BEARER_PREFIX: &str = "Bearer ";

/// A user cleared to act on one team
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAccess {
    pub user: User,
    pub team: Team,
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the caller and check that they hold `permission` on `team_id`.
///
/// Unknown tokens are a 401, teams the user does not belong to a 404 and
/// a missing permission a 403.
pub async fn authorize(
    directory: &dyn TeamDirectory,
    headers: &HeaderMap,
    team_id: &str,
    permission: Permission,
) -> Result<TeamAccess, AppError> {
    let Some(token) = bearer_token(headers) else {
        warn!(
            team_id = %team_id,
            auth_result = "failure",
            auth_type = "bearer",
            failure_reason = "missing_authorization_header",
            "Authentication failed - missing bearer token"
        );
        return Err(AppError::authentication_error("Missing bearer token"));
    };

    let Some(user) = directory.current_user(token).await else {
        warn!(
            team_id = %team_id,
            token = %sanitize_token(token),
            auth_result = "failure",
            auth_type = "bearer",
            failure_reason = "invalid_token",
            "Authentication failed - unknown bearer token"
        );
        return Err(AppError::authentication_error("Invalid bearer token"));
    };

    let Some(team) = directory.team(&user.id, team_id).await else {
        warn!(
            team_id = %team_id,
            user_id = %user.id,
            auth_result = "failure",
            failure_reason = "not_a_member",
            "Team access denied"
        );
        return Err(AppError::not_found(format!("Team {} not found", team_id)));
    };

    if !directory.has_permission(&user, &team, permission) {
        warn!(
            team_id = %team_id,
            user_id = %user.id,
            role = ?team.role,
            permission = %permission,
            auth_result = "failure",
            failure_reason = "insufficient_permission",
            "Team access denied"
        );
        return Err(AppError::authorization_error(format!(
            "Missing {} permission on team {}",
            permission, team_id
        )));
    }

    debug!(
        team_id = %team_id,
        user_id = %user.id,
        permission = %permission,
        auth_result = "success",
        "Team access granted"
    );

    Ok(TeamAccess { user, team })
}
