//! Team, identity and per-team daemon configuration.
//!
//! The dashboard does not own users or teams; it reaches them through the
//! [`TeamDirectory`] and [`ConfigStore`] traits so the HTTP layer can run
//! against any identity provider or storage backend.

pub mod directory;
pub mod store;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::DaemonConfig;

pub use directory::{StaticTeamDirectory, UserConfig};
pub use store::{FileConfigStore, InMemoryConfigStore};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Read balances, transactions and statistics
    View,
    /// Create invoices, addresses and payments
    Transact,
    /// Change the daemon connection and join federations
    Manage,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::View => "view",
            Permission::Transact => "transact",
            Permission::Manage => "manage",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Viewer,
    Member,
    Admin,
}

impl TeamRole {
    pub fn grants(&self, permission: Permission) -> bool {
        match self {
            TeamRole::Admin => true,
            TeamRole::Member => matches!(permission, Permission::View | Permission::Transact),
            TeamRole::Viewer => permission == Permission::View,
        }
    }
}

impl FromStr for TeamRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "viewer" => Ok(TeamRole::Viewer),
            "member" => Ok(TeamRole::Member),
            "admin" => Ok(TeamRole::Admin),
            other => Err(anyhow::anyhow!("Unknown team role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

/// A team as seen by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: String,
    pub role: TeamRole,
}

/// Result of the last connection test against a team's daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    pub last_checked_utc: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub federation_count: usize,
}

#[async_trait]
pub trait TeamDirectory: Send + Sync {
    /// User owning `token`, if any
    async fn current_user(&self, token: &str) -> Option<User>;

    /// `team_id` as seen by `user_id`; `None` when the user is not a member
    async fn team(&self, user_id: &str, team_id: &str) -> Option<Team>;

    fn has_permission(&self, _user: &User, team: &Team, permission: Permission) -> bool {
        team.role.grants(permission)
    }
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_config(&self, team_id: &str) -> anyhow::Result<Option<DaemonConfig>>;

    async fn set_config(&self, team_id: &str, config: DaemonConfig) -> anyhow::Result<()>;

    async fn get_status(&self, team_id: &str) -> anyhow::Result<Option<ConnectionStatus>>;

    async fn set_status(&self, team_id: &str, status: ConnectionStatus) -> anyhow::Result<()>;
}
