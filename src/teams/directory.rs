use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Team, TeamDirectory, TeamRole, User};

/// A user entry from the dashboard configuration file
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Bearer token presented by the dashboard front-end
    pub token: String,
    /// Team id to role
    #[serde(default)]
    pub teams: BTreeMap<String, TeamRole>,
}

impl fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("token", &"[REDACTED]")
            .field("teams", &self.teams)
            .finish()
    }
}

/// Directory backed by a fixed list of users
#[derive(Debug, Clone, Default)]
pub struct StaticTeamDirectory {
    users: Vec<UserConfig>,
}

impl StaticTeamDirectory {
    pub fn new(users: Vec<UserConfig>) -> Self {
        Self { users }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl TeamDirectory for StaticTeamDirectory {
    async fn current_user(&self, token: &str) -> Option<User> {
        if token.is_empty() {
            return None;
        }

        self.users
            .iter()
            .find(|user| user.token == token)
            .map(|user| User {
                id: user.id.clone(),
                name: if user.name.is_empty() {
                    user.id.clone()
                } else {
                    user.name.clone()
                },
            })
    }

    async fn team(&self, user_id: &str, team_id: &str) -> Option<Team> {
        let user = self.users.iter().find(|user| user.id == user_id)?;
        user.teams.get(team_id).map(|role| Team {
            id: team_id.to_string(),
            role: *role,
        })
    }
}
