//! User directory capability and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::UserId;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// A user record as returned by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub name: String,
}

/// Remote capability to look up user records.
///
/// The orchestrator uses it only for existence validation during order
/// creation.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetches a user record by id.
    async fn get_user(&self, id: UserId) -> Result<UserSnapshot, ClientError>;
}

#[derive(Debug, Default)]
struct InMemoryUserState {
    users: HashMap<UserId, UserSnapshot>,
    unreachable: bool,
}

/// In-memory user directory for wiring and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    state: Arc<RwLock<InMemoryUserState>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty in-memory user directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user and returns its directory-assigned id.
    pub fn add_user(
        &self,
        username: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> UserId {
        let id = UserId::new();
        self.state.write().unwrap().users.insert(
            id,
            UserSnapshot {
                id,
                username: username.into(),
                email: email.into(),
                name: name.into(),
            },
        );
        id
    }

    /// Makes every call fail with a communication error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.write().unwrap().unreachable = unreachable;
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_user(&self, id: UserId) -> Result<UserSnapshot, ClientError> {
        let state = self.state.read().unwrap();
        if state.unreachable {
            return Err(ClientError::Communication(
                "user directory unreachable".to_string(),
            ));
        }
        state.users.get(&id).cloned().ok_or(ClientError::NotFound {
            resource: "user",
            id: id.as_uuid(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_user_returns_record() {
        let directory = InMemoryUserDirectory::new();
        let id = directory.add_user("ada", "ada@example.com", "Ada Lovelace");

        let user = directory.get_user(id).await.unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn get_missing_user_is_not_found() {
        let directory = InMemoryUserDirectory::new();
        let result = directory.get_user(UserId::new()).await;
        assert!(matches!(
            result,
            Err(ClientError::NotFound {
                resource: "user",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn unreachable_directory_fails_with_communication() {
        let directory = InMemoryUserDirectory::new();
        let id = directory.add_user("ada", "ada@example.com", "Ada Lovelace");
        directory.set_unreachable(true);

        let result = directory.get_user(id).await;
        assert!(matches!(result, Err(ClientError::Communication(_))));
    }
}
