//! User service.

use campus_common::{AppError, AppResult};
use campus_db::{entities::user, repositories::UserRepository};

/// User lookup and token authentication.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Underlying repository, used by the compose form to resolve usernames.
    #[must_use]
    pub const fn repository(&self) -> &UserRepository {
        &self.user_repo
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {id}")))
    }

    /// Authenticate a user by API token. Inactive accounts are rejected.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::Unauthorized)
    }
}
