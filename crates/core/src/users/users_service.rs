use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::users_model::{NewUser, User, UserError};
use super::users_traits::{UserRepositoryTrait, UserServiceTrait};
use crate::errors::{DatabaseError, Error, Result};

/// Service for managing users.
pub struct UserService {
    repository: Arc<dyn UserRepositoryTrait>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepositoryTrait>) -> Self {
        Self { repository }
    }
}

/// Emails are stored and compared lowercased so lookups are case-insensitive.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl UserServiceTrait for UserService {
    async fn create_user(&self, mut new_user: NewUser) -> Result<User> {
        new_user.email = normalize_email(&new_user.email);
        debug!("Creating user {}", new_user.email);

        match self.repository.create(new_user).await {
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => {
                Err(UserError::DuplicateEmail.into())
            }
            other => other,
        }
    }

    fn get_user(&self, user_id: &str) -> Result<User> {
        self.repository.get_by_id(user_id)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.repository.find_by_email(&normalize_email(email))
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.repository.list(None)
    }

    async fn set_user_active(&self, user_id: &str, active: bool) -> Result<User> {
        self.repository.set_active(user_id, active).await
    }
}
