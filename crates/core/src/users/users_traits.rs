//! User repository and service traits.

use async_trait::async_trait;

use super::users_model::{NewUser, User};
use crate::errors::Result;

/// Contract for credential-store persistence.
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Inserts a new user record.
    async fn create(&self, new_user: NewUser) -> Result<User>;

    /// Retrieves a user by id. Fails with a not-found error when absent.
    fn get_by_id(&self, user_id: &str) -> Result<User>;

    /// Looks a user up by email, `None` when unknown.
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Lists users, optionally filtered by active status.
    fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<User>>;

    /// Flips the active flag. Users are never deleted.
    async fn set_active(&self, user_id: &str, active: bool) -> Result<User>;
}

/// Contract for credential-store business operations.
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    /// Creates a user; fails with `DuplicateEmail` when the email is taken.
    async fn create_user(&self, new_user: NewUser) -> Result<User>;

    /// Retrieves a user by id.
    fn get_user(&self, user_id: &str) -> Result<User>;

    /// Looks a user up by normalized email.
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Lists all users.
    fn list_users(&self) -> Result<Vec<User>>;

    /// Soft-activates or deactivates a user.
    async fn set_user_active(&self, user_id: &str, active: bool) -> Result<User>;
}
