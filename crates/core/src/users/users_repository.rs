use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{Error, Result};
use crate::schema::users::dsl::*;

use super::users_model::{NewUser, User, UserDb, UserError};
use super::users_traits::UserRepositoryTrait;

/// Repository for managing user records in the database.
///
/// Reads go through the shared pool; writes are serialized through the
/// writer actor.
pub struct UserRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        new_user.validate()?;

        let user_db: UserDb = new_user.into();
        self.writer
            .exec(move |conn| {
                diesel::insert_into(crate::schema::users::table)
                    .values(&user_db)
                    .execute(conn)?;
                Ok(user_db.into())
            })
            .await
    }

    fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;

        let user = users
            .select(UserDb::as_select())
            .find(user_id)
            .first::<UserDb>(&mut conn)?;

        Ok(user.into())
    }

    fn find_by_email(&self, email_param: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;

        let user = users
            .select(UserDb::as_select())
            .filter(email.eq(email_param))
            .first::<UserDb>(&mut conn)
            .optional()?;

        Ok(user.map(User::from))
    }

    fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<User>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = crate::schema::users::table.into_boxed();
        if let Some(active) = is_active_filter {
            query = query.filter(is_active.eq(active));
        }

        let results = query
            .select(UserDb::as_select())
            .order(created_at.desc())
            .load::<UserDb>(&mut conn)?;

        Ok(results.into_iter().map(User::from).collect())
    }

    async fn set_active(&self, user_id: &str, active: bool) -> Result<User> {
        let id_owned = user_id.to_string();
        self.writer
            .exec(move |conn| {
                let affected = diesel::update(users.find(id_owned.as_str()))
                    .set((
                        is_active.eq(active),
                        updated_at.eq(chrono::Utc::now().naive_utc()),
                    ))
                    .execute(conn)?;
                if affected == 0 {
                    return Err(Error::User(UserError::NotFound));
                }
                let user = users
                    .select(UserDb::as_select())
                    .find(id_owned.as_str())
                    .first::<UserDb>(conn)?;
                Ok(user.into())
            })
            .await
    }
}
