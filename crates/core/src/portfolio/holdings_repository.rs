use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::Result;
use crate::schema::holdings::dsl::*;

use super::holdings_model::{Holding, HoldingDb, HoldingError, HoldingUpdate, NewHolding};
use super::holdings_traits::HoldingRepositoryTrait;

/// Repository for managing holding records in the database.
///
/// Ownership scoping lives in the queries themselves: every lookup filters
/// on `user_id`, so another user's holding behaves exactly like a missing
/// one.
pub struct HoldingRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl HoldingRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl HoldingRepositoryTrait for HoldingRepository {
    async fn create(&self, owner_id: &str, new_holding: NewHolding) -> Result<Holding> {
        let holding_db = HoldingDb::from_new(owner_id, new_holding);
        self.writer
            .exec(move |conn| {
                diesel::insert_into(crate::schema::holdings::table)
                    .values(&holding_db)
                    .execute(conn)?;
                Ok(holding_db.into())
            })
            .await
    }

    async fn update(
        &self,
        owner_id: &str,
        holding_id: &str,
        update: HoldingUpdate,
    ) -> Result<Holding> {
        let owner = owner_id.to_string();
        let hid = holding_id.to_string();
        self.writer
            .exec(move |conn| {
                let mut existing = holdings
                    .filter(id.eq(&hid))
                    .filter(user_id.eq(&owner))
                    .select(HoldingDb::as_select())
                    .first::<HoldingDb>(conn)
                    .optional()?
                    .ok_or(HoldingError::NotFound)?;

                if let Some(new_quantity) = update.quantity {
                    existing.quantity = new_quantity.to_string();
                }
                if let Some(new_entry_price) = update.entry_price {
                    existing.entry_price = new_entry_price.to_string();
                }
                if let Some(new_purchased_at) = update.purchased_at {
                    existing.purchased_at = Some(new_purchased_at);
                }
                existing.updated_at = chrono::Utc::now().naive_utc();

                diesel::update(holdings.find(&existing.id))
                    .set(&existing)
                    .execute(conn)?;

                Ok(existing.into())
            })
            .await
    }

    async fn delete(&self, owner_id: &str, holding_id: &str) -> Result<()> {
        let owner = owner_id.to_string();
        let hid = holding_id.to_string();
        self.writer
            .exec(move |conn| {
                let affected = diesel::delete(
                    holdings.filter(id.eq(&hid)).filter(user_id.eq(&owner)),
                )
                .execute(conn)?;
                if affected == 0 {
                    return Err(HoldingError::NotFound.into());
                }
                Ok(())
            })
            .await
    }

    fn list(&self, owner_id: &str) -> Result<Vec<Holding>> {
        let mut conn = get_connection(&self.pool)?;

        let results = holdings
            .filter(user_id.eq(owner_id))
            .select(HoldingDb::as_select())
            .order(created_at.desc())
            .load::<HoldingDb>(&mut conn)?;

        Ok(results.into_iter().map(Holding::from).collect())
    }
}
