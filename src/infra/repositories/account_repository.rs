//! Local user mirror and customer records.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::{customer, user};
use crate::domain::{Actor, Customer, User};
use crate::errors::{AppError, AppResult};

/// Transaction-scoped access to users and customers.
pub struct TxAccountRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxAccountRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(self.txn).await?;
        Ok(model.map(User::from))
    }

    /// Insert the mirror row, or refresh it when the token carries new values.
    pub async fn upsert_user(&self, actor: &Actor) -> AppResult<User> {
        let now = Utc::now();

        match user::Entity::find_by_id(actor.id).one(self.txn).await? {
            Some(existing)
                if existing.email == actor.email
                    && existing.name == actor.name
                    && existing.role == actor.role.as_str() =>
            {
                Ok(User::from(existing))
            }
            Some(existing) => {
                let mut active: user::ActiveModel = existing.into();
                active.email = Set(actor.email.clone());
                active.name = Set(actor.name.clone());
                active.role = Set(actor.role.as_str().to_string());
                active.updated_at = Set(now);
                let model = active.update(self.txn).await?;
                Ok(User::from(model))
            }
            None => {
                let model = user::ActiveModel {
                    id: Set(actor.id),
                    email: Set(actor.email.clone()),
                    name: Set(actor.name.clone()),
                    role: Set(actor.role.as_str().to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                // A concurrent first request may have inserted it already
                user::Entity::insert(model)
                    .on_conflict(OnConflict::column(user::Column::Id).do_nothing().to_owned())
                    .exec_without_returning(self.txn)
                    .await?;
                self.find_user(actor.id)
                    .await?
                    .ok_or_else(|| AppError::internal(format!("User {} vanished after insert", actor.id)))
            }
        }
    }

    pub async fn find_customer(&self, id: i32) -> AppResult<Option<Customer>> {
        let model = customer::Entity::find_by_id(id).one(self.txn).await?;
        Ok(model.map(Customer::from))
    }

    pub async fn find_customer_by_user(&self, user_id: Uuid) -> AppResult<Option<Customer>> {
        let model = customer::Entity::find()
            .filter(customer::Column::UserId.eq(user_id))
            .one(self.txn)
            .await?;
        Ok(model.map(Customer::from))
    }

    /// Insert the user's customer record unless one exists, and return it.
    pub async fn create_customer(&self, user_id: Uuid) -> AppResult<Customer> {
        let model = customer::ActiveModel {
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        customer::Entity::insert(model)
            .on_conflict(OnConflict::column(customer::Column::UserId).do_nothing().to_owned())
            .exec_without_returning(self.txn)
            .await?;
        self.find_customer_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Customer for {} vanished after insert", user_id)))
    }

    /// Display names keyed by user id, for notification text.
    pub async fn names(&self, ids: &[Uuid]) -> AppResult<Vec<(Uuid, String)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(self.txn)
            .await?;
        Ok(models.into_iter().map(|m| (m.id, m.name)).collect())
    }
}
