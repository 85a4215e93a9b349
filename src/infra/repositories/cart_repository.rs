//! Carts and cart items.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{cart, cart_item};
use crate::domain::{Cart, CartItem};
use crate::errors::{AppResult, DbResultExt};

/// Transaction-scoped cart access.
pub struct TxCartRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxCartRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn find(&self, id: Uuid) -> AppResult<Option<Cart>> {
        let model = cart::Entity::find_by_id(id).one(self.txn).await?;
        Ok(model.map(Cart::from))
    }

    pub async fn find_by_customer(&self, customer_id: i32) -> AppResult<Option<Cart>> {
        let model = cart::Entity::find()
            .filter(cart::Column::CustomerId.eq(customer_id))
            .one(self.txn)
            .await?;
        Ok(model.map(Cart::from))
    }

    /// Insert a cart; the unique customer column rejects a second one.
    pub async fn create(&self, customer_id: i32) -> AppResult<Cart> {
        let model = cart::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer_id),
            created_at: Set(Utc::now()),
        }
        .insert(self.txn)
        .await
        .or_conflict("Cart already exists")?;
        Ok(Cart::from(model))
    }

    pub async fn items(&self, cart_id: Uuid) -> AppResult<Vec<CartItem>> {
        let models = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .order_by_asc(cart_item::Column::Id)
            .all(self.txn)
            .await?;
        Ok(models.into_iter().map(CartItem::from).collect())
    }

    pub async fn contains(&self, cart_id: Uuid, course_id: i32) -> AppResult<bool> {
        let found = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::CourseId.eq(course_id))
            .one(self.txn)
            .await?;
        Ok(found.is_some())
    }

    pub async fn add_item(&self, cart_id: Uuid, course_id: i32) -> AppResult<CartItem> {
        let model = cart_item::ActiveModel {
            cart_id: Set(cart_id),
            course_id: Set(course_id),
            ..Default::default()
        }
        .insert(self.txn)
        .await
        .or_conflict("Item already in the cart")?;
        Ok(CartItem::from(model))
    }

    /// Remove one item; false when the item is not in this cart.
    pub async fn remove_item(&self, cart_id: Uuid, item_id: i32) -> AppResult<bool> {
        let result = cart_item::Entity::delete_many()
            .filter(cart_item::Column::Id.eq(item_id))
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(self.txn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Delete the cart together with its items.
    pub async fn delete(&self, cart_id: Uuid) -> AppResult<()> {
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(self.txn)
            .await?;
        cart::Entity::delete_by_id(cart_id).exec(self.txn).await?;
        Ok(())
    }
}
