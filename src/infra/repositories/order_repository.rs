//! Orders and immutable purchase records.
//!
//! Enrollment is not stored anywhere: a customer is enrolled in a course when
//! an order item for it belongs to an order with a completed payment.

use std::collections::BTreeSet;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::{order, order_item};
use crate::domain::{Order, OrderItem, PaymentStatus};
use crate::errors::{AppError, AppResult, DbResultExt};
use crate::types::PaginationParams;

/// Purchase record fields snapshotted at checkout
#[derive(Debug, Clone)]
pub struct PurchaseLine {
    pub course_id: i32,
    pub instructor_id: Uuid,
    pub price: Decimal,
}

/// Transaction-scoped order access.
pub struct TxOrderRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxOrderRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn create(&self, customer_id: i32, status: PaymentStatus) -> AppResult<Order> {
        let model = order::ActiveModel {
            customer_id: Set(customer_id),
            payment_status: Set(status.code().to_string()),
            placed_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;
        Ok(Order::from(model))
    }

    /// Attach a purchase record. The `(customer, course)` unique index turns a
    /// racing duplicate into a conflict.
    pub async fn add_item(&self, order: &Order, line: &PurchaseLine) -> AppResult<OrderItem> {
        let model = order_item::ActiveModel {
            order_id: Set(order.id),
            course_id: Set(line.course_id),
            customer_id: Set(order.customer_id),
            instructor_id: Set(line.instructor_id),
            price: Set(line.price),
            purchased_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.txn)
        .await
        .or_conflict(&format!(
            "You have already purchased course: [{}]",
            line.course_id
        ))?;
        Ok(OrderItem::from(model))
    }

    pub async fn find(&self, id: i32) -> AppResult<Option<Order>> {
        let model = order::Entity::find_by_id(id).one(self.txn).await?;
        Ok(model.map(Order::from))
    }

    pub async fn items(&self, order_id: i32) -> AppResult<Vec<OrderItem>> {
        let models = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::Id)
            .all(self.txn)
            .await?;
        Ok(models.into_iter().map(OrderItem::from).collect())
    }

    /// A customer's orders, newest first, with the total count.
    pub async fn list_for_customer(
        &self,
        customer_id: i32,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Order>, u64)> {
        let paginator = order::Entity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .order_by_desc(order::Column::Id)
            .paginate(self.txn, params.per_page());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page_index()).await?;
        Ok((models.into_iter().map(Order::from).collect(), total))
    }

    /// Move an order to a new settlement state; only pending orders settle.
    pub async fn set_status(&self, id: i32, next: PaymentStatus) -> AppResult<Order> {
        let model = order::Entity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_else(|| AppError::not_found("Order not found"))?;

        let current = PaymentStatus::from_code(&model.payment_status)
            .ok_or_else(|| AppError::internal(format!("Unknown payment status on order {}", id)))?;
        if !current.can_transition_to(next) {
            return Err(AppError::conflict(format!(
                "Order payment status cannot change from {:?} to {:?}",
                current, next
            )));
        }

        let mut active: order::ActiveModel = model.into();
        active.payment_status = Set(next.code().to_string());
        let model = active.update(self.txn).await?;
        Ok(Order::from(model))
    }

    /// Courses the customer holds any purchase record for, whatever the order state.
    pub async fn purchased_course_ids(&self, customer_id: i32) -> AppResult<Vec<i32>> {
        let ids = order_item::Entity::find()
            .select_only()
            .column(order_item::Column::CourseId)
            .filter(order_item::Column::CustomerId.eq(customer_id))
            .into_tuple::<i32>()
            .all(self.txn)
            .await?;
        Ok(ids)
    }

    /// True when the customer holds a completed purchase of the course.
    pub async fn has_completed_purchase(&self, customer_id: i32, course_id: i32) -> AppResult<bool> {
        let count = completed_items()
            .filter(order_item::Column::CustomerId.eq(customer_id))
            .filter(order_item::Column::CourseId.eq(course_id))
            .count(self.txn)
            .await?;
        Ok(count > 0)
    }

    /// Distinct customers with a completed purchase of the course.
    pub async fn enrolled_customers(&self, course_id: i32) -> AppResult<u64> {
        let customers = completed_items()
            .select_only()
            .column(order_item::Column::CustomerId)
            .filter(order_item::Column::CourseId.eq(course_id))
            .into_tuple::<i32>()
            .all(self.txn)
            .await?;
        Ok(customers.into_iter().collect::<BTreeSet<_>>().len() as u64)
    }

    /// Completed purchase records for an instructor's courses.
    pub async fn completed_items_of_instructor(&self, instructor_id: Uuid) -> AppResult<Vec<OrderItem>> {
        let models = completed_items()
            .filter(order_item::Column::InstructorId.eq(instructor_id))
            .all(self.txn)
            .await?;
        Ok(models.into_iter().map(OrderItem::from).collect())
    }
}

/// Order items whose order is settled as complete.
fn completed_items() -> sea_orm::Select<order_item::Entity> {
    order_item::Entity::find().filter(
        order_item::Column::OrderId.in_subquery(
            Query::select()
                .column(order::Column::Id)
                .from(order::Entity)
                .and_where(order::Column::PaymentStatus.eq(PaymentStatus::Complete.code()))
                .to_owned(),
        ),
    )
}
