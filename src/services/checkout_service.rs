//! Checkout transactor and payment settlement.
//!
//! Checkout turns the caller's cart into an order inside one serializable
//! transaction: the duplicate-purchase check, the order rows, the enrollment
//! effects and the cart deletion commit together or not at all.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::account_service::ensure_customer;
use super::notifier::EventDispatcher;
use super::recompute;
use crate::domain::commerce::{already_purchased, already_purchased_message};
use crate::domain::{
    is_permitted, AccessFacts, Action, Actor, Order, OrderSnapshot, PaymentPolicy, PaymentStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{PurchaseLine, TransactionContext, UnitOfWork};
use crate::types::PaginationParams;

/// Checkout service trait for dependency injection.
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Convert the caller's cart into an order.
    async fn checkout(&self, actor: &Actor) -> AppResult<OrderSnapshot>;

    /// Settle a pending order. Admin only.
    async fn settle_order(&self, actor: &Actor, order_id: i32, status: PaymentStatus) -> AppResult<OrderSnapshot>;

    /// The caller's orders, newest first, with the total count.
    async fn list_orders(&self, actor: &Actor, params: PaginationParams) -> AppResult<(Vec<OrderSnapshot>, u64)>;
}

/// Concrete implementation of CheckoutService using Unit of Work.
pub struct CheckoutManager<U: UnitOfWork> {
    uow: Arc<U>,
    dispatcher: EventDispatcher,
    policy: PaymentPolicy,
    default_deduction: Decimal,
}

impl<U: UnitOfWork> CheckoutManager<U> {
    pub fn new(
        uow: Arc<U>,
        dispatcher: EventDispatcher,
        policy: PaymentPolicy,
        default_deduction: Decimal,
    ) -> Self {
        Self {
            uow,
            dispatcher,
            policy,
            default_deduction,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> CheckoutService for CheckoutManager<U> {
    async fn checkout(&self, actor: &Actor) -> AppResult<OrderSnapshot> {
        if !is_permitted(Action::Checkout, actor.role, &AccessFacts::default()) {
            return Err(AppError::forbidden("Only students and instructors can buy courses"));
        }

        let actor = actor.clone();
        let status = self.policy.initial_status();
        let deduction = self.default_deduction;

        let (snapshot, event) = self
            .uow
            .transaction_serializable(|ctx| {
                Box::pin(async move {
                    let customer = ensure_customer(&ctx, &actor).await?;
                    let carts = ctx.carts();
                    let cart = carts
                        .find_by_customer(customer.id)
                        .await?
                        .ok_or_else(|| AppError::validation("Cart is empty"))?;
                    let cart_items = carts.items(cart.id).await?;
                    if cart_items.is_empty() {
                        return Err(AppError::validation("Cart is empty"));
                    }

                    let cart_courses: Vec<i32> = cart_items.iter().map(|i| i.course_id).collect();
                    let purchased = ctx.orders().purchased_course_ids(customer.id).await?;
                    let duplicates = already_purchased(&cart_courses, &purchased);
                    if !duplicates.is_empty() {
                        return Err(AppError::conflict(already_purchased_message(&duplicates)));
                    }

                    let courses: BTreeMap<i32, _> = ctx
                        .catalog()
                        .find_courses(&cart_courses)
                        .await?
                        .into_iter()
                        .map(|c| (c.id, c))
                        .collect();

                    let order = ctx.orders().create(customer.id, status).await?;
                    let mut items = Vec::with_capacity(cart_items.len());
                    for course_id in &cart_courses {
                        let course = courses.get(course_id).ok_or_not_found("Course not found")?;
                        let line = PurchaseLine {
                            course_id: course.id,
                            instructor_id: course.instructor_id,
                            price: course.price,
                        };
                        items.push(ctx.orders().add_item(&order, &line).await?);
                    }

                    let event = match order.payment_status {
                        PaymentStatus::Complete => {
                            Some(recompute::enrollment(&ctx, &order, &items, actor.id, deduction).await?)
                        }
                        _ => None,
                    };

                    carts.delete(cart.id).await?;
                    Ok((OrderSnapshot::new(order, items), event))
                })
            })
            .await?;

        tracing::info!(
            order_id = snapshot.order.id,
            customer_id = snapshot.order.customer_id,
            status = ?snapshot.order.payment_status,
            total = %snapshot.total_price,
            "Checkout completed"
        );
        self.dispatcher.publish(event.into_iter().collect()).await;
        Ok(snapshot)
    }

    async fn settle_order(&self, actor: &Actor, order_id: i32, status: PaymentStatus) -> AppResult<OrderSnapshot> {
        if !is_permitted(Action::SettlePayment, actor.role, &AccessFacts::default()) {
            return Err(AppError::forbidden("Only administrators can settle payments"));
        }
        if status == PaymentStatus::Pending {
            return Err(AppError::validation("status must be complete or failed"));
        }

        let deduction = self.default_deduction;
        let (snapshot, event) = self
            .uow
            .transaction_serializable(|ctx| {
                Box::pin(async move {
                    let order = ctx.orders().set_status(order_id, status).await?;
                    let items = ctx.orders().items(order.id).await?;

                    let event = if order.payment_status == PaymentStatus::Complete {
                        let customer = ctx
                            .accounts()
                            .find_customer(order.customer_id)
                            .await?
                            .ok_or_not_found("Customer not found")?;
                        Some(recompute::enrollment(&ctx, &order, &items, customer.user_id, deduction).await?)
                    } else {
                        None
                    };

                    Ok((OrderSnapshot::new(order, items), event))
                })
            })
            .await?;

        tracing::info!(
            order_id,
            status = ?snapshot.order.payment_status,
            settled_by = %actor.id,
            "Order settled"
        );
        self.dispatcher.publish(event.into_iter().collect()).await;
        Ok(snapshot)
    }

    async fn list_orders(&self, actor: &Actor, params: PaginationParams) -> AppResult<(Vec<OrderSnapshot>, u64)> {
        let user_id = actor.id;
        crate::with_transaction!(self.uow, |ctx| {
            let customer = match ctx.accounts().find_customer_by_user(user_id).await? {
                Some(customer) => customer,
                None => return Ok((Vec::new(), 0)),
            };

            let (orders, total) = ctx.orders().list_for_customer(customer.id, &params).await?;
            let snapshots = with_items(&ctx, orders).await?;
            Ok((snapshots, total))
        })
    }
}

async fn with_items(ctx: &TransactionContext<'_>, orders: Vec<Order>) -> AppResult<Vec<OrderSnapshot>> {
    let mut snapshots = Vec::with_capacity(orders.len());
    for order in orders {
        let items = ctx.orders().items(order.id).await?;
        snapshots.push(OrderSnapshot::new(order, items));
    }
    Ok(snapshots)
}
