//! Cart ledger.
//!
//! One cart per customer, created lazily. A course sits in a cart at most
//! once; the `(cart, course)` unique index settles racing adds.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use super::account_service::ensure_customer;
use crate::domain::{Actor, Cart, CartLine, CartSnapshot};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{TransactionContext, UnitOfWork};

/// Cart service trait for dependency injection.
#[async_trait]
pub trait CartService: Send + Sync {
    /// The caller's cart, created on first use.
    async fn get_cart(&self, actor: &Actor) -> AppResult<CartSnapshot>;

    async fn add_item(&self, actor: &Actor, cart_id: Uuid, course_id: Option<i32>) -> AppResult<CartSnapshot>;

    async fn remove_item(&self, actor: &Actor, cart_id: Uuid, item_id: i32) -> AppResult<CartSnapshot>;
}

/// Concrete implementation of CartService using Unit of Work.
pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn get_cart(&self, actor: &Actor) -> AppResult<CartSnapshot> {
        let actor = actor.clone();
        crate::with_transaction!(self.uow, |ctx| {
            let cart = own_cart(&ctx, &actor).await?;
            snapshot(&ctx, &cart).await
        })
    }

    async fn add_item(&self, actor: &Actor, cart_id: Uuid, course_id: Option<i32>) -> AppResult<CartSnapshot> {
        let course_id = course_id.ok_or_else(|| AppError::validation("course_id is required"))?;

        let actor = actor.clone();
        crate::with_transaction!(self.uow, |ctx| {
            let cart = addressed_cart(&ctx, &actor, cart_id).await?;
            ctx.catalog().find_course(course_id).await?.ok_or_not_found("Invalid course_id")?;

            let carts = ctx.carts();
            if carts.contains(cart.id, course_id).await? {
                return Err(AppError::conflict("Item already in the cart"));
            }
            carts.add_item(cart.id, course_id).await?;

            tracing::debug!(cart_id = %cart.id, course_id, "Course added to cart");
            snapshot(&ctx, &cart).await
        })
    }

    async fn remove_item(&self, actor: &Actor, cart_id: Uuid, item_id: i32) -> AppResult<CartSnapshot> {
        let actor = actor.clone();
        crate::with_transaction!(self.uow, |ctx| {
            let cart = addressed_cart(&ctx, &actor, cart_id).await?;
            if !ctx.carts().remove_item(cart.id, item_id).await? {
                return Err(AppError::not_found("Item not found in cart"));
            }
            snapshot(&ctx, &cart).await
        })
    }
}

/// Get-or-create the caller's cart.
async fn own_cart(ctx: &TransactionContext<'_>, actor: &Actor) -> AppResult<Cart> {
    let customer = ensure_customer(ctx, actor).await?;
    let carts = ctx.carts();
    match carts.find_by_customer(customer.id).await? {
        Some(cart) => Ok(cart),
        None => carts.create(customer.id).await,
    }
}

/// The caller's cart, which must be the one named in the path.
async fn addressed_cart(ctx: &TransactionContext<'_>, actor: &Actor, cart_id: Uuid) -> AppResult<Cart> {
    let cart = own_cart(ctx, actor).await?;
    if cart.id != cart_id {
        return Err(AppError::not_found("Cart not found"));
    }
    Ok(cart)
}

async fn snapshot(ctx: &TransactionContext<'_>, cart: &Cart) -> AppResult<CartSnapshot> {
    let items = ctx.carts().items(cart.id).await?;
    let course_ids: Vec<i32> = items.iter().map(|i| i.course_id).collect();
    let courses: BTreeMap<i32, _> = ctx
        .catalog()
        .find_courses(&course_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let lines = items
        .into_iter()
        .filter_map(|item| {
            courses.get(&item.course_id).map(|course| CartLine {
                id: item.id,
                course_id: course.id,
                title: course.title.clone(),
                price: course.price,
            })
        })
        .collect();

    Ok(CartSnapshot::new(cart.id, lines))
}
