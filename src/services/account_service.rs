//! Account provisioning.
//!
//! Identities are issued elsewhere. The first authenticated request of an
//! identity creates its local mirror, and a customer record for roles that
//! buy courses. Provisioning again is a no-op.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Actor, Customer, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{TransactionContext, UnitOfWork};

/// Account service trait for dependency injection.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Mirror the caller locally and make sure buyers have a customer record.
    async fn provision(&self, actor: &Actor) -> AppResult<User>;
}

/// Concrete implementation of AccountService using Unit of Work.
pub struct AccountManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AccountManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> AccountService for AccountManager<U> {
    async fn provision(&self, actor: &Actor) -> AppResult<User> {
        let actor = actor.clone();
        crate::with_transaction!(self.uow, |ctx| {
            let user = ctx.accounts().upsert_user(&actor).await?;
            if actor.role.has_customer() {
                ensure_customer(&ctx, &actor).await?;
            }
            Ok(user)
        })
    }
}

/// The caller's customer record, provisioning it on first use.
///
/// Admins never buy courses and get a permission error.
pub(crate) async fn ensure_customer(ctx: &TransactionContext<'_>, actor: &Actor) -> AppResult<Customer> {
    if !actor.role.has_customer() {
        return Err(AppError::forbidden("Only students and instructors can buy courses"));
    }

    let accounts = ctx.accounts();
    if let Some(customer) = accounts.find_customer_by_user(actor.id).await? {
        return Ok(customer);
    }

    accounts.upsert_user(actor).await?;
    let customer = accounts.create_customer(actor.id).await?;
    tracing::info!(user_id = %actor.id, customer_id = customer.id, "Customer provisioned");
    Ok(customer)
}
