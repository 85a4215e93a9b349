//! Instructor earnings report.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use super::recompute;
use crate::domain::{is_permitted, AccessFacts, Action, Actor, EarningsReport, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Earnings service trait for dependency injection.
#[async_trait]
pub trait EarningsService: Send + Sync {
    /// Recompute and report net earnings. Instructors see their own only.
    async fn get_earnings(&self, actor: &Actor, instructor_id: Uuid) -> AppResult<EarningsReport>;
}

/// Concrete implementation of EarningsService using Unit of Work.
pub struct EarningsManager<U: UnitOfWork> {
    uow: Arc<U>,
    default_deduction: Decimal,
}

impl<U: UnitOfWork> EarningsManager<U> {
    pub fn new(uow: Arc<U>, default_deduction: Decimal) -> Self {
        Self { uow, default_deduction }
    }
}

#[async_trait]
impl<U: UnitOfWork> EarningsService for EarningsManager<U> {
    async fn get_earnings(&self, actor: &Actor, instructor_id: Uuid) -> AppResult<EarningsReport> {
        let facts = AccessFacts {
            is_owner: actor.id == instructor_id,
            ..Default::default()
        };
        if !is_permitted(Action::ViewEarnings, actor.role, &facts) {
            return Err(AppError::forbidden("You can only view your own earnings"));
        }

        let deduction = self.default_deduction;
        crate::with_transaction!(self.uow, |ctx| {
            ctx.accounts()
                .find_user(instructor_id)
                .await?
                .filter(|u| u.role == UserRole::Instructor)
                .ok_or_not_found("Instructor not found")?;

            let earnings = recompute::instructor_earnings(&ctx, instructor_id, deduction).await?;
            let students: BTreeSet<i32> = ctx
                .orders()
                .completed_items_of_instructor(instructor_id)
                .await?
                .iter()
                .map(|item| item.customer_id)
                .collect();

            Ok(EarningsReport {
                earnings_after_deduction: earnings.total_earnings,
                last_payout: earnings.last_payout,
                total_students_enrolled: students.len() as u64,
            })
        })
    }
}
