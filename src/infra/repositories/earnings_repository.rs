//! Instructor earnings projections.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::instructor_earnings;
use crate::domain::InstructorEarnings;
use crate::errors::{AppError, AppResult, DbResultExt};

/// Transaction-scoped earnings access.
pub struct TxEarningsRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxEarningsRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn find(&self, instructor_id: Uuid) -> AppResult<Option<InstructorEarnings>> {
        let model = instructor_earnings::Entity::find()
            .filter(instructor_earnings::Column::InstructorId.eq(instructor_id))
            .one(self.txn)
            .await?;
        Ok(model.map(InstructorEarnings::from))
    }

    /// Fetch the instructor's row, creating it with the given deduction.
    pub async fn get_or_create(
        &self,
        instructor_id: Uuid,
        deduction_percentage: Decimal,
    ) -> AppResult<InstructorEarnings> {
        if let Some(existing) = self.find(instructor_id).await? {
            return Ok(existing);
        }

        let model = instructor_earnings::ActiveModel {
            instructor_id: Set(instructor_id),
            total_earnings: Set(Decimal::ZERO),
            last_payout: Set(None),
            deduction_percentage: Set(deduction_percentage),
            ..Default::default()
        }
        .insert(self.txn)
        .await
        .or_conflict("Earnings record already exists")?;
        Ok(InstructorEarnings::from(model))
    }

    /// Overwrite the projected total.
    pub async fn set_total(&self, id: i32, total_earnings: Decimal) -> AppResult<InstructorEarnings> {
        let model = instructor_earnings::Entity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_else(|| AppError::not_found("Earnings record not found"))?;
        let mut active: instructor_earnings::ActiveModel = model.into();
        active.total_earnings = Set(total_earnings);
        let model = active.update(self.txn).await?;
        Ok(InstructorEarnings::from(model))
    }
}
