//! Course ratings.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::rating;
use crate::domain::Rating;
use crate::errors::{AppError, AppResult, DbResultExt};

/// Transaction-scoped rating access.
pub struct TxRatingRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxRatingRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn find(&self, id: i32) -> AppResult<Option<Rating>> {
        let model = rating::Entity::find_by_id(id).one(self.txn).await?;
        Ok(model.map(Rating::from))
    }

    pub async fn find_by_user(&self, user_id: Uuid, course_id: i32) -> AppResult<Option<Rating>> {
        let model = rating::Entity::find()
            .filter(rating::Column::UserId.eq(user_id))
            .filter(rating::Column::CourseId.eq(course_id))
            .one(self.txn)
            .await?;
        Ok(model.map(Rating::from))
    }

    /// Insert a rating; the `(user, course)` unique index rejects a second one.
    pub async fn create(&self, user_id: Uuid, course_id: i32, score: Decimal) -> AppResult<Rating> {
        let now = Utc::now();
        let model = rating::ActiveModel {
            user_id: Set(user_id),
            course_id: Set(course_id),
            score: Set(score),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.txn)
        .await
        .or_conflict("You have already rated this course")?;
        Ok(Rating::from(model))
    }

    pub async fn update_score(&self, id: i32, score: Decimal) -> AppResult<Rating> {
        let model = rating::Entity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_else(|| AppError::not_found("Rating not found"))?;
        let mut active: rating::ActiveModel = model.into();
        active.score = Set(score);
        active.updated_at = Set(Utc::now());
        let model = active.update(self.txn).await?;
        Ok(Rating::from(model))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = rating::Entity::delete_by_id(id).exec(self.txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Rating not found"));
        }
        Ok(())
    }

    pub async fn scores_of_course(&self, course_id: i32) -> AppResult<Vec<Decimal>> {
        let scores = rating::Entity::find()
            .select_only()
            .column(rating::Column::Score)
            .filter(rating::Column::CourseId.eq(course_id))
            .into_tuple::<Decimal>()
            .all(self.txn)
            .await?;
        Ok(scores)
    }
}
