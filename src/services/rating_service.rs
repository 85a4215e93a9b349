//! Course ratings.
//!
//! Every mutation recomputes the course aggregate in the same serializable
//! transaction as the write.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::access::authorize;
use super::recompute;
use crate::domain::progress::validate_rating_score;
use crate::domain::{Action, Actor, Rating};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{TransactionContext, UnitOfWork};

/// Rating service trait for dependency injection.
#[async_trait]
pub trait RatingService: Send + Sync {
    async fn rate_course(&self, actor: &Actor, course_id: i32, score: Decimal) -> AppResult<Rating>;

    async fn update_rating(&self, actor: &Actor, course_id: i32, rating_id: i32, score: Decimal) -> AppResult<Rating>;

    async fn delete_rating(&self, actor: &Actor, course_id: i32, rating_id: i32) -> AppResult<()>;
}

/// Concrete implementation of RatingService using Unit of Work.
pub struct RatingManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> RatingManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> RatingService for RatingManager<U> {
    async fn rate_course(&self, actor: &Actor, course_id: i32, score: Decimal) -> AppResult<Rating> {
        let score = validate_rating_score(score)?;
        let actor = actor.clone();

        let rating = self
            .uow
            .transaction_serializable(|ctx| {
                Box::pin(async move {
                    let course = ctx.catalog().find_course(course_id).await?.ok_or_not_found("Course not found")?;
                    authorize(&ctx, &actor, Action::RateCourse, &course, None).await?;

                    if ctx.ratings().find_by_user(actor.id, course.id).await?.is_some() {
                        return Err(AppError::conflict("You have already rated this course"));
                    }
                    let rating = ctx.ratings().create(actor.id, course.id, score).await?;
                    recompute::course_rating(&ctx, course.id).await?;
                    Ok(rating)
                })
            })
            .await?;

        tracing::info!(rating_id = rating.id, course_id, "Course rated");
        Ok(rating)
    }

    async fn update_rating(&self, actor: &Actor, course_id: i32, rating_id: i32, score: Decimal) -> AppResult<Rating> {
        let score = validate_rating_score(score)?;
        let actor = actor.clone();

        self.uow
            .transaction_serializable(|ctx| {
                Box::pin(async move {
                    let rating = own_rating(&ctx, &actor, course_id, rating_id).await?;
                    let rating = ctx.ratings().update_score(rating.id, score).await?;
                    recompute::course_rating(&ctx, course_id).await?;
                    Ok(rating)
                })
            })
            .await
    }

    async fn delete_rating(&self, actor: &Actor, course_id: i32, rating_id: i32) -> AppResult<()> {
        let actor = actor.clone();

        self.uow
            .transaction_serializable(|ctx| {
                Box::pin(async move {
                    let rating = own_rating(&ctx, &actor, course_id, rating_id).await?;
                    ctx.ratings().delete(rating.id).await?;
                    recompute::course_rating(&ctx, course_id).await?;
                    Ok(())
                })
            })
            .await?;

        tracing::info!(rating_id, course_id, "Rating deleted");
        Ok(())
    }
}

/// The rating, which must belong to the course and to the caller.
async fn own_rating(
    ctx: &TransactionContext<'_>,
    actor: &Actor,
    course_id: i32,
    rating_id: i32,
) -> AppResult<Rating> {
    let rating = ctx
        .ratings()
        .find(rating_id)
        .await?
        .filter(|r| r.course_id == course_id)
        .ok_or_not_found("Rating not found")?;
    if rating.user_id != actor.id {
        return Err(AppError::forbidden("You can only modify your own rating"));
    }
    Ok(rating)
}
