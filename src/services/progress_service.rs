//! Lesson completion tracking.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::access::{authorize, load_lesson};
use super::notifier::EventDispatcher;
use super::recompute;
use crate::domain::{Action, Actor, CourseProgress, Lesson};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Lesson as seen by the student tracking it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LessonSnapshot {
    #[serde(flatten)]
    pub lesson: Lesson,
    /// Derived from the course progress completion set
    pub opened: bool,
    pub course_progress: Decimal,
    pub course_completed: bool,
}

/// Progress service trait for dependency injection.
#[async_trait]
pub trait ProgressService: Send + Sync {
    /// Add or remove the lesson from the caller's completion set.
    async fn set_lesson_completion(&self, actor: &Actor, lesson_id: i32, done: bool) -> AppResult<LessonSnapshot>;

    async fn get_progress(&self, actor: &Actor, course_id: i32) -> AppResult<CourseProgress>;
}

/// Concrete implementation of ProgressService using Unit of Work.
pub struct ProgressManager<U: UnitOfWork> {
    uow: Arc<U>,
    dispatcher: EventDispatcher,
}

impl<U: UnitOfWork> ProgressManager<U> {
    pub fn new(uow: Arc<U>, dispatcher: EventDispatcher) -> Self {
        Self { uow, dispatcher }
    }
}

#[async_trait]
impl<U: UnitOfWork> ProgressService for ProgressManager<U> {
    async fn set_lesson_completion(&self, actor: &Actor, lesson_id: i32, done: bool) -> AppResult<LessonSnapshot> {
        let actor = actor.clone();
        let (snapshot, event) = crate::with_transaction!(self.uow, |ctx| {
            let (lesson, scope) = load_lesson(&ctx, lesson_id).await?;
            authorize(&ctx, &actor, Action::TrackLesson, &scope.course, Some(&scope.section)).await?;

            let progress = ctx.progress().get_or_create(actor.id, scope.course.id).await?;
            if done {
                ctx.progress().mark_completed(progress.id, lesson.id).await?;
            } else {
                ctx.progress().mark_uncompleted(progress.id, lesson.id).await?;
            }

            let change = recompute::course_progress(&ctx, actor.id, scope.course.id).await?;
            let event = match change.newly_completed {
                true => Some(recompute::course_completed(&ctx, actor.id, &scope.course).await?),
                false => None,
            };

            let snapshot = LessonSnapshot {
                opened: change.progress.has_completed(lesson.id),
                course_progress: change.progress.progress,
                course_completed: change.progress.completed,
                lesson,
            };
            Ok((snapshot, event))
        })?;

        tracing::debug!(
            lesson_id,
            done,
            progress = %snapshot.course_progress,
            "Lesson completion updated"
        );
        self.dispatcher.publish(event.into_iter().collect()).await;
        Ok(snapshot)
    }

    async fn get_progress(&self, actor: &Actor, course_id: i32) -> AppResult<CourseProgress> {
        let actor = actor.clone();
        crate::with_transaction!(self.uow, |ctx| {
            let course = ctx.catalog().find_course(course_id).await?.ok_or_not_found("Course not found")?;
            authorize(&ctx, &actor, Action::ViewProgress, &course, None).await?;
            ctx.progress().get_or_create(actor.id, course.id).await
        })
    }
}
