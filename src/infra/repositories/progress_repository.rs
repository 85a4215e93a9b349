//! Course progress rows and their completed-lesson sets.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::{completed_lesson, course_progress};
use crate::domain::CourseProgress;
use crate::errors::{AppError, AppResult};

/// Transaction-scoped progress access.
pub struct TxProgressRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxProgressRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn find(&self, student_id: Uuid, course_id: i32) -> AppResult<Option<CourseProgress>> {
        let model = course_progress::Entity::find()
            .filter(course_progress::Column::StudentId.eq(student_id))
            .filter(course_progress::Column::CourseId.eq(course_id))
            .one(self.txn)
            .await?;

        match model {
            Some(model) => Ok(Some(self.hydrate(model).await?)),
            None => Ok(None),
        }
    }

    /// Fetch the single progress row of a (student, course) pair, creating it at zero.
    pub async fn get_or_create(&self, student_id: Uuid, course_id: i32) -> AppResult<CourseProgress> {
        if let Some(existing) = self.find(student_id, course_id).await? {
            return Ok(existing);
        }

        let model = course_progress::ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            progress: Set(Decimal::ZERO),
            completed: Set(false),
            last_accessed: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;

        tracing::debug!(student_id = %student_id, course_id, "Course progress created");
        self.hydrate(model).await
    }

    /// Student ids holding a progress row for the course.
    pub async fn students_of_course(&self, course_id: i32) -> AppResult<Vec<Uuid>> {
        let ids = course_progress::Entity::find()
            .select_only()
            .column(course_progress::Column::StudentId)
            .filter(course_progress::Column::CourseId.eq(course_id))
            .into_tuple::<Uuid>()
            .all(self.txn)
            .await?;
        Ok(ids)
    }

    /// Add a lesson to the completed set; adding twice is a no-op.
    pub async fn mark_completed(&self, progress_id: i32, lesson_id: i32) -> AppResult<()> {
        let exists = completed_lesson::Entity::find()
            .filter(completed_lesson::Column::ProgressId.eq(progress_id))
            .filter(completed_lesson::Column::LessonId.eq(lesson_id))
            .one(self.txn)
            .await?
            .is_some();
        if exists {
            return Ok(());
        }

        completed_lesson::ActiveModel {
            progress_id: Set(progress_id),
            lesson_id: Set(lesson_id),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;
        Ok(())
    }

    /// Remove a lesson from the completed set; removing an absent lesson is a no-op.
    pub async fn mark_uncompleted(&self, progress_id: i32, lesson_id: i32) -> AppResult<()> {
        completed_lesson::Entity::delete_many()
            .filter(completed_lesson::Column::ProgressId.eq(progress_id))
            .filter(completed_lesson::Column::LessonId.eq(lesson_id))
            .exec(self.txn)
            .await?;
        Ok(())
    }

    /// Store recomputed values and touch `last_accessed`.
    pub async fn save(&self, progress_id: i32, progress: Decimal, completed: bool) -> AppResult<()> {
        let model = course_progress::Entity::find_by_id(progress_id)
            .one(self.txn)
            .await?
            .ok_or_else(|| AppError::not_found("Course progress not found"))?;
        let mut active: course_progress::ActiveModel = model.into();
        active.progress = Set(progress);
        active.completed = Set(completed);
        active.last_accessed = Set(Utc::now());
        active.update(self.txn).await?;
        Ok(())
    }

    async fn hydrate(&self, model: course_progress::Model) -> AppResult<CourseProgress> {
        let completed_lessons = completed_lesson::Entity::find()
            .select_only()
            .column(completed_lesson::Column::LessonId)
            .filter(completed_lesson::Column::ProgressId.eq(model.id))
            .order_by_asc(completed_lesson::Column::LessonId)
            .into_tuple::<i32>()
            .all(self.txn)
            .await?;

        Ok(CourseProgress {
            id: model.id,
            student_id: model.student_id,
            course_id: model.course_id,
            progress: model.progress,
            completed: model.completed,
            completed_lessons,
            last_accessed: model.last_accessed,
        })
    }
}
