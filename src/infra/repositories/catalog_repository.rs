//! Courses, sections, lessons and quiz questions.
//!
//! Besides plain reads and inserts this store exposes narrow writers for the
//! derived columns (`number_of_lessons`, `total_duration`, rating fields,
//! `number_of_students`). Only the recomputation routines call them.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::{answer_option, collection, course, lesson, question, section};
use crate::domain::{
    AnswerOption, Collection, Course, Lesson, NewCourse, NewSection, Question, RatingAggregate,
    Section, SectionTotals,
};
use crate::domain::catalog::next_sequence;
use crate::errors::{AppError, AppResult, DbResultExt};

/// Resolved lesson fields ready to be stored
#[derive(Debug, Clone)]
pub struct LessonRecord {
    pub title: String,
    pub file: Option<String>,
    pub duration: i64,
    pub is_active: bool,
}

/// Transaction-scoped catalog access.
pub struct TxCatalogRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxCatalogRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    // =========================================================================
    // Collections & courses
    // =========================================================================

    pub async fn create_collection(&self, title: &str) -> AppResult<Collection> {
        let model = collection::ActiveModel {
            title: Set(title.to_string()),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;
        Ok(Collection::from(model))
    }

    pub async fn find_collection(&self, id: i32) -> AppResult<Option<Collection>> {
        let model = collection::Entity::find_by_id(id).one(self.txn).await?;
        Ok(model.map(Collection::from))
    }

    pub async fn create_course(&self, instructor_id: Uuid, input: &NewCourse) -> AppResult<Course> {
        let now = Utc::now();
        let model = course::ActiveModel {
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            price: Set(input.price),
            currency: Set(input.currency.as_str().to_string()),
            level: Set(input.level.as_str().to_string()),
            is_active: Set(true),
            collection_id: Set(input.collection_id),
            instructor_id: Set(instructor_id),
            preview: Set(input.preview.clone()),
            rating_count: Set(0),
            average_rating: Set(0.0),
            number_of_students: Set(0),
            total_duration: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.txn)
        .await
        .or_conflict("Preview is already used by another course")?;
        Ok(Course::from(model))
    }

    pub async fn find_course(&self, id: i32) -> AppResult<Option<Course>> {
        let model = course::Entity::find_by_id(id).one(self.txn).await?;
        Ok(model.map(Course::from))
    }

    pub async fn find_courses(&self, ids: &[i32]) -> AppResult<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = course::Entity::find()
            .filter(course::Column::Id.is_in(ids.iter().copied()))
            .all(self.txn)
            .await?;
        Ok(models.into_iter().map(Course::from).collect())
    }

    /// Course ids taught by an instructor.
    pub async fn course_ids_of_instructor(&self, instructor_id: Uuid) -> AppResult<Vec<i32>> {
        let ids = course::Entity::find()
            .select_only()
            .column(course::Column::Id)
            .filter(course::Column::InstructorId.eq(instructor_id))
            .into_tuple::<i32>()
            .all(self.txn)
            .await?;
        Ok(ids)
    }

    async fn course_model(&self, id: i32) -> AppResult<course::Model> {
        course::Entity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_else(|| AppError::not_found("Course not found"))
    }

    pub async fn set_course_duration(&self, id: i32, total_duration: i64) -> AppResult<()> {
        let mut active: course::ActiveModel = self.course_model(id).await?.into();
        active.total_duration = Set(total_duration);
        active.updated_at = Set(Utc::now());
        active.update(self.txn).await?;
        Ok(())
    }

    pub async fn set_course_rating(&self, id: i32, aggregate: RatingAggregate) -> AppResult<()> {
        let mut active: course::ActiveModel = self.course_model(id).await?.into();
        active.rating_count = Set(aggregate.rating_count);
        active.average_rating = Set(aggregate.average_rating);
        active.updated_at = Set(Utc::now());
        active.update(self.txn).await?;
        Ok(())
    }

    pub async fn set_course_students(&self, id: i32, number_of_students: i32) -> AppResult<()> {
        let mut active: course::ActiveModel = self.course_model(id).await?.into();
        active.number_of_students = Set(number_of_students);
        active.updated_at = Set(Utc::now());
        active.update(self.txn).await?;
        Ok(())
    }

    // =========================================================================
    // Sections
    // =========================================================================

    pub async fn find_section(&self, id: i32) -> AppResult<Option<Section>> {
        let model = section::Entity::find_by_id(id).one(self.txn).await?;
        Ok(model.map(Section::from))
    }

    /// Sections of a course ordered by position.
    pub async fn sections_of_course(&self, course_id: i32) -> AppResult<Vec<Section>> {
        let models = section::Entity::find()
            .filter(section::Column::CourseId.eq(course_id))
            .order_by_asc(section::Column::Position)
            .all(self.txn)
            .await?;
        Ok(models.into_iter().map(Section::from).collect())
    }

    pub async fn max_section_position(&self, course_id: i32) -> AppResult<Option<i32>> {
        let max = section::Entity::find()
            .select_only()
            .column(section::Column::Position)
            .filter(section::Column::CourseId.eq(course_id))
            .order_by_desc(section::Column::Position)
            .into_tuple::<i32>()
            .one(self.txn)
            .await?;
        Ok(max)
    }

    /// Drop the default flag from every section of the course.
    pub async fn clear_default_section(&self, course_id: i32) -> AppResult<()> {
        section::Entity::update_many()
            .col_expr(section::Column::IsDefault, Expr::value(false))
            .filter(section::Column::CourseId.eq(course_id))
            .filter(section::Column::IsDefault.eq(true))
            .exec(self.txn)
            .await?;
        Ok(())
    }

    pub async fn create_section(
        &self,
        course_id: i32,
        input: &NewSection,
        position: i32,
        is_default: bool,
    ) -> AppResult<Section> {
        let model = section::ActiveModel {
            course_id: Set(course_id),
            title: Set(input.title.clone()),
            position: Set(position),
            locked: Set(input.locked),
            is_default: Set(is_default),
            number_of_lessons: Set(0),
            total_duration: Set(0),
            lessons_issued: Set(0),
            ..Default::default()
        }
        .insert(self.txn)
        .await
        .or_conflict("Section position already taken")?;
        Ok(Section::from(model))
    }

    pub async fn set_section_totals(&self, id: i32, totals: SectionTotals) -> AppResult<()> {
        let model = section::Entity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_else(|| AppError::not_found("Section not found"))?;
        let mut active: section::ActiveModel = model.into();
        active.number_of_lessons = Set(totals.number_of_lessons);
        active.total_duration = Set(totals.total_duration);
        active.update(self.txn).await?;
        Ok(())
    }

    // =========================================================================
    // Lessons
    // =========================================================================

    pub async fn find_lesson(&self, id: i32) -> AppResult<Option<Lesson>> {
        let model = lesson::Entity::find_by_id(id).one(self.txn).await?;
        Ok(model.map(Lesson::from))
    }

    pub async fn lessons_of_section(&self, section_id: i32) -> AppResult<Vec<Lesson>> {
        let models = lesson::Entity::find()
            .filter(lesson::Column::SectionId.eq(section_id))
            .order_by_asc(lesson::Column::LessonOrder)
            .all(self.txn)
            .await?;
        Ok(models.into_iter().map(Lesson::from).collect())
    }

    /// Every lesson id of a course, across all its sections.
    pub async fn lesson_ids_of_course(&self, course_id: i32) -> AppResult<Vec<i32>> {
        let section_ids = section::Entity::find()
            .select_only()
            .column(section::Column::Id)
            .filter(section::Column::CourseId.eq(course_id))
            .into_tuple::<i32>()
            .all(self.txn)
            .await?;
        if section_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = lesson::Entity::find()
            .select_only()
            .column(lesson::Column::Id)
            .filter(lesson::Column::SectionId.is_in(section_ids))
            .into_tuple::<i32>()
            .all(self.txn)
            .await?;
        Ok(ids)
    }

    /// Claim the next lesson order of a section. Orders of deleted lessons
    /// are never handed out again.
    pub async fn claim_lesson_order(&self, section_id: i32) -> AppResult<i32> {
        let model = section::Entity::find_by_id(section_id)
            .one(self.txn)
            .await?
            .ok_or_else(|| AppError::not_found("Section not found"))?;
        let order = next_sequence(Some(model.lessons_issued));
        let mut active: section::ActiveModel = model.into();
        active.lessons_issued = Set(order);
        active.update(self.txn).await?;
        Ok(order)
    }

    pub async fn create_lesson(
        &self,
        section_id: i32,
        record: LessonRecord,
        order: i32,
    ) -> AppResult<Lesson> {
        let model = lesson::ActiveModel {
            section_id: Set(section_id),
            title: Set(record.title),
            file: Set(record.file),
            lesson_order: Set(order),
            duration: Set(record.duration),
            is_active: Set(record.is_active),
            ..Default::default()
        }
        .insert(self.txn)
        .await
        .or_conflict("File is already attached to another lesson")?;
        Ok(Lesson::from(model))
    }

    pub async fn update_lesson(&self, id: i32, record: LessonRecord) -> AppResult<Lesson> {
        let model = lesson::Entity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_else(|| AppError::not_found("Lesson not found"))?;
        let mut active: lesson::ActiveModel = model.into();
        active.title = Set(record.title);
        active.file = Set(record.file);
        active.duration = Set(record.duration);
        active.is_active = Set(record.is_active);
        let model = active
            .update(self.txn)
            .await
            .or_conflict("File is already attached to another lesson")?;
        Ok(Lesson::from(model))
    }

    pub async fn delete_lesson(&self, id: i32) -> AppResult<()> {
        let result = lesson::Entity::delete_by_id(id).exec(self.txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Lesson not found"));
        }
        Ok(())
    }

    // =========================================================================
    // Questions
    // =========================================================================

    pub async fn create_question(&self, section_id: i32, text: &str) -> AppResult<Question> {
        let model = question::ActiveModel {
            section_id: Set(section_id),
            text: Set(text.to_string()),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;
        Ok(Question::from(model))
    }

    pub async fn create_option(
        &self,
        question_id: i32,
        text: &str,
        is_correct: bool,
    ) -> AppResult<AnswerOption> {
        let model = answer_option::ActiveModel {
            question_id: Set(question_id),
            text: Set(text.to_string()),
            is_correct: Set(is_correct),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;
        Ok(AnswerOption::from(model))
    }

    pub async fn find_question(&self, id: i32) -> AppResult<Option<Question>> {
        let model = question::Entity::find_by_id(id).one(self.txn).await?;
        Ok(model.map(Question::from))
    }

    pub async fn find_option(&self, id: i32) -> AppResult<Option<AnswerOption>> {
        let model = answer_option::Entity::find_by_id(id).one(self.txn).await?;
        Ok(model.map(AnswerOption::from))
    }

    pub async fn questions_of_section(&self, section_id: i32) -> AppResult<Vec<Question>> {
        let models = question::Entity::find()
            .filter(question::Column::SectionId.eq(section_id))
            .order_by_asc(question::Column::Id)
            .all(self.txn)
            .await?;
        Ok(models.into_iter().map(Question::from).collect())
    }

    pub async fn options_of_questions(&self, question_ids: &[i32]) -> AppResult<Vec<AnswerOption>> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = answer_option::Entity::find()
            .filter(answer_option::Column::QuestionId.is_in(question_ids.iter().copied()))
            .order_by_asc(answer_option::Column::Id)
            .all(self.txn)
            .await?;
        Ok(models.into_iter().map(AnswerOption::from).collect())
    }
}
