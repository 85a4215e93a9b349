//! Catalog service - Course structure management.
//!
//! Lesson writes are the trigger for the duration and progress cascade, so
//! every lesson mutation runs `recompute::lesson_cascade` before commit.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::access::{authorize, load_lesson, load_section};
use super::notifier::EventDispatcher;
use super::recompute;
use crate::config::MIN_QUESTION_OPTIONS;
use crate::domain::catalog::{lesson_duration, next_sequence};
use crate::domain::{
    Action, Actor, Collection, Course, Lesson, LessonChanges, NewCourse, NewLesson, NewQuestion,
    NewSection, QuestionView, Section, UserRole,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{LessonRecord, UnitOfWork};

/// Owner-facing course counters
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseStatistics {
    pub course_id: i32,
    pub rating_count: i32,
    pub average_rating: f64,
    #[serde(rename = "numberOfStudents")]
    pub number_of_students: i32,
    pub total_duration: i64,
}

impl From<&Course> for CourseStatistics {
    fn from(course: &Course) -> Self {
        Self {
            course_id: course.id,
            rating_count: course.rating_count,
            average_rating: course.average_rating,
            number_of_students: course.number_of_students,
            total_duration: course.total_duration,
        }
    }
}

/// Catalog service trait for dependency injection.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn create_collection(&self, actor: &Actor, title: String) -> AppResult<Collection>;

    /// The calling instructor becomes the owner.
    async fn create_course(&self, actor: &Actor, input: NewCourse) -> AppResult<Course>;

    async fn get_course(&self, course_id: i32) -> AppResult<Course>;

    async fn list_sections(&self, course_id: i32) -> AppResult<Vec<Section>>;

    async fn create_section(&self, actor: &Actor, course_id: i32, input: NewSection) -> AppResult<Section>;

    async fn list_lessons(&self, actor: &Actor, course_id: i32, section_id: i32) -> AppResult<Vec<Lesson>>;

    async fn create_lesson(
        &self,
        actor: &Actor,
        course_id: i32,
        section_id: i32,
        input: NewLesson,
    ) -> AppResult<Lesson>;

    async fn update_lesson(&self, actor: &Actor, lesson_id: i32, changes: LessonChanges) -> AppResult<Lesson>;

    async fn delete_lesson(&self, actor: &Actor, lesson_id: i32) -> AppResult<()>;

    async fn create_question(
        &self,
        actor: &Actor,
        course_id: i32,
        section_id: i32,
        input: NewQuestion,
    ) -> AppResult<QuestionView>;

    /// Option correctness is revealed to the owner and to admins only.
    async fn list_questions(&self, actor: &Actor, course_id: i32, section_id: i32) -> AppResult<Vec<QuestionView>>;

    async fn statistics(&self, actor: &Actor, course_id: i32) -> AppResult<CourseStatistics>;
}

/// Concrete implementation of CatalogService using Unit of Work.
pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
    dispatcher: EventDispatcher,
}

impl<U: UnitOfWork> CatalogManager<U> {
    pub fn new(uow: Arc<U>, dispatcher: EventDispatcher) -> Self {
        Self { uow, dispatcher }
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogManager<U> {
    async fn create_collection(&self, actor: &Actor, title: String) -> AppResult<Collection> {
        if actor.role == UserRole::Student {
            return Err(AppError::forbidden("Only instructors can create collections"));
        }

        crate::with_transaction!(self.uow, |ctx| {
            ctx.catalog().create_collection(title.trim()).await
        })
    }

    async fn create_course(&self, actor: &Actor, input: NewCourse) -> AppResult<Course> {
        if actor.role != UserRole::Instructor {
            return Err(AppError::forbidden("Only instructors can create courses"));
        }
        if input.price.is_sign_negative() {
            return Err(AppError::validation("price must not be negative"));
        }

        let instructor_id = actor.id;
        let course = crate::with_transaction!(self.uow, |ctx| {
            ctx.catalog()
                .find_collection(input.collection_id)
                .await?
                .ok_or_not_found("Collection not found")?;
            ctx.catalog().create_course(instructor_id, &input).await
        })?;

        tracing::info!(course_id = course.id, instructor_id = %instructor_id, "Course created");
        Ok(course)
    }

    async fn get_course(&self, course_id: i32) -> AppResult<Course> {
        crate::with_transaction!(self.uow, |ctx| {
            ctx.catalog().find_course(course_id).await?.ok_or_not_found("Course not found")
        })
    }

    async fn list_sections(&self, course_id: i32) -> AppResult<Vec<Section>> {
        crate::with_transaction!(self.uow, |ctx| {
            ctx.catalog().find_course(course_id).await?.ok_or_not_found("Course not found")?;
            ctx.catalog().sections_of_course(course_id).await
        })
    }

    async fn create_section(&self, actor: &Actor, course_id: i32, input: NewSection) -> AppResult<Section> {
        let actor = actor.clone();
        crate::with_transaction!(self.uow, |ctx| {
            let catalog = ctx.catalog();
            let course = catalog.find_course(course_id).await?.ok_or_not_found("Course not found")?;
            authorize(&ctx, &actor, Action::ManageCourse, &course, None).await?;

            let current_max = catalog.max_section_position(course.id).await?;
            // The first section of a course is the default one
            let is_default = input.is_default || current_max.is_none();
            if is_default {
                catalog.clear_default_section(course.id).await?;
            }

            catalog
                .create_section(course.id, &input, next_sequence(current_max), is_default)
                .await
        })
    }

    async fn list_lessons(&self, actor: &Actor, course_id: i32, section_id: i32) -> AppResult<Vec<Lesson>> {
        let actor = actor.clone();
        crate::with_transaction!(self.uow, |ctx| {
            let scope = load_section(&ctx, course_id, section_id).await?;
            authorize(&ctx, &actor, Action::ViewSection, &scope.course, Some(&scope.section)).await?;
            ctx.catalog().lessons_of_section(scope.section.id).await
        })
    }

    async fn create_lesson(
        &self,
        actor: &Actor,
        course_id: i32,
        section_id: i32,
        input: NewLesson,
    ) -> AppResult<Lesson> {
        let actor = actor.clone();
        let (lesson, events) = crate::with_transaction!(self.uow, |ctx| {
            let scope = load_section(&ctx, course_id, section_id).await?;
            authorize(&ctx, &actor, Action::ManageCourse, &scope.course, None).await?;

            let record = LessonRecord {
                duration: lesson_duration(input.file.as_deref(), input.duration),
                title: input.title,
                file: input.file,
                is_active: input.is_active,
            };
            let order = ctx.catalog().claim_lesson_order(scope.section.id).await?;
            let lesson = ctx.catalog().create_lesson(scope.section.id, record, order).await?;

            let events = recompute::lesson_cascade(&ctx, scope.section.id).await?;
            Ok((lesson, events))
        })?;

        tracing::info!(lesson_id = lesson.id, section_id = lesson.section_id, "Lesson created");
        self.dispatcher.publish(events).await;
        Ok(lesson)
    }

    async fn update_lesson(&self, actor: &Actor, lesson_id: i32, changes: LessonChanges) -> AppResult<Lesson> {
        let actor = actor.clone();
        let (lesson, events) = crate::with_transaction!(self.uow, |ctx| {
            let (current, scope) = load_lesson(&ctx, lesson_id).await?;
            authorize(&ctx, &actor, Action::ManageCourse, &scope.course, None).await?;

            let file = changes.file.or(current.file);
            let reported = changes.duration.unwrap_or(current.duration);
            let record = LessonRecord {
                duration: lesson_duration(file.as_deref(), reported),
                title: changes.title.unwrap_or(current.title),
                file,
                is_active: changes.is_active.unwrap_or(current.is_active),
            };
            let lesson = ctx.catalog().update_lesson(lesson_id, record).await?;

            let events = recompute::lesson_cascade(&ctx, lesson.section_id).await?;
            Ok((lesson, events))
        })?;

        self.dispatcher.publish(events).await;
        Ok(lesson)
    }

    async fn delete_lesson(&self, actor: &Actor, lesson_id: i32) -> AppResult<()> {
        let actor = actor.clone();
        let events = crate::with_transaction!(self.uow, |ctx| {
            let (lesson, scope) = load_lesson(&ctx, lesson_id).await?;
            authorize(&ctx, &actor, Action::ManageCourse, &scope.course, None).await?;

            ctx.catalog().delete_lesson(lesson.id).await?;
            recompute::lesson_cascade(&ctx, lesson.section_id).await
        })?;

        tracing::info!(lesson_id, "Lesson deleted");
        self.dispatcher.publish(events).await;
        Ok(())
    }

    async fn create_question(
        &self,
        actor: &Actor,
        course_id: i32,
        section_id: i32,
        input: NewQuestion,
    ) -> AppResult<QuestionView> {
        if input.options.len() < MIN_QUESTION_OPTIONS {
            return Err(AppError::validation(format!(
                "A question needs at least {} options",
                MIN_QUESTION_OPTIONS
            )));
        }
        if !input.options.iter().any(|o| o.is_correct) {
            return Err(AppError::validation("A question needs at least one correct option"));
        }

        let actor = actor.clone();
        crate::with_transaction!(self.uow, |ctx| {
            let scope = load_section(&ctx, course_id, section_id).await?;
            authorize(&ctx, &actor, Action::ManageCourse, &scope.course, None).await?;

            let catalog = ctx.catalog();
            let question = catalog.create_question(scope.section.id, &input.text).await?;
            let mut options = Vec::with_capacity(input.options.len());
            for option in &input.options {
                options.push(catalog.create_option(question.id, &option.text, option.is_correct).await?);
            }
            Ok(QuestionView::build(question, options, true))
        })
    }

    async fn list_questions(&self, actor: &Actor, course_id: i32, section_id: i32) -> AppResult<Vec<QuestionView>> {
        let actor = actor.clone();
        crate::with_transaction!(self.uow, |ctx| {
            let scope = load_section(&ctx, course_id, section_id).await?;
            let facts = authorize(&ctx, &actor, Action::ViewSection, &scope.course, Some(&scope.section)).await?;
            let reveal = facts.is_owner || actor.role.is_admin();

            let catalog = ctx.catalog();
            let questions = catalog.questions_of_section(scope.section.id).await?;
            let ids: Vec<i32> = questions.iter().map(|q| q.id).collect();
            let options = catalog.options_of_questions(&ids).await?;

            Ok(questions
                .into_iter()
                .map(|q| QuestionView::build(q, options.clone(), reveal))
                .collect())
        })
    }

    async fn statistics(&self, actor: &Actor, course_id: i32) -> AppResult<CourseStatistics> {
        let actor = actor.clone();
        crate::with_transaction!(self.uow, |ctx| {
            let course = ctx.catalog().find_course(course_id).await?.ok_or_not_found("Course not found")?;
            authorize(&ctx, &actor, Action::ManageCourse, &course, None).await?;
            Ok(CourseStatistics::from(&course))
        })
    }
}
