//! Access & gating evaluation against stored facts.
//!
//! The verdict itself comes from the pure capability table in
//! `domain::access`; this module only gathers the facts it needs
//! (ownership, completed purchase, unlock state) inside the caller's
//! transaction.

use uuid::Uuid;

use crate::domain::catalog::previous_section;
use crate::domain::{
    is_permitted, section_unlocked, AccessFacts, Action, Actor, Course, Lesson, Section,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::TransactionContext;

/// Course and section addressed by a nested route
#[derive(Debug, Clone)]
pub struct SectionScope {
    pub course: Course,
    pub section: Section,
}

/// Load a section and check it belongs to the course.
pub async fn load_section(
    ctx: &TransactionContext<'_>,
    course_id: i32,
    section_id: i32,
) -> AppResult<SectionScope> {
    let catalog = ctx.catalog();
    let course = catalog.find_course(course_id).await?.ok_or_not_found("Course not found")?;
    let section = catalog
        .find_section(section_id)
        .await?
        .filter(|s| s.course_id == course.id)
        .ok_or_not_found("Section not found")?;
    Ok(SectionScope { course, section })
}

/// Load a lesson together with its section and course.
pub async fn load_lesson(ctx: &TransactionContext<'_>, lesson_id: i32) -> AppResult<(Lesson, SectionScope)> {
    let catalog = ctx.catalog();
    let lesson = catalog.find_lesson(lesson_id).await?.ok_or_not_found("Lesson not found")?;
    let section = catalog.find_section(lesson.section_id).await?.ok_or_not_found("Section not found")?;
    let course = catalog.find_course(section.course_id).await?.ok_or_not_found("Course not found")?;
    Ok((lesson, SectionScope { course, section }))
}

/// True when the user holds a completed purchase of the course.
pub async fn has_purchase(ctx: &TransactionContext<'_>, user_id: Uuid, course_id: i32) -> AppResult<bool> {
    match ctx.accounts().find_customer_by_user(user_id).await? {
        Some(customer) => ctx.orders().has_completed_purchase(customer.id, course_id).await,
        None => Ok(false),
    }
}

/// Default sections, first sections and sections whose predecessor quiz the
/// student passed are unlocked.
pub async fn is_section_unlocked(
    ctx: &TransactionContext<'_>,
    student_id: Uuid,
    section: &Section,
) -> AppResult<bool> {
    if section.is_default {
        return Ok(true);
    }

    let sections = ctx.catalog().sections_of_course(section.course_id).await?;
    let previous = match previous_section(&sections, section) {
        Some(previous) => previous,
        None => return Ok(section_unlocked(section.is_default, false, false)),
    };

    let score = ctx.quiz().find_score(student_id, previous.id).await?;
    // The stored flag holds the exact-ratio verdict
    let passed = score.is_some_and(|s| s.completed);
    Ok(section_unlocked(section.is_default, true, passed))
}

/// Gather the facts the capability table needs for this caller.
pub async fn facts(
    ctx: &TransactionContext<'_>,
    actor: &Actor,
    course: &Course,
    section: Option<&Section>,
) -> AppResult<AccessFacts> {
    let is_owner = course.is_owned_by(actor.id);
    let has_purchase = has_purchase(ctx, actor.id, course.id).await?;
    let section_unlocked = match section {
        Some(section) if has_purchase => is_section_unlocked(ctx, actor.id, section).await?,
        _ => false,
    };

    Ok(AccessFacts {
        is_owner,
        has_purchase,
        section_unlocked,
    })
}

/// Fail unless the caller may perform `action` on the course (and section).
pub async fn authorize(
    ctx: &TransactionContext<'_>,
    actor: &Actor,
    action: Action,
    course: &Course,
    section: Option<&Section>,
) -> AppResult<AccessFacts> {
    let facts = facts(ctx, actor, course, section).await?;
    if is_permitted(action, actor.role, &facts) {
        return Ok(facts);
    }

    tracing::debug!(
        user_id = %actor.id,
        role = %actor.role,
        course_id = course.id,
        action = ?action,
        "Access denied"
    );
    Err(denial(action, &facts))
}

fn denial(action: Action, facts: &AccessFacts) -> AppError {
    match action {
        Action::ViewSection | Action::AnswerQuiz | Action::TrackLesson if facts.has_purchase => {
            AppError::forbidden("Complete the previous section's quiz to unlock this section")
        }
        Action::ViewSection | Action::AnswerQuiz | Action::TrackLesson | Action::ViewProgress => {
            AppError::forbidden("You have not purchased this course")
        }
        Action::RateCourse => AppError::validation("You can only rate courses you have purchased"),
        Action::ManageCourse => AppError::forbidden("Only the course instructor can modify this course"),
        Action::ViewEarnings => AppError::forbidden("You can only view your own earnings"),
        Action::Checkout => AppError::forbidden("Only students and instructors can buy courses"),
        Action::SettlePayment => AppError::forbidden("Only administrators can settle payments"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denials_map_to_http_statuses() {
        let none = AccessFacts::default();
        assert!(matches!(denial(Action::TrackLesson, &none), AppError::Forbidden(_)));
        assert!(matches!(denial(Action::RateCourse, &none), AppError::Validation(_)));

        let bought = AccessFacts { has_purchase: true, ..none };
        let err = denial(Action::ViewSection, &bought);
        assert!(err.to_string().contains("previous section"));
    }
}
