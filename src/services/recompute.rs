//! Aggregate recomputation.
//!
//! Every derived column is rebuilt from the rows currently stored, inside the
//! transaction of the write that invalidated it. Nothing here accumulates
//! deltas, so running a routine twice over the same facts stores the same
//! value.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::progress::{is_course_complete, net_earnings, progress_percent};
use crate::domain::{
    Course, CourseProgress, DomainEvent, InstructorEarnings, Order, OrderItem, PurchasedCourse,
    RatingAggregate, SectionTotals,
};
use crate::errors::{AppResult, OptionExt};
use crate::infra::TransactionContext;

/// Result of a progress recomputation
#[derive(Debug, Clone)]
pub struct ProgressChange {
    pub progress: CourseProgress,
    /// The row moved from incomplete to complete in this recomputation
    pub newly_completed: bool,
}

/// Rebuild `progress` and `completed` of a (student, course) pair.
pub async fn course_progress(
    ctx: &TransactionContext<'_>,
    student_id: Uuid,
    course_id: i32,
) -> AppResult<ProgressChange> {
    let mut progress = ctx.progress().get_or_create(student_id, course_id).await?;
    let lesson_ids: BTreeSet<i32> = ctx
        .catalog()
        .lesson_ids_of_course(course_id)
        .await?
        .into_iter()
        .collect();

    let done = progress
        .completed_lessons
        .iter()
        .filter(|id| lesson_ids.contains(id))
        .count();
    let percent = progress_percent(done, lesson_ids.len());
    let completed = is_course_complete(done, lesson_ids.len());
    let newly_completed = completed && !progress.completed;

    ctx.progress().save(progress.id, percent, completed).await?;

    progress.progress = percent;
    progress.completed = completed;
    Ok(ProgressChange {
        progress,
        newly_completed,
    })
}

/// Event owed when a student finishes a course.
pub async fn course_completed(
    ctx: &TransactionContext<'_>,
    student_id: Uuid,
    course: &Course,
) -> AppResult<DomainEvent> {
    let student_name = ctx
        .accounts()
        .find_user(student_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_else(|| student_id.to_string());

    Ok(DomainEvent::CourseCompleted {
        student_id,
        student_name,
        course_id: course.id,
        course_title: course.title.clone(),
        instructor_id: course.instructor_id,
    })
}

/// Rebuild `rating_count` and `average_rating` of a course.
pub async fn course_rating(ctx: &TransactionContext<'_>, course_id: i32) -> AppResult<RatingAggregate> {
    let scores = ctx.ratings().scores_of_course(course_id).await?;
    let aggregate = RatingAggregate::from_scores(&scores);
    ctx.catalog().set_course_rating(course_id, aggregate).await?;

    tracing::debug!(
        course_id,
        rating_count = aggregate.rating_count,
        average_rating = aggregate.average_rating,
        "Course rating recomputed"
    );
    Ok(aggregate)
}

/// Rebuild section totals, the course duration, then every student's progress
/// in the course. Runs after any lesson create, update or delete.
///
/// Returns completion events for students the change pushed to 100%.
pub async fn lesson_cascade(ctx: &TransactionContext<'_>, section_id: i32) -> AppResult<Vec<DomainEvent>> {
    let catalog = ctx.catalog();
    let section = catalog.find_section(section_id).await?.ok_or_not_found("Section not found")?;

    let lessons = catalog.lessons_of_section(section_id).await?;
    catalog.set_section_totals(section_id, SectionTotals::from_lessons(&lessons)).await?;

    let course_duration: i64 = catalog
        .sections_of_course(section.course_id)
        .await?
        .iter()
        .map(|s| s.total_duration)
        .sum();
    catalog.set_course_duration(section.course_id, course_duration).await?;

    let course = catalog.find_course(section.course_id).await?.ok_or_not_found("Course not found")?;
    let mut events = Vec::new();
    for student_id in ctx.progress().students_of_course(course.id).await? {
        let change = course_progress(ctx, student_id, course.id).await?;
        if change.newly_completed {
            events.push(course_completed(ctx, student_id, &course).await?);
        }
    }

    tracing::debug!(
        section_id,
        course_id = course.id,
        total_duration = course_duration,
        "Lesson aggregates recomputed"
    );
    Ok(events)
}

/// Rebuild `number_of_students` as the distinct completed buyers.
pub async fn course_students(ctx: &TransactionContext<'_>, course_id: i32) -> AppResult<i32> {
    let count = ctx.orders().enrolled_customers(course_id).await? as i32;
    ctx.catalog().set_course_students(course_id, count).await?;
    Ok(count)
}

/// Rebuild the instructor's net earnings from completed purchase records.
pub async fn instructor_earnings(
    ctx: &TransactionContext<'_>,
    instructor_id: Uuid,
    default_deduction: Decimal,
) -> AppResult<InstructorEarnings> {
    let earnings = ctx.earnings().get_or_create(instructor_id, default_deduction).await?;
    let prices: Vec<Decimal> = ctx
        .orders()
        .completed_items_of_instructor(instructor_id)
        .await?
        .into_iter()
        .map(|item| item.price)
        .collect();

    let total = net_earnings(&prices, earnings.deduction_percentage);
    ctx.earnings().set_total(earnings.id, total).await
}

/// Effects of a completed order: progress rows, enrollment counts and
/// instructor earnings. Returns the `OrderPlaced` event to publish after commit.
pub async fn enrollment(
    ctx: &TransactionContext<'_>,
    order: &Order,
    items: &[OrderItem],
    student_id: Uuid,
    default_deduction: Decimal,
) -> AppResult<DomainEvent> {
    let mut instructors = BTreeSet::new();
    for item in items {
        ctx.progress().get_or_create(student_id, item.course_id).await?;
        course_students(ctx, item.course_id).await?;
        instructors.insert(item.instructor_id);
    }

    for instructor_id in &instructors {
        instructor_earnings(ctx, *instructor_id, default_deduction).await?;
    }

    let course_ids: Vec<i32> = items.iter().map(|i| i.course_id).collect();
    let titles: BTreeMap<i32, String> = ctx
        .catalog()
        .find_courses(&course_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c.title))
        .collect();

    let mut people: Vec<Uuid> = instructors.into_iter().collect();
    people.push(student_id);
    let names: BTreeMap<Uuid, String> = ctx.accounts().names(&people).await?.into_iter().collect();
    let name_of = |id: &Uuid| names.get(id).cloned().unwrap_or_else(|| id.to_string());

    let courses = items
        .iter()
        .map(|item| PurchasedCourse {
            course_id: item.course_id,
            title: titles.get(&item.course_id).cloned().unwrap_or_default(),
            instructor_id: item.instructor_id,
            instructor_name: name_of(&item.instructor_id),
        })
        .collect();

    tracing::info!(
        order_id = order.id,
        customer_id = order.customer_id,
        courses = items.len(),
        "Enrollment applied"
    );

    Ok(DomainEvent::OrderPlaced {
        order_id: order.id,
        customer_user_id: student_id,
        customer_name: name_of(&student_id),
        courses,
    })
}
