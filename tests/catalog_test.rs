//! Catalog authoring and course ratings.

mod common;

use rust_decimal_macros::dec;

use common::engine;
use course_engine::domain::{Currency, Level, NewCourse, NewOption, NewQuestion, NewSection, UserRole};
use course_engine::errors::AppError;
use course_engine::services::ServiceContainer;

fn new_course(collection_id: i32, price: rust_decimal::Decimal) -> NewCourse {
    NewCourse {
        title: "Draft".to_string(),
        description: "Draft course".to_string(),
        price,
        currency: Currency::Eur,
        level: Level::Advanced,
        collection_id,
        preview: "previews/draft.mp4".to_string(),
    }
}

// =============================================================================
// Authoring
// =============================================================================

#[tokio::test]
async fn test_only_instructors_author_courses() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let catalog = engine.services.catalog();

    let collection = catalog.create_collection(&instructor, "  Systems  ".to_string()).await.unwrap();
    assert_eq!(collection.title, "Systems");

    let by_student = catalog.create_collection(&student, "Nope".to_string()).await;
    assert!(matches!(by_student, Err(AppError::Forbidden(_))));

    let course = catalog.create_course(&student, new_course(collection.id, dec!(10))).await;
    assert!(matches!(course, Err(AppError::Forbidden(_))));

    let negative = catalog.create_course(&instructor, new_course(collection.id, dec!(-1))).await;
    assert!(matches!(negative, Err(AppError::Validation(_))));

    let orphan = catalog.create_course(&instructor, new_course(collection.id + 100, dec!(10))).await;
    assert!(matches!(orphan, Err(AppError::NotFound(_))));

    let created = catalog.create_course(&instructor, new_course(collection.id, dec!(10))).await.unwrap();
    assert_eq!(created.instructor_id, instructor.id);
    assert_eq!(created.currency, Currency::Eur);
    assert_eq!(created.level, Level::Advanced);
    assert_eq!(created.rating_count, 0);
    assert_eq!(created.number_of_students, 0);
}

#[tokio::test]
async fn test_sections_are_positioned_with_one_default() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let course = engine.course(&instructor, "Layout", dec!(10.00)).await;
    let catalog = engine.services.catalog();

    let first = engine.section(&instructor, course.id, "One").await;
    let second = engine.section(&instructor, course.id, "Two").await;
    assert_eq!((first.position, first.is_default), (1, true));
    assert_eq!((second.position, second.is_default), (2, false));

    let third = catalog
        .create_section(
            &instructor,
            course.id,
            NewSection {
                title: "Three".to_string(),
                locked: false,
                is_default: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(third.position, 3);

    let sections = catalog.list_sections(course.id).await.unwrap();
    let defaults: Vec<i32> = sections.iter().filter(|s| s.is_default).map(|s| s.id).collect();
    assert_eq!(defaults, vec![third.id]);
    let positions: Vec<i32> = sections.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_only_owner_changes_course_structure() {
    let engine = engine().await;
    let owner = engine.actor("ines", UserRole::Instructor).await;
    let rival = engine.actor("ivan", UserRole::Instructor).await;
    let course = engine.course(&owner, "Owned", dec!(10.00)).await;
    let section = engine.section(&owner, course.id, "One").await;
    let lesson = engine.lesson(&owner, course.id, section.id, "owned-1.mp4", 30).await;
    let catalog = engine.services.catalog();

    let section_attempt = catalog
        .create_section(
            &rival,
            course.id,
            NewSection {
                title: "Hijack".to_string(),
                locked: false,
                is_default: false,
            },
        )
        .await;
    assert!(matches!(section_attempt, Err(AppError::Forbidden(_))));

    let delete_attempt = catalog.delete_lesson(&rival, lesson.id).await;
    assert!(matches!(delete_attempt, Err(AppError::Forbidden(_))));

    let stats = catalog.statistics(&rival, course.id).await;
    assert!(matches!(stats, Err(AppError::Forbidden(_))));

    let stats = catalog.statistics(&owner, course.id).await.unwrap();
    assert_eq!(stats.course_id, course.id);
    assert_eq!(stats.total_duration, 30);
}

#[tokio::test]
async fn test_update_lesson_recomputes_duration() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let course = engine.course(&instructor, "Edited", dec!(10.00)).await;
    let section = engine.section(&instructor, course.id, "One").await;
    let lesson = engine.lesson(&instructor, course.id, section.id, "edited-1.mp4", 120).await;
    let catalog = engine.services.catalog();

    let shorter = catalog
        .update_lesson(
            &instructor,
            lesson.id,
            course_engine::domain::LessonChanges {
                duration: Some(60),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(shorter.duration, 60);
    assert_eq!(shorter.title, lesson.title);
    assert_eq!(catalog.get_course(course.id).await.unwrap().total_duration, 60);

    let document = catalog
        .update_lesson(
            &instructor,
            lesson.id,
            course_engine::domain::LessonChanges {
                file: Some("edited-1.pdf".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(document.duration, 0);
    assert_eq!(catalog.get_course(course.id).await.unwrap().total_duration, 0);
}

#[tokio::test]
async fn test_lesson_order_is_never_reused() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let course = engine.course(&instructor, "Reordered", dec!(10.00)).await;
    let section = engine.section(&instructor, course.id, "One").await;
    let other = engine.section(&instructor, course.id, "Two").await;
    let catalog = engine.services.catalog();

    let first = engine.lesson(&instructor, course.id, section.id, "reordered-1.mp4", 10).await;
    let second = engine.lesson(&instructor, course.id, section.id, "reordered-2.mp4", 10).await;
    assert_eq!((first.order, second.order), (1, 2));

    catalog.delete_lesson(&instructor, second.id).await.unwrap();
    let third = engine.lesson(&instructor, course.id, section.id, "reordered-3.mp4", 10).await;
    assert_eq!(third.order, 3);

    // Counters are per section
    let elsewhere = engine.lesson(&instructor, course.id, other.id, "reordered-4.mp4", 10).await;
    assert_eq!(elsewhere.order, 1);

    let orders: Vec<i32> = catalog
        .list_lessons(&instructor, course.id, section.id)
        .await
        .unwrap()
        .iter()
        .map(|l| l.order)
        .collect();
    assert_eq!(orders, vec![1, 3]);
}

#[tokio::test]
async fn test_question_rules_and_visibility() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let course = engine.course(&instructor, "Quizzed", dec!(10.00)).await;
    let section = engine.section(&instructor, course.id, "One").await;
    let catalog = engine.services.catalog();

    let single = catalog
        .create_question(
            &instructor,
            course.id,
            section.id,
            NewQuestion {
                text: "Lonely".to_string(),
                options: vec![NewOption {
                    text: "only".to_string(),
                    is_correct: true,
                }],
            },
        )
        .await;
    assert!(matches!(single, Err(AppError::Validation(_))));

    let no_answer = catalog
        .create_question(
            &instructor,
            course.id,
            section.id,
            NewQuestion {
                text: "Unanswerable".to_string(),
                options: vec![
                    NewOption {
                        text: "a".to_string(),
                        is_correct: false,
                    },
                    NewOption {
                        text: "b".to_string(),
                        is_correct: false,
                    },
                ],
            },
        )
        .await;
    assert!(matches!(no_answer, Err(AppError::Validation(_))));

    engine.question(&instructor, course.id, section.id, "Visible").await;
    engine.buy(&student, &[course.id]).await;

    let for_student = catalog.list_questions(&student, course.id, section.id).await.unwrap();
    assert_eq!(for_student.len(), 1);
    assert_eq!(for_student[0].options.len(), 2);
    assert!(for_student[0].options.iter().all(|o| o.is_correct.is_none()));

    let for_owner = catalog.list_questions(&instructor, course.id, section.id).await.unwrap();
    assert!(for_owner[0].options.iter().all(|o| o.is_correct.is_some()));
}

// =============================================================================
// Ratings
// =============================================================================

#[tokio::test]
async fn test_rating_aggregate_tracks_every_change() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let sam = engine.actor("sam", UserRole::Student).await;
    let olga = engine.actor("olga", UserRole::Student).await;
    let course = engine.course(&instructor, "Rated", dec!(10.00)).await;
    engine.buy(&sam, &[course.id]).await;
    engine.buy(&olga, &[course.id]).await;

    let ratings = engine.services.ratings();
    let catalog = engine.services.catalog();

    let from_sam = ratings.rate_course(&sam, course.id, dec!(4)).await.unwrap();
    let stored = catalog.get_course(course.id).await.unwrap();
    assert_eq!(stored.rating_count, 1);
    assert_eq!(stored.average_rating, 4.0);

    let from_olga = ratings.rate_course(&olga, course.id, dec!(5)).await.unwrap();
    let stored = catalog.get_course(course.id).await.unwrap();
    assert_eq!(stored.rating_count, 2);
    assert_eq!(stored.average_rating, 4.5);

    let twice = ratings.rate_course(&sam, course.id, dec!(3)).await;
    assert!(matches!(twice, Err(AppError::Conflict(_))));

    ratings.update_rating(&sam, course.id, from_sam.id, dec!(3)).await.unwrap();
    assert_eq!(catalog.get_course(course.id).await.unwrap().average_rating, 4.0);

    let not_yours = ratings.update_rating(&olga, course.id, from_sam.id, dec!(1)).await;
    assert!(matches!(not_yours, Err(AppError::Forbidden(_))));

    ratings.delete_rating(&olga, course.id, from_olga.id).await.unwrap();
    let stored = catalog.get_course(course.id).await.unwrap();
    assert_eq!(stored.rating_count, 1);
    assert_eq!(stored.average_rating, 3.0);

    let gone = ratings.delete_rating(&olga, course.id, from_olga.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));

    ratings.delete_rating(&sam, course.id, from_sam.id).await.unwrap();
    let stored = catalog.get_course(course.id).await.unwrap();
    assert_eq!(stored.rating_count, 0);
    assert_eq!(stored.average_rating, 0.0);
}

#[tokio::test]
async fn test_rating_requires_purchase_and_range() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let course = engine.course(&instructor, "Unrated", dec!(10.00)).await;
    let ratings = engine.services.ratings();

    let unbought = ratings.rate_course(&student, course.id, dec!(4)).await;
    assert!(matches!(
        unbought,
        Err(AppError::Validation(ref m)) if m == "You can only rate courses you have purchased"
    ));

    engine.buy(&student, &[course.id]).await;

    let too_high = ratings.rate_course(&student, course.id, dec!(6)).await;
    assert!(matches!(too_high, Err(AppError::Validation(_))));
    let too_low = ratings.rate_course(&student, course.id, dec!(0.5)).await;
    assert!(matches!(too_low, Err(AppError::Validation(_))));

    let unknown = ratings.rate_course(&student, course.id + 100, dec!(4)).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}
