//! Quiz scoring, section gating and lesson progress.

mod common;

use rust_decimal_macros::dec;

use common::{engine, option_id, Engine};
use course_engine::domain::{Actor, Course, QuestionView, QuizState, Section, UserRole};
use course_engine::errors::AppError;
use course_engine::services::{AnswerInput, ServiceContainer};

/// Course with two sections; the first carries a four-question quiz.
struct GatedCourse {
    instructor: Actor,
    student: Actor,
    course: Course,
    first: Section,
    second: Section,
    questions: Vec<QuestionView>,
}

async fn gated_course(engine: &Engine) -> GatedCourse {
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let course = engine.course(&instructor, "Gated", dec!(25.00)).await;

    let first = engine.section(&instructor, course.id, "Basics").await;
    let second = engine.section(&instructor, course.id, "Advanced").await;
    engine.lesson(&instructor, course.id, second.id, "advanced-1.mp4", 60).await;

    let mut questions = Vec::new();
    for n in 1..=4 {
        questions.push(
            engine
                .question(&instructor, course.id, first.id, &format!("Question {}", n))
                .await,
        );
    }

    engine.buy(&student, &[course.id]).await;

    GatedCourse {
        instructor,
        student,
        course,
        first,
        second,
        questions,
    }
}

fn answers(questions: &[QuestionView], correct: usize) -> Vec<AnswerInput> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| AnswerInput {
            question_id: Some(q.id),
            option_id: Some(option_id(q, i < correct)),
        })
        .collect()
}

// =============================================================================
// Gating
// =============================================================================

#[tokio::test]
async fn test_next_section_unlocks_after_passing_quiz() {
    let engine = engine().await;
    let g = gated_course(&engine).await;
    let catalog = engine.services.catalog();

    assert!(g.first.is_default);
    assert!(!g.second.is_default);

    let locked = catalog.list_lessons(&g.student, g.course.id, g.second.id).await;
    assert!(matches!(locked, Err(AppError::Forbidden(_))));

    let result = engine
        .services
        .quiz()
        .submit_all_answers(&g.student, g.course.id, g.first.id, answers(&g.questions, 3))
        .await
        .unwrap();
    assert_eq!(result.score, dec!(75));
    assert!(result.passed);
    assert_eq!(result.progress.correct_answers, 3);
    assert_eq!(result.progress.total_questions, 4);

    let lessons = catalog.list_lessons(&g.student, g.course.id, g.second.id).await.unwrap();
    assert_eq!(lessons.len(), 1);
}

#[tokio::test]
async fn test_failing_score_keeps_next_section_locked() {
    let engine = engine().await;
    let g = gated_course(&engine).await;

    let result = engine
        .services
        .quiz()
        .submit_all_answers(&g.student, g.course.id, g.first.id, answers(&g.questions, 2))
        .await
        .unwrap();
    assert_eq!(result.score, dec!(50));
    assert!(!result.passed);

    let locked = engine.services.catalog().list_lessons(&g.student, g.course.id, g.second.id).await;
    assert!(matches!(locked, Err(AppError::Forbidden(_))));

    let status = engine.services.quiz().status(&g.student, g.course.id, g.first.id).await.unwrap();
    assert_eq!(status.state, QuizState::Failed);
    assert_eq!(status.answered_questions, 4);
}

#[tokio::test]
async fn test_lessons_in_locked_section_cannot_be_tracked() {
    let engine = engine().await;
    let g = gated_course(&engine).await;
    let progress = engine.services.progress();
    let lessons = engine
        .services
        .catalog()
        .list_lessons(&g.instructor, g.course.id, g.second.id)
        .await
        .unwrap();
    let lesson_id = lessons[0].id;

    let locked = progress.set_lesson_completion(&g.student, lesson_id, true).await;
    assert!(matches!(
        locked,
        Err(AppError::Forbidden(ref m)) if m.contains("previous section")
    ));

    // Progress stays readable while the section is locked
    let before = progress.get_progress(&g.student, g.course.id).await.unwrap();
    assert_eq!(before.progress, dec!(0));
    assert!(before.completed_lessons.is_empty());

    engine
        .services
        .quiz()
        .submit_all_answers(&g.student, g.course.id, g.first.id, answers(&g.questions, 4))
        .await
        .unwrap();

    let done = progress.set_lesson_completion(&g.student, lesson_id, true).await.unwrap();
    assert_eq!(done.course_progress, dec!(100));
    assert!(done.course_completed);

    // The owner tracks regardless of gating
    let by_owner = progress.set_lesson_completion(&g.instructor, lesson_id, true).await;
    assert!(by_owner.is_ok());
}

#[tokio::test]
async fn test_owner_and_admin_bypass_gating() {
    let engine = engine().await;
    let g = gated_course(&engine).await;
    let admin = engine.actor("ada", UserRole::Admin).await;
    let catalog = engine.services.catalog();

    let owner_view = catalog.list_lessons(&g.instructor, g.course.id, g.second.id).await;
    assert!(owner_view.is_ok());

    let admin_view = catalog.list_lessons(&admin, g.course.id, g.second.id).await;
    assert!(admin_view.is_ok());

    let other = engine.actor("ivan", UserRole::Instructor).await;
    let denied = catalog.list_lessons(&other, g.course.id, g.first.id).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_section_must_belong_to_course() {
    let engine = engine().await;
    let g = gated_course(&engine).await;
    let other_course = engine.course(&g.instructor, "Elsewhere", dec!(5.00)).await;

    let mismatch = engine
        .services
        .catalog()
        .list_lessons(&g.student, other_course.id, g.first.id)
        .await;
    assert!(matches!(mismatch, Err(AppError::NotFound(_))));
}

// =============================================================================
// Quiz answers
// =============================================================================

#[tokio::test]
async fn test_answer_is_replaced_not_accumulated() {
    let engine = engine().await;
    let g = gated_course(&engine).await;
    let quiz = engine.services.quiz();
    let q = &g.questions[0];

    let right = quiz
        .submit_answer(&g.student, g.course.id, g.first.id, q.id, option_id(q, true))
        .await
        .unwrap();
    assert_eq!(right.score, dec!(25));
    assert!(!right.passed);
    assert_eq!(right.student_answer.question_id, q.id);

    let wrong = quiz
        .submit_answer(&g.student, g.course.id, g.first.id, q.id, option_id(q, false))
        .await
        .unwrap();
    assert_eq!(wrong.score, dec!(0));
    assert_eq!(wrong.student_answer.id, right.student_answer.id);

    let status = quiz.status(&g.student, g.course.id, g.first.id).await.unwrap();
    assert_eq!(status.state, QuizState::InProgress);
    assert_eq!(status.answered_questions, 1);
    assert_eq!(status.total_questions, 4);
}

#[tokio::test]
async fn test_answer_validation() {
    let engine = engine().await;
    let g = gated_course(&engine).await;
    let quiz = engine.services.quiz();
    let (q1, q2) = (&g.questions[0], &g.questions[1]);

    let crossed = quiz
        .submit_answer(&g.student, g.course.id, g.first.id, q1.id, option_id(q2, true))
        .await;
    assert!(matches!(crossed, Err(AppError::Validation(_))));

    let unknown_option = quiz
        .submit_answer(&g.student, g.course.id, g.first.id, q1.id, 9_999)
        .await;
    assert!(matches!(unknown_option, Err(AppError::NotFound(_))));

    let unknown_question = quiz
        .submit_answer(&g.student, g.course.id, g.first.id, 9_999, option_id(q1, true))
        .await;
    assert!(matches!(unknown_question, Err(AppError::NotFound(_))));

    let incomplete = quiz
        .submit_all_answers(
            &g.student,
            g.course.id,
            g.first.id,
            vec![AnswerInput {
                question_id: Some(q1.id),
                option_id: None,
            }],
        )
        .await;
    assert!(matches!(incomplete, Err(AppError::Validation(_))));

    let empty = quiz.submit_all_answers(&g.student, g.course.id, g.first.id, vec![]).await;
    assert!(matches!(empty, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_batch_with_bad_entry_stores_nothing() {
    let engine = engine().await;
    let g = gated_course(&engine).await;
    let quiz = engine.services.quiz();

    let mut batch = answers(&g.questions, 4);
    batch.push(AnswerInput {
        question_id: Some(g.questions[0].id),
        option_id: Some(option_id(&g.questions[1], true)),
    });

    let rejected = quiz.submit_all_answers(&g.student, g.course.id, g.first.id, batch).await;
    assert!(matches!(rejected, Err(AppError::Validation(_))));

    let status = quiz.status(&g.student, g.course.id, g.first.id).await.unwrap();
    assert_eq!(status.answered_questions, 0);
    assert_eq!(status.state, QuizState::NotStarted);
}

#[tokio::test]
async fn test_quiz_requires_purchase() {
    let engine = engine().await;
    let g = gated_course(&engine).await;
    let stranger = engine.actor("olga", UserRole::Student).await;
    let q = &g.questions[0];

    let denied = engine
        .services
        .quiz()
        .submit_answer(&stranger, g.course.id, g.first.id, q.id, option_id(q, true))
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(ref m)) if m == "You have not purchased this course"));
}

// =============================================================================
// Retake
// =============================================================================

#[tokio::test]
async fn test_retake_resets_score_and_counts_attempts() {
    let engine = engine().await;
    let g = gated_course(&engine).await;
    let quiz = engine.services.quiz();

    quiz.submit_all_answers(&g.student, g.course.id, g.first.id, answers(&g.questions, 4))
        .await
        .unwrap();
    let passed = quiz.status(&g.student, g.course.id, g.first.id).await.unwrap();
    assert_eq!(passed.state, QuizState::Passed);
    assert_eq!(passed.score, dec!(100));

    let first = quiz.retake(&g.student, g.course.id, g.first.id).await.unwrap();
    assert_eq!(first.attempt_count, 1);
    assert_eq!(
        first.redirect_url,
        format!("/courses/{}/sections/{}/questions", g.course.id, g.first.id)
    );

    let status = quiz.status(&g.student, g.course.id, g.first.id).await.unwrap();
    assert_eq!(status.state, QuizState::NotStarted);
    assert_eq!(status.score, dec!(0));
    assert_eq!(status.answered_questions, 0);
    assert_eq!(status.attempt_count, 1);

    // The zeroed score locks the next section again
    let locked = engine.services.catalog().list_lessons(&g.student, g.course.id, g.second.id).await;
    assert!(matches!(locked, Err(AppError::Forbidden(_))));

    let second = quiz.retake(&g.student, g.course.id, g.first.id).await.unwrap();
    assert_eq!(second.attempt_count, 2);
}

// =============================================================================
// Lesson progress
// =============================================================================

#[tokio::test]
async fn test_progress_follows_completed_lessons() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let course = engine.course(&instructor, "Tracked", dec!(10.00)).await;
    let section = engine.section(&instructor, course.id, "Only").await;
    let one = engine.lesson(&instructor, course.id, section.id, "tracked-1.mp4", 120).await;
    let two = engine.lesson(&instructor, course.id, section.id, "tracked-2.mp4", 180).await;
    engine.buy(&student, &[course.id]).await;

    let progress = engine.services.progress();

    let half = progress.set_lesson_completion(&student, one.id, true).await.unwrap();
    assert!(half.opened);
    assert_eq!(half.course_progress, dec!(50));
    assert!(!half.course_completed);

    // Marking again changes nothing
    let same = progress.set_lesson_completion(&student, one.id, true).await.unwrap();
    assert_eq!(same.course_progress, dec!(50));

    let done = progress.set_lesson_completion(&student, two.id, true).await.unwrap();
    assert_eq!(done.course_progress, dec!(100));
    assert!(done.course_completed);
    assert_eq!(engine.notifier.titles_for(instructor.id).iter().filter(|t| *t == "Course Completed").count(), 1);

    progress.set_lesson_completion(&student, two.id, true).await.unwrap();
    assert_eq!(engine.notifier.titles_for(instructor.id).iter().filter(|t| *t == "Course Completed").count(), 1);

    let undone = progress.set_lesson_completion(&student, two.id, false).await.unwrap();
    assert!(!undone.opened);
    assert_eq!(undone.course_progress, dec!(50));
    assert!(!undone.course_completed);

    let stored = progress.get_progress(&student, course.id).await.unwrap();
    assert_eq!(stored.completed_lessons, vec![one.id]);
    assert_eq!(stored.progress, dec!(50));
}

#[tokio::test]
async fn test_lesson_changes_cascade_to_totals_and_progress() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let course = engine.course(&instructor, "Cascade", dec!(10.00)).await;
    let section = engine.section(&instructor, course.id, "Only").await;
    let one = engine.lesson(&instructor, course.id, section.id, "cascade-1.mp4", 120).await;
    let two = engine.lesson(&instructor, course.id, section.id, "cascade-2.mov", 180).await;
    engine.buy(&student, &[course.id]).await;

    let catalog = engine.services.catalog();
    let progress = engine.services.progress();
    progress.set_lesson_completion(&student, one.id, true).await.unwrap();
    progress.set_lesson_completion(&student, two.id, true).await.unwrap();

    let sections = catalog.list_sections(course.id).await.unwrap();
    assert_eq!(sections[0].number_of_lessons, 2);
    assert_eq!(sections[0].total_duration, 300);
    assert_eq!(catalog.get_course(course.id).await.unwrap().total_duration, 300);

    // Non-video files never carry a duration
    let notes = engine.lesson(&instructor, course.id, section.id, "cascade-notes.pdf", 50).await;
    assert_eq!(notes.duration, 0);
    assert_eq!(notes.order, 3);

    let sections = catalog.list_sections(course.id).await.unwrap();
    assert_eq!(sections[0].number_of_lessons, 3);
    assert_eq!(sections[0].total_duration, 300);

    // A new lesson lowers everyone's progress in the course
    let diluted = progress.get_progress(&student, course.id).await.unwrap();
    assert_eq!(diluted.progress.round_dp(2), dec!(66.67));
    assert!(!diluted.completed);

    // Removing it restores completion and notifies again
    catalog.delete_lesson(&instructor, notes.id).await.unwrap();
    let restored = progress.get_progress(&student, course.id).await.unwrap();
    assert_eq!(restored.progress, dec!(100));
    assert!(restored.completed);
    assert_eq!(engine.notifier.titles_for(instructor.id).iter().filter(|t| *t == "Course Completed").count(), 2);
}

#[tokio::test]
async fn test_progress_requires_purchase() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let admin = engine.actor("ada", UserRole::Admin).await;
    let course = engine.course(&instructor, "Closed", dec!(10.00)).await;
    let section = engine.section(&instructor, course.id, "Only").await;
    let lesson = engine.lesson(&instructor, course.id, section.id, "closed-1.mp4", 30).await;

    let by_student = engine.services.progress().set_lesson_completion(&student, lesson.id, true).await;
    assert!(matches!(by_student, Err(AppError::Forbidden(_))));

    let by_admin = engine.services.progress().set_lesson_completion(&admin, lesson.id, true).await;
    assert!(matches!(by_admin, Err(AppError::Forbidden(_))));

    let unknown = engine.services.progress().set_lesson_completion(&student, lesson.id + 100, true).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}
