//! Quiz scoring engine.
//!
//! Answers are upserted per (student, question); the section score is always
//! recomputed from the stored answers in the same transaction, so the score
//! reflects one consistent answer snapshot.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::access::{authorize, load_section};
use crate::config::RETAKE_REDIRECT_TEMPLATE;
use crate::domain::{
    Action, Actor, QuizState, QuizStatus, ScoreSummary, StudentAnswer,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{TransactionContext, UnitOfWork};

/// One entry of a batch submission; both ids are required.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnswerInput {
    pub question_id: Option<i32>,
    pub option_id: Option<i32>,
}

/// Result of a single-answer submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnswerOutcome {
    pub student_answer: StudentAnswer,
    pub passed: bool,
    pub score: Decimal,
}

/// Result of a batch submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizResult {
    pub score: Decimal,
    pub passed: bool,
    pub progress: QuizProgress,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizProgress {
    pub correct_answers: usize,
    pub total_questions: usize,
}

impl From<ScoreSummary> for QuizResult {
    fn from(summary: ScoreSummary) -> Self {
        Self {
            score: summary.score,
            passed: summary.passed,
            progress: QuizProgress {
                correct_answers: summary.correct_answers,
                total_questions: summary.total_questions,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RetakeOutcome {
    pub message: String,
    pub attempt_count: i32,
    pub redirect_url: String,
}

/// Quiz service trait for dependency injection.
#[async_trait]
pub trait QuizService: Send + Sync {
    async fn submit_answer(
        &self,
        actor: &Actor,
        course_id: i32,
        section_id: i32,
        question_id: i32,
        option_id: i32,
    ) -> AppResult<AnswerOutcome>;

    async fn submit_all_answers(
        &self,
        actor: &Actor,
        course_id: i32,
        section_id: i32,
        answers: Vec<AnswerInput>,
    ) -> AppResult<QuizResult>;

    /// Start a new attempt: bump the counter, zero the score, clear answers.
    async fn retake(&self, actor: &Actor, course_id: i32, section_id: i32) -> AppResult<RetakeOutcome>;

    async fn status(&self, actor: &Actor, course_id: i32, section_id: i32) -> AppResult<QuizStatus>;
}

/// Concrete implementation of QuizService using Unit of Work.
pub struct QuizManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> QuizManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> QuizService for QuizManager<U> {
    async fn submit_answer(
        &self,
        actor: &Actor,
        course_id: i32,
        section_id: i32,
        question_id: i32,
        option_id: i32,
    ) -> AppResult<AnswerOutcome> {
        let actor = actor.clone();
        crate::with_transaction!(self.uow, |ctx| {
            let scope = load_section(&ctx, course_id, section_id).await?;
            authorize(&ctx, &actor, Action::AnswerQuiz, &scope.course, Some(&scope.section)).await?;

            let section_questions = question_ids(&ctx, scope.section.id).await?;
            check_answer(&ctx, &section_questions, question_id, option_id).await?;

            let student_answer = ctx.quiz().upsert_answer(actor.id, question_id, option_id).await?;
            let summary = score_section(&ctx, actor.id, scope.section.id).await?;

            Ok(AnswerOutcome {
                student_answer,
                passed: summary.passed,
                score: summary.score,
            })
        })
    }

    async fn submit_all_answers(
        &self,
        actor: &Actor,
        course_id: i32,
        section_id: i32,
        answers: Vec<AnswerInput>,
    ) -> AppResult<QuizResult> {
        let pairs = complete_pairs(&answers)?;

        let actor = actor.clone();
        let result = crate::with_transaction!(self.uow, |ctx| {
            let scope = load_section(&ctx, course_id, section_id).await?;
            authorize(&ctx, &actor, Action::AnswerQuiz, &scope.course, Some(&scope.section)).await?;

            let section_questions = question_ids(&ctx, scope.section.id).await?;
            for (question_id, option_id) in &pairs {
                check_answer(&ctx, &section_questions, *question_id, *option_id).await?;
            }
            for (question_id, option_id) in &pairs {
                ctx.quiz().upsert_answer(actor.id, *question_id, *option_id).await?;
            }

            score_section(&ctx, actor.id, scope.section.id).await
        })?;

        tracing::info!(
            section_id,
            score = %result.score,
            passed = result.passed,
            "Quiz submitted"
        );
        Ok(QuizResult::from(result))
    }

    async fn retake(&self, actor: &Actor, course_id: i32, section_id: i32) -> AppResult<RetakeOutcome> {
        let actor = actor.clone();
        let attempt = crate::with_transaction!(self.uow, |ctx| {
            let scope = load_section(&ctx, course_id, section_id).await?;
            authorize(&ctx, &actor, Action::AnswerQuiz, &scope.course, Some(&scope.section)).await?;

            let quiz = ctx.quiz();
            let attempt = quiz.increment_attempt(actor.id, scope.section.id).await?;
            let ids: Vec<i32> = question_ids(&ctx, scope.section.id).await?.into_iter().collect();
            quiz.clear_answers(actor.id, &ids).await?;
            quiz.save_score(actor.id, scope.section.id, Decimal::ZERO, false).await?;
            Ok(attempt)
        })?;

        tracing::info!(section_id, attempt_count = attempt.attempt_count, "Quiz reset for retake");
        Ok(RetakeOutcome {
            message: "Quiz has been reset. You can retake it now.".to_string(),
            attempt_count: attempt.attempt_count,
            redirect_url: retake_redirect(course_id, section_id),
        })
    }

    async fn status(&self, actor: &Actor, course_id: i32, section_id: i32) -> AppResult<QuizStatus> {
        let actor = actor.clone();
        crate::with_transaction!(self.uow, |ctx| {
            let scope = load_section(&ctx, course_id, section_id).await?;
            authorize(&ctx, &actor, Action::ViewSection, &scope.course, Some(&scope.section)).await?;

            let ids: Vec<i32> = question_ids(&ctx, scope.section.id).await?.into_iter().collect();
            let quiz = ctx.quiz();
            let answered = quiz
                .answers(actor.id, &ids)
                .await?
                .iter()
                .filter(|a| a.selected_option_id.is_some())
                .count();
            let score = quiz.find_score(actor.id, scope.section.id).await?;
            let attempt_count = quiz
                .find_attempt(actor.id, scope.section.id)
                .await?
                .map(|a| a.attempt_count)
                .unwrap_or(0);

            Ok(QuizStatus {
                state: QuizState::derive(answered, ids.len(), score.as_ref()),
                score: score.map(|s| s.score).unwrap_or(Decimal::ZERO),
                answered_questions: answered,
                total_questions: ids.len(),
                attempt_count,
            })
        })
    }
}

/// Reject the whole batch when any entry lacks an id.
fn complete_pairs(answers: &[AnswerInput]) -> AppResult<Vec<(i32, i32)>> {
    if answers.is_empty() {
        return Err(AppError::validation("answers must not be empty"));
    }

    answers
        .iter()
        .map(|a| match (a.question_id, a.option_id) {
            (Some(question_id), Some(option_id)) => Ok((question_id, option_id)),
            _ => Err(AppError::validation(
                "Each answer requires both question_id and option_id",
            )),
        })
        .collect()
}

async fn question_ids(ctx: &TransactionContext<'_>, section_id: i32) -> AppResult<BTreeSet<i32>> {
    Ok(ctx
        .catalog()
        .questions_of_section(section_id)
        .await?
        .into_iter()
        .map(|q| q.id)
        .collect())
}

/// The question must be in the section and the option must answer it.
async fn check_answer(
    ctx: &TransactionContext<'_>,
    section_questions: &BTreeSet<i32>,
    question_id: i32,
    option_id: i32,
) -> AppResult<()> {
    if !section_questions.contains(&question_id) {
        return Err(AppError::not_found(format!(
            "Question {} not found in this section",
            question_id
        )));
    }

    let option = ctx
        .catalog()
        .find_option(option_id)
        .await?
        .filter(|o| section_questions.contains(&o.question_id))
        .ok_or_not_found("Option not found")?;
    if option.question_id != question_id {
        return Err(AppError::validation(format!(
            "Option {} does not belong to question {}",
            option_id, question_id
        )));
    }
    Ok(())
}

/// Recompute and store the student's score for the section.
async fn score_section(ctx: &TransactionContext<'_>, student_id: Uuid, section_id: i32) -> AppResult<ScoreSummary> {
    let ids: Vec<i32> = question_ids(ctx, section_id).await?.into_iter().collect();
    let correct_options: BTreeMap<i32, i32> = ctx
        .catalog()
        .options_of_questions(&ids)
        .await?
        .into_iter()
        .filter(|o| o.is_correct)
        .map(|o| (o.id, o.question_id))
        .collect();

    let correct = ctx
        .quiz()
        .answers(student_id, &ids)
        .await?
        .iter()
        .filter(|a| {
            a.selected_option_id
                .and_then(|option| correct_options.get(&option))
                .is_some_and(|question| *question == a.question_id)
        })
        .count();

    let summary = ScoreSummary::new(correct, ids.len());
    ctx.quiz()
        .save_score(student_id, section_id, summary.score, summary.passed)
        .await?;
    Ok(summary)
}

fn retake_redirect(course_id: i32, section_id: i32) -> String {
    RETAKE_REDIRECT_TEMPLATE
        .replace("{course}", &course_id.to_string())
        .replace("{section}", &section_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_ids_reject_the_batch() {
        let answers = vec![
            AnswerInput { question_id: Some(1), option_id: Some(2) },
            AnswerInput { question_id: Some(3), option_id: None },
        ];
        assert!(matches!(complete_pairs(&answers), Err(AppError::Validation(_))));
        assert!(matches!(complete_pairs(&[]), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_retake_redirect() {
        assert_eq!(retake_redirect(4, 9), "/courses/4/sections/9/questions");
    }
}
