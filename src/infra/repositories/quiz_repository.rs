//! Student answers, section scores and retake attempts.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{section_attempt, student_answer, student_score};
use crate::domain::{SectionAttempt, StudentAnswer, StudentScore};
use crate::errors::AppResult;

/// Transaction-scoped quiz state access.
pub struct TxQuizRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxQuizRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Record the student's selection for a question; the last answer wins.
    pub async fn upsert_answer(
        &self,
        student_id: Uuid,
        question_id: i32,
        option_id: i32,
    ) -> AppResult<StudentAnswer> {
        let existing = student_answer::Entity::find()
            .filter(student_answer::Column::StudentId.eq(student_id))
            .filter(student_answer::Column::QuestionId.eq(question_id))
            .one(self.txn)
            .await?;

        let model = match existing {
            Some(model) => {
                let mut active: student_answer::ActiveModel = model.into();
                active.selected_option_id = Set(Some(option_id));
                active.answered_at = Set(Utc::now());
                active.update(self.txn).await?
            }
            None => {
                student_answer::ActiveModel {
                    student_id: Set(student_id),
                    question_id: Set(question_id),
                    selected_option_id: Set(Some(option_id)),
                    answered_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(self.txn)
                .await?
            }
        };
        Ok(StudentAnswer::from(model))
    }

    /// The student's answers to the given questions, cleared ones included.
    pub async fn answers(&self, student_id: Uuid, question_ids: &[i32]) -> AppResult<Vec<StudentAnswer>> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = student_answer::Entity::find()
            .filter(student_answer::Column::StudentId.eq(student_id))
            .filter(student_answer::Column::QuestionId.is_in(question_ids.iter().copied()))
            .order_by_asc(student_answer::Column::QuestionId)
            .all(self.txn)
            .await?;
        Ok(models.into_iter().map(StudentAnswer::from).collect())
    }

    /// Null out the selections; the rows are kept.
    pub async fn clear_answers(&self, student_id: Uuid, question_ids: &[i32]) -> AppResult<u64> {
        if question_ids.is_empty() {
            return Ok(0);
        }
        let result = student_answer::Entity::update_many()
            .col_expr(
                student_answer::Column::SelectedOptionId,
                Expr::value(Option::<i32>::None),
            )
            .filter(student_answer::Column::StudentId.eq(student_id))
            .filter(student_answer::Column::QuestionId.is_in(question_ids.iter().copied()))
            .exec(self.txn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn find_score(&self, student_id: Uuid, section_id: i32) -> AppResult<Option<StudentScore>> {
        let model = student_score::Entity::find()
            .filter(student_score::Column::StudentId.eq(student_id))
            .filter(student_score::Column::SectionId.eq(section_id))
            .one(self.txn)
            .await?;
        Ok(model.map(StudentScore::from))
    }

    /// Write the section score, creating the row on first use.
    pub async fn save_score(
        &self,
        student_id: Uuid,
        section_id: i32,
        score: Decimal,
        completed: bool,
    ) -> AppResult<StudentScore> {
        let existing = student_score::Entity::find()
            .filter(student_score::Column::StudentId.eq(student_id))
            .filter(student_score::Column::SectionId.eq(section_id))
            .one(self.txn)
            .await?;

        let model = match existing {
            Some(model) => {
                let mut active: student_score::ActiveModel = model.into();
                active.score = Set(score);
                active.completed = Set(completed);
                active.updated_at = Set(Utc::now());
                active.update(self.txn).await?
            }
            None => {
                student_score::ActiveModel {
                    student_id: Set(student_id),
                    section_id: Set(section_id),
                    score: Set(score),
                    completed: Set(completed),
                    updated_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(self.txn)
                .await?
            }
        };
        Ok(StudentScore::from(model))
    }

    pub async fn find_attempt(&self, student_id: Uuid, section_id: i32) -> AppResult<Option<SectionAttempt>> {
        let model = section_attempt::Entity::find()
            .filter(section_attempt::Column::StudentId.eq(student_id))
            .filter(section_attempt::Column::SectionId.eq(section_id))
            .one(self.txn)
            .await?;
        Ok(model.map(SectionAttempt::from))
    }

    /// Bump the attempt counter by one, creating it at one.
    pub async fn increment_attempt(&self, student_id: Uuid, section_id: i32) -> AppResult<SectionAttempt> {
        let existing = section_attempt::Entity::find()
            .filter(section_attempt::Column::StudentId.eq(student_id))
            .filter(section_attempt::Column::SectionId.eq(section_id))
            .one(self.txn)
            .await?;

        let model = match existing {
            Some(model) => {
                let next = model.attempt_count + 1;
                let mut active: section_attempt::ActiveModel = model.into();
                active.attempt_count = Set(next);
                active.update(self.txn).await?
            }
            None => {
                section_attempt::ActiveModel {
                    student_id: Set(student_id),
                    section_id: Set(section_id),
                    attempt_count: Set(1),
                    ..Default::default()
                }
                .insert(self.txn)
                .await?
            }
        };
        Ok(SectionAttempt::from(model))
    }
}
