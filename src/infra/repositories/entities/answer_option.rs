use sea_orm::entity::prelude::*;

use crate::domain::AnswerOption;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "answer_options")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub question_id: i32,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AnswerOption {
    fn from(model: Model) -> Self {
        AnswerOption {
            id: model.id,
            question_id: model.question_id,
            text: model.text,
            is_correct: model.is_correct,
        }
    }
}
