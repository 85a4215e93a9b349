use sea_orm::entity::prelude::*;

use crate::domain::StudentAnswer;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "student_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: Uuid,
    pub question_id: i32,
    pub selected_option_id: Option<i32>,
    pub answered_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StudentAnswer {
    fn from(model: Model) -> Self {
        StudentAnswer {
            id: model.id,
            student_id: model.student_id,
            question_id: model.question_id,
            selected_option_id: model.selected_option_id,
            answered_at: model.answered_at,
        }
    }
}
