use sea_orm::entity::prelude::*;

use crate::domain::SectionAttempt;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "section_attempts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: Uuid,
    pub section_id: i32,
    pub attempt_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SectionAttempt {
    fn from(model: Model) -> Self {
        SectionAttempt {
            id: model.id,
            student_id: model.student_id,
            section_id: model.section_id,
            attempt_count: model.attempt_count,
        }
    }
}
