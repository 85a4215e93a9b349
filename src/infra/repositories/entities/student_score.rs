use sea_orm::entity::prelude::*;

use crate::domain::StudentScore;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_scores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: Uuid,
    pub section_id: i32,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub score: Decimal,
    pub completed: bool,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StudentScore {
    fn from(model: Model) -> Self {
        StudentScore {
            id: model.id,
            student_id: model.student_id,
            section_id: model.section_id,
            score: model.score,
            completed: model.completed,
        }
    }
}
