//! Course progress entity. The completed-lesson set lives in `completed_lessons`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "course_progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: Uuid,
    pub course_id: i32,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub progress: Decimal,
    pub completed: bool,
    pub last_accessed: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
