use sea_orm::entity::prelude::*;

use crate::domain::Lesson;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lessons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub section_id: i32,
    pub title: String,
    #[sea_orm(unique)]
    pub file: Option<String>,
    pub lesson_order: i32,
    /// Seconds
    pub duration: i64,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Lesson {
    fn from(model: Model) -> Self {
        Lesson {
            id: model.id,
            section_id: model.section_id,
            title: model.title,
            file: model.file,
            order: model.lesson_order,
            duration: model.duration,
            is_active: model.is_active,
        }
    }
}
