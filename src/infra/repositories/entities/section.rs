use sea_orm::entity::prelude::*;

use crate::domain::Section;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    pub position: i32,
    pub locked: bool,
    pub is_default: bool,
    pub number_of_lessons: i32,
    pub total_duration: i64,
    /// High-water mark of lesson orders handed out; never decremented.
    pub lessons_issued: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Section {
    fn from(model: Model) -> Self {
        Section {
            id: model.id,
            course_id: model.course_id,
            title: model.title,
            position: model.position,
            locked: model.locked,
            is_default: model.is_default,
            number_of_lessons: model.number_of_lessons,
            total_duration: model.total_duration,
        }
    }
}
