//! Course entity. Aggregate columns are written only by recomputation.

use sea_orm::entity::prelude::*;

use crate::domain::{Course, Currency, Level};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub currency: String,
    pub level: String,
    pub is_active: bool,
    pub collection_id: i32,
    pub instructor_id: Uuid,
    #[sea_orm(unique)]
    pub preview: String,
    pub rating_count: i32,
    #[sea_orm(column_type = "Double")]
    pub average_rating: f64,
    pub number_of_students: i32,
    pub total_duration: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Course {
    fn from(model: Model) -> Self {
        Course {
            id: model.id,
            title: model.title,
            description: model.description,
            price: model.price,
            currency: Currency::from(model.currency.as_str()),
            level: Level::from(model.level.as_str()),
            is_active: model.is_active,
            collection_id: model.collection_id,
            instructor_id: model.instructor_id,
            preview: model.preview,
            rating_count: model.rating_count,
            average_rating: model.average_rating,
            number_of_students: model.number_of_students,
            total_duration: model.total_duration,
            created_at: model.created_at,
        }
    }
}
