use sea_orm::entity::prelude::*;

use crate::domain::Collection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "collections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Collection {
    fn from(model: Model) -> Self {
        Collection {
            id: model.id,
            title: model.title,
        }
    }
}
