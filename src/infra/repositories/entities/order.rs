use sea_orm::entity::prelude::*;

use crate::domain::{Order, PaymentStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub customer_id: i32,
    /// One of P, C, F
    pub payment_status: String,
    pub placed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Order {
    fn from(model: Model) -> Self {
        Order {
            id: model.id,
            customer_id: model.customer_id,
            payment_status: PaymentStatus::from_code(&model.payment_status)
                .unwrap_or(PaymentStatus::Pending),
            placed_at: model.placed_at,
        }
    }
}
