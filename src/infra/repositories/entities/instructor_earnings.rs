//! Earnings projection entity; `total_earnings` is overwritten on every recompute.

use sea_orm::entity::prelude::*;

use crate::domain::InstructorEarnings;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "instructor_earnings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub instructor_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_earnings: Decimal,
    pub last_payout: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub deduction_percentage: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for InstructorEarnings {
    fn from(model: Model) -> Self {
        InstructorEarnings {
            id: model.id,
            instructor_id: model.instructor_id,
            total_earnings: model.total_earnings,
            last_payout: model.last_payout,
            deduction_percentage: model.deduction_percentage,
        }
    }
}
