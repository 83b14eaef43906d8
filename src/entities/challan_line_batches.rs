use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expiry-dated sub-lot of a received challan line. `expiry_date` is pinned
/// to the first day of the month (wire format YYYY-MM).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "challan_line_batches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub challan_line_id: i64,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::delivery_challan_lines::Entity",
        from = "Column::ChallanLineId",
        to = "super::delivery_challan_lines::Column::Id"
    )]
    DeliveryChallanLines,
}

impl Related<super::delivery_challan_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryChallanLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
