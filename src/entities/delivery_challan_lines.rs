use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One received row of a delivery challan. `rate` is frozen from the PO line
/// at reconciliation time (`po_line.amount / po_line.ordered_qty`) and
/// `amount = rate * receiving_qty`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_challan_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub challan_id: i64,
    pub po_line_id: i64,
    pub item_id: i64,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub receiving_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::delivery_challans::Entity",
        from = "Column::ChallanId",
        to = "super::delivery_challans::Column::Id"
    )]
    DeliveryChallans,
    #[sea_orm(
        belongs_to = "super::purchase_order_lines::Entity",
        from = "Column::PoLineId",
        to = "super::purchase_order_lines::Column::Id"
    )]
    PurchaseOrderLines,
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id"
    )]
    Items,
    #[sea_orm(has_many = "super::challan_line_batches::Entity")]
    ChallanLineBatches,
}

impl Related<super::delivery_challans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryChallans.def()
    }
}

impl Related<super::purchase_order_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderLines.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::challan_line_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChallanLineBatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
