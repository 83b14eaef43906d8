use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One item row of a purchase order. `received_qty` is cumulative and is
/// mutated only by the receipt reconciliation engine; `0 <= received_qty <=
/// ordered_qty` holds after every committed reconciliation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_order_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub po_id: i64,
    pub item_id: i64,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub ordered_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub received_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub approved1_qty: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub approved2_qty: Option<Decimal>,
    pub remark: Option<String>,
}

impl Model {
    /// Quantity still orderable against this line.
    pub fn remaining_qty(&self) -> Decimal {
        self.ordered_qty - self.received_qty
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_orders::Entity",
        from = "Column::PoId",
        to = "super::purchase_orders::Column::Id"
    )]
    PurchaseOrders,
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id"
    )]
    Items,
    #[sea_orm(has_many = "super::delivery_challan_lines::Entity")]
    DeliveryChallanLines,
}

impl Related<super::purchase_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrders.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::delivery_challan_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryChallanLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
