use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Inward delivery challan: goods physically received against a purchase
/// order. The bill/payment sub-status is independent of stock reconciliation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_challans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub challan_no: String,
    pub site_id: i64,
    pub vendor_id: i64,
    pub po_id: i64,
    pub challan_date: NaiveDate,
    pub received_date: Option<NaiveDate>,
    pub vehicle_no: Option<String>,
    pub remark: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_amount: Decimal,
    pub bill_no: Option<String>,
    pub bill_date: Option<NaiveDate>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub bill_amount: Decimal,
    pub due_days: i32,
    pub due_date: Option<NaiveDate>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub paid_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub due_amount: Decimal,
    pub payment_status: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sites::Entity",
        from = "Column::SiteId",
        to = "super::sites::Column::Id"
    )]
    Sites,
    #[sea_orm(
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::Id"
    )]
    Vendors,
    #[sea_orm(
        belongs_to = "super::purchase_orders::Entity",
        from = "Column::PoId",
        to = "super::purchase_orders::Column::Id"
    )]
    PurchaseOrders,
    #[sea_orm(has_many = "super::delivery_challan_lines::Entity")]
    DeliveryChallanLines,
}

impl Related<super::sites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sites.def()
    }
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendors.def()
    }
}

impl Related<super::purchase_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrders.def()
    }
}

impl Related<super::delivery_challan_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryChallanLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Bill payment lifecycle, independent of approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum PaymentStatus {
    #[strum(serialize = "UNPAID")]
    #[serde(rename = "UNPAID")]
    Unpaid,
    #[strum(serialize = "PARTIALLY_PAID")]
    #[serde(rename = "PARTIALLY_PAID")]
    PartiallyPaid,
    #[strum(serialize = "PAID")]
    #[serde(rename = "PAID")]
    Paid,
}

impl PaymentStatus {
    /// Derives the status from the billed and paid totals.
    pub fn derive(bill_amount: Decimal, paid_amount: Decimal) -> Self {
        if paid_amount <= Decimal::ZERO {
            PaymentStatus::Unpaid
        } else if paid_amount >= bill_amount {
            PaymentStatus::Paid
        } else {
            PaymentStatus::PartiallyPaid
        }
    }
}
