use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase order cut against a vendor, optionally sourced from an approved
/// indent. Two-level approval with amount/role based auto-escalation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub po_no: String,
    pub site_id: i64,
    pub vendor_id: i64,
    pub indent_id: Option<i64>,
    pub expected_date: Option<NaiveDate>,
    pub remark: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_amount: Decimal,
    pub approval_status: String,
    pub created_by: Uuid,
    pub approved1_by: Option<Uuid>,
    pub approved1_at: Option<DateTime<Utc>>,
    pub approved2_by: Option<Uuid>,
    pub approved2_at: Option<DateTime<Utc>>,
    pub completed_by: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_approved1: bool,
    pub is_approved2: bool,
    pub is_completed: bool,
    pub is_suspended: bool,
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
        belongs_to = "super::indents::Entity",
        from = "Column::IndentId",
        to = "super::indents::Column::Id"
    )]
    Indents,
    #[sea_orm(has_many = "super::purchase_order_lines::Entity")]
    PurchaseOrderLines,
    #[sea_orm(has_many = "super::delivery_challans::Entity")]
    DeliveryChallans,
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

impl Related<super::purchase_order_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderLines.def()
    }
}

impl Related<super::delivery_challans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryChallans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
