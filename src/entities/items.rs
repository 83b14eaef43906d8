use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item master. `is_expiry_tracked` decides whether receipts for this item are
/// split into expiry batches in the stock ledger.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub unit: String,
    pub is_expiry_tracked: bool,
    pub hsn_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_order_lines::Entity")]
    PurchaseOrderLines,
    #[sea_orm(has_many = "super::site_item_balances::Entity")]
    SiteItemBalances,
}

impl Related<super::purchase_order_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderLines.def()
    }
}

impl Related<super::site_item_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SiteItemBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
