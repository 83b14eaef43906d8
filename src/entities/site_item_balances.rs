use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Running closing balance per (site, item). Created lazily on the first
/// receipt touching the pair, never deleted. Mutated only through the stock
/// ledger's signed-delta functions.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_item_balances")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub site_id: i64,
    pub item_id: i64,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub closing_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub closing_value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Weighted unit rate; zero when no stock is on hand.
    pub fn unit_rate(&self) -> Decimal {
        if self.closing_qty.is_zero() {
            Decimal::ZERO
        } else {
            self.closing_value / self.closing_qty
        }
    }
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
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id"
    )]
    Items,
}

impl Related<super::sites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sites.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
