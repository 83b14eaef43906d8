use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::delivery_challans::Entity")]
    DeliveryChallans,
    #[sea_orm(has_many = "super::site_item_balances::Entity")]
    SiteItemBalances,
}

impl Related<super::delivery_challans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryChallans.def()
    }
}

impl Related<super::site_item_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SiteItemBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
