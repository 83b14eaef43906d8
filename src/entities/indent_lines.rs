use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One requested item of an indent. Approvers may adjust the stage quantities
/// (`approved1_qty`, `approved2_qty`) while signing off.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "indent_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub indent_id: i64,
    pub item_id: i64,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub approved1_qty: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub approved2_qty: Option<Decimal>,
    pub remark: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::indents::Entity",
        from = "Column::IndentId",
        to = "super::indents::Column::Id"
    )]
    Indents,
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id"
    )]
    Items,
}

impl Related<super::indents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Indents.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
