use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Material indent raised at a site. Two-level approval, then completion once
/// a purchase order has been cut against it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "indents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub indent_no: String,
    pub site_id: i64,
    pub required_by: Option<NaiveDate>,
    pub remark: Option<String>,
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
    #[sea_orm(has_many = "super::indent_lines::Entity")]
    IndentLines,
}

impl Related<super::sites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sites.def()
    }
}

impl Related<super::indent_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IndentLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
