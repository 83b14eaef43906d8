//! Material indent service: creation and the two-level approval workflow,
//! with approver line edits persisted atomically with the status change.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::Actor;
use crate::entities::{
    indent_lines,
    indents::{self, Entity as IndentEntity},
    items, sites,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::approval::{
    self, ApprovalAction, ApprovalSnapshot, ApprovalStatus, DocumentKind, StampKind,
};

#[derive(Debug, Clone)]
pub struct CreateIndentInput {
    pub indent_no: String,
    pub site_id: i64,
    pub required_by: Option<NaiveDate>,
    pub remark: Option<String>,
    pub lines: Vec<IndentLineInput>,
}

#[derive(Debug, Clone)]
pub struct IndentLineInput {
    pub item_id: i64,
    pub qty: Decimal,
    pub remark: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IndentLineEdit {
    pub line_id: i64,
    pub qty: Option<Decimal>,
    pub approved1_qty: Option<Decimal>,
    pub approved2_qty: Option<Decimal>,
    pub remark: Option<String>,
}

#[derive(Clone)]
pub struct IndentService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl IndentService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        created_by: Uuid,
        input: CreateIndentInput,
    ) -> Result<indents::Model, ServiceError> {
        if input.lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "indent needs at least one line".to_string(),
            ));
        }
        for line in &input.lines {
            if line.qty <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "quantity must be positive for item {}",
                    line.item_id
                )));
            }
        }

        let txn = self.db.begin().await?;

        sites::Entity::find_by_id(input.site_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Site {} not found", input.site_id)))?;
        for line in &input.lines {
            items::Entity::find_by_id(line.item_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Item {} not found", line.item_id))
                })?;
        }

        let header = indents::ActiveModel {
            indent_no: Set(input.indent_no.clone()),
            site_id: Set(input.site_id),
            required_by: Set(input.required_by),
            remark: Set(input.remark.clone()),
            approval_status: Set(ApprovalStatus::Draft.to_string()),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        let indent = match header.insert(&txn).await {
            Ok(model) => model,
            Err(e) => {
                return match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => Err(ServiceError::Conflict(
                        format!("indent number {} already exists", input.indent_no),
                    )),
                    _ => Err(e.into()),
                };
            }
        };

        for line in &input.lines {
            indent_lines::ActiveModel {
                indent_id: Set(indent.id),
                item_id: Set(line.item_id),
                qty: Set(line.qty),
                remark: Set(line.remark.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(indent_id = indent.id, indent_no = %indent.indent_no, "indent created");
        Ok(indent)
    }

    /// Applies an approval action; status, stamps and line edits persist in
    /// one transaction.
    #[instrument(skip(self, actor, line_edits))]
    pub async fn apply_action(
        &self,
        id: i64,
        actor: &Actor,
        action: ApprovalAction,
        line_edits: Vec<IndentLineEdit>,
    ) -> Result<indents::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let indent = IndentEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Indent {} not found", id)))?;

        let status = ApprovalStatus::from_str(&indent.approval_status)
            .map_err(|_| ServiceError::InvalidStatus(indent.approval_status.clone()))?;
        let snapshot = ApprovalSnapshot {
            status,
            created_by: indent.created_by,
            approved1_by: indent.approved1_by,
            is_approved1: indent.is_approved1,
            is_approved2: indent.is_approved2,
            is_completed: indent.is_completed,
        };

        let transition = approval::transition(DocumentKind::Indent, &snapshot, action, actor)?;

        let old_status = indent.approval_status.clone();
        let now = Utc::now();

        let mut active: indents::ActiveModel = indent.into();
        active.approval_status = Set(transition.new_status.to_string());
        active.updated_at = Set(now);
        match transition.stamp {
            StampKind::Approved1 => {
                active.approved1_by = Set(Some(actor.id));
                active.approved1_at = Set(Some(now));
                active.is_approved1 = Set(true);
            }
            StampKind::Approved2 => {
                active.approved2_by = Set(Some(actor.id));
                active.approved2_at = Set(Some(now));
                active.is_approved2 = Set(true);
            }
            StampKind::Completed => {
                active.completed_by = Set(Some(actor.id));
                active.completed_at = Set(Some(now));
                active.is_completed = Set(true);
            }
            StampKind::Suspended => {
                active.is_suspended = Set(true);
            }
            StampKind::Unsuspended => {
                active.is_suspended = Set(false);
            }
        }

        self.persist_line_edits(&txn, id, &line_edits).await?;

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::IndentStatusChanged {
                    indent_id: updated.id,
                    old_status,
                    new_status: updated.approval_status.clone(),
                })
                .await;
        }

        info!(
            indent_id = updated.id,
            status = %updated.approval_status,
            "indent action {} applied",
            action
        );
        Ok(updated)
    }

    async fn persist_line_edits(
        &self,
        txn: &DatabaseTransaction,
        indent_id: i64,
        edits: &[IndentLineEdit],
    ) -> Result<(), ServiceError> {
        for edit in edits {
            let line = indent_lines::Entity::find_by_id(edit.line_id)
                .one(txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Indent line {} not found", edit.line_id))
                })?;
            if line.indent_id != indent_id {
                return Err(ServiceError::InvalidOperation(format!(
                    "Line {} does not belong to indent {}",
                    edit.line_id, indent_id
                )));
            }

            let mut active: indent_lines::ActiveModel = line.into();
            if let Some(qty) = edit.qty {
                active.qty = Set(qty);
            }
            if let Some(qty) = edit.approved1_qty {
                active.approved1_qty = Set(Some(qty));
            }
            if let Some(qty) = edit.approved2_qty {
                active.approved2_qty = Set(Some(qty));
            }
            if let Some(remark) = &edit.remark {
                active.remark = Set(Some(remark.clone()));
            }
            active.update(txn).await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        id: i64,
    ) -> Result<(indents::Model, Vec<indent_lines::Model>), ServiceError> {
        let db = &*self.db;
        let indent = IndentEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Indent {} not found", id)))?;
        let lines = indent_lines::Entity::find()
            .filter(indent_lines::Column::IndentId.eq(id))
            .all(db)
            .await?;
        Ok((indent, lines))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<indents::Model>, u64), ServiceError> {
        let db = &*self.db;
        let paginator = IndentEntity::find()
            .order_by_desc(indents::Column::Id)
            .paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((models, total))
    }
}
