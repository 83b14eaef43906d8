//! Purchase order service: creation, two-level approval with
//! auto-escalation, and line edits persisted atomically with status changes.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use std::str::FromStr;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::Actor;
use crate::entities::{
    items,
    purchase_order_lines,
    purchase_orders::{self, Entity as PoEntity},
    sites, vendors,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::approval::{
    self, ApprovalAction, ApprovalSnapshot, ApprovalStatus, DocumentKind, StampKind,
};

#[derive(Debug, Clone)]
pub struct CreatePurchaseOrderInput {
    pub po_no: String,
    pub site_id: i64,
    pub vendor_id: i64,
    pub indent_id: Option<i64>,
    pub expected_date: Option<NaiveDate>,
    pub remark: Option<String>,
    pub lines: Vec<PoLineInput>,
}

#[derive(Debug, Clone)]
pub struct PoLineInput {
    pub item_id: i64,
    pub ordered_qty: Decimal,
    pub rate: Decimal,
}

/// Editable line fields an approver may change alongside a status action.
#[derive(Debug, Clone)]
pub struct PoLineEdit {
    pub line_id: i64,
    pub qty: Option<Decimal>,
    pub approved1_qty: Option<Decimal>,
    pub approved2_qty: Option<Decimal>,
    pub remark: Option<String>,
}

#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Arc<DatabaseConnection>,
    auto_approve_threshold: Decimal,
    event_sender: Option<EventSender>,
}

impl PurchaseOrderService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        auto_approve_threshold: Decimal,
        event_sender: Option<EventSender>,
    ) -> Self {
        Self {
            db,
            auto_approve_threshold,
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        created_by: Uuid,
        input: CreatePurchaseOrderInput,
    ) -> Result<purchase_orders::Model, ServiceError> {
        if input.lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "purchase order needs at least one line".to_string(),
            ));
        }
        for line in &input.lines {
            if line.ordered_qty <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "ordered quantity must be positive for item {}",
                    line.item_id
                )));
            }
        }

        let txn = self.db.begin().await?;

        sites::Entity::find_by_id(input.site_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Site {} not found", input.site_id)))?;
        vendors::Entity::find_by_id(input.vendor_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Vendor {} not found", input.vendor_id))
            })?;
        for line in &input.lines {
            items::Entity::find_by_id(line.item_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Item {} not found", line.item_id))
                })?;
        }

        let total_amount: Decimal = input
            .lines
            .iter()
            .map(|l| (l.ordered_qty * l.rate).round_dp(4))
            .sum();

        let header = purchase_orders::ActiveModel {
            po_no: Set(input.po_no.clone()),
            site_id: Set(input.site_id),
            vendor_id: Set(input.vendor_id),
            indent_id: Set(input.indent_id),
            expected_date: Set(input.expected_date),
            remark: Set(input.remark.clone()),
            total_amount: Set(total_amount),
            approval_status: Set(ApprovalStatus::Draft.to_string()),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        let po = match header.insert(&txn).await {
            Ok(model) => model,
            Err(e) => {
                return match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => Err(ServiceError::Conflict(
                        format!("purchase order number {} already exists", input.po_no),
                    )),
                    _ => Err(e.into()),
                };
            }
        };

        for line in &input.lines {
            purchase_order_lines::ActiveModel {
                po_id: Set(po.id),
                item_id: Set(line.item_id),
                ordered_qty: Set(line.ordered_qty),
                rate: Set(line.rate),
                amount: Set((line.ordered_qty * line.rate).round_dp(4)),
                received_qty: Set(Decimal::ZERO),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(po_id = po.id, po_no = %po.po_no, "purchase order created");
        Ok(po)
    }

    /// Applies an approval action. Status, stamps and any line edits persist
    /// in one transaction; a purchase order below the auto-approval
    /// threshold (or approved by head office holding level-2 capability)
    /// escalates straight to level 2 with the same actor on both stamps.
    #[instrument(skip(self, actor, line_edits))]
    pub async fn apply_action(
        &self,
        id: i64,
        actor: &Actor,
        action: ApprovalAction,
        line_edits: Vec<PoLineEdit>,
    ) -> Result<purchase_orders::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let po = PoEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", id)))?;

        let status = ApprovalStatus::from_str(&po.approval_status)
            .map_err(|_| ServiceError::InvalidStatus(po.approval_status.clone()))?;
        let snapshot = ApprovalSnapshot {
            status,
            created_by: po.created_by,
            approved1_by: po.approved1_by,
            is_approved1: po.is_approved1,
            is_approved2: po.is_approved2,
            is_completed: po.is_completed,
        };

        let transition =
            approval::transition(DocumentKind::PurchaseOrder, &snapshot, action, actor)?;

        let old_status = po.approval_status.clone();
        let total_amount = po.total_amount;
        let now = Utc::now();

        let mut active: purchase_orders::ActiveModel = po.into();
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
        let new_total = self.recompute_total(&txn, id, total_amount, &line_edits).await?;
        active.total_amount = Set(new_total);

        // Auto-escalation: level-1 approval of a small or head-office order
        // is promoted to level 2 in the same transaction.
        if transition.stamp == StampKind::Approved1
            && approval::should_auto_escalate(new_total, self.auto_approve_threshold, actor)
        {
            active.approval_status = Set(ApprovalStatus::ApprovedLevel2.to_string());
            active.approved2_by = Set(Some(actor.id));
            active.approved2_at = Set(Some(now));
            active.is_approved2 = Set(true);

            let lines = purchase_order_lines::Entity::find()
                .filter(purchase_order_lines::Column::PoId.eq(id))
                .all(&txn)
                .await?;
            for line in lines {
                if line.approved2_qty.is_none() {
                    let carried = line.approved1_qty;
                    let mut line_active: purchase_order_lines::ActiveModel = line.into();
                    line_active.approved2_qty = Set(carried);
                    line_active.update(&txn).await?;
                }
            }
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::PurchaseOrderStatusChanged {
                    po_id: updated.id,
                    old_status,
                    new_status: updated.approval_status.clone(),
                })
                .await;
        }

        info!(
            po_id = updated.id,
            status = %updated.approval_status,
            "purchase order action {} applied",
            action
        );
        Ok(updated)
    }

    async fn persist_line_edits(
        &self,
        txn: &DatabaseTransaction,
        po_id: i64,
        edits: &[PoLineEdit],
    ) -> Result<(), ServiceError> {
        for edit in edits {
            let line = purchase_order_lines::Entity::find_by_id(edit.line_id)
                .one(txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "Purchase order line {} not found",
                        edit.line_id
                    ))
                })?;
            if line.po_id != po_id {
                return Err(ServiceError::InvalidOperation(format!(
                    "Line {} does not belong to purchase order {}",
                    edit.line_id, po_id
                )));
            }

            let rate = line.rate;
            let mut active: purchase_order_lines::ActiveModel = line.into();
            if let Some(qty) = edit.qty {
                active.ordered_qty = Set(qty);
                active.amount = Set((qty * rate).round_dp(4));
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

    async fn recompute_total(
        &self,
        txn: &DatabaseTransaction,
        po_id: i64,
        current: Decimal,
        edits: &[PoLineEdit],
    ) -> Result<Decimal, ServiceError> {
        if !edits.iter().any(|e| e.qty.is_some()) {
            return Ok(current);
        }
        let lines = purchase_order_lines::Entity::find()
            .filter(purchase_order_lines::Column::PoId.eq(po_id))
            .all(txn)
            .await?;
        Ok(lines.iter().map(|l| l.amount).sum())
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        id: i64,
    ) -> Result<(purchase_orders::Model, Vec<purchase_order_lines::Model>), ServiceError> {
        let db = &*self.db;
        let po = PoEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", id)))?;
        let lines = purchase_order_lines::Entity::find()
            .filter(purchase_order_lines::Column::PoId.eq(id))
            .all(db)
            .await?;
        Ok((po, lines))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<purchase_orders::Model>, u64), ServiceError> {
        let db = &*self.db;
        let paginator = PoEntity::find()
            .order_by_desc(purchase_orders::Column::Id)
            .paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((models, total))
    }
}
