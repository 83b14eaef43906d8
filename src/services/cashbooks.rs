//! Cash voucher service. Cashbooks use the single-level slice of the
//! approval machine: DRAFT -> APPROVED_LEVEL_1, plus suspend/unsuspend.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryOrder, SqlErr, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::Actor;
use crate::entities::{
    cashbooks::{self, Entity as CashbookEntity},
    sites,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::approval::{
    self, ApprovalAction, ApprovalSnapshot, ApprovalStatus, DocumentKind, StampKind,
};

#[derive(Debug, Clone)]
pub struct CreateCashbookInput {
    pub voucher_no: String,
    pub site_id: i64,
    pub payee: String,
    pub narration: Option<String>,
    pub amount: Decimal,
    pub voucher_date: NaiveDate,
}

#[derive(Clone)]
pub struct CashbookService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl CashbookService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        created_by: Uuid,
        input: CreateCashbookInput,
    ) -> Result<cashbooks::Model, ServiceError> {
        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "voucher amount must be positive".to_string(),
            ));
        }

        let db = &*self.db;
        sites::Entity::find_by_id(input.site_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Site {} not found", input.site_id)))?;

        let voucher = cashbooks::ActiveModel {
            voucher_no: Set(input.voucher_no.clone()),
            site_id: Set(input.site_id),
            payee: Set(input.payee.clone()),
            narration: Set(input.narration.clone()),
            amount: Set(input.amount),
            voucher_date: Set(input.voucher_date),
            approval_status: Set(ApprovalStatus::Draft.to_string()),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        let created = match voucher.insert(db).await {
            Ok(model) => model,
            Err(e) => {
                return match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => Err(ServiceError::Conflict(
                        format!("voucher number {} already exists", input.voucher_no),
                    )),
                    _ => Err(e.into()),
                };
            }
        };

        info!(cashbook_id = created.id, voucher_no = %created.voucher_no, "cash voucher created");
        Ok(created)
    }

    #[instrument(skip(self, actor))]
    pub async fn apply_action(
        &self,
        id: i64,
        actor: &Actor,
        action: ApprovalAction,
    ) -> Result<cashbooks::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let voucher = CashbookEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cashbook {} not found", id)))?;

        let status = ApprovalStatus::from_str(&voucher.approval_status)
            .map_err(|_| ServiceError::InvalidStatus(voucher.approval_status.clone()))?;
        let snapshot = ApprovalSnapshot {
            status,
            created_by: voucher.created_by,
            approved1_by: voucher.approved1_by,
            is_approved1: voucher.is_approved1,
            is_approved2: false,
            is_completed: false,
        };

        let transition = approval::transition(DocumentKind::Cashbook, &snapshot, action, actor)?;

        let now = Utc::now();
        let mut active: cashbooks::ActiveModel = voucher.into();
        active.approval_status = Set(transition.new_status.to_string());
        active.updated_at = Set(now);
        match transition.stamp {
            StampKind::Approved1 => {
                active.approved1_by = Set(Some(actor.id));
                active.approved1_at = Set(Some(now));
                active.is_approved1 = Set(true);
            }
            StampKind::Suspended => {
                active.is_suspended = Set(true);
            }
            StampKind::Unsuspended => {
                active.is_suspended = Set(false);
            }
            // The machine never produces these for a cashbook.
            StampKind::Approved2 | StampKind::Completed => {
                return Err(ServiceError::InvalidOperation(format!(
                    "cashbook has no {} action",
                    action
                )));
            }
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        if transition.stamp == StampKind::Approved1 {
            if let Some(sender) = &self.event_sender {
                sender
                    .send_or_log(Event::CashbookApproved {
                        cashbook_id: updated.id,
                        approver: actor.id,
                    })
                    .await;
            }
        }

        info!(
            cashbook_id = updated.id,
            status = %updated.approval_status,
            "cashbook action {} applied",
            action
        );
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<cashbooks::Model, ServiceError> {
        let db = &*self.db;
        CashbookEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cashbook {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<cashbooks::Model>, u64), ServiceError> {
        let db = &*self.db;
        let paginator = CashbookEntity::find()
            .order_by_desc(cashbooks::Column::Id)
            .paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((models, total))
    }
}
