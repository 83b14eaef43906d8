//! Delivery challan service: document numbering, reconciliation
//! orchestration and the bill/payment sub-status.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::entities::{
    challan_line_batches, delivery_challan_lines,
    delivery_challans::{self, Entity as ChallanEntity, PaymentStatus},
    purchase_orders, sites, vendors,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::doc_number;
use crate::services::reconciliation::{self, ReceiptLineInput};
use crate::services::stock_ledger;

#[derive(Debug, Clone)]
pub struct CreateChallanInput {
    pub site_id: i64,
    pub vendor_id: i64,
    pub po_id: i64,
    pub challan_date: NaiveDate,
    pub received_date: Option<NaiveDate>,
    pub vehicle_no: Option<String>,
    pub remark: Option<String>,
    pub bill: Option<BillInput>,
    pub lines: Vec<ReceiptLineInput>,
}

#[derive(Debug, Clone)]
pub struct UpdateChallanInput {
    pub challan_date: NaiveDate,
    pub received_date: Option<NaiveDate>,
    pub vehicle_no: Option<String>,
    pub remark: Option<String>,
    pub lines: Vec<ReceiptLineInput>,
}

#[derive(Debug, Clone)]
pub struct BillInput {
    pub bill_no: String,
    pub bill_date: NaiveDate,
    pub bill_amount: Decimal,
    pub due_days: i32,
}

/// Challan line with its batch split, for responses.
#[derive(Debug, Serialize)]
pub struct ChallanLineDetail {
    #[serde(flatten)]
    pub line: delivery_challan_lines::Model,
    pub batches: Vec<challan_line_batches::Model>,
}

/// Full challan projection: header, lines and the current closing stock of
/// every item the document touches (read-only convenience, not part of the
/// write path).
#[derive(Debug, Serialize)]
pub struct ChallanDetail {
    #[serde(flatten)]
    pub challan: delivery_challans::Model,
    pub lines: Vec<ChallanLineDetail>,
    pub closing_stock_by_item_id: HashMap<i64, Decimal>,
}

#[derive(Clone)]
pub struct DeliveryChallanService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl DeliveryChallanService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a challan and reconciles its lines in one transaction.
    /// The generated challan number is backstopped by the UNIQUE constraint;
    /// a duplicate from a concurrent creation is retried once with a fresh
    /// number.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        created_by: Uuid,
        input: CreateChallanInput,
    ) -> Result<delivery_challans::Model, ServiceError> {
        self.validate_header_refs(&input).await?;

        let mut attempts = 0;
        let created = loop {
            attempts += 1;
            match self.try_create(created_by, &input).await {
                Ok(model) => break model,
                Err(ServiceError::Conflict(reason)) if attempts == 1 => {
                    warn!("challan number collision ({}), retrying once", reason);
                    continue;
                }
                Err(e) => return Err(e),
            }
        };

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::ChallanCreated {
                    challan_id: created.id,
                    challan_no: created.challan_no.clone(),
                })
                .await;
        }

        info!(
            challan_id = created.id,
            challan_no = %created.challan_no,
            "delivery challan created"
        );
        Ok(created)
    }

    async fn try_create(
        &self,
        created_by: Uuid,
        input: &CreateChallanInput,
    ) -> Result<delivery_challans::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let challan_no = doc_number::next_challan_number(&txn).await?;

        let (bill_amount, due_days, bill_no, bill_date, due_date) = match &input.bill {
            Some(bill) => (
                bill.bill_amount,
                bill.due_days,
                Some(bill.bill_no.clone()),
                Some(bill.bill_date),
                Some(bill.bill_date + Duration::days(i64::from(bill.due_days))),
            ),
            None => (Decimal::ZERO, 0, None, None, None),
        };
        let due_amount = bill_amount.max(Decimal::ZERO);

        let header = delivery_challans::ActiveModel {
            challan_no: Set(challan_no),
            site_id: Set(input.site_id),
            vendor_id: Set(input.vendor_id),
            po_id: Set(input.po_id),
            challan_date: Set(input.challan_date),
            received_date: Set(input.received_date),
            vehicle_no: Set(input.vehicle_no.clone()),
            remark: Set(input.remark.clone()),
            total_amount: Set(Decimal::ZERO),
            bill_no: Set(bill_no),
            bill_date: Set(bill_date),
            bill_amount: Set(bill_amount),
            due_days: Set(due_days),
            due_date: Set(due_date),
            paid_amount: Set(Decimal::ZERO),
            due_amount: Set(due_amount),
            payment_status: Set(PaymentStatus::derive(bill_amount, Decimal::ZERO).to_string()),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        let challan = match header.insert(&txn).await {
            Ok(model) => model,
            Err(e) => {
                return match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(detail)) => {
                        txn.rollback().await?;
                        Err(ServiceError::Conflict(format!(
                            "duplicate challan number: {}",
                            detail
                        )))
                    }
                    _ => Err(e.into()),
                };
            }
        };

        let total_amount = reconciliation::apply(&txn, &challan, &input.lines).await?;

        let mut active: delivery_challans::ActiveModel = challan.into();
        active.total_amount = Set(total_amount);
        let challan = active.update(&txn).await?;

        txn.commit().await?;
        Ok(challan)
    }

    /// Replaces a challan's line set, reversing the previous version's
    /// ledger effect before applying the new one. Any validation failure
    /// rolls the whole edit back, leaving the prior state intact.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: i64,
        input: UpdateChallanInput,
    ) -> Result<delivery_challans::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let challan = ChallanEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Challan {} not found", id)))?;

        reconciliation::reverse(&txn, &challan).await?;
        let total_amount = reconciliation::apply(&txn, &challan, &input.lines).await?;

        let mut active: delivery_challans::ActiveModel = challan.into();
        active.challan_date = Set(input.challan_date);
        active.received_date = Set(input.received_date);
        active.vehicle_no = Set(input.vehicle_no);
        active.remark = Set(input.remark);
        active.total_amount = Set(total_amount);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::ChallanUpdated {
                    challan_id: updated.id,
                })
                .await;
        }

        info!(challan_id = updated.id, "delivery challan updated");
        Ok(updated)
    }

    /// Deletes a challan, reversing its ledger effect first.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let challan = ChallanEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Challan {} not found", id)))?;

        reconciliation::reverse(&txn, &challan).await?;
        ChallanEntity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::ChallanDeleted { challan_id: id })
                .await;
        }

        info!(challan_id = id, "delivery challan deleted");
        Ok(())
    }

    /// Loads a challan with lines, batch splits and the current closing
    /// stock of every item it references.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<ChallanDetail, ServiceError> {
        let db = &*self.db;

        let challan = ChallanEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Challan {} not found", id)))?;

        let lines = delivery_challan_lines::Entity::find()
            .filter(delivery_challan_lines::Column::ChallanId.eq(id))
            .all(db)
            .await?;
        let line_ids: Vec<i64> = lines.iter().map(|l| l.id).collect();
        let batches = challan_line_batches::Entity::find()
            .filter(challan_line_batches::Column::ChallanLineId.is_in(line_ids))
            .all(db)
            .await?;

        let item_ids: Vec<i64> = {
            let mut ids: Vec<i64> = lines.iter().map(|l| l.item_id).collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        let closing_stock_by_item_id =
            stock_ledger::closing_stock(db, challan.site_id, &item_ids).await?;

        let lines = lines
            .into_iter()
            .map(|line| {
                let line_batches = batches
                    .iter()
                    .filter(|b| b.challan_line_id == line.id)
                    .cloned()
                    .collect();
                ChallanLineDetail {
                    line,
                    batches: line_batches,
                }
            })
            .collect();

        Ok(ChallanDetail {
            challan,
            lines,
            closing_stock_by_item_id,
        })
    }

    /// Paginated challan listing, newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<delivery_challans::Model>, u64), ServiceError> {
        let db = &*self.db;
        let paginator = ChallanEntity::find()
            .order_by_desc(delivery_challans::Column::Id)
            .paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((models, total))
    }

    /// Sets or replaces the bill details and recomputes the payment
    /// sub-status.
    #[instrument(skip(self, bill))]
    pub async fn update_bill(
        &self,
        id: i64,
        bill: BillInput,
    ) -> Result<delivery_challans::Model, ServiceError> {
        let db = &*self.db;

        let challan = ChallanEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Challan {} not found", id)))?;

        let paid = challan.paid_amount;
        let due_amount = (bill.bill_amount - paid).max(Decimal::ZERO);

        let mut active: delivery_challans::ActiveModel = challan.into();
        active.bill_no = Set(Some(bill.bill_no));
        active.bill_date = Set(Some(bill.bill_date));
        active.bill_amount = Set(bill.bill_amount);
        active.due_days = Set(bill.due_days);
        active.due_date = Set(Some(bill.bill_date + Duration::days(i64::from(bill.due_days))));
        active.due_amount = Set(due_amount);
        active.payment_status = Set(PaymentStatus::derive(bill.bill_amount, paid).to_string());
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }

    /// Records a payment against the bill and recomputes the sub-status.
    #[instrument(skip(self))]
    pub async fn record_payment(
        &self,
        id: i64,
        amount: Decimal,
    ) -> Result<delivery_challans::Model, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "payment amount must be positive".to_string(),
            ));
        }

        let db = &*self.db;
        let challan = ChallanEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Challan {} not found", id)))?;

        let paid = challan.paid_amount + amount;
        let bill_amount = challan.bill_amount;
        let due_amount = (bill_amount - paid).max(Decimal::ZERO);

        let mut active: delivery_challans::ActiveModel = challan.into();
        active.paid_amount = Set(paid);
        active.due_amount = Set(due_amount);
        active.payment_status = Set(PaymentStatus::derive(bill_amount, paid).to_string());
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }

    async fn validate_header_refs(&self, input: &CreateChallanInput) -> Result<(), ServiceError> {
        let db = &*self.db;

        sites::Entity::find_by_id(input.site_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Site {} not found", input.site_id)))?;
        vendors::Entity::find_by_id(input.vendor_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Vendor {} not found", input.vendor_id))
            })?;
        let po = purchase_orders::Entity::find_by_id(input.po_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order {} not found", input.po_id))
            })?;

        if po.site_id != input.site_id {
            return Err(ServiceError::InvalidOperation(format!(
                "Purchase order {} belongs to a different site",
                po.po_no
            )));
        }
        if po.vendor_id != input.vendor_id {
            return Err(ServiceError::InvalidOperation(format!(
                "Purchase order {} belongs to a different vendor",
                po.po_no
            )));
        }

        Ok(())
    }
}
