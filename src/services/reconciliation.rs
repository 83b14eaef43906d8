//! Receipt reconciliation engine.
//!
//! Keeps the stock ledger, the challan's own rows and the purchase-order
//! cumulative received quantities consistent on every challan create, update
//! and delete. An update is a full reversal of the previous version followed
//! by a fresh apply, inside the caller's transaction: validation of the new
//! line set runs against the remaining quantity *after* reversal, so editing
//! a receipt of 60 down to 40 is judged against the freed-up headroom.
//!
//! Every invariant violation aborts the caller's transaction; neither the
//! reversal nor the re-application is ever partially visible.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseTransaction, EntityTrait,
    QueryFilter,
};
use tracing::debug;

use crate::entities::{
    challan_line_batches, delivery_challan_lines, delivery_challans, items, purchase_order_lines,
};
use crate::errors::ServiceError;
use crate::services::stock_ledger::{self, StockRef};

/// Tolerance for remaining-quantity comparisons, absorbing rounding noise
/// from rate derivation.
pub const QTY_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

const STOCK_REF_TYPE: &str = "CHALLAN";

/// One incoming receipt line: a purchase-order line reference, the received
/// quantity, and the expiry batch split when the item is expiry-tracked.
#[derive(Debug, Clone)]
pub struct ReceiptLineInput {
    pub po_line_id: i64,
    pub receiving_qty: Decimal,
    pub batches: Vec<ReceiptBatchInput>,
}

#[derive(Debug, Clone)]
pub struct ReceiptBatchInput {
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub qty: Decimal,
}

/// Applies a challan's line set: validates remaining quantities, persists
/// lines and batch rows, increments PO received quantities and posts the
/// ledger deltas. Returns the challan's total amount.
pub async fn apply(
    txn: &DatabaseTransaction,
    challan: &delivery_challans::Model,
    lines: &[ReceiptLineInput],
) -> Result<Decimal, ServiceError> {
    // Zero-quantity lines are dropped silently.
    let live: Vec<&ReceiptLineInput> = lines
        .iter()
        .filter(|l| l.receiving_qty > Decimal::ZERO)
        .collect();

    let incoming_by_po_line = aggregate_by_po_line(&live);

    // Validate every referenced PO line before touching anything.
    let mut po_lines: BTreeMap<i64, purchase_order_lines::Model> = BTreeMap::new();
    for (&po_line_id, &incoming) in &incoming_by_po_line {
        let po_line = purchase_order_lines::Entity::find_by_id(po_line_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order line {} not found", po_line_id))
            })?;
        if po_line.po_id != challan.po_id {
            return Err(ServiceError::InvalidOperation(format!(
                "Purchase order line {} does not belong to purchase order {}",
                po_line_id, challan.po_id
            )));
        }

        let remaining = po_line.remaining_qty();
        if incoming > remaining + QTY_EPSILON {
            return Err(ServiceError::QuantityExceeded {
                po_line_id,
                remaining,
                requested: incoming,
            });
        }
        po_lines.insert(po_line_id, po_line);
    }

    let reference = StockRef {
        reference_type: STOCK_REF_TYPE,
        reference_id: challan.id,
    };

    let mut total_amount = Decimal::ZERO;
    // (site, item) deltas for lines without a batch split.
    let mut item_deltas: BTreeMap<i64, (Decimal, Decimal)> = BTreeMap::new();

    for line in &live {
        let po_line = &po_lines[&line.po_line_id];
        let item = items::Entity::find_by_id(po_line.item_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Item {} not found", po_line.item_id))
            })?;

        if !line.batches.is_empty() && !item.is_expiry_tracked {
            return Err(ServiceError::InvalidInput(format!(
                "Item {} is not expiry-tracked but a batch split was supplied",
                item.code
            )));
        }

        // Rate is frozen from the PO line at reconciliation time.
        let rate = if po_line.ordered_qty.is_zero() {
            Decimal::ZERO
        } else {
            (po_line.amount / po_line.ordered_qty).round_dp(4)
        };
        let amount = (rate * line.receiving_qty).round_dp(4);
        total_amount += amount;

        let persisted = delivery_challan_lines::ActiveModel {
            challan_id: Set(challan.id),
            po_line_id: Set(line.po_line_id),
            item_id: Set(po_line.item_id),
            receiving_qty: Set(line.receiving_qty),
            rate: Set(rate),
            amount: Set(amount),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        if line.batches.is_empty() {
            let entry = item_deltas
                .entry(po_line.item_id)
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 += line.receiving_qty;
            entry.1 += amount;
        } else {
            for batch in &line.batches {
                let batch_amount = (rate * batch.qty).round_dp(4);
                challan_line_batches::ActiveModel {
                    challan_line_id: Set(persisted.id),
                    batch_number: Set(batch.batch_number.clone()),
                    expiry_date: Set(batch.expiry_date),
                    qty: Set(batch.qty),
                    amount: Set(batch_amount),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                stock_ledger::apply_batch_delta(
                    txn,
                    challan.site_id,
                    po_line.item_id,
                    &batch.batch_number,
                    batch.expiry_date,
                    batch.qty,
                    batch_amount,
                    reference,
                )
                .await?;
            }
        }
    }

    for (item_id, (qty, amount)) in item_deltas {
        stock_ledger::apply_item_delta(txn, challan.site_id, item_id, qty, amount, reference)
            .await?;
    }

    for (po_line_id, po_line) in po_lines {
        let incoming = incoming_by_po_line
            .get(&po_line_id)
            .copied()
            .unwrap_or_default();
        let new_received = po_line.received_qty + incoming;
        let mut active: purchase_order_lines::ActiveModel = po_line.into();
        active.received_qty = Set(new_received);
        active.update(txn).await?;
    }

    debug!(challan_id = challan.id, %total_amount, "challan lines applied");
    Ok(total_amount)
}

/// Reverses a challan's previous effect: subtracts every batch balance
/// first (a new version may reuse a batch number with a different
/// quantity), then the item balances, deletes the old rows, and gives the
/// received quantities back to the PO lines.
pub async fn reverse(
    txn: &DatabaseTransaction,
    challan: &delivery_challans::Model,
) -> Result<(), ServiceError> {
    let lines = delivery_challan_lines::Entity::find()
        .filter(delivery_challan_lines::Column::ChallanId.eq(challan.id))
        .all(txn)
        .await?;
    if lines.is_empty() {
        return Ok(());
    }

    let line_ids: Vec<i64> = lines.iter().map(|l| l.id).collect();
    let batches = challan_line_batches::Entity::find()
        .filter(challan_line_batches::Column::ChallanLineId.is_in(line_ids.clone()))
        .all(txn)
        .await?;

    let reference = StockRef {
        reference_type: STOCK_REF_TYPE,
        reference_id: challan.id,
    };

    let item_of_line: BTreeMap<i64, i64> = lines.iter().map(|l| (l.id, l.item_id)).collect();
    let mut batched_lines: Vec<i64> = Vec::new();

    for batch in &batches {
        let item_id = item_of_line[&batch.challan_line_id];
        stock_ledger::apply_batch_delta(
            txn,
            challan.site_id,
            item_id,
            &batch.batch_number,
            batch.expiry_date,
            -batch.qty,
            -batch.amount,
            reference,
        )
        .await?;
        batched_lines.push(batch.challan_line_id);
    }

    let mut item_deltas: BTreeMap<i64, (Decimal, Decimal)> = BTreeMap::new();
    for line in &lines {
        if batched_lines.contains(&line.id) {
            continue;
        }
        let entry = item_deltas
            .entry(line.item_id)
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += line.receiving_qty;
        entry.1 += line.amount;
    }
    for (item_id, (qty, amount)) in item_deltas {
        stock_ledger::apply_item_delta(txn, challan.site_id, item_id, -qty, -amount, reference)
            .await?;
    }

    challan_line_batches::Entity::delete_many()
        .filter(challan_line_batches::Column::ChallanLineId.is_in(line_ids.clone()))
        .exec(txn)
        .await?;
    delivery_challan_lines::Entity::delete_many()
        .filter(delivery_challan_lines::Column::ChallanId.eq(challan.id))
        .exec(txn)
        .await?;

    let mut reversed_by_po_line: BTreeMap<i64, Decimal> = BTreeMap::new();
    for line in &lines {
        *reversed_by_po_line.entry(line.po_line_id).or_default() += line.receiving_qty;
    }
    for (po_line_id, reversed) in reversed_by_po_line {
        let po_line = purchase_order_lines::Entity::find_by_id(po_line_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order line {} not found", po_line_id))
            })?;
        let new_received = (po_line.received_qty - reversed).max(Decimal::ZERO);
        let mut active: purchase_order_lines::ActiveModel = po_line.into();
        active.received_qty = Set(new_received);
        active.update(txn).await?;
    }

    debug!(challan_id = challan.id, "challan lines reversed");
    Ok(())
}

fn aggregate_by_po_line(lines: &[&ReceiptLineInput]) -> BTreeMap<i64, Decimal> {
    let mut incoming: BTreeMap<i64, Decimal> = BTreeMap::new();
    for line in lines {
        *incoming.entry(line.po_line_id).or_default() += line.receiving_qty;
    }
    incoming
}
