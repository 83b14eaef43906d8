//! Quantity ledger store.
//!
//! Running closing balances per (site, item) and per (site, item, batch).
//! Every mutation goes through the signed-delta functions here — document
//! services never write balance fields directly — and each mutation appends
//! a `stock_transactions` row, so closing stock can be answered either from
//! the running rows or by folding the log.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};
use tracing::debug;

use crate::entities::{
    site_item_balances, site_item_batch_balances,
    stock_transactions,
};
use crate::errors::ServiceError;

/// Document that caused a ledger movement, for the audit trail.
#[derive(Debug, Clone, Copy)]
pub struct StockRef<'a> {
    pub reference_type: &'a str,
    pub reference_id: i64,
}

/// Adds a signed delta to the (site, item) balance, creating the row on
/// first touch. Reversals clamp at zero rather than going negative.
pub async fn apply_item_delta<C: ConnectionTrait>(
    conn: &C,
    site_id: i64,
    item_id: i64,
    qty_delta: Decimal,
    value_delta: Decimal,
    reference: StockRef<'_>,
) -> Result<site_item_balances::Model, ServiceError> {
    let existing = site_item_balances::Entity::find()
        .filter(site_item_balances::Column::SiteId.eq(site_id))
        .filter(site_item_balances::Column::ItemId.eq(item_id))
        .one(conn)
        .await?;

    let updated = match existing {
        Some(row) => {
            let new_qty = (row.closing_qty + qty_delta).max(Decimal::ZERO);
            let new_value = (row.closing_value + value_delta).max(Decimal::ZERO);

            let mut active: site_item_balances::ActiveModel = row.into();
            active.closing_qty = Set(new_qty);
            active.closing_value = Set(new_value);
            active.updated_at = Set(Utc::now());
            active.update(conn).await?
        }
        None => {
            let row = site_item_balances::ActiveModel {
                site_id: Set(site_id),
                item_id: Set(item_id),
                closing_qty: Set(qty_delta.max(Decimal::ZERO)),
                closing_value: Set(value_delta.max(Decimal::ZERO)),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            };
            row.insert(conn).await?
        }
    };

    record_movement(conn, site_id, item_id, None, qty_delta, value_delta, reference).await?;

    debug!(
        site_id,
        item_id,
        %qty_delta,
        closing_qty = %updated.closing_qty,
        "item balance updated"
    );

    Ok(updated)
}

/// Adds a signed delta to the (site, item, batch) balance. A positive delta
/// reusing an existing batch number with a different expiry date is a
/// conflict — a batch number carries exactly one expiry for its lifetime.
pub async fn apply_batch_delta<C: ConnectionTrait>(
    conn: &C,
    site_id: i64,
    item_id: i64,
    batch_number: &str,
    expiry_date: NaiveDate,
    qty_delta: Decimal,
    value_delta: Decimal,
    reference: StockRef<'_>,
) -> Result<site_item_batch_balances::Model, ServiceError> {
    let existing = site_item_batch_balances::Entity::find()
        .filter(site_item_batch_balances::Column::SiteId.eq(site_id))
        .filter(site_item_batch_balances::Column::ItemId.eq(item_id))
        .filter(site_item_batch_balances::Column::BatchNumber.eq(batch_number))
        .one(conn)
        .await?;

    let updated = match existing {
        Some(row) => {
            if qty_delta > Decimal::ZERO && row.expiry_date != expiry_date {
                return Err(ServiceError::BatchConflict {
                    batch_number: batch_number.to_string(),
                    existing: row.expiry_date,
                    incoming: expiry_date,
                });
            }

            let new_qty = (row.closing_qty + qty_delta).max(Decimal::ZERO);
            let new_value = (row.closing_value + value_delta).max(Decimal::ZERO);

            let mut active: site_item_batch_balances::ActiveModel = row.into();
            active.closing_qty = Set(new_qty);
            active.closing_value = Set(new_value);
            active.updated_at = Set(Utc::now());
            active.update(conn).await?
        }
        None => {
            let row = site_item_batch_balances::ActiveModel {
                site_id: Set(site_id),
                item_id: Set(item_id),
                batch_number: Set(batch_number.to_string()),
                expiry_date: Set(expiry_date),
                closing_qty: Set(qty_delta.max(Decimal::ZERO)),
                closing_value: Set(value_delta.max(Decimal::ZERO)),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            };
            row.insert(conn).await?
        }
    };

    record_movement(
        conn,
        site_id,
        item_id,
        Some(batch_number),
        qty_delta,
        value_delta,
        reference,
    )
    .await?;

    Ok(updated)
}

async fn record_movement<C: ConnectionTrait>(
    conn: &C,
    site_id: i64,
    item_id: i64,
    batch_number: Option<&str>,
    qty_delta: Decimal,
    value_delta: Decimal,
    reference: StockRef<'_>,
) -> Result<(), ServiceError> {
    let movement = stock_transactions::ActiveModel {
        site_id: Set(site_id),
        item_id: Set(item_id),
        batch_number: Set(batch_number.map(str::to_string)),
        qty_delta: Set(qty_delta),
        value_delta: Set(value_delta),
        reference_type: Set(reference.reference_type.to_string()),
        reference_id: Set(reference.reference_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    movement.insert(conn).await?;
    Ok(())
}

/// Closing quantity per item from the running balance rows. An item's total
/// is its (site, item) row plus all of its batch rows; items with no rows
/// yet report zero.
pub async fn closing_stock<C: ConnectionTrait>(
    conn: &C,
    site_id: i64,
    item_ids: &[i64],
) -> Result<HashMap<i64, Decimal>, ServiceError> {
    let mut totals: HashMap<i64, Decimal> =
        item_ids.iter().map(|id| (*id, Decimal::ZERO)).collect();

    let item_rows = site_item_balances::Entity::find()
        .filter(site_item_balances::Column::SiteId.eq(site_id))
        .filter(site_item_balances::Column::ItemId.is_in(item_ids.to_vec()))
        .all(conn)
        .await?;
    for row in item_rows {
        *totals.entry(row.item_id).or_default() += row.closing_qty;
    }

    let batch_rows = site_item_batch_balances::Entity::find()
        .filter(site_item_batch_balances::Column::SiteId.eq(site_id))
        .filter(site_item_batch_balances::Column::ItemId.is_in(item_ids.to_vec()))
        .all(conn)
        .await?;
    for row in batch_rows {
        *totals.entry(row.item_id).or_default() += row.closing_qty;
    }

    Ok(totals)
}

/// Same question as [`closing_stock`], answered by folding the append-only
/// movement log. The two paths are interchangeable and must agree.
pub async fn closing_stock_from_log<C: ConnectionTrait>(
    conn: &C,
    site_id: i64,
    item_ids: &[i64],
) -> Result<HashMap<i64, Decimal>, ServiceError> {
    let mut totals: HashMap<i64, Decimal> =
        item_ids.iter().map(|id| (*id, Decimal::ZERO)).collect();

    let movements = stock_transactions::Entity::find()
        .filter(stock_transactions::Column::SiteId.eq(site_id))
        .filter(stock_transactions::Column::ItemId.is_in(item_ids.to_vec()))
        .all(conn)
        .await?;
    for movement in movements {
        let total = totals.entry(movement.item_id).or_default();
        // Clamped reversals floor at zero, so the fold clamps the same way.
        *total = (*total + movement.qty_delta).max(Decimal::ZERO);
    }

    Ok(totals)
}
