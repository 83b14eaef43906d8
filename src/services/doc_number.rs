//! Challan number generation.
//!
//! Numbers follow the `NNNN-NNNN` pattern. The next number is derived from
//! the numerically highest existing one; anything not matching the pattern
//! is legacy data and is ignored. The read-then-write window is backstopped
//! by the UNIQUE constraint on `challan_no` — callers retry once with a
//! regenerated number on a uniqueness conflict.

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};

use crate::entities::delivery_challans;
use crate::errors::ServiceError;

static CHALLAN_NO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{4})$").unwrap());

const SEGMENT_MAX: u32 = 9999;

/// Parses a `NNNN-NNNN` document number into its two segments.
fn parse(value: &str) -> Option<(u32, u32)> {
    let caps = CHALLAN_NO_RE.captures(value)?;
    let left = caps[1].parse().ok()?;
    let right = caps[2].parse().ok()?;
    Some((left, right))
}

fn format(left: u32, right: u32) -> String {
    format!("{:04}-{:04}", left, right)
}

/// Computes the successor of the highest number among `existing`.
/// The right segment increments first; past 9999 it resets to 0001 and the
/// left segment increments.
pub fn next_from<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let highest = existing.into_iter().filter_map(parse).max();

    match highest {
        None => format(1, 1),
        Some((left, right)) if right >= SEGMENT_MAX => format(left + 1, 1),
        Some((left, right)) => format(left, right + 1),
    }
}

/// Next challan number from the numbers currently persisted.
pub async fn next_challan_number<C: ConnectionTrait>(conn: &C) -> Result<String, ServiceError> {
    let existing: Vec<String> = delivery_challans::Entity::find()
        .select_only()
        .column(delivery_challans::Column::ChallanNo)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(next_from(existing.iter().map(String::as_str)))
}
