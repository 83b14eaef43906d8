//! Receipt reconciliation: ledger and purchase-order invariants across
//! challan create, update and delete.

mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use sitebook_api::entities::{
    delivery_challans, purchase_order_lines, site_item_balances, site_item_batch_balances,
};

use common::{
    dec, response_json, seed_item, seed_purchase_order, seed_site, seed_vendor, TestActor,
    TestApp,
};

struct Fixture {
    app: TestApp,
    actor: TestActor,
    site_id: i64,
    vendor_id: i64,
    item_id: i64,
    po_id: i64,
    po_line_id: i64,
}

/// One site, one non-expiry item, one PO line: ordered 100 @ 5.
async fn fixture() -> Fixture {
    let app = TestApp::new().await;
    let actor = TestActor::new(&[]);
    let site_id = seed_site(&app, "S1").await;
    let vendor_id = seed_vendor(&app, "Sharma Traders").await;
    let item_id = seed_item(&app, "CEM-53", false).await;
    let (po_id, line_ids) = seed_purchase_order(
        &app,
        &actor,
        "PO-001",
        site_id,
        vendor_id,
        &[(item_id, "100", "5")],
    )
    .await;

    Fixture {
        app,
        actor,
        site_id,
        vendor_id,
        item_id,
        po_id,
        po_line_id: line_ids[0],
    }
}

impl Fixture {
    async fn create_challan(&self, lines: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = self
            .app
            .request_as(
                &self.actor,
                Method::POST,
                "/api/v1/challans",
                Some(json!({
                    "site_id": self.site_id,
                    "vendor_id": self.vendor_id,
                    "po_id": self.po_id,
                    "challan_date": "2025-03-01",
                    "lines": lines,
                })),
            )
            .await;
        let status = response.status();
        (status, response_json(response).await)
    }

    async fn received_qty(&self, po_line_id: i64) -> rust_decimal::Decimal {
        purchase_order_lines::Entity::find_by_id(po_line_id)
            .one(&*self.app.state.db)
            .await
            .expect("query po line")
            .expect("po line exists")
            .received_qty
    }

    async fn closing_qty(&self, item_id: i64) -> rust_decimal::Decimal {
        site_item_balances::Entity::find()
            .filter(site_item_balances::Column::SiteId.eq(self.site_id))
            .filter(site_item_balances::Column::ItemId.eq(item_id))
            .one(&*self.app.state.db)
            .await
            .expect("query balance")
            .map(|b| b.closing_qty)
            .unwrap_or_default()
    }
}

#[tokio::test]
async fn create_updates_received_qty_and_closing_stock() {
    let fx = fixture().await;

    let (status, body) = fx
        .create_challan(json!([{ "po_line_id": fx.po_line_id, "receiving_qty": "60" }]))
        .await;
    assert_eq!(status, StatusCode::CREATED, "create challan: {body}");

    assert_eq!(fx.received_qty(fx.po_line_id).await, dec!(60));
    assert_eq!(fx.closing_qty(fx.item_id).await, dec!(60));

    // Rate is frozen from the PO line: amount/qty = 500/100 = 5.
    assert_eq!(dec(&body["total_amount"]), dec!(300));
}

#[tokio::test]
async fn editing_a_receipt_down_reapplies_not_accumulates() {
    let fx = fixture().await;

    let (status, body) = fx
        .create_challan(json!([{ "po_line_id": fx.po_line_id, "receiving_qty": "60" }]))
        .await;
    assert_eq!(status, StatusCode::CREATED, "create challan: {body}");
    let challan_id = body["id"].as_i64().expect("challan id");

    let response = fx
        .app
        .request_as(
            &fx.actor,
            Method::PUT,
            &format!("/api/v1/challans/{challan_id}"),
            Some(json!({
                "challan_date": "2025-03-02",
                "lines": [{ "po_line_id": fx.po_line_id, "receiving_qty": "40" }],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // 40, not 100 and not -20.
    assert_eq!(fx.received_qty(fx.po_line_id).await, dec!(40));
    assert_eq!(fx.closing_qty(fx.item_id).await, dec!(40));
}

#[tokio::test]
async fn resubmitting_an_unchanged_line_set_is_a_net_noop() {
    let fx = fixture().await;

    let (_, body) = fx
        .create_challan(json!([{ "po_line_id": fx.po_line_id, "receiving_qty": "55" }]))
        .await;
    let challan_id = body["id"].as_i64().expect("challan id");

    for _ in 0..2 {
        let response = fx
            .app
            .request_as(
                &fx.actor,
                Method::PUT,
                &format!("/api/v1/challans/{challan_id}"),
                Some(json!({
                    "challan_date": "2025-03-01",
                    "lines": [{ "po_line_id": fx.po_line_id, "receiving_qty": "55" }],
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(fx.received_qty(fx.po_line_id).await, dec!(55));
    assert_eq!(fx.closing_qty(fx.item_id).await, dec!(55));
}

#[tokio::test]
async fn over_receipt_is_rejected_with_the_remaining_quantity() {
    let fx = fixture().await;

    let (status, _) = fx
        .create_challan(json!([{ "po_line_id": fx.po_line_id, "receiving_qty": "70" }]))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = fx
        .create_challan(json!([{ "po_line_id": fx.po_line_id, "receiving_qty": "50" }]))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["po_line_id"].as_i64(), Some(fx.po_line_id));
    assert_eq!(dec(&body["details"]["remaining_qty"]), dec!(30));
    assert_eq!(dec(&body["details"]["requested_qty"]), dec!(50));

    // Nothing from the rejected challan is visible.
    assert_eq!(fx.received_qty(fx.po_line_id).await, dec!(70));
    assert_eq!(fx.closing_qty(fx.item_id).await, dec!(70));
    let challans = delivery_challans::Entity::find()
        .count(&*fx.app.state.db)
        .await
        .expect("count challans");
    assert_eq!(challans, 1);
}

#[tokio::test]
async fn received_qty_never_exceeds_ordered_qty_across_a_sequence() {
    let fx = fixture().await;

    for qty in ["30", "30", "40"] {
        let (status, _) = fx
            .create_challan(json!([{ "po_line_id": fx.po_line_id, "receiving_qty": qty }]))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let received = fx.received_qty(fx.po_line_id).await;
        assert!(received >= dec!(0) && received <= dec!(100));
    }

    // The order is now fully received; one more unit must be rejected.
    let (status, _) = fx
        .create_challan(json!([{ "po_line_id": fx.po_line_id, "receiving_qty": "1" }]))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(fx.received_qty(fx.po_line_id).await, dec!(100));
}

#[tokio::test]
async fn update_can_move_the_receipt_to_another_po_line() {
    let app = TestApp::new().await;
    let actor = TestActor::new(&[]);
    let site_id = seed_site(&app, "S1").await;
    let vendor_id = seed_vendor(&app, "Sharma Traders").await;
    let item_a = seed_item(&app, "CEM-53", false).await;
    let item_b = seed_item(&app, "TMT-12", false).await;
    let (po_id, line_ids) = seed_purchase_order(
        &app,
        &actor,
        "PO-001",
        site_id,
        vendor_id,
        &[(item_a, "100", "5"), (item_b, "50", "80")],
    )
    .await;

    let response = app
        .request_as(
            &actor,
            Method::POST,
            "/api/v1/challans",
            Some(json!({
                "site_id": site_id,
                "vendor_id": vendor_id,
                "po_id": po_id,
                "challan_date": "2025-03-01",
                "lines": [{ "po_line_id": line_ids[0], "receiving_qty": "25" }],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let challan_id = response_json(response).await["id"].as_i64().expect("id");

    let response = app
        .request_as(
            &actor,
            Method::PUT,
            &format!("/api/v1/challans/{challan_id}"),
            Some(json!({
                "challan_date": "2025-03-02",
                "lines": [{ "po_line_id": line_ids[1], "receiving_qty": "10" }],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let line_a = purchase_order_lines::Entity::find_by_id(line_ids[0])
        .one(&*app.state.db)
        .await
        .expect("query")
        .expect("line a");
    let line_b = purchase_order_lines::Entity::find_by_id(line_ids[1])
        .one(&*app.state.db)
        .await
        .expect("query")
        .expect("line b");
    assert_eq!(line_a.received_qty, dec!(0));
    assert_eq!(line_b.received_qty, dec!(10));
}

#[tokio::test]
async fn delete_reverses_the_ledger_effect() {
    let fx = fixture().await;

    let (_, body) = fx
        .create_challan(json!([{ "po_line_id": fx.po_line_id, "receiving_qty": "60" }]))
        .await;
    let challan_id = body["id"].as_i64().expect("challan id");

    let response = fx
        .app
        .request_as(
            &fx.actor,
            Method::DELETE,
            &format!("/api/v1/challans/{challan_id}"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(fx.received_qty(fx.po_line_id).await, dec!(0));
    assert_eq!(fx.closing_qty(fx.item_id).await, dec!(0));
}

#[tokio::test]
async fn zero_quantity_lines_are_dropped_silently() {
    let app = TestApp::new().await;
    let actor = TestActor::new(&[]);
    let site_id = seed_site(&app, "S1").await;
    let vendor_id = seed_vendor(&app, "Sharma Traders").await;
    let item_a = seed_item(&app, "CEM-53", false).await;
    let item_b = seed_item(&app, "TMT-12", false).await;
    let (po_id, line_ids) = seed_purchase_order(
        &app,
        &actor,
        "PO-001",
        site_id,
        vendor_id,
        &[(item_a, "100", "5"), (item_b, "50", "80")],
    )
    .await;

    let response = app
        .request_as(
            &actor,
            Method::POST,
            "/api/v1/challans",
            Some(json!({
                "site_id": site_id,
                "vendor_id": vendor_id,
                "po_id": po_id,
                "challan_date": "2025-03-01",
                "lines": [
                    { "po_line_id": line_ids[0], "receiving_qty": "20" },
                    { "po_line_id": line_ids[1], "receiving_qty": "0" },
                ],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let challan_id = response_json(response).await["id"].as_i64().expect("id");

    let response = app
        .request(Method::GET, &format!("/api/v1/challans/{challan_id}"), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["lines"].as_array().expect("lines").len(), 1);
}

#[tokio::test]
async fn batch_conflict_is_rejected_without_any_mutation() {
    let app = TestApp::new().await;
    let actor = TestActor::new(&[]);
    let site_id = seed_site(&app, "S1").await;
    let vendor_id = seed_vendor(&app, "MediBuild").await;
    let item_id = seed_item(&app, "ADMIX-R", true).await;
    let (po_id, line_ids) = seed_purchase_order(
        &app,
        &actor,
        "PO-001",
        site_id,
        vendor_id,
        &[(item_id, "100", "12")],
    )
    .await;

    let payload_with = |expiry: &str, qty: &str| {
        json!({
            "site_id": site_id,
            "vendor_id": vendor_id,
            "po_id": po_id,
            "challan_date": "2025-03-01",
            "lines": [{
                "po_line_id": line_ids[0],
                "receiving_qty": qty,
                "batches": [{
                    "batch_number": "B1",
                    "expiry_date": expiry,
                    "receiving_qty": qty,
                }],
            }],
        })
    };

    let response = app
        .request_as(
            &actor,
            Method::POST,
            "/api/v1/challans",
            Some(payload_with("2025-06", "30")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same batch number, different expiry: conflict, nothing applied.
    let response = app
        .request_as(
            &actor,
            Method::POST,
            "/api/v1/challans",
            Some(payload_with("2025-07", "10")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert_eq!(body["details"]["batch_number"].as_str(), Some("B1"));
    assert_eq!(body["details"]["existing_expiry"].as_str(), Some("2025-06"));
    assert_eq!(body["details"]["incoming_expiry"].as_str(), Some("2025-07"));

    let batch = site_item_batch_balances::Entity::find()
        .filter(site_item_batch_balances::Column::SiteId.eq(site_id))
        .filter(site_item_batch_balances::Column::ItemId.eq(item_id))
        .all(&*app.state.db)
        .await
        .expect("batch balances");
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].closing_qty, dec!(30));

    let line = purchase_order_lines::Entity::find_by_id(line_ids[0])
        .one(&*app.state.db)
        .await
        .expect("query")
        .expect("line");
    assert_eq!(line.received_qty, dec!(30));
}

#[tokio::test]
async fn batch_totals_reconcile_with_the_item_total() {
    let app = TestApp::new().await;
    let actor = TestActor::new(&[]);
    let site_id = seed_site(&app, "S1").await;
    let vendor_id = seed_vendor(&app, "MediBuild").await;
    let item_id = seed_item(&app, "ADMIX-R", true).await;
    let (po_id, line_ids) = seed_purchase_order(
        &app,
        &actor,
        "PO-001",
        site_id,
        vendor_id,
        &[(item_id, "100", "12")],
    )
    .await;

    let response = app
        .request_as(
            &actor,
            Method::POST,
            "/api/v1/challans",
            Some(json!({
                "site_id": site_id,
                "vendor_id": vendor_id,
                "po_id": po_id,
                "challan_date": "2025-03-01",
                "lines": [{
                    "po_line_id": line_ids[0],
                    "receiving_qty": "50",
                    "batches": [
                        { "batch_number": "B1", "expiry_date": "2025-06", "receiving_qty": "30" },
                        { "batch_number": "B2", "expiry_date": "2025-09", "receiving_qty": "20" },
                    ],
                }],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let batches = site_item_batch_balances::Entity::find()
        .filter(site_item_batch_balances::Column::ItemId.eq(item_id))
        .all(&*app.state.db)
        .await
        .expect("batch balances");
    let batch_total: rust_decimal::Decimal = batches.iter().map(|b| b.closing_qty).sum();
    assert_eq!(batch_total, dec!(50));

    // The closing stock view agrees with the batch split.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/stock/closing?site_id={site_id}&item_ids={item_id}"),
            None,
        )
        .await;
    let totals = response_json(response).await;
    assert_eq!(dec(&totals[item_id.to_string()]), dec!(50));
}

#[tokio::test]
async fn both_closing_stock_read_paths_agree_after_edits() {
    let fx = fixture().await;

    let (_, body) = fx
        .create_challan(json!([{ "po_line_id": fx.po_line_id, "receiving_qty": "60" }]))
        .await;
    let challan_id = body["id"].as_i64().expect("challan id");

    let response = fx
        .app
        .request_as(
            &fx.actor,
            Method::PUT,
            &format!("/api/v1/challans/{challan_id}"),
            Some(json!({
                "challan_date": "2025-03-02",
                "lines": [{ "po_line_id": fx.po_line_id, "receiving_qty": "40" }],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let from_balances = response_json(
        fx.app
            .request(
                Method::GET,
                &format!(
                    "/api/v1/stock/closing?site_id={}&item_ids={}",
                    fx.site_id, fx.item_id
                ),
                None,
            )
            .await,
    )
    .await;
    let from_log = response_json(
        fx.app
            .request(
                Method::GET,
                &format!(
                    "/api/v1/stock/closing-from-log?site_id={}&item_ids={}",
                    fx.site_id, fx.item_id
                ),
                None,
            )
            .await,
    )
    .await;

    let key = fx.item_id.to_string();
    assert_eq!(dec(&from_balances[&key]), dec!(40));
    assert_eq!(dec(&from_balances[&key]), dec(&from_log[&key]));
}
