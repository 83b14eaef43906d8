//! Approval workflow over HTTP: guards, suspension, and purchase-order
//! auto-escalation.

mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec as rdec;
use serde_json::json;
use sitebook_api::auth::consts;

use common::{
    dec, response_json, seed_item, seed_purchase_order, seed_site, seed_vendor, TestActor,
    TestApp,
};

async fn seed_indent(app: &TestApp, actor: &TestActor, site_id: i64, item_id: i64) -> i64 {
    let response = app
        .request_as(
            actor,
            Method::POST,
            "/api/v1/indents",
            Some(json!({
                "indent_no": "IND-001",
                "site_id": site_id,
                "lines": [{ "item_id": item_id, "qty": "25" }],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["id"].as_i64().expect("indent id")
}

async fn indent_action(
    app: &TestApp,
    actor: &TestActor,
    id: i64,
    action: &str,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .request_as(
            actor,
            Method::POST,
            &format!("/api/v1/indents/{id}/action"),
            Some(json!({ "status_action": action })),
        )
        .await;
    let status = response.status();
    (status, response_json(response).await)
}

async fn po_action(
    app: &TestApp,
    actor: &TestActor,
    id: i64,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .request_as(
            actor,
            Method::POST,
            &format!("/api/v1/purchase-orders/{id}/action"),
            Some(body),
        )
        .await;
    let status = response.status();
    (status, response_json(response).await)
}

#[tokio::test]
async fn creator_cannot_approve_but_another_qualified_actor_can() {
    let app = TestApp::new().await;
    let creator = TestActor::new(&[consts::INDENTS_APPROVE1]);
    let site_id = seed_site(&app, "S1").await;
    let item_id = seed_item(&app, "CEM-53", false).await;
    let indent_id = seed_indent(&app, &creator, site_id, item_id).await;

    let (status, body) = indent_action(&app, &creator, indent_id, "approve1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(
        body["message"].as_str().unwrap_or_default().contains("creator"),
        "unexpected message: {body}"
    );

    let approver = TestActor::new(&[consts::INDENTS_APPROVE1]);
    let (status, body) = indent_action(&app, &approver, indent_id, "approve1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approval_status"].as_str(), Some("APPROVED_LEVEL_1"));
    assert_eq!(
        body["approved1_by"].as_str(),
        Some(approver.id.to_string().as_str())
    );
}

#[tokio::test]
async fn level1_approver_cannot_sign_level2() {
    let app = TestApp::new().await;
    let creator = TestActor::new(&[]);
    let approver = TestActor::new(&[consts::INDENTS_APPROVE1, consts::INDENTS_APPROVE2]);
    let site_id = seed_site(&app, "S1").await;
    let item_id = seed_item(&app, "CEM-53", false).await;
    let indent_id = seed_indent(&app, &creator, site_id, item_id).await;

    let (status, _) = indent_action(&app, &approver, indent_id, "approve1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = indent_action(&app, &approver, indent_id, "approve2").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(
        body["message"]
            .as_str()
            .unwrap_or_default()
            .contains("level-1 approver"),
        "unexpected message: {body}"
    );

    let second = TestActor::new(&[consts::INDENTS_APPROVE2]);
    let (status, body) = indent_action(&app, &second, indent_id, "approve2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approval_status"].as_str(), Some("APPROVED_LEVEL_2"));
}

#[tokio::test]
async fn approvals_are_monotonic() {
    let app = TestApp::new().await;
    let creator = TestActor::new(&[]);
    let actor = TestActor::new(&[
        consts::INDENTS_APPROVE1,
        consts::INDENTS_APPROVE2,
        consts::INDENTS_COMPLETE,
    ]);
    let site_id = seed_site(&app, "S1").await;
    let item_id = seed_item(&app, "CEM-53", false).await;
    let indent_id = seed_indent(&app, &creator, site_id, item_id).await;

    // From DRAFT, approve2 and complete are invalid.
    let (status, _) = indent_action(&app, &actor, indent_id, "approve2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = indent_action(&app, &actor, indent_id, "complete").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = indent_action(&app, &actor, indent_id, "approve1").await;
    assert_eq!(status, StatusCode::OK);
    let second = TestActor::new(&[consts::INDENTS_APPROVE2]);
    let (status, _) = indent_action(&app, &second, indent_id, "approve2").await;
    assert_eq!(status, StatusCode::OK);

    // From APPROVED_LEVEL_2, both approvals always fail.
    let (status, _) = indent_action(&app, &actor, indent_id, "approve1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = indent_action(&app, &second, indent_id, "approve2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn suspend_parks_and_unsuspend_recomputes_the_status() {
    let app = TestApp::new().await;
    let creator = TestActor::new(&[]);
    let approver = TestActor::new(&[consts::INDENTS_APPROVE1, consts::INDENTS_SUSPEND]);
    let site_id = seed_site(&app, "S1").await;
    let item_id = seed_item(&app, "CEM-53", false).await;
    let indent_id = seed_indent(&app, &creator, site_id, item_id).await;

    let (status, _) = indent_action(&app, &approver, indent_id, "approve1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = indent_action(&app, &approver, indent_id, "suspend").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approval_status"].as_str(), Some("SUSPENDED"));

    // No forward action while suspended.
    let second = TestActor::new(&[consts::INDENTS_APPROVE2]);
    let (status, _) = indent_action(&app, &second, indent_id, "approve2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = indent_action(&app, &approver, indent_id, "unsuspend").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approval_status"].as_str(), Some("APPROVED_LEVEL_1"));
}

#[tokio::test]
async fn small_purchase_order_auto_escalates_on_first_approval() {
    let app = TestApp::new().await;
    let creator = TestActor::new(&[]);
    let site_id = seed_site(&app, "S1").await;
    let vendor_id = seed_vendor(&app, "Sharma Traders").await;
    let item_id = seed_item(&app, "CEM-53", false).await;
    // Total 100 x 5 = 500, well below the default threshold.
    let (po_id, line_ids) = seed_purchase_order(
        &app,
        &creator,
        "PO-001",
        site_id,
        vendor_id,
        &[(item_id, "100", "5")],
    )
    .await;

    let approver = TestActor::new(&[consts::PURCHASE_ORDERS_APPROVE1]);
    let (status, body) = po_action(
        &app,
        &approver,
        po_id,
        json!({
            "status_action": "approve1",
            "lines": [{ "line_id": line_ids[0], "approved1_qty": "90" }],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approval_status"].as_str(), Some("APPROVED_LEVEL_2"));

    // Both stamps carry the same actor, and the stage quantity is copied
    // forward.
    let id = approver.id.to_string();
    assert_eq!(body["approved1_by"].as_str(), Some(id.as_str()));
    assert_eq!(body["approved2_by"].as_str(), Some(id.as_str()));

    let response = app
        .request(Method::GET, &format!("/api/v1/purchase-orders/{po_id}"), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(dec(&body["lines"][0]["approved1_qty"]), rdec!(90));
    assert_eq!(dec(&body["lines"][0]["approved2_qty"]), rdec!(90));
}

#[tokio::test]
async fn large_purchase_order_requires_a_second_approver() {
    let app = TestApp::new().await;
    let creator = TestActor::new(&[]);
    let site_id = seed_site(&app, "S1").await;
    let vendor_id = seed_vendor(&app, "Sharma Traders").await;
    let item_id = seed_item(&app, "TMT-12", false).await;
    // Total 1000 x 80 = 80,000, above the default threshold.
    let (po_id, _) = seed_purchase_order(
        &app,
        &creator,
        "PO-002",
        site_id,
        vendor_id,
        &[(item_id, "1000", "80")],
    )
    .await;

    let approver = TestActor::new(&[consts::PURCHASE_ORDERS_APPROVE1]);
    let (status, body) = po_action(&app, &approver, po_id, json!({ "status_action": "approve1" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approval_status"].as_str(), Some("APPROVED_LEVEL_1"));

    let second = TestActor::new(&[consts::PURCHASE_ORDERS_APPROVE2]);
    let (status, body) = po_action(&app, &second, po_id, json!({ "status_action": "approve2" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approval_status"].as_str(), Some("APPROVED_LEVEL_2"));
}

#[tokio::test]
async fn head_office_level2_holder_escalates_a_large_order() {
    let app = TestApp::new().await;
    let creator = TestActor::new(&[]);
    let site_id = seed_site(&app, "S1").await;
    let vendor_id = seed_vendor(&app, "Sharma Traders").await;
    let item_id = seed_item(&app, "TMT-12", false).await;
    let (po_id, _) = seed_purchase_order(
        &app,
        &creator,
        "PO-003",
        site_id,
        vendor_id,
        &[(item_id, "1000", "80")],
    )
    .await;

    let head_office = TestActor::with_roles(
        &[
            consts::PURCHASE_ORDERS_APPROVE1,
            consts::PURCHASE_ORDERS_APPROVE2,
        ],
        &["head-office"],
    );
    let (status, body) = po_action(
        &app,
        &head_office,
        po_id,
        json!({ "status_action": "approve1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approval_status"].as_str(), Some("APPROVED_LEVEL_2"));
}

#[tokio::test]
async fn cashbook_uses_the_single_level_workflow() {
    let app = TestApp::new().await;
    let creator = TestActor::new(&[]);
    let site_id = seed_site(&app, "S1").await;

    let response = app
        .request_as(
            &creator,
            Method::POST,
            "/api/v1/cashbooks",
            Some(json!({
                "voucher_no": "CV-001",
                "site_id": site_id,
                "payee": "Site engineer",
                "amount": "1500",
                "voucher_date": "2025-03-01",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cashbook_id = response_json(response).await["id"].as_i64().expect("id");

    let approver = TestActor::new(&[consts::CASHBOOKS_APPROVE1]);
    let response = app
        .request_as(
            &approver,
            Method::POST,
            &format!("/api/v1/cashbooks/{cashbook_id}/action"),
            Some(json!({ "status_action": "approve1" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["approval_status"].as_str(), Some("APPROVED_LEVEL_1"));

    // Cashbooks have no level 2.
    let response = app
        .request_as(
            &approver,
            Method::POST,
            &format!("/api/v1/cashbooks/{cashbook_id}/action"),
            Some(json!({ "status_action": "approve2" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mutating_without_actor_headers_is_unauthorized() {
    let app = TestApp::new().await;
    let site_id = seed_site(&app, "S1").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cashbooks",
            Some(json!({
                "voucher_no": "CV-001",
                "site_id": site_id,
                "payee": "Site engineer",
                "amount": "1500",
                "voucher_date": "2025-03-01",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
