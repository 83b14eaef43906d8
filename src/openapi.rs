//! OpenAPI document for the HTTP surface, served at
//! `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::errors::ErrorResponse;
use crate::handlers::{cashbooks, challans, indents, purchase_orders, stock};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "sitebook-api",
        description = "Back-office API for construction contractors: cash vouchers, material indents, purchase orders, delivery challans and site inventory"
    ),
    paths(
        cashbooks::create_cashbook,
        cashbooks::cashbook_action,
        cashbooks::get_cashbook,
        cashbooks::list_cashbooks,
        indents::create_indent,
        indents::indent_action,
        indents::get_indent,
        indents::list_indents,
        purchase_orders::create_purchase_order,
        purchase_orders::purchase_order_action,
        purchase_orders::get_purchase_order,
        purchase_orders::list_purchase_orders,
        challans::create_challan,
        challans::update_challan,
        challans::get_challan,
        challans::list_challans,
        challans::delete_challan,
        challans::update_bill,
        challans::record_payment,
        stock::closing_stock,
        stock::closing_stock_from_log,
    ),
    components(schemas(
        ErrorResponse,
        cashbooks::CreateCashbookRequest,
        cashbooks::CashbookActionRequest,
        indents::CreateIndentRequest,
        indents::IndentLineRequest,
        indents::IndentActionRequest,
        indents::IndentLineEditRequest,
        purchase_orders::CreatePurchaseOrderRequest,
        purchase_orders::PurchaseOrderLineRequest,
        purchase_orders::PurchaseOrderActionRequest,
        purchase_orders::PurchaseOrderLineEditRequest,
        challans::CreateChallanRequest,
        challans::UpdateChallanRequest,
        challans::ChallanLineRequest,
        challans::ChallanBatchRequest,
        challans::BillRequest,
        challans::RecordPaymentRequest,
    )),
    tags(
        (name = "cashbooks", description = "Cash vouchers"),
        (name = "indents", description = "Material indents"),
        (name = "purchase-orders", description = "Purchase orders"),
        (name = "challans", description = "Inward delivery challans"),
        (name = "stock", description = "Closing stock queries"),
    )
)]
pub struct ApiDoc;
