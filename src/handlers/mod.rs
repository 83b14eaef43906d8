pub mod cashbooks;
pub mod challans;
pub mod common;
pub mod indents;
pub mod purchase_orders;
pub mod reference;
pub mod stock;

use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::events::EventSender;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub reference: Arc<crate::services::reference::ReferenceDataService>,
    pub cashbooks: Arc<crate::services::cashbooks::CashbookService>,
    pub indents: Arc<crate::services::indents::IndentService>,
    pub purchase_orders: Arc<crate::services::purchase_orders::PurchaseOrderService>,
    pub challans: Arc<crate::services::challans::DeliveryChallanService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &AppConfig,
        event_sender: EventSender,
    ) -> Self {
        let auto_approve_threshold = Decimal::try_from(config.po_auto_approve_threshold)
            .unwrap_or(Decimal::ZERO);

        Self {
            reference: Arc::new(crate::services::reference::ReferenceDataService::new(
                db.clone(),
            )),
            cashbooks: Arc::new(crate::services::cashbooks::CashbookService::new(
                db.clone(),
                Some(event_sender.clone()),
            )),
            indents: Arc::new(crate::services::indents::IndentService::new(
                db.clone(),
                Some(event_sender.clone()),
            )),
            purchase_orders: Arc::new(
                crate::services::purchase_orders::PurchaseOrderService::new(
                    db.clone(),
                    auto_approve_threshold,
                    Some(event_sender.clone()),
                ),
            ),
            challans: Arc::new(crate::services::challans::DeliveryChallanService::new(
                db,
                Some(event_sender),
            )),
        }
    }
}
