use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after a transaction commits. Delivery is best
/// effort; events are never part of the transactional contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CashbookApproved {
        cashbook_id: i64,
        approver: Uuid,
    },
    IndentStatusChanged {
        indent_id: i64,
        old_status: String,
        new_status: String,
    },
    PurchaseOrderStatusChanged {
        po_id: i64,
        old_status: String,
        new_status: String,
    },
    ChallanCreated {
        challan_id: i64,
        challan_no: String,
    },
    ChallanUpdated {
        challan_id: i64,
    },
    ChallanDeleted {
        challan_id: i64,
    },
    StockUpdated {
        site_id: i64,
        item_id: i64,
        qty_delta: Decimal,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing the failure to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is down.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

/// Drains the event channel, logging each event. The place to hang real
/// consumers (notifications, report caches) without touching the services.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::StockUpdated {
                site_id,
                item_id,
                qty_delta,
            } => {
                info!(site_id, item_id, %qty_delta, "stock updated");
            }
            other => {
                info!(event = ?other, "domain event");
            }
        }
    }

    info!("Event channel closed; stopping event processing loop");
}
