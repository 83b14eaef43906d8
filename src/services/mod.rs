pub mod approval;
pub mod cashbooks;
pub mod challans;
pub mod doc_number;
pub mod indents;
pub mod purchase_orders;
pub mod reconciliation;
pub mod reference;
pub mod stock_ledger;
