pub mod cashbooks;
pub mod challan_line_batches;
pub mod delivery_challan_lines;
pub mod delivery_challans;
pub mod indent_lines;
pub mod indents;
pub mod items;
pub mod purchase_order_lines;
pub mod purchase_orders;
pub mod site_item_balances;
pub mod site_item_batch_balances;
pub mod sites;
pub mod stock_transactions;
pub mod vendors;
