//! # MRP Ledger
//!
//! 批次層級庫存帳：入庫、預留、扣帳、釋放、隔離與守恆探針

pub mod ledger;
pub mod store;

// Re-export 主要類型
pub use ledger::InventoryLedger;
pub use store::MaterialStore;
