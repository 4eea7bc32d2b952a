//! # MRP Engine
//!
//! 批次層級的物料需求規劃核心：
//! BOM 圖（展開/循環防護）、庫存帳（預留/扣帳/守恆）、
//! 需求規劃器（淨算/短缺/再訂購）與預留協調器（原子提交/回滾）。

pub use bom_graph;
pub use mrp_core;
pub use mrp_ledger;
pub use mrp_plan;

// 常用類型直接 re-export
pub use bom_graph::{BomChild, BomEdge, BomGraph};
pub use mrp_core::{
    Allocation, BatchStatus, Demand, DemandType, InventoryBatch, Material, MrpError, Part,
    PlanningPolicy, PurchaseOrderLine, RequirementItem, RequirementNode, Result,
};
pub use mrp_ledger::InventoryLedger;
pub use mrp_plan::{
    CommitResult, MrpPlanner, PlanResult, ReorderCalculator, ReorderLine, ReorderStatus,
    ReservationCoordinator, ShortageLine,
};
