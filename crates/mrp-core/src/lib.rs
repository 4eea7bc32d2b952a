//! # MRP Core
//!
//! 核心資料模型與類型定義

pub mod allocation;
pub mod batch;
pub mod demand;
pub mod material;
pub mod part;
pub mod policy;
pub mod requirement;
pub mod supply;

// Re-export 主要類型
pub use allocation::Allocation;
pub use batch::{BatchStatus, InventoryBatch};
pub use demand::{Demand, DemandType};
pub use material::{Material, MaterialUpdate};
pub use part::{Part, PartUpdate};
pub use policy::PlanningPolicy;
pub use requirement::{RequirementItem, RequirementNode};
pub use supply::PurchaseOrderLine;

use rust_decimal::Decimal;
use uuid::Uuid;

/// MRP 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum MrpError {
    #[error("BOM 結構存在循環: {0}")]
    CycleDetected(String),

    #[error("BOM 版本過期: 預期 {expected}, 實際 {actual}")]
    StaleGraphVersion { expected: u64, actual: u64 },

    #[error("物料短缺: {material_id} 缺口 {shortfall}")]
    Shortage {
        material_id: String,
        shortfall: Decimal,
    },

    #[error("找不到 BOM 結構: {0}")]
    NoBillOfMaterials(String),

    #[error("預留套組部分失敗: {0}")]
    PartialAllocationFailure(String),

    #[error("無效的數量: {0}")]
    InvalidQuantity(String),

    #[error("找不到件號: {0}")]
    UnknownPart(String),

    #[error("找不到物料: {0}")]
    UnknownMaterial(String),

    #[error("需求已存在有效預留套組: {0}")]
    AlreadyCommitted(Uuid),

    #[error("找不到批次: {0}")]
    UnknownBatch(Uuid),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MrpError>;
