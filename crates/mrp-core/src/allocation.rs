//! 預留分配模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 預留分配（需求對單一批次的鎖定）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    /// 分配ID
    pub id: Uuid,

    /// 需求ID
    pub demand_id: Uuid,

    /// 批次ID
    pub batch_id: Uuid,

    /// 物料ID
    pub material_id: String,

    /// 預留數量
    pub quantity: Decimal,
}

impl Allocation {
    /// 創建新的預留分配
    pub fn new(demand_id: Uuid, batch_id: Uuid, material_id: String, quantity: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            demand_id,
            batch_id,
            material_id,
            quantity,
        }
    }
}
