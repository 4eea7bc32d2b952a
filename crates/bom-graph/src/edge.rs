//! BOM 邊模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// BOM 邊的子端：製造件或採購物料（物料必為葉節點）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BomChild {
    /// 子件號
    Part(String),
    /// 物料ID
    Material(String),
}

impl BomChild {
    /// 取得識別字串
    pub fn item_id(&self) -> &str {
        match self {
            BomChild::Part(id) | BomChild::Material(id) => id,
        }
    }
}

/// BOM 邊（父件對子件/物料的單位用量）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomEdge {
    /// 邊ID
    pub id: Uuid,

    /// 父件號
    pub parent: String,

    /// 子端
    pub child: BomChild,

    /// 單位用量（每一父件所需）
    pub quantity_per: Decimal,

    /// 製程工序
    pub process_step: Option<String>,
}

impl BomEdge {
    /// 創建新的 BOM 邊
    pub fn new(parent: String, child: BomChild, quantity_per: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent,
            child,
            quantity_per,
            process_step: None,
        }
    }

    /// 建構器模式：設置製程工序
    pub fn with_process_step(mut self, process_step: String) -> Self {
        self.process_step = Some(process_step);
        self
    }
}
