//! 需求模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 需求類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandType {
    /// 客戶訂單項
    OrderItem,
    /// 生產批次
    ProductionRun,
}

/// 需求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demand {
    /// 需求ID
    pub id: Uuid,

    /// 件號
    pub part_number: String,

    /// 需求數量
    pub quantity: Decimal,

    /// 到期日
    pub due_date: NaiveDate,

    /// 需求類型
    pub demand_type: DemandType,

    /// 來源單據（如訂單號）
    pub source_ref: Option<String>,

    /// 優先級（1-10，10最高）
    pub priority: u8,
}

impl Demand {
    /// 創建新的需求
    pub fn new(
        part_number: String,
        quantity: Decimal,
        due_date: NaiveDate,
        demand_type: DemandType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            part_number,
            quantity,
            due_date,
            demand_type,
            source_ref: None,
            priority: 5,
        }
    }

    /// 建構器模式：設置來源單據
    pub fn with_source_ref(mut self, source_ref: String) -> Self {
        self.source_ref = Some(source_ref);
        self
    }

    /// 建構器模式：設置優先級
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.clamp(1, 10);
        self
    }
}
