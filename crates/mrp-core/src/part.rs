//! 件號模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 件號（製造件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// 件號（唯一識別）
    pub part_number: String,

    /// 描述
    pub description: String,

    /// 客戶
    pub customer: Option<String>,

    /// 單位成本
    pub unit_cost: Decimal,

    /// 單件週期時間（秒）
    pub cycle_time_secs: Decimal,

    /// 換線準備時間（秒）
    pub setup_time_secs: Decimal,
}

impl Part {
    /// 創建新的件號
    pub fn new(part_number: String, description: String) -> Self {
        Self {
            part_number,
            description,
            customer: None,
            unit_cost: Decimal::ZERO,
            cycle_time_secs: Decimal::ZERO,
            setup_time_secs: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置客戶
    pub fn with_customer(mut self, customer: String) -> Self {
        self.customer = Some(customer);
        self
    }

    /// 建構器模式：設置單位成本
    pub fn with_unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = unit_cost;
        self
    }

    /// 建構器模式：設置週期時間
    pub fn with_cycle_time_secs(mut self, cycle_time_secs: Decimal) -> Self {
        self.cycle_time_secs = cycle_time_secs;
        self
    }

    /// 建構器模式：設置準備時間
    pub fn with_setup_time_secs(mut self, setup_time_secs: Decimal) -> Self {
        self.setup_time_secs = setup_time_secs;
        self
    }
}

/// 件號更新（僅覆蓋有給值的欄位）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartUpdate {
    pub description: Option<String>,
    pub customer: Option<String>,
    pub unit_cost: Option<Decimal>,
    pub cycle_time_secs: Option<Decimal>,
    pub setup_time_secs: Option<Decimal>,
}

impl PartUpdate {
    /// 套用更新，未給值的欄位保持原值
    pub fn apply(self, part: &mut Part) {
        if let Some(description) = self.description {
            part.description = description;
        }
        if let Some(customer) = self.customer {
            part.customer = Some(customer);
        }
        if let Some(unit_cost) = self.unit_cost {
            part.unit_cost = unit_cost;
        }
        if let Some(cycle_time_secs) = self.cycle_time_secs {
            part.cycle_time_secs = cycle_time_secs;
        }
        if let Some(setup_time_secs) = self.setup_time_secs {
            part.setup_time_secs = setup_time_secs;
        }
    }
}
