//! 規劃參數

use serde::{Deserialize, Serialize};

/// 規劃參數
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningPolicy {
    /// 再訂購點估算的消耗視窗（天）
    pub horizon_days: u32,

    /// 規劃時是否排除已過期批次
    pub exclude_expired: bool,
}

impl Default for PlanningPolicy {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            exclude_expired: true,
        }
    }
}

impl PlanningPolicy {
    /// 創建預設規劃參數
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置消耗視窗
    pub fn with_horizon_days(mut self, horizon_days: u32) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    /// 建構器模式：設置過期批次處理
    pub fn with_exclude_expired(mut self, exclude_expired: bool) -> Self {
        self.exclude_expired = exclude_expired;
        self
    }
}
