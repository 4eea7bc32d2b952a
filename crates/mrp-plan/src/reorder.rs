//! 再訂購點計算器
//!
//! 線性消耗啟發式：假設物料在規劃時界內以 `moq / horizon_days`
//! 的速率均勻消耗，估算距再訂購點的天數。
//! 這是規劃訊號，不是到貨承諾。

use mrp_core::{Material, PlanningPolicy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 再訂購狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReorderStatus {
    /// 可用量已低於再訂購點，應立即補貨
    Critical,
    /// 估算天數低於採購前置期，等下去就來不及
    Warning,
    /// 尚有餘裕
    Ok,
}

/// 單一物料的再訂購評估
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderLine {
    /// 物料 ID
    pub material_id: String,

    /// 評估當下的可用量
    pub available: Decimal,

    /// 再訂購點
    pub reorder_point: Decimal,

    /// 依線性消耗估算、距觸及再訂購點的天數
    pub days_until_reorder: Decimal,

    /// 再訂購狀態
    pub status: ReorderStatus,

    /// 可用量是否已低於再訂購點
    pub below_reorder_point: bool,
}

/// 再訂購點計算器
pub struct ReorderCalculator;

impl ReorderCalculator {
    /// 評估單一物料
    ///
    /// `days_until_reorder = max(0, (available - reorder_point) / (moq / horizon_days))`；
    /// 消耗速率無法估算（MOQ 或時界為零）時保守地視為已到期。
    pub fn evaluate(
        material: &Material,
        available: Decimal,
        policy: &PlanningPolicy,
    ) -> ReorderLine {
        let below_reorder_point = available <= material.reorder_point;
        let days_until_reorder = Self::days_until_reorder(material, available, policy);

        let status = if below_reorder_point {
            ReorderStatus::Critical
        } else if days_until_reorder <= Decimal::from(material.lead_time_days) {
            ReorderStatus::Warning
        } else {
            ReorderStatus::Ok
        };

        ReorderLine {
            material_id: material.material_id.clone(),
            available,
            reorder_point: material.reorder_point,
            days_until_reorder,
            status,
            below_reorder_point,
        }
    }

    fn days_until_reorder(
        material: &Material,
        available: Decimal,
        policy: &PlanningPolicy,
    ) -> Decimal {
        if policy.horizon_days == 0 {
            return Decimal::ZERO;
        }
        let depletion_rate = material.moq / Decimal::from(policy.horizon_days);
        if depletion_rate <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        ((available - material.reorder_point) / depletion_rate).max(Decimal::ZERO)
    }
}
