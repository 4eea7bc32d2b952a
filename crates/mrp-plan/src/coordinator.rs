//! 預留協調器
//!
//! 把規劃結果綁定為需求的有效預留套組：每個需求至多一套，
//! 提交時逐筆驗證批次支撐，任一筆失效即整套回滾。

use mrp_core::{Allocation, Demand, MrpError, Result};
use mrp_ledger::InventoryLedger;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::PlanResult;

/// 提交結果摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitResult {
    /// 需求 ID
    pub demand_id: Uuid,

    /// 套組內的分配筆數
    pub allocation_count: usize,

    /// 套組總數量
    pub total_quantity: Decimal,
}

/// 預留協調器
#[derive(Debug)]
pub struct ReservationCoordinator {
    /// 庫存帳
    ledger: Arc<InventoryLedger>,

    /// 有效預留套組登錄（需求 ID → 分配套組）
    active: Mutex<HashMap<Uuid, Vec<Allocation>>>,
}

impl ReservationCoordinator {
    /// 創建新的協調器
    pub fn new(ledger: Arc<InventoryLedger>) -> Self {
        Self {
            ledger,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// 提交規劃結果為需求的有效預留套組
    ///
    /// 規劃產生的分配已在庫存帳預留；提交逐筆驗證批次仍有
    /// 足額預留支撐（防止釋放後重播過期的規劃結果），全數通過
    /// 才登錄。任一筆失效即釋放整套並回傳
    /// [`MrpError::PartialAllocationFailure`]，帳面回到提交前狀態。
    pub fn commit(&self, demand: &Demand, plan: &PlanResult) -> Result<CommitResult> {
        if plan.demand_id != demand.id {
            return Err(MrpError::Other(format!(
                "規劃結果與需求不符: 規劃 {} 需求 {}",
                plan.demand_id, demand.id
            )));
        }

        tracing::info!(
            "提交預留套組：需求 {}，分配 {} 筆",
            demand.id,
            plan.allocations.len()
        );

        let mut registry = self.registry()?;
        if registry.contains_key(&demand.id) {
            return Err(MrpError::AlreadyCommitted(demand.id));
        }

        for allocation in &plan.allocations {
            if self.ledger.holds(allocation)? {
                continue;
            }
            tracing::debug!(
                "分配失去批次支撐：批次 {} 物料 {}，回滾整套",
                allocation.batch_id,
                allocation.material_id
            );
            self.release_set(&plan.allocations);
            return Err(MrpError::PartialAllocationFailure(format!(
                "需求 {} 的分配 {} 已失去批次 {} 的預留支撐",
                demand.id, allocation.id, allocation.batch_id
            )));
        }

        let total_quantity = plan.allocations.iter().map(|a| a.quantity).sum();
        registry.insert(demand.id, plan.allocations.clone());

        Ok(CommitResult {
            demand_id: demand.id,
            allocation_count: plan.allocations.len(),
            total_quantity,
        })
    }

    /// 釋放需求的整套預留回可用量並關閉登錄
    pub fn release(&self, demand_id: Uuid) -> Result<usize> {
        let allocations = self.take_set(demand_id)?;
        tracing::info!("釋放預留套組：需求 {}，分配 {} 筆", demand_id, allocations.len());
        self.drain_set(demand_id, allocations, |ledger, allocation| {
            ledger.release(allocation)
        })
    }

    /// 取消需求（釋放的別名流程，語意為整筆需求作廢）
    pub fn cancel(&self, demand_id: Uuid) -> Result<usize> {
        tracing::info!("取消需求：{}", demand_id);
        self.release(demand_id)
    }

    /// 把整套預留轉為永久扣帳並關閉登錄（生產已執行）
    pub fn consume(&self, demand_id: Uuid) -> Result<usize> {
        let allocations = self.take_set(demand_id)?;
        tracing::info!("扣帳預留套組：需求 {}，分配 {} 筆", demand_id, allocations.len());
        self.drain_set(demand_id, allocations, |ledger, allocation| {
            ledger.consume(allocation)
        })
    }

    /// 需求是否持有有效預留套組
    pub fn is_committed(&self, demand_id: Uuid) -> Result<bool> {
        Ok(self.registry()?.contains_key(&demand_id))
    }

    /// 逐筆套用操作；中途失敗時把未處理的殘餘放回登錄
    fn drain_set<F>(&self, demand_id: Uuid, allocations: Vec<Allocation>, op: F) -> Result<usize>
    where
        F: Fn(&InventoryLedger, &Allocation) -> Result<()>,
    {
        let count = allocations.len();
        for (i, allocation) in allocations.iter().enumerate() {
            if let Err(e) = op(&self.ledger, allocation) {
                let remainder: Vec<Allocation> = allocations[i..].to_vec();
                tracing::warn!(
                    "需求 {} 套組處理中斷於分配 {}，殘餘 {} 筆放回登錄: {}",
                    demand_id,
                    allocation.id,
                    remainder.len(),
                    e
                );
                self.registry()?.insert(demand_id, remainder);
                return Err(e);
            }
        }
        Ok(count)
    }

    fn take_set(&self, demand_id: Uuid) -> Result<Vec<Allocation>> {
        self.registry()?
            .remove(&demand_id)
            .ok_or_else(|| MrpError::Other(format!("需求 {} 無有效預留套組", demand_id)))
    }

    /// 回滾路徑的盡力釋放，個別失敗僅記錄
    fn release_set(&self, allocations: &[Allocation]) {
        for allocation in allocations {
            if let Err(e) = self.ledger.release(allocation) {
                tracing::warn!(
                    "回滾釋放失敗: 批次 {} 物料 {}: {}",
                    allocation.batch_id,
                    allocation.material_id,
                    e
                );
            }
        }
    }

    fn registry(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Vec<Allocation>>>> {
        self.active
            .lock()
            .map_err(|e| MrpError::Other(format!("預留登錄鎖取得失敗: {}", e)))
    }
}
