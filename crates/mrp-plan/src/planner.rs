//! 需求規劃器
//!
//! BOM 展開 → 淨需求計算 → 預留/短缺判定的主流程。
//! 只有物料葉節點承載庫存；中間件號僅列入需求明細供追溯。

use bom_graph::BomGraph;
use chrono::{Duration, NaiveDate};
use mrp_core::{
    Allocation, Demand, Material, MrpError, PlanningPolicy, PurchaseOrderLine, RequirementItem,
    RequirementNode, Result,
};
use mrp_ledger::InventoryLedger;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// 單一物料的短缺明細
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortageLine {
    /// 物料 ID
    pub material_id: String,

    /// 缺口數量
    pub shortfall: Decimal,

    /// 建議訂購量（缺口與 MOQ 取大者）
    pub suggested_order_qty: Decimal,

    /// 最早可到貨日（規劃日 + 採購前置期）
    pub earliest_available: NaiveDate,
}

/// 單筆需求的規劃結果
///
/// 短缺不是錯誤：部分物料短缺時其餘物料照常預留，
/// 缺口逐筆列在 `shortages`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    /// 需求 ID
    pub demand_id: Uuid,

    /// 已在庫存帳完成的預留
    pub allocations: Vec<Allocation>,

    /// 短缺明細
    pub shortages: Vec<ShortageLine>,

    /// 展開後的需求明細（含中間件號，父先於子）
    pub requirements: Vec<RequirementNode>,
}

impl PlanResult {
    /// 是否全數滿足（無任何短缺）
    pub fn is_fully_covered(&self) -> bool {
        self.shortages.is_empty()
    }
}

/// MRP 規劃器
pub struct MrpPlanner {
    /// BOM 圖（來自 BOM 引擎）
    graph: Arc<BomGraph>,

    /// 庫存帳
    ledger: Arc<InventoryLedger>,

    /// 物料主檔
    materials: HashMap<String, Material>,

    /// 未結採購單明細
    open_pos: Vec<PurchaseOrderLine>,

    /// 規劃參數
    policy: PlanningPolicy,
}

impl MrpPlanner {
    /// 創建新的規劃器
    pub fn new(
        graph: Arc<BomGraph>,
        ledger: Arc<InventoryLedger>,
        materials: HashMap<String, Material>,
        open_pos: Vec<PurchaseOrderLine>,
        policy: PlanningPolicy,
    ) -> Self {
        Self {
            graph,
            ledger,
            materials,
            open_pos,
            policy,
        }
    }

    /// 庫存帳引用
    pub fn ledger(&self) -> &Arc<InventoryLedger> {
        &self.ledger
    }

    /// 規劃單筆需求
    ///
    /// 展開 → 逐物料淨算 → 足額者預留、缺額者列短缺。
    /// 並發掏空造成的預留失敗降級為短缺明細，不中斷整筆規劃。
    pub fn plan(&self, demand: &Demand, today: NaiveDate) -> Result<PlanResult> {
        tracing::info!(
            "開始需求規劃：需求 {}，件號 {}，數量 {}",
            demand.id,
            demand.part_number,
            demand.quantity
        );

        if demand.quantity <= Decimal::ZERO {
            return Err(MrpError::InvalidQuantity(format!(
                "需求數量必須為正值: {} 數量 {}",
                demand.part_number, demand.quantity
            )));
        }

        // Step 1: BOM 展開（以呼叫當下的圖版本戳記）
        tracing::debug!("Step 1: BOM 展開");
        let version = self.graph.version();
        let mut requirements = self.explode_demand(demand, version)?;
        tracing::debug!("展開節點數量: {}", requirements.len());

        // Step 2: 逐物料葉節點淨算
        tracing::debug!("Step 2: 淨需求計算");
        let mut allocations: Vec<Allocation> = Vec::new();
        let mut shortages: Vec<ShortageLine> = Vec::new();

        for node in requirements.iter_mut() {
            let material_id = match &node.item {
                RequirementItem::Material(id) => id.clone(),
                RequirementItem::Part(_) => continue,
            };

            let material = match self.materials.get(&material_id) {
                Some(material) => material,
                None => {
                    self.rollback(&allocations);
                    return Err(MrpError::UnknownMaterial(material_id));
                }
            };

            let gross = node.gross_qty;
            let available = match self.ledger.available(&material_id, today) {
                Ok(qty) => qty,
                Err(e) => {
                    self.rollback(&allocations);
                    return Err(e);
                }
            };
            let po_incoming = self.open_po_incoming(&material_id, demand.due_date);
            let net = gross - available - po_incoming;
            node.net_qty = net.max(Decimal::ZERO);

            tracing::debug!(
                "物料 {}: 毛需求 {}，可用 {}，在途 {}，淨需求 {}",
                material_id,
                gross,
                available,
                po_incoming,
                net
            );

            if net > Decimal::ZERO {
                shortages.push(self.shortage_line(material, net, today));
                continue;
            }

            match self
                .ledger
                .reserve(&material_id, gross, demand.id, today)
            {
                Ok(mut allocated) => allocations.append(&mut allocated),
                Err(MrpError::Shortage { shortfall, .. }) => {
                    // 淨算與預留之間被並發需求掏空，降級為短缺
                    tracing::debug!("物料 {} 遭並發掏空，缺口 {}", material_id, shortfall);
                    shortages.push(self.shortage_line(material, shortfall, today));
                }
                Err(e) => {
                    self.rollback(&allocations);
                    return Err(e);
                }
            }
        }

        tracing::info!(
            "需求規劃完成：預留 {} 筆，短缺 {} 筆",
            allocations.len(),
            shortages.len()
        );

        Ok(PlanResult {
            demand_id: demand.id,
            allocations,
            shortages,
            requirements,
        })
    }

    /// 平行規劃多筆需求
    ///
    /// 需求彼此獨立，庫存帳按物料序列化，結果順序與輸入一致。
    pub fn plan_all(&self, demands: &[Demand], today: NaiveDate) -> Vec<Result<PlanResult>> {
        tracing::info!("開始批次規劃：需求 {} 筆", demands.len());
        demands
            .par_iter()
            .map(|demand| self.plan(demand, today))
            .collect()
    }

    /// 再訂購點報告
    ///
    /// 對每個物料以線性消耗啟發式估算距再訂購點的天數，
    /// 輸出按物料 ID 排序。
    pub fn reorder_report(&self, today: NaiveDate) -> Result<Vec<crate::ReorderLine>> {
        let mut lines = Vec::with_capacity(self.materials.len());
        for material in self.materials.values() {
            let available = self.ledger.available(&material.material_id, today)?;
            lines.push(crate::ReorderCalculator::evaluate(
                material,
                available,
                &self.policy,
            ));
        }
        lines.sort_by(|a, b| a.material_id.cmp(&b.material_id));
        Ok(lines)
    }

    /// 展開需求為需求明細
    ///
    /// 無下層結構的根件號若本身是在檔物料，視為單節點需求；
    /// 否則回傳 [`MrpError::NoBillOfMaterials`]。
    fn explode_demand(&self, demand: &Demand, version: u64) -> Result<Vec<RequirementNode>> {
        if self.graph.has_children(&demand.part_number) {
            return self
                .graph
                .explode_at_version(&demand.part_number, demand.quantity, version);
        }
        if self.materials.contains_key(&demand.part_number) {
            return Ok(vec![RequirementNode::new(
                RequirementItem::Material(demand.part_number.clone()),
                demand.quantity,
                0,
            )]);
        }
        Err(MrpError::NoBillOfMaterials(demand.part_number.clone()))
    }

    /// 截止日前可到的未結採購在途量
    fn open_po_incoming(&self, material_id: &str, due_date: NaiveDate) -> Decimal {
        self.open_pos
            .iter()
            .filter(|line| {
                line.material_id == material_id && line.is_open() && line.arrives_by(due_date)
            })
            .map(|line| line.quantity)
            .sum()
    }

    fn shortage_line(&self, material: &Material, shortfall: Decimal, today: NaiveDate) -> ShortageLine {
        ShortageLine {
            material_id: material.material_id.clone(),
            shortfall,
            suggested_order_qty: shortfall.max(material.moq),
            earliest_available: today + Duration::days(i64::from(material.lead_time_days)),
        }
    }

    /// 釋放本次規劃已完成的預留（硬錯誤時回復帳面）
    fn rollback(&self, allocations: &[Allocation]) {
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
}
