//! BOM 結構圖

use crate::arena::{BomArena, NodeIndex, NodeKind};
use crate::edge::{BomChild, BomEdge};
use mrp_core::{MrpError, RequirementNode, Result};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// BOM 結構圖
///
/// 每次成功的結構變更（節點註冊、邊插入）遞增版本戳；
/// 讀取方可持版本戳呼叫 [`BomGraph::explode_at_version`] 做過期檢查。
/// 件號與物料共用識別字串空間，同一識別字串只會對應一個節點。
#[derive(Debug, Clone, Default)]
pub struct BomGraph {
    arena: BomArena,
    version: u64,
}

impl BomGraph {
    /// 創建空的 BOM 圖
    pub fn new() -> Self {
        Self::default()
    }

    /// 當前版本戳
    pub fn version(&self) -> u64 {
        self.version
    }

    /// 取得競技場引用
    pub fn arena(&self) -> &BomArena {
        &self.arena
    }

    /// 註冊製造件節點
    pub fn register_part(&mut self, part_number: &str) -> NodeIndex {
        let (idx, created) = self.arena.insert_node(part_number, NodeKind::Part);
        if created {
            self.version += 1;
            tracing::debug!("註冊件號節點: {} (v{})", part_number, self.version);
        }
        idx
    }

    /// 註冊採購物料節點（葉節點）
    pub fn register_material(&mut self, material_id: &str) -> NodeIndex {
        let (idx, created) = self.arena.insert_node(material_id, NodeKind::Material);
        if created {
            self.version += 1;
            tracing::debug!("註冊物料節點: {} (v{})", material_id, self.version);
        }
        idx
    }

    /// 新增 BOM 邊
    ///
    /// 提交前驗證：用量必須為正、兩端節點已註冊且類別相符、
    /// 不得形成循環。任一驗證失敗時圖維持原狀。
    pub fn add_edge(&mut self, edge: BomEdge) -> Result<()> {
        if edge.quantity_per <= Decimal::ZERO {
            return Err(MrpError::InvalidQuantity(format!(
                "BOM 用量必須為正值: {} → {} 用量 {}",
                edge.parent,
                edge.child.item_id(),
                edge.quantity_per
            )));
        }

        let parent_idx = self
            .arena
            .find_node(&edge.parent)
            .filter(|&idx| self.arena.node(idx).map(|n| n.kind) == Some(NodeKind::Part))
            .ok_or_else(|| MrpError::UnknownPart(edge.parent.clone()))?;

        let child_idx = match &edge.child {
            BomChild::Part(part_number) => self
                .arena
                .find_node(part_number)
                .filter(|&idx| self.arena.node(idx).map(|n| n.kind) == Some(NodeKind::Part))
                .ok_or_else(|| MrpError::UnknownPart(part_number.clone()))?,
            BomChild::Material(material_id) => self
                .arena
                .find_node(material_id)
                .filter(|&idx| self.arena.node(idx).map(|n| n.kind) == Some(NodeKind::Material))
                .ok_or_else(|| MrpError::UnknownMaterial(material_id.clone()))?,
        };

        // 循環檢查：若子端已可達父端，插入後即成環
        if self.reaches(child_idx, parent_idx) {
            return Err(MrpError::CycleDetected(edge.parent.clone()));
        }

        tracing::debug!(
            "新增 BOM 邊: {} → {} 用量 {}",
            edge.parent,
            edge.child.item_id(),
            edge.quantity_per
        );
        self.arena.insert_edge(parent_idx, child_idx, edge);
        self.version += 1;
        Ok(())
    }

    /// 檢查件號是否有子件（是否具備 BOM）
    pub fn has_children(&self, item_id: &str) -> bool {
        self.arena
            .find_node(item_id)
            .map(|idx| self.arena.children(idx).next().is_some())
            .unwrap_or(false)
    }

    /// 展開需求
    ///
    /// 回傳根節點可達的每個件號/物料一筆 [`RequirementNode`]，
    /// 跨路徑數量合計，順序為父先於子。
    pub fn explode(&self, root_part: &str, quantity: Decimal) -> Result<Vec<RequirementNode>> {
        if quantity <= Decimal::ZERO {
            return Err(MrpError::InvalidQuantity(format!(
                "展開數量必須為正值: {} 數量 {}",
                root_part, quantity
            )));
        }
        let root_idx = self
            .arena
            .find_node(root_part)
            .ok_or_else(|| MrpError::UnknownPart(root_part.to_string()))?;

        crate::explode::explode(&self.arena, root_idx, quantity)
    }

    /// 帶版本戳檢查的展開
    ///
    /// 版本戳不符時回傳 [`MrpError::StaleGraphVersion`]，不做任何計算。
    pub fn explode_at_version(
        &self,
        root_part: &str,
        quantity: Decimal,
        expected_version: u64,
    ) -> Result<Vec<RequirementNode>> {
        if expected_version != self.version {
            return Err(MrpError::StaleGraphVersion {
                expected: expected_version,
                actual: self.version,
            });
        }
        self.explode(root_part, quantity)
    }

    /// 檢查 `from` 是否可經由子邊到達 `target`
    fn reaches(&self, from: NodeIndex, target: NodeIndex) -> bool {
        let mut stack = vec![from];
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        while let Some(node) = stack.pop() {
            if node == target {
                return true;
            }
            if visited.insert(node) {
                for (child, _) in self.arena.children(node) {
                    stack.push(child);
                }
            }
        }
        false
    }
}
