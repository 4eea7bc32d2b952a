//! 需求展開
//!
//! 深度優先遍歷，每個節點記憶化單位用量映射，
//! 共用子組件跨路徑只合計一次，重訪為 O(1)。

use crate::arena::{BomArena, NodeIndex, NodeKind};
use mrp_core::{MrpError, RequirementItem, RequirementNode, Result};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet, VecDeque};

/// 展開根節點需求為 RequirementNode 序列（父先於子）
pub(crate) fn explode(
    arena: &BomArena,
    root: NodeIndex,
    quantity: Decimal,
) -> Result<Vec<RequirementNode>> {
    let mut memo: HashMap<NodeIndex, HashMap<NodeIndex, Decimal>> = HashMap::new();
    let mut postorder: Vec<NodeIndex> = Vec::new();
    let mut stack: HashSet<NodeIndex> = HashSet::new();

    per_unit(arena, root, &mut memo, &mut stack, &mut postorder)?;

    let depths = min_depths(arena, root);
    let root_map = &memo[&root];

    // 後序反轉即為拓撲順序（父先於子）
    let mut nodes = Vec::with_capacity(postorder.len());
    for &idx in postorder.iter().rev() {
        let node = arena
            .node(idx)
            .ok_or_else(|| MrpError::UnknownPart(format!("節點索引 {}", idx)))?;
        let item = match node.kind {
            NodeKind::Part => RequirementItem::Part(node.item_id.clone()),
            NodeKind::Material => RequirementItem::Material(node.item_id.clone()),
        };
        let gross = root_map[&idx] * quantity;
        nodes.push(RequirementNode::new(item, gross, depths[&idx]));
    }

    tracing::debug!(
        "展開完成: 根 {} 數量 {}，節點 {} 筆",
        arena.node(root).map(|n| n.item_id.as_str()).unwrap_or("?"),
        quantity,
        nodes.len()
    );

    Ok(nodes)
}

/// 計算節點的單位用量映射（含節點自身 = 1）
///
/// 遞迴堆疊集合偵測循環；授權階段已拒絕循環，
/// 此處命中即代表結構不變量被破壞。
fn per_unit(
    arena: &BomArena,
    node: NodeIndex,
    memo: &mut HashMap<NodeIndex, HashMap<NodeIndex, Decimal>>,
    stack: &mut HashSet<NodeIndex>,
    postorder: &mut Vec<NodeIndex>,
) -> Result<()> {
    if memo.contains_key(&node) {
        return Ok(());
    }
    if !stack.insert(node) {
        let item_id = arena
            .node(node)
            .map(|n| n.item_id.clone())
            .unwrap_or_default();
        return Err(MrpError::CycleDetected(item_id));
    }

    let mut map: HashMap<NodeIndex, Decimal> = HashMap::new();
    map.insert(node, Decimal::ONE);

    let children: Vec<(NodeIndex, Decimal)> = arena
        .children(node)
        .map(|(child, edge)| (child, edge.quantity_per))
        .collect();

    for (child, quantity_per) in children {
        per_unit(arena, child, memo, stack, postorder)?;
        for (&descendant, &per) in &memo[&child] {
            *map.entry(descendant).or_insert(Decimal::ZERO) += per * quantity_per;
        }
    }

    stack.remove(&node);
    memo.insert(node, map);
    postorder.push(node);
    Ok(())
}

/// BFS 計算各可達節點的最淺層深
fn min_depths(arena: &BomArena, root: NodeIndex) -> HashMap<NodeIndex, u32> {
    let mut depths: HashMap<NodeIndex, u32> = HashMap::new();
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();
    depths.insert(root, 0);
    queue.push_back(root);

    while let Some(node) = queue.pop_front() {
        let depth = depths[&node];
        for (child, _) in arena.children(node) {
            if !depths.contains_key(&child) {
                depths.insert(child, depth + 1);
                queue.push_back(child);
            }
        }
    }
    depths
}
