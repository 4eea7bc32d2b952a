//! 節點競技場儲存
//!
//! 節點與邊以擁有式集合存放，透過穩定索引定址，不使用巢狀所有權指標。

use crate::edge::BomEdge;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 節點索引
pub type NodeIndex = usize;

/// 邊索引
pub type EdgeIndex = usize;

/// 節點類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// 製造件
    Part,
    /// 採購物料（葉節點）
    Material,
}

/// 圖節點
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartNode {
    /// 件號或物料ID
    pub item_id: String,

    /// 節點類別
    pub kind: NodeKind,

    /// 子邊（子節點索引, 邊索引）
    pub children: Vec<(NodeIndex, EdgeIndex)>,

    /// 父邊（父節點索引, 邊索引）
    pub parents: Vec<(NodeIndex, EdgeIndex)>,
}

/// 節點競技場
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BomArena {
    nodes: Vec<PartNode>,
    edges: Vec<BomEdge>,
    index: HashMap<String, NodeIndex>,
}

impl BomArena {
    /// 創建空的競技場
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入節點；同一識別字串重複插入回傳既有索引
    pub fn insert_node(&mut self, item_id: &str, kind: NodeKind) -> (NodeIndex, bool) {
        if let Some(&idx) = self.index.get(item_id) {
            return (idx, false);
        }
        let idx = self.nodes.len();
        self.nodes.push(PartNode {
            item_id: item_id.to_string(),
            kind,
            children: Vec::new(),
            parents: Vec::new(),
        });
        self.index.insert(item_id.to_string(), idx);
        (idx, true)
    }

    /// 插入已驗證的邊並連接兩端節點
    pub(crate) fn insert_edge(
        &mut self,
        parent: NodeIndex,
        child: NodeIndex,
        edge: BomEdge,
    ) -> EdgeIndex {
        let edge_idx = self.edges.len();
        self.edges.push(edge);
        self.nodes[parent].children.push((child, edge_idx));
        self.nodes[child].parents.push((parent, edge_idx));
        edge_idx
    }

    /// 以識別字串查找節點
    pub fn find_node(&self, item_id: &str) -> Option<NodeIndex> {
        self.index.get(item_id).copied()
    }

    /// 取得節點
    pub fn node(&self, idx: NodeIndex) -> Option<&PartNode> {
        self.nodes.get(idx)
    }

    /// 取得邊
    pub fn edge(&self, idx: EdgeIndex) -> Option<&BomEdge> {
        self.edges.get(idx)
    }

    /// 迭代節點的子邊
    pub fn children(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, &BomEdge)> {
        self.nodes[idx]
            .children
            .iter()
            .map(move |&(child_idx, edge_idx)| (child_idx, &self.edges[edge_idx]))
    }

    /// 迭代節點的父邊
    pub fn parents(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, &BomEdge)> {
        self.nodes[idx]
            .parents
            .iter()
            .map(move |&(parent_idx, edge_idx)| (parent_idx, &self.edges[edge_idx]))
    }

    /// 節點數量
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 邊數量
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
