//! # BOM Graph
//!
//! 組裝結構圖：件號節點、BOM 邊、循環檢查與需求展開

pub mod arena;
pub mod edge;
pub mod explode;
pub mod graph;

// Re-export 主要類型
pub use arena::{BomArena, NodeIndex, NodeKind, PartNode};
pub use edge::{BomChild, BomEdge};
pub use graph::BomGraph;
