//! 需求展開節點模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 展開節點的對象：製造件或採購物料
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequirementItem {
    /// 製造件（件號）
    Part(String),
    /// 採購物料（物料ID）
    Material(String),
}

impl RequirementItem {
    /// 取得識別字串
    pub fn item_id(&self) -> &str {
        match self {
            RequirementItem::Part(id) | RequirementItem::Material(id) => id,
        }
    }

    /// 檢查是否為採購物料
    pub fn is_material(&self) -> bool {
        matches!(self, RequirementItem::Material(_))
    }
}

/// 需求展開節點（每個件號/物料一筆，跨路徑數量合計）
///
/// 展開時淨需求預設等於毛需求，由規劃器針對物料葉節點扣抵後覆寫。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementNode {
    /// 對象
    pub item: RequirementItem,

    /// 毛需求量（所有路徑合計）
    pub gross_qty: Decimal,

    /// 淨需求量（毛需求 - 可用庫存 - 合格在途）
    pub net_qty: Decimal,

    /// 層深（根為 0，多路徑取最淺）
    pub depth: u32,
}

impl RequirementNode {
    /// 創建新的展開節點
    pub fn new(item: RequirementItem, gross_qty: Decimal, depth: u32) -> Self {
        Self {
            item,
            gross_qty,
            net_qty: gross_qty,
            depth,
        }
    }

    /// 建構器模式：設置淨需求量
    pub fn with_net_qty(mut self, net_qty: Decimal) -> Self {
        self.net_qty = net_qty;
        self
    }
}
