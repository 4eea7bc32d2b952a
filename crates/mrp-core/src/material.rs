//! 物料模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 物料（採購料件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// 物料ID（唯一識別）
    pub material_id: String,

    /// 名稱
    pub name: String,

    /// 材質類別
    pub material_type: String,

    /// 預設供應商
    pub preferred_supplier: Option<String>,

    /// 單價
    pub unit_price: Decimal,

    /// 最小訂購量
    pub moq: Decimal,

    /// 採購前置天數
    pub lead_time_days: u32,

    /// 再訂購點
    pub reorder_point: Decimal,
}

impl Material {
    /// 創建新的物料
    pub fn new(material_id: String, name: String, material_type: String) -> Self {
        Self {
            material_id,
            name,
            material_type,
            preferred_supplier: None,
            unit_price: Decimal::ZERO,
            moq: Decimal::ONE,
            lead_time_days: 0,
            reorder_point: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置預設供應商
    pub fn with_preferred_supplier(mut self, supplier_id: String) -> Self {
        self.preferred_supplier = Some(supplier_id);
        self
    }

    /// 建構器模式：設置單價
    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = unit_price;
        self
    }

    /// 建構器模式：設置最小訂購量
    pub fn with_moq(mut self, moq: Decimal) -> Self {
        self.moq = moq;
        self
    }

    /// 建構器模式：設置採購前置天數
    pub fn with_lead_time_days(mut self, lead_time_days: u32) -> Self {
        self.lead_time_days = lead_time_days;
        self
    }

    /// 建構器模式：設置再訂購點
    pub fn with_reorder_point(mut self, reorder_point: Decimal) -> Self {
        self.reorder_point = reorder_point;
        self
    }
}

/// 物料更新（僅覆蓋有給值的欄位）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialUpdate {
    pub name: Option<String>,
    pub material_type: Option<String>,
    pub preferred_supplier: Option<String>,
    pub unit_price: Option<Decimal>,
    pub moq: Option<Decimal>,
    pub lead_time_days: Option<u32>,
    pub reorder_point: Option<Decimal>,
}

impl MaterialUpdate {
    /// 套用更新，未給值的欄位保持原值
    pub fn apply(self, material: &mut Material) {
        if let Some(name) = self.name {
            material.name = name;
        }
        if let Some(material_type) = self.material_type {
            material.material_type = material_type;
        }
        if let Some(preferred_supplier) = self.preferred_supplier {
            material.preferred_supplier = Some(preferred_supplier);
        }
        if let Some(unit_price) = self.unit_price {
            material.unit_price = unit_price;
        }
        if let Some(moq) = self.moq {
            material.moq = moq;
        }
        if let Some(lead_time_days) = self.lead_time_days {
            material.lead_time_days = lead_time_days;
        }
        if let Some(reorder_point) = self.reorder_point {
            material.reorder_point = reorder_point;
        }
    }
}
