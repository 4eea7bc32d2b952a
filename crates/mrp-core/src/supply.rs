//! 在途供應模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 採購訂單明細（在途供應）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    /// 採購單號
    pub po_number: String,

    /// 物料ID
    pub material_id: String,

    /// 訂購數量
    pub quantity: Decimal,

    /// 預計到貨日
    pub expected_date: NaiveDate,

    /// 是否已收貨
    pub received: bool,
}

impl PurchaseOrderLine {
    /// 創建新的採購訂單明細
    pub fn new(
        po_number: String,
        material_id: String,
        quantity: Decimal,
        expected_date: NaiveDate,
    ) -> Self {
        Self {
            po_number,
            material_id,
            quantity,
            expected_date,
            received: false,
        }
    }

    /// 建構器模式：標記為已收貨
    pub fn as_received(mut self) -> Self {
        self.received = true;
        self
    }

    /// 檢查是否為在途（未收貨）
    pub fn is_open(&self) -> bool {
        !self.received
    }

    /// 檢查是否能在指定日期前到貨
    pub fn arrives_by(&self, date: NaiveDate) -> bool {
        self.expected_date <= date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_po_line() {
        let line = PurchaseOrderLine::new(
            "PO-1001".to_string(),
            "M1".to_string(),
            Decimal::from(5),
            date(2024, 7, 10),
        );

        assert_eq!(line.po_number, "PO-1001");
        assert!(line.is_open());
        assert!(line.arrives_by(date(2024, 7, 10)));
        assert!(!line.arrives_by(date(2024, 7, 9)));
    }

    #[test]
    fn test_received_line_is_closed() {
        let line = PurchaseOrderLine::new(
            "PO-1002".to_string(),
            "M2".to_string(),
            Decimal::from(100),
            date(2024, 6, 1),
        )
        .as_received();

        assert!(!line.is_open());
    }
}
