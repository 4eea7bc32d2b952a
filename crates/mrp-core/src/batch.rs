//! 庫存批次模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 批次狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    /// 可用
    Available,
    /// 已全數預留
    Reserved,
    /// 隔離（品檢/凍結）
    Quarantine,
}

/// 庫存批次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryBatch {
    /// 批次ID
    pub id: Uuid,

    /// 物料ID
    pub material_id: String,

    /// 批號
    pub batch_number: String,

    /// 批次總量
    pub quantity: Decimal,

    /// 已預留數量
    pub reserved_qty: Decimal,

    /// 儲位
    pub location: Option<String>,

    /// 批次狀態
    pub status: BatchStatus,

    /// 有效期限
    pub expiry_date: Option<NaiveDate>,

    /// 入庫日期
    pub received_date: NaiveDate,
}

impl InventoryBatch {
    /// 創建新的庫存批次
    pub fn new(
        material_id: String,
        batch_number: String,
        quantity: Decimal,
        received_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            material_id,
            batch_number,
            quantity,
            reserved_qty: Decimal::ZERO,
            location: None,
            status: BatchStatus::Available,
            expiry_date: None,
            received_date,
        }
    }

    /// 建構器模式：設置有效期限
    pub fn with_expiry_date(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    /// 建構器模式：設置儲位
    pub fn with_location(mut self, location: String) -> Self {
        self.location = Some(location);
        self
    }

    /// 未預留的自由數量
    pub fn free_qty(&self) -> Decimal {
        self.quantity - self.reserved_qty
    }

    /// 檢查批次在指定日期是否已過期
    pub fn is_expired(&self, as_of: NaiveDate) -> bool {
        matches!(self.expiry_date, Some(expiry) if expiry < as_of)
    }

    /// 批次在指定日期是否可供預留
    pub fn is_usable(&self, as_of: NaiveDate) -> bool {
        self.status != BatchStatus::Quarantine && !self.is_expired(as_of)
    }

    /// 依預留量重算狀態（隔離狀態不受影響）
    pub fn refresh_status(&mut self) {
        if self.status == BatchStatus::Quarantine {
            return;
        }
        self.status = if self.quantity > Decimal::ZERO && self.reserved_qty >= self.quantity {
            BatchStatus::Reserved
        } else {
            BatchStatus::Available
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_batch() {
        let batch = InventoryBatch::new(
            "M1".to_string(),
            "LOT-2024-001".to_string(),
            Decimal::from(100),
            date(2024, 1, 5),
        );

        assert_eq!(batch.material_id, "M1");
        assert_eq!(batch.free_qty(), Decimal::from(100));
        assert_eq!(batch.status, BatchStatus::Available);
        assert!(batch.expiry_date.is_none());
    }

    #[test]
    fn test_batch_builder() {
        let batch = InventoryBatch::new(
            "M2".to_string(),
            "LOT-2024-002".to_string(),
            Decimal::from(50),
            date(2024, 2, 1),
        )
        .with_expiry_date(date(2024, 8, 1))
        .with_location("W1-A-03".to_string());

        assert_eq!(batch.expiry_date, Some(date(2024, 8, 1)));
        assert_eq!(batch.location, Some("W1-A-03".to_string()));
    }

    #[test]
    fn test_batch_expiry() {
        let batch = InventoryBatch::new(
            "M1".to_string(),
            "LOT-2024-003".to_string(),
            Decimal::from(10),
            date(2024, 1, 1),
        )
        .with_expiry_date(date(2024, 6, 1));

        assert!(!batch.is_expired(date(2024, 6, 1)));
        assert!(batch.is_expired(date(2024, 6, 2)));
        assert!(!batch.is_usable(date(2024, 7, 1)));
    }

    #[test]
    fn test_refresh_status_tracks_reservation() {
        let mut batch = InventoryBatch::new(
            "M1".to_string(),
            "LOT-2024-004".to_string(),
            Decimal::from(20),
            date(2024, 3, 1),
        );

        // 部分預留仍為可用
        batch.reserved_qty = Decimal::from(5);
        batch.refresh_status();
        assert_eq!(batch.status, BatchStatus::Available);
        assert_eq!(batch.free_qty(), Decimal::from(15));

        // 全數預留轉為已預留
        batch.reserved_qty = Decimal::from(20);
        batch.refresh_status();
        assert_eq!(batch.status, BatchStatus::Reserved);
        assert_eq!(batch.free_qty(), Decimal::ZERO);
    }

    #[test]
    fn test_quarantine_not_usable() {
        let mut batch = InventoryBatch::new(
            "M1".to_string(),
            "LOT-2024-005".to_string(),
            Decimal::from(30),
            date(2024, 4, 1),
        );
        batch.status = BatchStatus::Quarantine;

        assert!(!batch.is_usable(date(2024, 4, 2)));

        // 重算狀態不會解除隔離
        batch.refresh_status();
        assert_eq!(batch.status, BatchStatus::Quarantine);
    }
}
