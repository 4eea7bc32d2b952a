//! 單一物料的批次儲存
//!
//! 所有變更方法都在物料鎖之下被呼叫，單一寫入者。

use chrono::NaiveDate;
use mrp_core::{Allocation, BatchStatus, InventoryBatch, MrpError, Result};
use rust_decimal::Decimal;
use uuid::Uuid;

/// 單一物料的批次儲存
#[derive(Debug, Default)]
pub struct MaterialStore {
    material_id: String,
    batches: Vec<InventoryBatch>,
    consumed: Decimal,
    total_received: Decimal,
}

impl MaterialStore {
    /// 創建空的物料儲存
    pub fn new(material_id: String) -> Self {
        Self {
            material_id,
            ..Default::default()
        }
    }

    /// 物料ID
    pub fn material_id(&self) -> &str {
        &self.material_id
    }

    /// 入庫批次
    pub fn receive(&mut self, batch: InventoryBatch) -> Result<()> {
        if batch.quantity < Decimal::ZERO {
            return Err(MrpError::InvalidQuantity(format!(
                "入庫數量不得為負: 批號 {} 數量 {}",
                batch.batch_number, batch.quantity
            )));
        }
        tracing::debug!(
            "入庫: {} 批號 {} 數量 {}",
            self.material_id,
            batch.batch_number,
            batch.quantity
        );
        self.total_received += batch.quantity;
        self.batches.push(batch);
        Ok(())
    }

    /// 可用數量（可用狀態批次的自由量，依設定排除過期）
    pub fn available(&self, as_of: NaiveDate, exclude_expired: bool) -> Decimal {
        self.batches
            .iter()
            .filter(|b| b.status == BatchStatus::Available)
            .filter(|b| !exclude_expired || !b.is_expired(as_of))
            .map(|b| b.free_qty())
            .sum()
    }

    /// 已過期批次的自由量（另行回報，不計入規劃可用量）
    pub fn expired(&self, as_of: NaiveDate) -> Decimal {
        self.batches
            .iter()
            .filter(|b| b.status != BatchStatus::Quarantine && b.is_expired(as_of))
            .map(|b| b.free_qty())
            .sum()
    }

    /// 預留數量（含過期與隔離批次上既有的預留）
    pub fn reserved(&self) -> Decimal {
        self.batches.iter().map(|b| b.reserved_qty).sum()
    }

    /// 累計扣帳數量
    pub fn consumed(&self) -> Decimal {
        self.consumed
    }

    /// 累計入庫數量
    pub fn total_received(&self) -> Decimal {
        self.total_received
    }

    /// 預留
    ///
    /// 最早到期優先（無效期者排最後，入庫日早者先），不足時跨批次分拆。
    /// 總自由量不足則整筆失敗，不保留任何部分預留。
    pub fn reserve(
        &mut self,
        quantity: Decimal,
        demand_id: Uuid,
        as_of: NaiveDate,
        exclude_expired: bool,
    ) -> Result<Vec<Allocation>> {
        if quantity <= Decimal::ZERO {
            return Err(MrpError::InvalidQuantity(format!(
                "預留數量必須為正值: {} 數量 {}",
                self.material_id, quantity
            )));
        }

        let mut order: Vec<usize> = (0..self.batches.len())
            .filter(|&i| {
                let b = &self.batches[i];
                b.status == BatchStatus::Available
                    && (!exclude_expired || !b.is_expired(as_of))
                    && b.free_qty() > Decimal::ZERO
            })
            .collect();
        order.sort_by_key(|&i| {
            let b = &self.batches[i];
            (b.expiry_date.is_none(), b.expiry_date, b.received_date)
        });

        // 先試算分拆，確認足量後才套用
        let mut plan: Vec<(usize, Decimal)> = Vec::new();
        let mut remaining = quantity;
        for idx in order {
            if remaining <= Decimal::ZERO {
                break;
            }
            let take = self.batches[idx].free_qty().min(remaining);
            plan.push((idx, take));
            remaining -= take;
        }

        if remaining > Decimal::ZERO {
            return Err(MrpError::Shortage {
                material_id: self.material_id.clone(),
                shortfall: remaining,
            });
        }

        let mut allocations = Vec::with_capacity(plan.len());
        for (idx, take) in plan {
            let batch = &mut self.batches[idx];
            batch.reserved_qty += take;
            batch.refresh_status();
            tracing::debug!(
                "預留: {} 批號 {} 數量 {} (需求 {})",
                self.material_id,
                batch.batch_number,
                take,
                demand_id
            );
            allocations.push(Allocation::new(
                demand_id,
                batch.id,
                self.material_id.clone(),
                take,
            ));
        }
        Ok(allocations)
    }

    /// 扣帳：預留量轉為永久扣減，批次歸零即除帳
    pub fn consume(&mut self, allocation: &Allocation) -> Result<()> {
        let idx = self.find_batch(allocation.batch_id)?;
        let batch = &mut self.batches[idx];
        if batch.reserved_qty < allocation.quantity {
            return Err(MrpError::InvalidQuantity(format!(
                "扣帳數量超過預留數量: 批次 {} 預留 {} 扣帳 {}",
                batch.id, batch.reserved_qty, allocation.quantity
            )));
        }
        batch.reserved_qty -= allocation.quantity;
        batch.quantity -= allocation.quantity;
        self.consumed += allocation.quantity;
        tracing::debug!(
            "扣帳: {} 批號 {} 數量 {}",
            self.material_id,
            batch.batch_number,
            allocation.quantity
        );
        if batch.quantity == Decimal::ZERO {
            self.batches.remove(idx);
        } else {
            self.batches[idx].refresh_status();
        }
        Ok(())
    }

    /// 釋放：預留量退回可用
    pub fn release(&mut self, allocation: &Allocation) -> Result<()> {
        let idx = self.find_batch(allocation.batch_id)?;
        let batch = &mut self.batches[idx];
        if batch.reserved_qty < allocation.quantity {
            return Err(MrpError::InvalidQuantity(format!(
                "釋放數量超過預留數量: 批次 {} 預留 {} 釋放 {}",
                batch.id, batch.reserved_qty, allocation.quantity
            )));
        }
        batch.reserved_qty -= allocation.quantity;
        batch.refresh_status();
        tracing::debug!(
            "釋放: {} 批號 {} 數量 {}",
            self.material_id,
            batch.batch_number,
            allocation.quantity
        );
        Ok(())
    }

    /// 隔離批次（品檢/凍結），隔離中不可預留
    pub fn quarantine(&mut self, batch_id: Uuid) -> Result<()> {
        let idx = self.find_batch(batch_id)?;
        self.batches[idx].status = BatchStatus::Quarantine;
        tracing::debug!("隔離: {} 批次 {}", self.material_id, batch_id);
        Ok(())
    }

    /// 解除隔離，依預留量回復狀態
    pub fn release_quarantine(&mut self, batch_id: Uuid) -> Result<()> {
        let idx = self.find_batch(batch_id)?;
        let batch = &mut self.batches[idx];
        batch.status = BatchStatus::Available;
        batch.refresh_status();
        tracing::debug!("解除隔離: {} 批次 {}", self.material_id, batch_id);
        Ok(())
    }

    /// 檢查分配是否仍有批次預留支撐（批次存在且預留量足額）
    pub fn holds(&self, allocation: &Allocation) -> bool {
        self.batches
            .iter()
            .any(|b| b.id == allocation.batch_id && b.reserved_qty >= allocation.quantity)
    }

    /// 批次快照（測試與報表用）
    pub fn batches(&self) -> &[InventoryBatch] {
        &self.batches
    }

    fn find_batch(&self, batch_id: Uuid) -> Result<usize> {
        self.batches
            .iter()
            .position(|b| b.id == batch_id)
            .ok_or(MrpError::UnknownBatch(batch_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn batch(qty: i64, expiry: Option<NaiveDate>, received: NaiveDate) -> InventoryBatch {
        let mut b = InventoryBatch::new(
            "M1".to_string(),
            format!("LOT-{}", received),
            Decimal::from(qty),
            received,
        );
        b.expiry_date = expiry;
        b
    }

    #[test]
    fn test_receive_rejects_negative() {
        let mut store = MaterialStore::new("M1".to_string());
        let result = store.receive(batch(-5, None, date(2024, 1, 1)));
        assert!(matches!(result, Err(MrpError::InvalidQuantity(_))));
        assert_eq!(store.total_received(), Decimal::ZERO);
    }

    #[test]
    fn test_expiry_split_scenario() {
        // 10 到期 2024-01-01、20 到期 2024-06-01，預留 15 應取 10 + 5
        let mut store = MaterialStore::new("M1".to_string());
        store
            .receive(batch(10, Some(date(2024, 1, 1)), date(2023, 10, 1)))
            .unwrap();
        store
            .receive(batch(20, Some(date(2024, 6, 1)), date(2023, 11, 1)))
            .unwrap();

        let allocations = store
            .reserve(Decimal::from(15), Uuid::new_v4(), date(2023, 12, 1), true)
            .unwrap();

        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].quantity, Decimal::from(10));
        assert_eq!(allocations[1].quantity, Decimal::from(5));
        assert_eq!(store.reserved(), Decimal::from(15));
    }

    #[rstest]
    #[case::none_sorts_last(
        vec![(10, None), (10, Some((2024, 6, 1)))],
        Decimal::from(5),
        1 // 有效期批次優先
    )]
    #[case::earliest_expiry_first(
        vec![(10, Some((2024, 9, 1))), (10, Some((2024, 3, 1)))],
        Decimal::from(5),
        1 // 較早到期者優先
    )]
    fn test_reserve_ordering(
        #[case] batches: Vec<(i64, Option<(i32, u32, u32)>)>,
        #[case] qty: Decimal,
        #[case] expected_source: usize,
    ) {
        let mut store = MaterialStore::new("M1".to_string());
        let mut ids = Vec::new();
        for (i, (q, expiry)) in batches.into_iter().enumerate() {
            let b = batch(
                q,
                expiry.map(|(y, m, d)| date(y, m, d)),
                date(2023, 1, 1 + i as u32),
            );
            ids.push(b.id);
            store.receive(b).unwrap();
        }

        let allocations = store
            .reserve(qty, Uuid::new_v4(), date(2024, 1, 1), false)
            .unwrap();

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].batch_id, ids[expected_source]);
    }

    #[test]
    fn test_received_date_tiebreak_for_no_expiry() {
        let mut store = MaterialStore::new("M1".to_string());
        let newer = batch(10, None, date(2024, 2, 1));
        let older = batch(10, None, date(2024, 1, 1));
        let older_id = older.id;
        store.receive(newer).unwrap();
        store.receive(older).unwrap();

        let allocations = store
            .reserve(Decimal::from(5), Uuid::new_v4(), date(2024, 3, 1), true)
            .unwrap();
        assert_eq!(allocations[0].batch_id, older_id);
    }

    #[test]
    fn test_shortage_is_atomic() {
        let mut store = MaterialStore::new("M1".to_string());
        store.receive(batch(10, None, date(2024, 1, 1))).unwrap();

        let result = store.reserve(Decimal::from(25), Uuid::new_v4(), date(2024, 2, 1), true);
        match result {
            Err(MrpError::Shortage {
                material_id,
                shortfall,
            }) => {
                assert_eq!(material_id, "M1");
                assert_eq!(shortfall, Decimal::from(15));
            }
            other => panic!("預期短缺錯誤，得到 {:?}", other),
        }
        // 失敗後不得保留部分預留
        assert_eq!(store.reserved(), Decimal::ZERO);
        assert_eq!(store.available(date(2024, 2, 1), true), Decimal::from(10));
    }

    #[test]
    fn test_expired_batch_not_reservable() {
        let mut store = MaterialStore::new("M1".to_string());
        store
            .receive(batch(10, Some(date(2024, 1, 1)), date(2023, 6, 1)))
            .unwrap();

        // 規劃日在到期日之後
        let result = store.reserve(Decimal::from(5), Uuid::new_v4(), date(2024, 2, 1), true);
        assert!(matches!(result, Err(MrpError::Shortage { .. })));
        assert_eq!(store.available(date(2024, 2, 1), true), Decimal::ZERO);
        assert_eq!(store.expired(date(2024, 2, 1)), Decimal::from(10));
    }

    #[test]
    fn test_consume_retires_empty_batch() {
        let mut store = MaterialStore::new("M1".to_string());
        store.receive(batch(10, None, date(2024, 1, 1))).unwrap();

        let allocations = store
            .reserve(Decimal::from(10), Uuid::new_v4(), date(2024, 2, 1), true)
            .unwrap();
        store.consume(&allocations[0]).unwrap();

        assert_eq!(store.batches().len(), 0);
        assert_eq!(store.consumed(), Decimal::from(10));
        // 守恆: 0 + 0 + 10 == 10
        assert_eq!(
            store.available(date(2024, 2, 1), true) + store.reserved() + store.consumed(),
            store.total_received()
        );
    }

    #[test]
    fn test_release_returns_to_available() {
        let mut store = MaterialStore::new("M1".to_string());
        store.receive(batch(10, None, date(2024, 1, 1))).unwrap();

        let allocations = store
            .reserve(Decimal::from(10), Uuid::new_v4(), date(2024, 2, 1), true)
            .unwrap();
        assert_eq!(store.available(date(2024, 2, 1), true), Decimal::ZERO);
        assert_eq!(store.batches()[0].status, BatchStatus::Reserved);

        store.release(&allocations[0]).unwrap();
        assert_eq!(store.available(date(2024, 2, 1), true), Decimal::from(10));
        assert_eq!(store.batches()[0].status, BatchStatus::Available);
    }

    #[test]
    fn test_quarantine_blocks_reserve() {
        let mut store = MaterialStore::new("M1".to_string());
        let b = batch(10, None, date(2024, 1, 1));
        let batch_id = b.id;
        store.receive(b).unwrap();

        store.quarantine(batch_id).unwrap();
        let result = store.reserve(Decimal::from(5), Uuid::new_v4(), date(2024, 2, 1), true);
        assert!(matches!(result, Err(MrpError::Shortage { .. })));

        store.release_quarantine(batch_id).unwrap();
        assert!(store
            .reserve(Decimal::from(5), Uuid::new_v4(), date(2024, 2, 1), true)
            .is_ok());
    }

    #[test]
    fn test_consume_unknown_batch() {
        let mut store = MaterialStore::new("M1".to_string());
        let phantom = Allocation::new(Uuid::new_v4(), Uuid::new_v4(), "M1".to_string(), Decimal::ONE);
        assert!(matches!(
            store.consume(&phantom),
            Err(MrpError::UnknownBatch(_))
        ));
    }
}
