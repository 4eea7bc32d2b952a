//! 庫存帳
//!
//! 每個物料一把鎖，批次變更單一寫入者；
//! 並發預留經由同一把物料鎖序列化，不會聯合超配。

use crate::store::MaterialStore;
use chrono::NaiveDate;
use mrp_core::{Allocation, InventoryBatch, MrpError, PlanningPolicy, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// 庫存帳
#[derive(Debug, Default)]
pub struct InventoryLedger {
    policy: PlanningPolicy,
    materials: Mutex<HashMap<String, Arc<Mutex<MaterialStore>>>>,
}

impl InventoryLedger {
    /// 以預設規劃參數創建庫存帳
    pub fn new() -> Self {
        Self::default()
    }

    /// 以指定規劃參數創建庫存帳
    pub fn with_policy(policy: PlanningPolicy) -> Self {
        Self {
            policy,
            materials: Mutex::new(HashMap::new()),
        }
    }

    /// 規劃參數
    pub fn policy(&self) -> &PlanningPolicy {
        &self.policy
    }

    /// 入庫批次（物料首見時自動建帳）
    pub fn receive(&self, batch: InventoryBatch) -> Result<()> {
        let store = self.store_or_insert(&batch.material_id)?;
        let result = lock(&store)?.receive(batch);
        result
    }

    /// 可用數量（未建帳物料視為零）
    pub fn available(&self, material_id: &str, as_of: NaiveDate) -> Result<Decimal> {
        match self.store(material_id)? {
            Some(store) => Ok(lock(&store)?.available(as_of, self.policy.exclude_expired)),
            None => Ok(Decimal::ZERO),
        }
    }

    /// 已過期的自由量
    pub fn expired(&self, material_id: &str, as_of: NaiveDate) -> Result<Decimal> {
        match self.store(material_id)? {
            Some(store) => Ok(lock(&store)?.expired(as_of)),
            None => Ok(Decimal::ZERO),
        }
    }

    /// 預留
    ///
    /// 試算與套用在同一把物料鎖之下完成；
    /// 總量不足回傳 [`MrpError::Shortage`]，不保留部分預留。
    pub fn reserve(
        &self,
        material_id: &str,
        quantity: Decimal,
        demand_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Vec<Allocation>> {
        match self.store(material_id)? {
            Some(store) => lock(&store)?.reserve(
                quantity,
                demand_id,
                as_of,
                self.policy.exclude_expired,
            ),
            None => Err(MrpError::Shortage {
                material_id: material_id.to_string(),
                shortfall: quantity,
            }),
        }
    }

    /// 扣帳
    pub fn consume(&self, allocation: &Allocation) -> Result<()> {
        let store = self.existing_store(&allocation.material_id)?;
        let result = lock(&store)?.consume(allocation);
        result
    }

    /// 釋放
    pub fn release(&self, allocation: &Allocation) -> Result<()> {
        let store = self.existing_store(&allocation.material_id)?;
        let result = lock(&store)?.release(allocation);
        result
    }

    /// 隔離批次
    pub fn quarantine(&self, material_id: &str, batch_id: Uuid) -> Result<()> {
        let store = self.existing_store(material_id)?;
        let result = lock(&store)?.quarantine(batch_id);
        result
    }

    /// 解除隔離
    pub fn release_quarantine(&self, material_id: &str, batch_id: Uuid) -> Result<()> {
        let store = self.existing_store(material_id)?;
        let result = lock(&store)?.release_quarantine(batch_id);
        result
    }

    /// 檢查分配是否仍有批次預留支撐
    pub fn holds(&self, allocation: &Allocation) -> Result<bool> {
        match self.store(&allocation.material_id)? {
            Some(store) => Ok(lock(&store)?.holds(allocation)),
            None => Ok(false),
        }
    }

    /// 守恆探針：預留數量
    pub fn reserved(&self, material_id: &str) -> Result<Decimal> {
        match self.store(material_id)? {
            Some(store) => Ok(lock(&store)?.reserved()),
            None => Ok(Decimal::ZERO),
        }
    }

    /// 守恆探針：累計扣帳數量
    pub fn consumed(&self, material_id: &str) -> Result<Decimal> {
        match self.store(material_id)? {
            Some(store) => Ok(lock(&store)?.consumed()),
            None => Ok(Decimal::ZERO),
        }
    }

    /// 守恆探針：累計入庫數量
    pub fn total_received(&self, material_id: &str) -> Result<Decimal> {
        match self.store(material_id)? {
            Some(store) => Ok(lock(&store)?.total_received()),
            None => Ok(Decimal::ZERO),
        }
    }

    fn store(&self, material_id: &str) -> Result<Option<Arc<Mutex<MaterialStore>>>> {
        let map = self
            .materials
            .lock()
            .map_err(|e| MrpError::Other(format!("物料索引鎖取得失敗: {}", e)))?;
        Ok(map.get(material_id).cloned())
    }

    fn existing_store(&self, material_id: &str) -> Result<Arc<Mutex<MaterialStore>>> {
        self.store(material_id)?
            .ok_or_else(|| MrpError::UnknownMaterial(material_id.to_string()))
    }

    fn store_or_insert(&self, material_id: &str) -> Result<Arc<Mutex<MaterialStore>>> {
        let mut map = self
            .materials
            .lock()
            .map_err(|e| MrpError::Other(format!("物料索引鎖取得失敗: {}", e)))?;
        Ok(map
            .entry(material_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(MaterialStore::new(material_id.to_string()))))
            .clone())
    }
}

fn lock(store: &Arc<Mutex<MaterialStore>>) -> Result<MutexGuard<'_, MaterialStore>> {
    store
        .lock()
        .map_err(|e| MrpError::Other(format!("物料鎖取得失敗: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::seq::SliceRandom;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn batch(material_id: &str, qty: i64, received: NaiveDate) -> InventoryBatch {
        InventoryBatch::new(
            material_id.to_string(),
            format!("LOT-{}-{}", material_id, received),
            Decimal::from(qty),
            received,
        )
    }

    #[test]
    fn test_unknown_material_reads_as_zero() {
        let ledger = InventoryLedger::new();
        assert_eq!(
            ledger.available("M9", date(2024, 1, 1)).unwrap(),
            Decimal::ZERO
        );
        assert_eq!(ledger.reserved("M9").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_reserve_unknown_material_is_full_shortage() {
        let ledger = InventoryLedger::new();
        let result = ledger.reserve("M9", Decimal::from(7), Uuid::new_v4(), date(2024, 1, 1));
        assert!(matches!(
            result,
            Err(MrpError::Shortage { shortfall, .. }) if shortfall == Decimal::from(7)
        ));
    }

    #[test]
    fn test_concurrent_reserve_never_oversubscribes() {
        let ledger = Arc::new(InventoryLedger::new());
        ledger
            .receive(batch("M1", 100, date(2024, 1, 1)))
            .unwrap();

        // 8 條執行緒各搶 30，總需求 240 遠大於 100
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    ledger.reserve("M1", Decimal::from(30), Uuid::new_v4(), date(2024, 2, 1))
                })
            })
            .collect();

        let mut granted = Decimal::ZERO;
        for handle in handles {
            if let Ok(allocations) = handle.join().unwrap() {
                granted += allocations.iter().map(|a| a.quantity).sum::<Decimal>();
            }
        }

        // 成功的預留總量不得超過可用量
        assert!(granted <= Decimal::from(100));
        assert_eq!(ledger.reserved("M1").unwrap(), granted);
        assert_eq!(
            ledger.available("M1", date(2024, 2, 1)).unwrap(),
            Decimal::from(100) - granted
        );
    }

    #[test]
    fn test_conservation_under_shuffled_ops() {
        let ledger = InventoryLedger::new();
        ledger.receive(batch("M1", 60, date(2024, 1, 1))).unwrap();
        ledger.receive(batch("M1", 40, date(2024, 1, 2))).unwrap();

        let demand_id = Uuid::new_v4();
        let mut allocations = ledger
            .reserve("M1", Decimal::from(70), demand_id, date(2024, 2, 1))
            .unwrap();

        // 任意順序地扣帳/釋放，守恆律都必須成立
        let mut rng = rand::thread_rng();
        allocations.shuffle(&mut rng);
        for (i, allocation) in allocations.iter().enumerate() {
            if i % 2 == 0 {
                ledger.consume(allocation).unwrap();
            } else {
                ledger.release(allocation).unwrap();
            }
            let total = ledger.available("M1", date(2024, 2, 1)).unwrap()
                + ledger.reserved("M1").unwrap()
                + ledger.consumed("M1").unwrap();
            assert_eq!(total, ledger.total_received("M1").unwrap());
        }
    }

    proptest! {
        /// 守恆律：任意入庫/預留/扣帳/釋放序列後
        /// available + reserved + consumed == total received
        #[test]
        fn prop_conservation_law(
            ops in prop::collection::vec((1i64..100, 0i64..150, any::<bool>()), 1..20)
        ) {
            let ledger = InventoryLedger::new();
            let as_of = date(2024, 6, 1);
            let mut day = 0u32;

            for (recv_qty, reserve_qty, consume_flag) in ops {
                day += 1;
                ledger
                    .receive(batch("M1", recv_qty, date(2024, 1, 1 + day % 28)))
                    .unwrap();

                if reserve_qty > 0 {
                    if let Ok(allocations) =
                        ledger.reserve("M1", Decimal::from(reserve_qty), Uuid::new_v4(), as_of)
                    {
                        for allocation in &allocations {
                            if consume_flag {
                                ledger.consume(allocation).unwrap();
                            } else {
                                ledger.release(allocation).unwrap();
                            }
                        }
                    }
                }

                let total = ledger.available("M1", as_of).unwrap()
                    + ledger.reserved("M1").unwrap()
                    + ledger.consumed("M1").unwrap();
                prop_assert_eq!(total, ledger.total_received("M1").unwrap());
            }
        }
    }
}
