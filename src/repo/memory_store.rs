use crate::domain::payment::PaymentRecord;
use crate::repo::payment_store::{LockedRecord, PaymentStore};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<PaymentRecord>>;

/// Process-local store with one async mutex per vehicle.
#[derive(Clone, Default)]
pub struct MemoryPaymentStore {
    records: Arc<Mutex<HashMap<i64, Slot>>>,
}

pub struct MemoryLockedRecord {
    guard: OwnedMutexGuard<PaymentRecord>,
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: PaymentRecord) {
        if let Ok(mut map) = self.records.lock() {
            map.insert(record.vehicle_id, Arc::new(AsyncMutex::new(record)));
        }
    }

    fn slot(&self, vehicle_id: i64) -> Option<Slot> {
        self.records.lock().ok()?.get(&vehicle_id).cloned()
    }

    fn slots(&self) -> Vec<Slot> {
        self.records
            .lock()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn lock(&self, vehicle_id: i64) -> Result<Option<Box<dyn LockedRecord>>> {
        let Some(slot) = self.slot(vehicle_id) else {
            return Ok(None);
        };
        let guard = slot.lock_owned().await;
        Ok(Some(Box::new(MemoryLockedRecord { guard })))
    }

    async fn read(&self, vehicle_id: i64) -> Result<Option<PaymentRecord>> {
        match self.slot(vehicle_id) {
            Some(slot) => Ok(Some(slot.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn vehicle_for_link(&self, link_id: &str) -> Result<Option<i64>> {
        let mut found = None;
        for slot in self.slots() {
            let record = slot.lock().await;
            if record.payment_link_id.as_deref() == Some(link_id) {
                found = match found {
                    Some(existing) if existing < record.vehicle_id => Some(existing),
                    _ => Some(record.vehicle_id),
                };
            }
        }
        Ok(found)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl LockedRecord for MemoryLockedRecord {
    fn record(&self) -> &PaymentRecord {
        &self.guard
    }

    async fn commit(mut self: Box<Self>, updated: &PaymentRecord) -> Result<()> {
        *self.guard = updated.clone();
        Ok(())
    }
}
