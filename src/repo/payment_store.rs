use crate::domain::payment::PaymentRecord;
use anyhow::Result;

/// Storage of the payment columns that live on a vehicle.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    /// Opens a critical section on one vehicle's payment fields. Nothing
    /// else can lock the same record until the returned handle is
    /// committed or dropped. `None` when the vehicle does not exist.
    async fn lock(&self, vehicle_id: i64) -> Result<Option<Box<dyn LockedRecord>>>;

    /// Unlocked snapshot.
    async fn read(&self, vehicle_id: i64) -> Result<Option<PaymentRecord>>;

    async fn vehicle_for_link(&self, link_id: &str) -> Result<Option<i64>>;

    async fn ping(&self) -> Result<()>;
}

#[async_trait::async_trait]
pub trait LockedRecord: Send {
    fn record(&self) -> &PaymentRecord;

    /// Writes status, reference and link id in one step and releases the
    /// lock. Dropping the handle instead leaves the record untouched.
    async fn commit(self: Box<Self>, updated: &PaymentRecord) -> Result<()>;
}
