use crate::domain::payment::{Amount, CustomerContact, PaymentRecord, PaymentStatus};
use crate::repo::payment_store::{LockedRecord, PaymentStore};
use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

const SELECT_RECORD: &str = r#"
    SELECT v.id, v.model, v.payment_status, v.transaction_id, v.payment_link_id, v.payment_amount,
           c.id AS customer_id, c.name AS customer_name, c.phone AS customer_phone, c.email AS customer_email
    FROM vehicles v
    LEFT JOIN customers c ON c.id = v.customer_id
    WHERE v.id = $1
"#;

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

pub struct PgLockedRecord {
    tx: Transaction<'static, Postgres>,
    record: PaymentRecord,
}

fn to_record(r: &PgRow) -> Result<PaymentRecord> {
    let vehicle_id: i64 = r.get("id");
    let raw_amount: Decimal = r.get("payment_amount");
    let amount = Amount::new(raw_amount)
        .ok_or_else(|| anyhow!("vehicle {} has unchargeable payment amount {}", vehicle_id, raw_amount))?;
    let status: String = r.get("payment_status");

    let owner = r
        .get::<Option<i64>, _>("customer_id")
        .map(|customer_id| CustomerContact {
            customer_id,
            name: r.get::<Option<String>, _>("customer_name").unwrap_or_default(),
            phone: r.get::<Option<String>, _>("customer_phone").unwrap_or_default(),
            email: r.get::<Option<String>, _>("customer_email").unwrap_or_default(),
        });

    Ok(PaymentRecord {
        vehicle_id,
        vehicle_model: r.get("model"),
        status: PaymentStatus::parse(&status),
        external_reference: r.get("transaction_id"),
        payment_link_id: r.get("payment_link_id"),
        amount,
        owner,
    })
}

#[async_trait::async_trait]
impl PaymentStore for PaymentsRepo {
    async fn lock(&self, vehicle_id: i64) -> Result<Option<Box<dyn LockedRecord>>> {
        let sql = format!("{SELECT_RECORD} FOR UPDATE OF v");
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&sql)
            .bind(vehicle_id)
            .fetch_optional(tx.as_mut())
            .await?;

        match row {
            Some(r) => {
                let record = to_record(&r)?;
                Ok(Some(Box::new(PgLockedRecord { tx, record })))
            }
            None => Ok(None),
        }
    }

    async fn read(&self, vehicle_id: i64) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query(SELECT_RECORD)
            .bind(vehicle_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(to_record).transpose()
    }

    async fn vehicle_for_link(&self, link_id: &str) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT id FROM vehicles WHERE payment_link_id = $1 ORDER BY id LIMIT 1")
            .bind(link_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("id")))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LockedRecord for PgLockedRecord {
    fn record(&self) -> &PaymentRecord {
        &self.record
    }

    async fn commit(self: Box<Self>, updated: &PaymentRecord) -> Result<()> {
        let PgLockedRecord { mut tx, .. } = *self;
        sqlx::query(
            r#"
            UPDATE vehicles
            SET payment_status = $2, transaction_id = $3, payment_link_id = $4
            WHERE id = $1
            "#,
        )
        .bind(updated.vehicle_id)
        .bind(updated.status.as_str())
        .bind(updated.external_reference.as_deref())
        .bind(updated.payment_link_id.as_deref())
        .execute(tx.as_mut())
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
