use crate::dal::batch_placeholders;
use crate::models::{CRC32_TABLE, Crc32Record, uuid_checksum};
use anyhow::{Context, Result};
use mysql_async::prelude::Queryable;
use mysql_async::{Pool, Value};

/// data access for the composite-key table. the checksum half of the key is
/// derived in here for every statement, writes included, so callers only
/// ever handle uuids and a stored row never carries a stale checksum.
#[derive(Clone)]
pub struct Crc32Dal {
    pool: Pool,
}

impl Crc32Dal {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// inserts the record; the stored checksum is derived from the uuid, not
    /// taken from the record
    pub async fn create(&self, record: &Crc32Record) -> Result<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(
            format!(
                "INSERT INTO {CRC32_TABLE} (uuid_crc32, uuid, name, email, nickname) \
                 VALUES (?, ?, ?, ?, ?)"
            ),
            (
                uuid_checksum(&record.uuid),
                record.uuid.as_str(),
                record.name.as_str(),
                record.email.as_str(),
                record.nickname.as_str(),
            ),
        )
        .await?;
        Ok(())
    }

    /// point lookup through the composite key; a missing row is an error
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Crc32Record> {
        let mut conn = self.pool.get_conn().await?;
        let row: Option<(u32, String, String, String, String)> = conn
            .exec_first(
                format!(
                    "SELECT uuid_crc32, uuid, name, email, nickname FROM {CRC32_TABLE} \
                     WHERE uuid_crc32 = ? AND uuid = ?"
                ),
                (uuid_checksum(uuid), uuid),
            )
            .await?;
        let (uuid_crc32, uuid, name, email, nickname) =
            row.with_context(|| format!("no row with uuid {uuid}"))?;
        Ok(Crc32Record {
            uuid_crc32,
            uuid,
            name,
            email,
            nickname,
        })
    }

    /// rewrites the non-key columns of the row keyed by `record.uuid`
    pub async fn update(&self, record: &Crc32Record) -> Result<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(
            format!(
                "UPDATE {CRC32_TABLE} SET name = ?, email = ?, nickname = ? \
                 WHERE uuid_crc32 = ? AND uuid = ?"
            ),
            (
                record.name.as_str(),
                record.email.as_str(),
                record.nickname.as_str(),
                uuid_checksum(&record.uuid),
                record.uuid.as_str(),
            ),
        )
        .await?;
        Ok(())
    }

    pub async fn delete(&self, uuid: &str) -> Result<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(
            format!("DELETE FROM {CRC32_TABLE} WHERE uuid_crc32 = ? AND uuid = ?"),
            (uuid_checksum(uuid), uuid),
        )
        .await?;
        Ok(())
    }

    /// inserts all records with one multi-row statement, deriving each stored
    /// checksum from its uuid
    pub async fn insert_batch(&self, records: &[Crc32Record]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let stmt = format!(
            "INSERT INTO {CRC32_TABLE} (uuid_crc32, uuid, name, email, nickname) VALUES {}",
            batch_placeholders(5, records.len())
        );
        let mut params = Vec::with_capacity(records.len() * 5);
        for record in records {
            params.push(Value::from(uuid_checksum(&record.uuid)));
            params.push(Value::from(record.uuid.as_str()));
            params.push(Value::from(record.name.as_str()));
            params.push(Value::from(record.email.as_str()));
            params.push(Value::from(record.nickname.as_str()));
        }
        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(stmt, params).await?;
        Ok(())
    }
}
