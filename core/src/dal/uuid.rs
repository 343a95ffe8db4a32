use crate::dal::batch_placeholders;
use crate::models::{UUID_TABLE, UuidRecord};
use anyhow::{Context, Result};
use mysql_async::prelude::Queryable;
use mysql_async::{Pool, Value};

/// data access for the table keyed directly by the uuid string
#[derive(Clone)]
pub struct UuidDal {
    pool: Pool,
}

impl UuidDal {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, record: &UuidRecord) -> Result<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(
            format!("INSERT INTO {UUID_TABLE} (uuid, name, email, nickname) VALUES (?, ?, ?, ?)"),
            (
                record.uuid.as_str(),
                record.name.as_str(),
                record.email.as_str(),
                record.nickname.as_str(),
            ),
        )
        .await?;
        Ok(())
    }

    /// point lookup by primary key; a missing row is an error
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<UuidRecord> {
        let mut conn = self.pool.get_conn().await?;
        let row: Option<(String, String, String, String)> = conn
            .exec_first(
                format!("SELECT uuid, name, email, nickname FROM {UUID_TABLE} WHERE uuid = ?"),
                (uuid,),
            )
            .await?;
        let (uuid, name, email, nickname) =
            row.with_context(|| format!("no row with uuid {uuid}"))?;
        Ok(UuidRecord {
            uuid,
            name,
            email,
            nickname,
        })
    }

    /// rewrites every non-key column of the row keyed by `record.uuid`
    pub async fn update(&self, record: &UuidRecord) -> Result<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(
            format!("UPDATE {UUID_TABLE} SET name = ?, email = ?, nickname = ? WHERE uuid = ?"),
            (
                record.name.as_str(),
                record.email.as_str(),
                record.nickname.as_str(),
                record.uuid.as_str(),
            ),
        )
        .await?;
        Ok(())
    }

    pub async fn delete(&self, uuid: &str) -> Result<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(
            format!("DELETE FROM {UUID_TABLE} WHERE uuid = ?"),
            (uuid,),
        )
        .await?;
        Ok(())
    }

    /// pages through rows; offsets deep into a big table get slow, which is
    /// part of what the uuid strategy is being measured on
    pub async fn list(&self, limit: usize, offset: usize) -> Result<Vec<UuidRecord>> {
        let mut conn = self.pool.get_conn().await?;
        let rows: Vec<(String, String, String, String)> = conn
            .exec(
                format!(
                    "SELECT uuid, name, email, nickname FROM {UUID_TABLE} LIMIT ? OFFSET ?"
                ),
                (limit as u64, offset as u64),
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|(uuid, name, email, nickname)| UuidRecord {
                uuid,
                name,
                email,
                nickname,
            })
            .collect())
    }

    /// inserts all records with one multi-row statement
    pub async fn insert_batch(&self, records: &[UuidRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let stmt = format!(
            "INSERT INTO {UUID_TABLE} (uuid, name, email, nickname) VALUES {}",
            batch_placeholders(4, records.len())
        );
        let mut params = Vec::with_capacity(records.len() * 4);
        for record in records {
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
