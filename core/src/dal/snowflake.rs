use crate::dal::batch_placeholders;
use crate::models::{SNOWFLAKE_TABLE, SnowflakeRecord};
use anyhow::{Context, Result, anyhow};
use mysql_async::prelude::Queryable;
use mysql_async::{Pool, Value};
use sonyflake::Sonyflake;
use std::sync::{Arc, Mutex};

/// data access for the numeric-key table. owns the id generator and assigns
/// ids to records that arrive without one, so callers can collect the
/// generated keys afterwards.
#[derive(Clone)]
pub struct SnowflakeDal {
    pool: Pool,
    generator: Arc<Mutex<Sonyflake>>,
}

impl SnowflakeDal {
    pub fn new(pool: Pool) -> Result<Self> {
        let generator = Sonyflake::new().context("initializing the snowflake id generator")?;
        Ok(Self {
            pool,
            generator: Arc::new(Mutex::new(generator)),
        })
    }

    /// draws the next id from the shared generator
    pub fn next_id(&self) -> Result<u64> {
        let mut generator = self
            .generator
            .lock()
            .map_err(|_| anyhow!("snowflake generator mutex poisoned"))?;
        Ok(generator.next_id()?)
    }

    /// inserts the record, assigning a fresh id first when it has none
    pub async fn create(&self, record: &mut SnowflakeRecord) -> Result<()> {
        if record.id == 0 {
            record.id = self.next_id()?;
        }
        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(
            format!("INSERT INTO {SNOWFLAKE_TABLE} (id, name, email, nickname) VALUES (?, ?, ?, ?)"),
            (
                record.id,
                record.name.as_str(),
                record.email.as_str(),
                record.nickname.as_str(),
            ),
        )
        .await?;
        Ok(())
    }

    /// point lookup by primary key; a missing row is an error
    pub async fn get_by_id(&self, id: u64) -> Result<SnowflakeRecord> {
        let mut conn = self.pool.get_conn().await?;
        let row: Option<(u64, String, String, String)> = conn
            .exec_first(
                format!("SELECT id, name, email, nickname FROM {SNOWFLAKE_TABLE} WHERE id = ?"),
                (id,),
            )
            .await?;
        let (id, name, email, nickname) = row.with_context(|| format!("no row with id {id}"))?;
        Ok(SnowflakeRecord {
            id,
            name,
            email,
            nickname,
        })
    }

    /// rewrites every non-key column of the row keyed by `record.id`
    pub async fn update(&self, record: &SnowflakeRecord) -> Result<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(
            format!("UPDATE {SNOWFLAKE_TABLE} SET name = ?, email = ?, nickname = ? WHERE id = ?"),
            (
                record.name.as_str(),
                record.email.as_str(),
                record.nickname.as_str(),
                record.id,
            ),
        )
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(
            format!("DELETE FROM {SNOWFLAKE_TABLE} WHERE id = ?"),
            (id,),
        )
        .await?;
        Ok(())
    }

    /// inserts all records with one multi-row statement, assigning ids to any
    /// record missing one
    pub async fn insert_batch(&self, records: &mut [SnowflakeRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        for record in records.iter_mut() {
            if record.id == 0 {
                record.id = self.next_id()?;
            }
        }
        let stmt = format!(
            "INSERT INTO {SNOWFLAKE_TABLE} (id, name, email, nickname) VALUES {}",
            batch_placeholders(4, records.len())
        );
        let mut params = Vec::with_capacity(records.len() * 4);
        for record in records.iter() {
            params.push(Value::from(record.id));
            params.push(Value::from(record.name.as_str()));
            params.push(Value::from(record.email.as_str()));
            params.push(Value::from(record.nickname.as_str()));
        }
        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(stmt, params).await?;
        Ok(())
    }
}
