use crate::dal::SnowflakeDal;
use crate::harness::{RunOutcome, run_bounded};
use crate::models::SnowflakeRecord;
use crate::service::{
    BenchSuite, Strategy, WorkloadOptions, batch_count, batch_range, scale_to_rows,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// benchmark suite for the generated numeric primary key
pub struct SnowflakeBench {
    dal: SnowflakeDal,
}

impl SnowflakeBench {
    pub fn new(dal: SnowflakeDal) -> Self {
        Self { dal }
    }

    /// inserts `count` fixture rows in batches, untimed, and returns the ids
    /// the dal assigned, in creation order
    async fn seed(&self, count: usize, batch_size: usize, tag: &str) -> Result<Vec<u64>> {
        let lower = tag.to_lowercase();
        let mut ids = Vec::with_capacity(count);
        for batch in 0..batch_count(count, batch_size) {
            let mut records: Vec<SnowflakeRecord> = batch_range(batch, batch_size, count)
                .map(|i| SnowflakeRecord {
                    id: 0,
                    name: format!("{tag}Name_{i}"),
                    email: format!("{lower}_{i}@test.com"),
                    nickname: format!("{tag}Nickname_{i}"),
                })
                .collect();
            self.dal
                .insert_batch(&mut records)
                .await
                .with_context(|| format!("seeding batch {batch} of the {tag} fixtures"))?;
            ids.extend(records.iter().map(|r| r.id));
        }
        info!("snowflake: seeded {count} rows ({tag} fixtures)");
        Ok(ids)
    }
}

#[async_trait]
impl BenchSuite for SnowflakeBench {
    fn strategy(&self) -> Strategy {
        Strategy::Snowflake
    }

    async fn create(&self, opts: &WorkloadOptions) -> Result<RunOutcome> {
        let dal = self.dal.clone();
        run_bounded(
            "snowflake/create",
            opts.operations,
            opts.concurrency,
            move |i| {
                let dal = dal.clone();
                async move {
                    let mut record = SnowflakeRecord {
                        id: 0,
                        name: format!("Name_{i}"),
                        email: format!("email_{i}@test.com"),
                        nickname: format!("Nickname_{i}"),
                    };
                    dal.create(&mut record).await
                }
            },
        )
        .await
    }

    async fn insert_batch(&self, opts: &WorkloadOptions) -> Result<RunOutcome> {
        let rows = opts.operations;
        let batch_size = opts.batch_size.max(1);
        let dal = self.dal.clone();
        let succeeded = Arc::new(AtomicUsize::new(0));
        let counter = succeeded.clone();
        let outcome = run_bounded(
            "snowflake/insert-batch",
            batch_count(rows, batch_size),
            opts.batch_concurrency,
            move |batch| {
                let dal = dal.clone();
                let succeeded = counter.clone();
                async move {
                    let mut records: Vec<SnowflakeRecord> = batch_range(batch, batch_size, rows)
                        .map(|i| SnowflakeRecord {
                            id: 0,
                            name: format!("Name_{i}"),
                            email: format!("email_{i}@test.com"),
                            nickname: format!("Nickname_{i}"),
                        })
                        .collect();
                    dal.insert_batch(&mut records).await?;
                    succeeded.fetch_add(records.len(), Ordering::Relaxed);
                    Ok(())
                }
            },
        )
        .await?;
        Ok(scale_to_rows(
            outcome,
            rows,
            succeeded.load(Ordering::Relaxed),
            batch_size,
        ))
    }

    async fn get(&self, opts: &WorkloadOptions) -> Result<RunOutcome> {
        let mut ids = self.seed(opts.operations, opts.batch_size, "Test").await?;
        ids.shuffle(&mut rand::rng());
        let ids = Arc::new(ids);
        let dal = self.dal.clone();
        run_bounded("snowflake/get", ids.len(), opts.concurrency, move |i| {
            let dal = dal.clone();
            let ids = ids.clone();
            async move { dal.get_by_id(ids[i]).await.map(|_| ()) }
        })
        .await
    }

    async fn update(&self, opts: &WorkloadOptions) -> Result<RunOutcome> {
        let ids = Arc::new(
            self.seed(opts.operations, opts.batch_size, "Original")
                .await?,
        );
        let dal = self.dal.clone();
        run_bounded("snowflake/update", ids.len(), opts.concurrency, move |i| {
            let dal = dal.clone();
            let ids = ids.clone();
            async move {
                let record = SnowflakeRecord {
                    id: ids[i],
                    name: format!("UpdatedName_{i}"),
                    email: format!("updated_{i}@test.com"),
                    nickname: format!("UpdatedNickname_{i}"),
                };
                dal.update(&record).await
            }
        })
        .await
    }

    async fn delete(&self, opts: &WorkloadOptions) -> Result<RunOutcome> {
        let ids = Arc::new(
            self.seed(opts.operations, opts.batch_size, "Delete")
                .await?,
        );
        let dal = self.dal.clone();
        run_bounded("snowflake/delete", ids.len(), opts.concurrency, move |i| {
            let dal = dal.clone();
            let ids = ids.clone();
            async move { dal.delete(ids[i]).await }
        })
        .await
    }
}
