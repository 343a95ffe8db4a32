use crate::dal::UuidDal;
use crate::harness::{RunOutcome, run_bounded};
use crate::models::UuidRecord;
use crate::service::{
    BenchSuite, Strategy, WorkloadOptions, batch_count, batch_range, scale_to_rows,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// benchmark suite for the plain uuid-string primary key
pub struct UuidBench {
    dal: UuidDal,
}

impl UuidBench {
    pub fn new(dal: UuidDal) -> Self {
        Self { dal }
    }

    /// inserts `count` fixture rows in batches, untimed, and returns their
    /// keys in creation order. `tag` keeps each workload's rows apart in the
    /// table.
    async fn seed(&self, count: usize, batch_size: usize, tag: &str) -> Result<Vec<String>> {
        let lower = tag.to_lowercase();
        let mut uuids = Vec::with_capacity(count);
        for batch in 0..batch_count(count, batch_size) {
            let records: Vec<UuidRecord> = batch_range(batch, batch_size, count)
                .map(|i| UuidRecord {
                    uuid: Uuid::new_v4().to_string(),
                    name: format!("{tag}Name_{i}"),
                    email: format!("{lower}_{i}@test.com"),
                    nickname: format!("{tag}Nickname_{i}"),
                })
                .collect();
            self.dal
                .insert_batch(&records)
                .await
                .with_context(|| format!("seeding batch {batch} of the {tag} fixtures"))?;
            uuids.extend(records.into_iter().map(|r| r.uuid));
        }
        info!("uuid: seeded {count} rows ({tag} fixtures)");
        Ok(uuids)
    }
}

#[async_trait]
impl BenchSuite for UuidBench {
    fn strategy(&self) -> Strategy {
        Strategy::Uuid
    }

    async fn create(&self, opts: &WorkloadOptions) -> Result<RunOutcome> {
        let dal = self.dal.clone();
        run_bounded("uuid/create", opts.operations, opts.concurrency, move |i| {
            let dal = dal.clone();
            async move {
                let record = UuidRecord {
                    uuid: Uuid::new_v4().to_string(),
                    name: format!("Name_{i}"),
                    email: format!("email_{i}@test.com"),
                    nickname: format!("Nickname_{i}"),
                };
                dal.create(&record).await
            }
        })
        .await
    }

    async fn insert_batch(&self, opts: &WorkloadOptions) -> Result<RunOutcome> {
        let rows = opts.operations;
        let batch_size = opts.batch_size.max(1);
        let dal = self.dal.clone();
        let succeeded = Arc::new(AtomicUsize::new(0));
        let counter = succeeded.clone();
        let outcome = run_bounded(
            "uuid/insert-batch",
            batch_count(rows, batch_size),
            opts.batch_concurrency,
            move |batch| {
                let dal = dal.clone();
                let succeeded = counter.clone();
                async move {
                    let records: Vec<UuidRecord> = batch_range(batch, batch_size, rows)
                        .map(|i| UuidRecord {
                            uuid: Uuid::new_v4().to_string(),
                            name: format!("Name_{i}"),
                            email: format!("email_{i}@test.com"),
                            nickname: format!("Nickname_{i}"),
                        })
                        .collect();
                    dal.insert_batch(&records).await?;
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
        let mut uuids = self.seed(opts.operations, opts.batch_size, "Test").await?;
        // random-access reads, not the insertion pattern
        uuids.shuffle(&mut rand::rng());
        let uuids = Arc::new(uuids);
        let dal = self.dal.clone();
        run_bounded("uuid/get", uuids.len(), opts.concurrency, move |i| {
            let dal = dal.clone();
            let uuids = uuids.clone();
            async move { dal.get_by_uuid(&uuids[i]).await.map(|_| ()) }
        })
        .await
    }

    async fn update(&self, opts: &WorkloadOptions) -> Result<RunOutcome> {
        let uuids = Arc::new(
            self.seed(opts.operations, opts.batch_size, "Original")
                .await?,
        );
        let dal = self.dal.clone();
        run_bounded("uuid/update", uuids.len(), opts.concurrency, move |i| {
            let dal = dal.clone();
            let uuids = uuids.clone();
            async move {
                let record = UuidRecord {
                    uuid: uuids[i].clone(),
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
        let uuids = Arc::new(
            self.seed(opts.operations, opts.batch_size, "Delete")
                .await?,
        );
        let dal = self.dal.clone();
        run_bounded("uuid/delete", uuids.len(), opts.concurrency, move |i| {
            let dal = dal.clone();
            let uuids = uuids.clone();
            async move { dal.delete(&uuids[i]).await }
        })
        .await
    }
}
