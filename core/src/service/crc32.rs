use crate::dal::Crc32Dal;
use crate::harness::{RunOutcome, run_bounded};
use crate::models::Crc32Record;
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

/// benchmark suite for the crc32+uuid composite primary key
pub struct Crc32Bench {
    dal: Crc32Dal,
}

impl Crc32Bench {
    pub fn new(dal: Crc32Dal) -> Self {
        Self { dal }
    }

    /// inserts `count` fixture rows in batches, untimed, and returns their
    /// keys in creation order
    async fn seed(&self, count: usize, batch_size: usize, tag: &str) -> Result<Vec<String>> {
        let lower = tag.to_lowercase();
        let mut uuids = Vec::with_capacity(count);
        for batch in 0..batch_count(count, batch_size) {
            let records: Vec<Crc32Record> = batch_range(batch, batch_size, count)
                .map(|i| {
                    Crc32Record::new(
                        Uuid::new_v4().to_string(),
                        format!("{tag}Name_{i}"),
                        format!("{lower}_{i}@test.com"),
                        format!("{tag}Nickname_{i}"),
                    )
                })
                .collect();
            self.dal
                .insert_batch(&records)
                .await
                .with_context(|| format!("seeding batch {batch} of the {tag} fixtures"))?;
            uuids.extend(records.into_iter().map(|r| r.uuid));
        }
        info!("crc32: seeded {count} rows ({tag} fixtures)");
        Ok(uuids)
    }
}

#[async_trait]
impl BenchSuite for Crc32Bench {
    fn strategy(&self) -> Strategy {
        Strategy::Crc32
    }

    async fn create(&self, opts: &WorkloadOptions) -> Result<RunOutcome> {
        let dal = self.dal.clone();
        run_bounded(
            "crc32/create",
            opts.operations,
            opts.concurrency,
            move |i| {
                let dal = dal.clone();
                async move {
                    let record = Crc32Record::new(
                        Uuid::new_v4().to_string(),
                        format!("Name_{i}"),
                        format!("email_{i}@test.com"),
                        format!("Nickname_{i}"),
                    );
                    dal.create(&record).await
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
            "crc32/insert-batch",
            batch_count(rows, batch_size),
            opts.batch_concurrency,
            move |batch| {
                let dal = dal.clone();
                let succeeded = counter.clone();
                async move {
                    let records: Vec<Crc32Record> = batch_range(batch, batch_size, rows)
                        .map(|i| {
                            Crc32Record::new(
                                Uuid::new_v4().to_string(),
                                format!("Name_{i}"),
                                format!("email_{i}@test.com"),
                                format!("Nickname_{i}"),
                            )
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
        uuids.shuffle(&mut rand::rng());
        let uuids = Arc::new(uuids);
        let dal = self.dal.clone();
        run_bounded("crc32/get", uuids.len(), opts.concurrency, move |i| {
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
        run_bounded("crc32/update", uuids.len(), opts.concurrency, move |i| {
            let dal = dal.clone();
            let uuids = uuids.clone();
            async move {
                let record = Crc32Record::new(
                    uuids[i].clone(),
                    format!("UpdatedName_{i}"),
                    format!("updated_{i}@test.com"),
                    format!("UpdatedNickname_{i}"),
                );
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
        run_bounded("crc32/delete", uuids.len(), opts.concurrency, move |i| {
            let dal = dal.clone();
            let uuids = uuids.clone();
            async move { dal.delete(&uuids[i]).await }
        })
        .await
    }
}
