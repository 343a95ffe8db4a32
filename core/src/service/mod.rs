mod crc32;
mod snowflake;
mod uuid;

pub use self::crc32::Crc32Bench;
pub use self::snowflake::SnowflakeBench;
pub use self::uuid::UuidBench;

use crate::harness::RunOutcome;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::ops::Range;

/// which primary-key design a suite drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Uuid,
    Crc32,
    Snowflake,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Uuid, Strategy::Crc32, Strategy::Snowflake];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Uuid => "uuid",
            Strategy::Crc32 => "crc32",
            Strategy::Snowflake => "snowflake",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// one timed benchmark shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    Create,
    InsertBatch,
    Get,
    Update,
    Delete,
}

impl Workload {
    pub const ALL: [Workload; 5] = [
        Workload::Create,
        Workload::InsertBatch,
        Workload::Get,
        Workload::Update,
        Workload::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Workload::Create => "create",
            Workload::InsertBatch => "insert-batch",
            Workload::Get => "get",
            Workload::Update => "update",
            Workload::Delete => "delete",
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// tuning for one workload run
#[derive(Debug, Clone, Copy)]
pub struct WorkloadOptions {
    /// rows touched by each workload
    pub operations: usize,
    /// cap on single-row operations in flight
    pub concurrency: usize,
    /// rows per multi-row insert statement
    pub batch_size: usize,
    /// cap on multi-row inserts in flight
    pub batch_concurrency: usize,
}

impl Default for WorkloadOptions {
    fn default() -> Self {
        Self {
            operations: 10_000,
            concurrency: 80,
            batch_size: 100,
            batch_concurrency: 30,
        }
    }
}

/// a full benchmark suite for one primary-key strategy.
///
/// the seeding that `get`, `update` and `delete` need happens inside the
/// respective method, before the timer starts; only the fan-out is measured.
#[async_trait]
pub trait BenchSuite: Send + Sync {
    fn strategy(&self) -> Strategy;

    /// times `operations` single-row inserts
    async fn create(&self, opts: &WorkloadOptions) -> Result<RunOutcome>;
    /// times `operations` rows inserted through multi-row statements
    async fn insert_batch(&self, opts: &WorkloadOptions) -> Result<RunOutcome>;
    /// times shuffled point lookups over freshly seeded rows
    async fn get(&self, opts: &WorkloadOptions) -> Result<RunOutcome>;
    /// times full-row updates over freshly seeded rows
    async fn update(&self, opts: &WorkloadOptions) -> Result<RunOutcome>;
    /// times deletes over freshly seeded rows
    async fn delete(&self, opts: &WorkloadOptions) -> Result<RunOutcome>;

    async fn run(&self, workload: Workload, opts: &WorkloadOptions) -> Result<RunOutcome> {
        match workload {
            Workload::Create => self.create(opts).await,
            Workload::InsertBatch => self.insert_batch(opts).await,
            Workload::Get => self.get(opts).await,
            Workload::Update => self.update(opts).await,
            Workload::Delete => self.delete(opts).await,
        }
    }
}

/// number of statements needed to insert `rows` in chunks of `batch_size`
pub(crate) fn batch_count(rows: usize, batch_size: usize) -> usize {
    rows.div_ceil(batch_size.max(1))
}

/// row indexes covered by statement `batch`; a zero batch size is treated
/// as 1, like `batch_count`
pub(crate) fn batch_range(batch: usize, batch_size: usize, rows: usize) -> Range<usize> {
    let batch_size = batch_size.max(1);
    let start = batch * batch_size;
    start..rows.min(start + batch_size)
}

/// statement-level outcomes are reported in row units like the single-row
/// workloads. `succeeded_rows` is counted by the statements themselves, so a
/// short tail statement contributes only the rows it actually carried; the
/// first error index becomes the first row of its batch.
pub(crate) fn scale_to_rows(
    mut outcome: RunOutcome,
    rows: usize,
    succeeded_rows: usize,
    batch_size: usize,
) -> RunOutcome {
    outcome.total = rows;
    outcome.failed = rows.saturating_sub(succeeded_rows);
    if let Some(first) = outcome.first_error.as_mut() {
        first.index *= batch_size;
    }
    outcome
}
