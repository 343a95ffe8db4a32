use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use log::info;
use pkbench_core::config::Config;
use pkbench_core::dal::{Crc32Dal, SnowflakeDal, UuidDal};
use pkbench_core::db;
use pkbench_core::harness::run_bounded;
use pkbench_core::models::{Crc32Record, SnowflakeRecord, UuidRecord};
use std::future::Future;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// bulk loader for driving the benchmark tables toward the 100 million row mark
#[derive(Parser, Debug)]
#[command(name = "pkbench-seeder", version)]
struct Args {
    /// path to the json config file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// table to fill
    #[arg(long, value_enum, default_value = "uuid")]
    strategy: StrategyArg,

    /// rows to insert in this invocation
    #[arg(long, default_value_t = 1_000_000)]
    rows: u64,

    /// rows per insert statement
    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    /// cap on insert statements in flight
    #[arg(long, default_value_t = 30)]
    concurrency: usize,

    /// index of the first row, for resuming an interrupted load
    #[arg(long, default_value_t = 0)]
    offset: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Uuid,
    Crc32,
    Snowflake,
}

impl StrategyArg {
    fn as_str(self) -> &'static str {
        match self {
            StrategyArg::Uuid => "uuid",
            StrategyArg::Crc32 => "crc32",
            StrategyArg::Snowflake => "snowflake",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if !args.config.exists() {
        bail!(
            "config file {} not found, run `pkbench init` to create one",
            args.config.display()
        );
    }
    let config = Config::load(&args.config)?;
    let pool = db::connect(&config.database).await?;
    db::create_tables(&pool).await?;

    info!(
        "seeding {} rows into the {} table, starting at row {}",
        args.rows,
        args.strategy.as_str(),
        args.offset
    );

    match args.strategy {
        StrategyArg::Uuid => {
            let dal = UuidDal::new(pool.clone());
            run_seed("seed/uuid", &args, move |range| {
                let dal = dal.clone();
                async move {
                    let records: Vec<UuidRecord> = range
                        .map(|i| UuidRecord {
                            uuid: Uuid::new_v4().to_string(),
                            name: format!("Name_{i}"),
                            email: format!("email_{i}@test.com"),
                            nickname: format!("Nickname_{i}"),
                        })
                        .collect();
                    dal.insert_batch(&records).await
                }
            })
            .await?;
        }
        StrategyArg::Crc32 => {
            let dal = Crc32Dal::new(pool.clone());
            run_seed("seed/crc32", &args, move |range| {
                let dal = dal.clone();
                async move {
                    let records: Vec<Crc32Record> = range
                        .map(|i| {
                            Crc32Record::new(
                                Uuid::new_v4().to_string(),
                                format!("Name_{i}"),
                                format!("email_{i}@test.com"),
                                format!("Nickname_{i}"),
                            )
                        })
                        .collect();
                    dal.insert_batch(&records).await
                }
            })
            .await?;
        }
        StrategyArg::Snowflake => {
            let dal = SnowflakeDal::new(pool.clone())?;
            run_seed("seed/snowflake", &args, move |range| {
                let dal = dal.clone();
                async move {
                    let mut records: Vec<SnowflakeRecord> = range
                        .map(|i| SnowflakeRecord {
                            id: 0,
                            name: format!("Name_{i}"),
                            email: format!("email_{i}@test.com"),
                            nickname: format!("Nickname_{i}"),
                        })
                        .collect();
                    dal.insert_batch(&mut records).await
                }
            })
            .await?;
        }
    }

    pool.disconnect().await?;
    Ok(())
}

/// fans the batched inserts out through the harness, logging progress every
/// 100k rows and a rows/sec summary at the end
async fn run_seed<F, Fut>(label: &'static str, args: &Args, insert: F) -> Result<()>
where
    F: Fn(Range<u64>) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let rows = args.rows;
    let batch_size = args.batch_size.max(1) as u64;
    let offset = args.offset;
    let batches = rows.div_ceil(batch_size) as usize;

    let done = Arc::new(AtomicU64::new(0));
    let counter = done.clone();
    let outcome = run_bounded(label, batches, args.concurrency, move |batch| {
        let start = offset + batch as u64 * batch_size;
        let end = offset + rows.min(batch as u64 * batch_size + batch_size);
        let fut = insert(start..end);
        let done = counter.clone();
        async move {
            fut.await?;
            let n = end - start;
            let total = done.fetch_add(n, Ordering::Relaxed) + n;
            if total / 100_000 != (total - n) / 100_000 {
                info!("seeded {total} / {rows} rows");
            }
            Ok(())
        }
    })
    .await?;

    let inserted = done.load(Ordering::Relaxed);
    if outcome.failed > 0 {
        let detail = outcome
            .first_error
            .as_ref()
            .map(|e| format!(", first failure in statement {}: {:#}", e.index, e.error))
            .unwrap_or_default();
        bail!(
            "{} of {batches} insert statements failed{detail}",
            outcome.failed
        );
    }
    let elapsed = outcome.elapsed;
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 { inserted as f64 / secs } else { 0.0 };
    info!("inserted {inserted} rows in {elapsed:.1?} ({rate:.0} rows/sec)");
    Ok(())
}
