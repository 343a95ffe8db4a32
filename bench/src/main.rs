use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use pkbench_core::config::Config;
use pkbench_core::dal::{Crc32Dal, SnowflakeDal, UuidDal};
use pkbench_core::db::{self, Pool};
use pkbench_core::report::{BenchReport, WorkloadReport};
use pkbench_core::service::{
    BenchSuite, Crc32Bench, SnowflakeBench, Strategy, UuidBench, Workload, WorkloadOptions,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "pkbench", about = "primary-key strategy benchmarks for mysql", version)]
struct Cli {
    /// path to the json config file
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// write a default config file to get started
    Init,
    /// create the three benchmark tables
    Setup,
    /// truncate the three benchmark tables
    Clean,
    /// run benchmark workloads and print a comparison table
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// primary-key strategy to benchmark
    #[arg(long, value_enum, default_value = "all")]
    strategy: StrategyArg,

    /// workload to run
    #[arg(long, value_enum, default_value = "all")]
    workload: WorkloadArg,

    /// rows touched by each workload
    #[arg(long, default_value_t = 10_000)]
    ops: usize,

    /// cap on single-row operations in flight
    #[arg(long, default_value_t = 80)]
    concurrency: usize,

    /// rows per multi-row insert statement
    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    /// cap on multi-row inserts in flight
    #[arg(long, default_value_t = 30)]
    batch_concurrency: usize,

    /// also write the results to this file as json
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Uuid,
    Crc32,
    Snowflake,
    All,
}

impl StrategyArg {
    fn selected(self) -> Vec<Strategy> {
        match self {
            StrategyArg::Uuid => vec![Strategy::Uuid],
            StrategyArg::Crc32 => vec![Strategy::Crc32],
            StrategyArg::Snowflake => vec![Strategy::Snowflake],
            StrategyArg::All => Strategy::ALL.to_vec(),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum WorkloadArg {
    Create,
    InsertBatch,
    Get,
    Update,
    Delete,
    All,
}

impl WorkloadArg {
    fn selected(self) -> Vec<Workload> {
        match self {
            WorkloadArg::Create => vec![Workload::Create],
            WorkloadArg::InsertBatch => vec![Workload::InsertBatch],
            WorkloadArg::Get => vec![Workload::Get],
            WorkloadArg::Update => vec![Workload::Update],
            WorkloadArg::Delete => vec![Workload::Delete],
            WorkloadArg::All => Workload::ALL.to_vec(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Init => {
            let config = Config::write_default(&cli.config)?;
            info!(
                "wrote default config to {} (database {})",
                cli.config.display(),
                config.database.database
            );
            Ok(())
        }
        Command::Setup => {
            let pool = connect(&cli.config).await?;
            db::create_tables(&pool).await?;
            pool.disconnect().await?;
            Ok(())
        }
        Command::Clean => {
            let pool = connect(&cli.config).await?;
            db::truncate_tables(&pool).await?;
            info!("benchmark tables truncated");
            pool.disconnect().await?;
            Ok(())
        }
        Command::Run(args) => run(&cli.config, args).await,
    }
}

/// loads the config and opens the pool, pointing at `init` when the config
/// file is missing
async fn connect(path: &Path) -> Result<Pool> {
    if !path.exists() {
        bail!(
            "config file {} not found, run `pkbench init` to create one",
            path.display()
        );
    }
    let config = Config::load(path)?;
    db::connect(&config.database).await
}

async fn run(config_path: &Path, args: RunArgs) -> Result<()> {
    let opts = WorkloadOptions {
        operations: args.ops,
        concurrency: args.concurrency,
        batch_size: args.batch_size,
        batch_concurrency: args.batch_concurrency,
    };
    let pool = connect(config_path).await?;

    let mut report = BenchReport::new();
    for strategy in args.strategy.selected() {
        let suite: Box<dyn BenchSuite> = match strategy {
            Strategy::Uuid => Box::new(UuidBench::new(UuidDal::new(pool.clone()))),
            Strategy::Crc32 => Box::new(Crc32Bench::new(Crc32Dal::new(pool.clone()))),
            Strategy::Snowflake => Box::new(SnowflakeBench::new(SnowflakeDal::new(pool.clone())?)),
        };
        for workload in args.workload.selected() {
            let in_flight = if workload == Workload::InsertBatch {
                opts.batch_concurrency
            } else {
                opts.concurrency
            };
            info!(
                "running {strategy}/{workload}: {} ops, at most {in_flight} in flight",
                opts.operations
            );
            let outcome = suite.run(workload, &opts).await?;
            info!(
                "{strategy}/{workload}: {} ops in {} ms, {} failed",
                outcome.total,
                outcome.elapsed.as_millis(),
                outcome.failed
            );
            report.push(WorkloadReport::from_outcome(strategy, workload, &outcome));
        }
    }

    report.print_table();
    if let Some(path) = &args.json {
        report.save_json(path)?;
        info!("report written to {}", path.display());
    }
    pool.disconnect().await?;

    if report.has_failures() {
        bail!("some operations failed, see the table above");
    }
    Ok(())
}
