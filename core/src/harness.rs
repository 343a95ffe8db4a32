use anyhow::{Result, anyhow};
use log::debug;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// the error of the lowest-indexed operation that failed
#[derive(Debug)]
pub struct FirstError {
    pub index: usize,
    pub error: anyhow::Error,
}

/// aggregate result of one bounded fan-out run
#[derive(Debug)]
pub struct RunOutcome {
    pub total: usize,
    pub failed: usize,
    pub elapsed: Duration,
    pub first_error: Option<FirstError>,
}

impl RunOutcome {
    pub fn succeeded(&self) -> usize {
        self.total - self.failed
    }

    /// operations per wall-clock second, 0.0 for an empty run
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total as f64 / secs
        } else {
            0.0
        }
    }
}

/// runs `op(i)` for every `i in 0..total` with at most `limit` operations in
/// flight, waits for all of them and times the whole fan-out.
///
/// a permit is taken before each operation future is built, so whatever work
/// the closure does counts against the bound. handles are joined in
/// submission order, which makes `first_error` the lowest failed index no
/// matter how completions interleave. a panicked operation counts as failed;
/// failures never cancel the remaining operations. a `limit` of 0 is treated
/// as 1.
pub async fn run_bounded<F, Fut>(
    label: &str,
    total: usize,
    limit: usize,
    op: F,
) -> Result<RunOutcome>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let limit = limit.max(1);
    let permits = Arc::new(Semaphore::new(limit));
    debug!("{label}: dispatching {total} operations, at most {limit} in flight");

    let started = Instant::now();
    let mut handles = Vec::with_capacity(total);
    for index in 0..total {
        let permit = permits.clone().acquire_owned().await?;
        let fut = op(index);
        handles.push(tokio::spawn(async move {
            let _permit = permit;
            fut.await
        }));
    }

    let mut failed = 0;
    let mut first_error = None;
    for (index, handle) in handles.into_iter().enumerate() {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(anyhow!("operation {index} panicked: {e}")),
        };
        if let Err(error) = result {
            failed += 1;
            if first_error.is_none() {
                first_error = Some(FirstError { index, error });
            }
        }
    }
    let elapsed = started.elapsed();
    debug!("{label}: {total} operations finished in {elapsed:?}, {failed} failed");

    Ok(RunOutcome {
        total,
        failed,
        elapsed,
        first_error,
    })
}
