use crate::harness::RunOutcome;
use crate::service::{Strategy, Workload};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// one timed workload, flattened for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadReport {
    pub strategy: String,
    pub workload: String,
    pub operations: usize,
    pub failed: usize,
    pub elapsed_ms: u64,
    pub ops_per_sec: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_error: Option<String>,
}

impl WorkloadReport {
    pub fn from_outcome(strategy: Strategy, workload: Workload, outcome: &RunOutcome) -> Self {
        Self {
            strategy: strategy.to_string(),
            workload: workload.to_string(),
            operations: outcome.total,
            failed: outcome.failed,
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            ops_per_sec: outcome.ops_per_sec(),
            first_error: outcome
                .first_error
                .as_ref()
                .map(|e| format!("operation {}: {:#}", e.index, e.error)),
        }
    }
}

/// everything one benchmark invocation measured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub started_at: String,
    pub results: Vec<WorkloadReport>,
}

impl BenchReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now().to_rfc3339(),
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, report: WorkloadReport) {
        self.results.push(report);
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| r.failed > 0)
    }

    /// prints the fixed-width comparison table
    pub fn print_table(&self) {
        println!(
            "{:<10}  {:<13}  {:>10}  {:>8}  {:>12}  {:>12}",
            "strategy", "workload", "ops", "failed", "elapsed", "ops/sec"
        );
        println!("{}", "-".repeat(75));
        for r in &self.results {
            println!(
                "{:<10}  {:<13}  {:>10}  {:>8}  {:>12}  {:>12.0}",
                r.strategy,
                r.workload,
                r.operations,
                r.failed,
                format_ms(r.elapsed_ms),
                r.ops_per_sec
            );
        }
    }

    /// writes the report as pretty-printed json
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("writing report to {}", path.display()))?;
        Ok(())
    }
}

impl Default for BenchReport {
    fn default() -> Self {
        Self::new()
    }
}

/// renders milliseconds with a coarser unit once they get noisy
pub fn format_ms(ms: u64) -> String {
    if ms >= 60_000 {
        format!("{:.1} min", ms as f64 / 60_000.0)
    } else if ms >= 10_000 {
        format!("{:.1} s", ms as f64 / 1000.0)
    } else {
        format!("{ms} ms")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::FirstError;
    use anyhow::anyhow;
    use std::time::Duration;

    fn outcome() -> RunOutcome {
        RunOutcome {
            total: 10_000,
            failed: 3,
            elapsed: Duration::from_millis(2000),
            first_error: Some(FirstError {
                index: 42,
                error: anyhow!("duplicate key"),
            }),
        }
    }

    #[test]
    fn report_rows_carry_the_outcome() {
        let report = WorkloadReport::from_outcome(Strategy::Uuid, Workload::Create, &outcome());
        assert_eq!(report.strategy, "uuid");
        assert_eq!(report.workload, "create");
        assert_eq!(report.operations, 10_000);
        assert_eq!(report.failed, 3);
        assert_eq!(report.elapsed_ms, 2000);
        assert_eq!(report.ops_per_sec, 5000.0);
        assert_eq!(
            report.first_error.as_deref(),
            Some("operation 42: duplicate key")
        );
    }

    #[test]
    fn clean_runs_serialize_without_an_error_field() {
        let clean = RunOutcome {
            total: 10,
            failed: 0,
            elapsed: Duration::from_millis(5),
            first_error: None,
        };
        let report = WorkloadReport::from_outcome(Strategy::Crc32, Workload::Get, &clean);
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("first_error"));
    }

    #[test]
    fn report_json_round_trips_through_disk() {
        let mut report = BenchReport::new();
        report.push(WorkloadReport::from_outcome(
            Strategy::Snowflake,
            Workload::Delete,
            &outcome(),
        ));
        assert!(report.has_failures());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.save_json(&path).unwrap();

        let loaded: BenchReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.started_at, report.started_at);
        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].workload, "delete");
        assert_eq!(loaded.results[0].failed, 3);
    }

    #[test]
    fn elapsed_formatting_picks_a_readable_unit() {
        assert_eq!(format_ms(950), "950 ms");
        assert_eq!(format_ms(12_340), "12.3 s");
        assert_eq!(format_ms(90_000), "1.5 min");
    }
}
