//! Run metrics for the shuffle and generate tools.
//!
//! A [`RunMetrics`] collects named counters and per-phase wall-clock timings
//! for a single invocation. It can be printed as a table or saved as JSON.
//!
//! # Example
//!
//! ```no_run
//! use csvshuf::metrics::RunMetrics;
//! use csvshuf::{shuffle_file_with_metrics, ShuffleOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut metrics = RunMetrics::new("shuffle");
//! shuffle_file_with_metrics("in.csv", "out.csv", &ShuffleOptions::default(), &mut metrics)?;
//! metrics.print();
//! metrics.save_to_file("metrics.json")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

/// Wall-clock time spent in one named phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseTiming {
    pub name: String,
    pub elapsed: Duration,
}

/// Counters and phase timings for one tool invocation.
#[derive(Clone, Debug)]
pub struct RunMetrics {
    tool: String,
    counters: BTreeMap<String, u64>,
    phases: Vec<PhaseTiming>,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
}

impl RunMetrics {
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            counters: BTreeMap::new(),
            phases: Vec::new(),
            start_time: None,
            end_time: None,
        }
    }

    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn record_start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn record_end(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Total elapsed time between [`record_start`](Self::record_start) and
    /// [`record_end`](Self::record_end), if both were called.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    /// Run `f`, recording how long it took under `name`.
    ///
    /// The timing is recorded even when `f` fails.
    ///
    /// # Errors
    /// Propagates the error returned by `f`.
    pub fn phase<T>(&mut self, name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let started = Instant::now();
        let out = f();
        self.phases.push(PhaseTiming {
            name: name.to_string(),
            elapsed: started.elapsed(),
        });
        out
    }

    #[must_use]
    pub fn phases(&self) -> &[PhaseTiming] {
        &self.phases
    }

    /// Add `value` to the counter `name`, creating it at zero first.
    pub fn increment_counter(&mut self, name: &str, value: u64) {
        *self.counters.entry(name.to_string()).or_insert(0) += value;
    }

    pub fn set_counter(&mut self, name: &str, value: u64) {
        self.counters.insert(name.to_string(), value);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.counters.get(name).copied()
    }

    /// All counters, phases and the total time as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let phases: Vec<Value> = self
            .phases
            .iter()
            .map(|p| json!({ "name": p.name, "elapsed_ms": p.elapsed.as_secs_f64() * 1000.0 }))
            .collect();
        let mut obj = json!({
            "tool": self.tool,
            "counters": self.counters,
            "phases": phases,
        });
        if let Some(elapsed) = self.elapsed() {
            obj["execution_time_ms"] = json!(elapsed.as_secs_f64() * 1000.0);
        }
        obj
    }

    /// Print the metrics to stdout in a human-readable format.
    pub fn print(&self) {
        println!("\n========== {} metrics ==========", self.tool);
        if let Some(elapsed) = self.elapsed() {
            println!(
                "Execution Time: {:.3}s ({} ms)",
                elapsed.as_secs_f64(),
                elapsed.as_millis()
            );
            println!("--------------------------------------");
        }
        for p in &self.phases {
            println!("phase {}: {:.3} ms", p.name, p.elapsed.as_secs_f64() * 1000.0);
        }
        for (name, value) in &self.counters {
            println!("{name}: {value}");
        }
        println!("======================================\n");
    }

    /// Save the metrics as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        file.write_all(formatted.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}
