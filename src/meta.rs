use std::env;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Facts about the current run, captured once at session start.
///
/// `source_dir` and `module_name` are derived from `source_path` at capture
/// time and never recomputed. `ended_at` and `final_dir` are written exactly
/// once, at termination.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub source_path: PathBuf,
    pub source_dir: PathBuf,
    pub module_name: String,
    pub arguments: Vec<String>,
    pub user: String,
    pub os: String,
    pub runtime_version: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub final_dir: Option<PathBuf>,
}

impl RunMetadata {
    /// Capture run facts for the module at `source_file` (typically `file!()`).
    ///
    /// Never fails: a missing user falls back to `"unknown"`.
    pub fn capture(source_file: impl AsRef<Path>) -> Self {
        let source_path = source_file.as_ref().to_path_buf();

        let source_dir = match source_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let module_name = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let user = env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            source_path,
            source_dir,
            module_name,
            arguments: env::args().skip(1).collect(),
            user,
            os: format!("{} {}", env::consts::OS, env::consts::ARCH),
            runtime_version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
            ended_at: None,
            final_dir: None,
        }
    }

    /// Directory where per-run log files live until a final directory is chosen.
    pub fn logs_dir(&self) -> PathBuf {
        self.source_dir.join("logs")
    }

    /// `<module_name>_<start timestamp>.log`. The timestamp component uses
    /// `started_at`, so the name is stable for the lifetime of the run.
    pub fn log_file_name(&self) -> String {
        format!(
            "{}_{}.log",
            self.module_name,
            self.started_at.format("%Y%m%d%H%M%S")
        )
    }

    /// Resolve the log file path from the current metadata state.
    ///
    /// Callers needing a stable path across the run must resolve once and
    /// cache it before setting `final_dir`; the session does exactly that at
    /// construction and never re-binds its open file destination.
    pub fn resolve_log_path(&self) -> PathBuf {
        match &self.final_dir {
            Some(dir) => dir.join(self.log_file_name()),
            None => self.logs_dir().join(self.log_file_name()),
        }
    }

    /// Elapsed time between start and end as `<m>m <s>s <ms>ms <µs>µs`.
    ///
    /// Each component is the remainder after subtracting the coarser units,
    /// so the pieces always recompose to the full duration.
    pub fn elapsed(&self) -> Option<String> {
        self.ended_at
            .map(|end| format_elapsed(end - self.started_at))
    }
}

pub(crate) fn format_elapsed(duration: Duration) -> String {
    let mut micros = duration.num_microseconds().unwrap_or(0).max(0);

    let minutes = micros / 60_000_000;
    micros -= minutes * 60_000_000;

    let seconds = micros / 1_000_000;
    micros -= seconds * 1_000_000;

    let millis = micros / 1_000;
    micros -= millis * 1_000;

    format!("{minutes}m {seconds}s {millis}ms {micros}µs")
}
