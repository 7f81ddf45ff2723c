use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::LogError;
use crate::message::AlertMessage;
use crate::meta::RunMetadata;
use crate::record::{render_console, render_file, Record};
use crate::severity::Severity;

/// Sink name for records emitted on the session itself.
const ROOT_SINK: &str = "root";

/// Which half of the severity range a destination subscribes to.
#[derive(Debug, Clone, Copy)]
enum Route {
    Fyi,
    Alert,
}

impl Route {
    fn accepts(self, severity: Severity) -> bool {
        match self {
            Route::Fyi => severity.is_fyi(),
            Route::Alert => severity.is_alert(),
        }
    }
}

type SharedFile = Arc<Mutex<BufWriter<File>>>;
type SharedWriter = Arc<Mutex<dyn Write + Send>>;

enum Target {
    Console(SharedWriter),
    File(SharedFile),
}

impl Target {
    fn console() -> Self {
        Target::Console(Arc::new(Mutex::new(io::stderr())))
    }
}

/// One physical sink: a minimum level, a route predicate, and a render
/// template implied by the target kind. A record is delivered iff both the
/// threshold and the predicate accept it.
struct Destination {
    min: Severity,
    route: Route,
    target: Target,
}

impl Destination {
    fn deliver(&self, record: &Record) {
        if record.severity < self.min || !self.route.accepts(record.severity) {
            return;
        }
        match &self.target {
            Target::Console(writer) => {
                if let Ok(mut writer) = writer.lock() {
                    let _ = writeln!(writer, "{}", render_console(record));
                }
            }
            Target::File(handle) => {
                if let Ok(mut writer) = handle.lock() {
                    let _ = writeln!(writer, "{}", render_file(record));
                    let _ = writer.flush();
                }
            }
        }
    }
}

/// One run's logging context, from construction to termination.
///
/// Construction captures run metadata, creates the `logs/` directory when
/// missing, opens the per-run log file, wires the destinations, and writes the
/// header banner. [`LogSession::terminate`] consumes the session, so emitting
/// after termination (or terminating twice) is a compile error rather than a
/// caller discipline.
pub struct LogSession {
    meta: RunMetadata,
    log_path: Option<PathBuf>,
    destinations: Vec<Destination>,
}

impl LogSession {
    /// Start a file-backed session for the module at `source_file`
    /// (typically `file!()`).
    ///
    /// The log file lives at `<source_dir>/logs/<module>_<timestamp>.log`,
    /// opened in append mode. The path is frozen here; setting a final
    /// directory at termination selects a copy target and never re-binds the
    /// open file.
    pub fn new(source_file: impl AsRef<Path>) -> Result<Self, LogError> {
        let meta = RunMetadata::capture(source_file);

        let logs_dir = meta.logs_dir();
        let created_logs_dir = !logs_dir.exists();
        if created_logs_dir {
            fs::create_dir_all(&logs_dir).map_err(|source| LogError::CreateDir {
                path: logs_dir.clone(),
                source,
            })?;
            warn!(path = %logs_dir.display(), "created missing logs directory");
        }

        let log_path = meta.resolve_log_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|source| LogError::OpenFile {
                path: log_path.clone(),
                source,
            })?;
        debug!(path = %log_path.display(), "log file opened");
        let handle: SharedFile = Arc::new(Mutex::new(BufWriter::new(file)));

        let destinations = vec![
            Destination {
                min: Severity::Debug,
                route: Route::Fyi,
                target: Target::File(handle.clone()),
            },
            Destination {
                min: Severity::Warning,
                route: Route::Alert,
                target: Target::File(handle),
            },
            Destination {
                min: Severity::Warning,
                route: Route::Alert,
                target: Target::console(),
            },
        ];

        let session = Self {
            meta,
            log_path: Some(log_path),
            destinations,
        };
        session.info(session.header());

        if created_logs_dir {
            let banner = AlertMessage::new("Logs directory created")
                .details(format!(
                    "Module uses logging and needs a log directory.\n\
                     A directory for logs did not exist in {}.\n\
                     Therefore, the logger created {}.",
                    session.meta.source_dir.display(),
                    session.meta.logs_dir().display()
                ))
                .render();
            session.warning(banner);
        }

        Ok(session)
    }

    /// Start a console-only session: FYI and ALERT records both go to stderr,
    /// no file is created, and a final directory passed to
    /// [`LogSession::terminate`] is ignored — there is nothing to copy.
    pub fn console_only(source_file: impl AsRef<Path>) -> Self {
        let meta = RunMetadata::capture(source_file);
        let destinations = vec![
            Destination {
                min: Severity::Debug,
                route: Route::Fyi,
                target: Target::console(),
            },
            Destination {
                min: Severity::Warning,
                route: Route::Alert,
                target: Target::console(),
            },
        ];
        let session = Self {
            meta,
            log_path: None,
            destinations,
        };
        session.info(session.header());
        session
    }

    pub fn meta(&self) -> &RunMetadata {
        &self.meta
    }

    /// Path of the per-run log file, if this session is file-backed.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// A child sink sharing this session's destinations; its records are
    /// tagged with `name` (dotted path) instead of `root`.
    pub fn scoped(&self, name: impl Into<String>) -> ScopedLog<'_> {
        ScopedLog {
            session: self,
            name: name.into(),
        }
    }

    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.emit(ROOT_SINK, Severity::Debug, message.as_ref(), Location::caller(), None);
    }

    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(ROOT_SINK, Severity::Info, message.as_ref(), Location::caller(), None);
    }

    #[track_caller]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.emit(ROOT_SINK, Severity::Warning, message.as_ref(), Location::caller(), None);
    }

    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(ROOT_SINK, Severity::Error, message.as_ref(), Location::caller(), None);
    }

    #[track_caller]
    pub fn critical(&self, message: impl AsRef<str>) {
        self.emit(ROOT_SINK, Severity::Critical, message.as_ref(), Location::caller(), None);
    }

    /// Error record carrying the failure that caused it.
    #[track_caller]
    pub fn error_with(&self, message: impl AsRef<str>, source: &dyn std::error::Error) {
        self.emit(
            ROOT_SINK,
            Severity::Error,
            message.as_ref(),
            Location::caller(),
            Some(source.to_string()),
        );
    }

    /// Critical record carrying the failure that caused it.
    #[track_caller]
    pub fn critical_with(&self, message: impl AsRef<str>, source: &dyn std::error::Error) {
        self.emit(
            ROOT_SINK,
            Severity::Critical,
            message.as_ref(),
            Location::caller(),
            Some(source.to_string()),
        );
    }

    /// End the session: stamp the end time, write the footer banner, flush and
    /// close the log file, then copy it to `final_dir` when one is given.
    ///
    /// Returns the path the log lives at afterward — the copy target when a
    /// copy happened, the frozen log path otherwise, `None` for console-only
    /// sessions (which also ignore `final_dir`). The copy target must already
    /// exist; a failed copy is returned as [`LogError::Copy`], never
    /// swallowed.
    pub fn terminate(mut self, final_dir: Option<&Path>) -> Result<Option<PathBuf>, LogError> {
        self.meta.ended_at = Some(Utc::now());
        // A final directory only means something when there is a file to
        // copy; a console-only session ignores it.
        if self.log_path.is_some() {
            if let Some(dir) = final_dir {
                self.meta.final_dir = Some(dir.to_path_buf());
            }
        }

        self.info(self.footer());

        // Flush and drop the file destinations before any copy reads the
        // file, so the copy can never observe a truncated log.
        for destination in &self.destinations {
            if let Target::File(handle) = &destination.target {
                if let Ok(mut writer) = handle.lock() {
                    let _ = writer.flush();
                }
            }
        }
        self.destinations.clear();

        let Some(log_path) = self.log_path.take() else {
            return Ok(None);
        };

        match &self.meta.final_dir {
            Some(dir) => {
                let target = dir.join(self.meta.log_file_name());
                fs::copy(&log_path, &target).map_err(|source| LogError::Copy {
                    dest: target.clone(),
                    source,
                })?;
                debug!(from = %log_path.display(), to = %target.display(), "log file copied");
                Ok(Some(target))
            }
            None => Ok(Some(log_path)),
        }
    }

    fn header(&self) -> String {
        let log_line = match &self.log_path {
            Some(path) => path.display().to_string(),
            None => "(console only)".to_string(),
        };
        format!(
            "BEGIN LOGGING...\n\
             START: {}\n\
             USER: {}\n\
             OPERATING SYSTEM: {}\n\
             RUNLOG VERSION: {}\n\
             ROOT: {}\n\
             ARGUMENTS: {}\n\
             LOG: {}\n\
             ========== STARTING ==========",
            self.meta.started_at.to_rfc3339(),
            self.meta.user,
            self.meta.os,
            self.meta.runtime_version,
            self.meta.source_path.display(),
            self.meta.arguments.join(" "),
            log_line,
        )
    }

    fn footer(&self) -> String {
        let mut footer = String::from("========== ENDING ==========\n");

        // The copied note requires an actual file; a session without one has
        // nothing to copy regardless of what was requested.
        if self.meta.final_dir.is_some() && self.log_path.is_some() {
            footer.push_str("Log copied to specified directory.\n");
        } else {
            footer.push_str("*** Final log directory not specified. ***\n");
        }

        let log_line = match &self.log_path {
            Some(path) => path.display().to_string(),
            None => "(console only)".to_string(),
        };
        let end = self
            .meta
            .ended_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        footer.push('\n');
        footer.push_str(&format!("LOG: {}\n", log_line));
        footer.push('\n');
        footer.push_str(&format!("  END: {}\n", end));
        footer.push_str(&format!("- START: {}\n", self.meta.started_at.to_rfc3339()));
        footer.push_str(&format!(
            "= ELAPSED: {}",
            self.meta.elapsed().unwrap_or_default()
        ));

        footer
    }

    fn emit(
        &self,
        name: &str,
        severity: Severity,
        message: &str,
        caller: &'static Location<'static>,
        cause: Option<String>,
    ) {
        let current = thread::current();
        let record = Record {
            message,
            severity,
            name,
            timestamp: Utc::now(),
            thread: current.name().unwrap_or("unnamed").to_string(),
            pid: process::id(),
            file: caller.file(),
            line: caller.line(),
            cause,
        };
        for destination in &self.destinations {
            destination.deliver(&record);
        }
    }
}

/// Child sink handle; see [`LogSession::scoped`].
pub struct ScopedLog<'a> {
    session: &'a LogSession,
    name: String,
}

impl ScopedLog<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.session
            .emit(&self.name, Severity::Debug, message.as_ref(), Location::caller(), None);
    }

    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.session
            .emit(&self.name, Severity::Info, message.as_ref(), Location::caller(), None);
    }

    #[track_caller]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.session
            .emit(&self.name, Severity::Warning, message.as_ref(), Location::caller(), None);
    }

    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>) {
        self.session
            .emit(&self.name, Severity::Error, message.as_ref(), Location::caller(), None);
    }

    #[track_caller]
    pub fn critical(&self, message: impl AsRef<str>) {
        self.session
            .emit(&self.name, Severity::Critical, message.as_ref(), Location::caller(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(severity: Severity) -> Record<'static> {
        Record {
            message: "pressure threshold crossed",
            severity,
            name: "root",
            timestamp: Utc::now(),
            thread: "main".to_string(),
            pid: 7,
            file: "src/bin/scan.rs",
            line: 1,
            cause: None,
        }
    }

    /// Helper: a console destination writing into a capture buffer.
    fn capture_destination(min: Severity, route: Route) -> (Destination, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let destination = Destination {
            min,
            route,
            target: Target::Console(buffer.clone()),
        };
        (destination, buffer)
    }

    fn captured(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn console_alert_destination_receives_warnings_without_glyph() {
        colored::control::set_override(false);
        let (destination, buffer) = capture_destination(Severity::Warning, Route::Alert);

        destination.deliver(&record(Severity::Warning));

        let output = captured(&buffer);
        assert!(output.contains("pressure threshold crossed"));
        assert!(output.contains(" - root - WARNING"));
        assert!(!output.contains('🟧'));
    }

    #[test]
    fn console_alert_destination_rejects_fyi_records() {
        let (destination, buffer) = capture_destination(Severity::Warning, Route::Alert);

        destination.deliver(&record(Severity::Debug));
        destination.deliver(&record(Severity::Info));

        assert!(captured(&buffer).is_empty());
    }

    #[test]
    fn console_fyi_destination_rejects_alerts() {
        let (destination, buffer) = capture_destination(Severity::Debug, Route::Fyi);

        destination.deliver(&record(Severity::Error));
        assert!(captured(&buffer).is_empty());

        destination.deliver(&record(Severity::Debug));
        assert!(captured(&buffer).contains(" - root - DEBUG"));
    }

    #[test]
    fn console_only_footer_never_claims_a_copy() {
        let dir = TempDir::new().unwrap();
        let mut session = LogSession::console_only(dir.path().join("tool.rs"));
        session.meta.ended_at = Some(Utc::now());
        // Even with a final directory recorded, a session without a file has
        // nothing to copy and the footer must not say otherwise.
        session.meta.final_dir = Some(dir.path().to_path_buf());

        let footer = session.footer();
        assert!(footer.contains("*** Final log directory not specified. ***"));
        assert!(!footer.contains("Log copied to specified directory."));
    }
}
