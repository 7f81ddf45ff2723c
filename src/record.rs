use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::severity::Severity;

const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S %z";

/// One emitted log record and the context it was captured with.
#[derive(Debug)]
pub struct Record<'a> {
    pub message: &'a str,
    pub severity: Severity,
    /// Dotted sink name; `root` for records emitted on the session itself.
    pub name: &'a str,
    pub timestamp: DateTime<Utc>,
    pub thread: String,
    pub pid: u32,
    /// Caller source location, from `#[track_caller]`.
    pub file: &'static str,
    pub line: u32,
    /// Error source attached to alert records, when the caller provided one.
    pub cause: Option<String>,
}

impl Record<'_> {
    fn meta_line(&self, level: &str) -> String {
        format!(
            "{} - {} - {}",
            self.timestamp.format(TIMESTAMP_FMT),
            self.name,
            level
        )
    }

    fn context_lines(&self) -> String {
        format!(
            "{} → pid {}\n{}:{}\nCAUSE: {}",
            self.thread,
            self.pid,
            self.file,
            self.line,
            self.cause.as_deref().unwrap_or("none")
        )
    }
}

/// Console rendering: no glyph; alerts carry the extended context block and a
/// colorized level name.
pub fn render_console(record: &Record) -> String {
    if record.severity.is_fyi() {
        format!(
            "{}\n{}",
            record.message,
            record.meta_line(record.severity.as_str())
        )
    } else {
        let level = match record.severity {
            Severity::Warning => record.severity.as_str().bright_yellow().to_string(),
            Severity::Error => record.severity.as_str().bright_red().to_string(),
            Severity::Critical => record.severity.as_str().bright_red().bold().to_string(),
            _ => record.severity.as_str().to_string(),
        };
        format!(
            "\n{}\n{}\n{}",
            record.message,
            record.meta_line(&level),
            record.context_lines()
        )
    }
}

/// File rendering: glyph-stamped, preceded by a blank separator line; alerts
/// carry the extended context block.
pub fn render_file(record: &Record) -> String {
    let head = format!(
        "\n{} {}\n{}",
        record.severity.glyph(),
        record.message,
        record.meta_line(record.severity.as_str())
    );
    if record.severity.is_fyi() {
        head
    } else {
        format!("{}\n{}", head, record.context_lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(severity: Severity) -> Record<'static> {
        Record {
            message: "disk scan finished",
            severity,
            name: "root",
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            thread: "main".to_string(),
            pid: 4242,
            file: "src/bin/scan.rs",
            line: 17,
            cause: None,
        }
    }

    #[test]
    fn console_fyi_is_short_and_glyph_free() {
        let rendered = render_console(&record(Severity::Info));
        assert_eq!(
            rendered,
            "disk scan finished\n2026-03-14 09:26:53 +0000 - root - INFO"
        );
    }

    #[test]
    fn console_alert_adds_context_without_glyph() {
        colored::control::set_override(false);
        let rendered = render_console(&record(Severity::Error));
        assert!(rendered.starts_with("\ndisk scan finished\n"));
        assert!(rendered.contains(" - root - ERROR"));
        assert!(rendered.contains("main → pid 4242"));
        assert!(rendered.contains("src/bin/scan.rs:17"));
        assert!(rendered.contains("CAUSE: none"));
        assert!(!rendered.contains('🟥'));
    }

    #[test]
    fn file_fyi_is_short_with_glyph() {
        let rendered = render_file(&record(Severity::Debug));
        assert_eq!(
            rendered,
            "\n⚪ disk scan finished\n2026-03-14 09:26:53 +0000 - root - DEBUG"
        );
    }

    #[test]
    fn file_alert_has_glyph_and_context() {
        let rendered = render_file(&record(Severity::Warning));
        assert!(rendered.contains("🟧 disk scan finished"));
        assert!(rendered.contains("main → pid 4242"));
        assert!(rendered.contains("CAUSE: none"));
    }

    #[test]
    fn attached_cause_is_rendered() {
        let mut rec = record(Severity::Critical);
        rec.cause = Some("permission denied".to_string());
        let rendered = render_file(&rec);
        assert!(rendered.contains("🟥🟥 disk scan finished"));
        assert!(rendered.contains("CAUSE: permission denied"));
    }
}
