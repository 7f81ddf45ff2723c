//! # runlog
//!
//! Per-run log files with severity routing and run-metadata banners.
//!
//! A [`LogSession`] owns one run's logging context: it creates a
//! `logs/` directory next to the invoking source file when missing, opens a
//! per-run log file named `<module>_<timestamp>.log`, and routes records by
//! severity — FYI records (debug, info) to the file, ALERT records (warning
//! and above) to both the file and stderr. File-bound records carry a
//! severity glyph; console records do not. Terminating the session writes a
//! footer with end/elapsed times and can copy the finished file to a final
//! directory.
//!
//! ## Key Types
//!
//! - [`LogSession`] - One run's logging context, construction to termination
//! - [`Severity`] - Ordered record severities with FYI/ALERT routing
//! - [`AlertMessage`] - Title/details/suggestions banner for alert records
//! - [`var_value`] - `name (type): value` debug formatting
//!
//! ## Example
//!
//! ```no_run
//! use runlog::{var_value, AlertMessage, LogSession};
//!
//! fn main() -> Result<(), runlog::LogError> {
//!     let log = LogSession::new(file!())?;
//!
//!     log.info("Trying actions…");
//!     log.debug(var_value("batch_size", &32));
//!
//!     if let Err(err) = std::fs::read("input.csv") {
//!         let banner = AlertMessage::new("Input file unreadable")
//!             .details("The input file could not be read.")
//!             .suggestions("Check the path and permissions, then retry.")
//!             .render();
//!         log.critical(banner);
//!         log.error_with("read failed", &err);
//!     }
//!
//!     log.terminate(None)?;
//!     Ok(())
//! }
//! ```

mod error;
mod message;
mod meta;
mod record;
mod session;
mod severity;
mod vardump;

pub use error::LogError;
pub use message::{AlertMessage, TRACE_TRAILER};
pub use meta::RunMetadata;
pub use record::Record;
pub use session::{LogSession, ScopedLog};
pub use severity::Severity;
pub use vardump::var_value;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize ambient tracing diagnostics for the application.
///
/// The library emits `tracing` breadcrumbs at lifecycle points (directory
/// creation, file open, termination copy); binaries that want to see them can
/// call this once at startup. `RUST_LOG` overrides `level` when set.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}
