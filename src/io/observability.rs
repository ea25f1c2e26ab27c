use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{EngineError, ErrorKind};

use super::unified::Format;

/// How bad a failed load or save was. Ordered, so it doubles as an alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IoSeverity {
    /// Informational event.
    Info,
    /// Reserved for non-fatal conditions.
    Warning,
    /// The call failed on its input (malformed data, schema mismatch, bad extension).
    Error,
    /// Critical error (missing files, permission problems, failed writes).
    Critical,
}

impl IoSeverity {
    /// Severity of a failed load/save: I/O failures are critical, everything else is an error.
    pub fn for_error(error: &EngineError) -> Self {
        match error.kind() {
            ErrorKind::Io => Self::Critical,
            _ => Self::Error,
        }
    }
}

/// Direction of an I/O call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOperation {
    /// Reading a file into a frame.
    Load,
    /// Writing a frame to a file.
    Save,
}

/// Context about a load or save attempt.
#[derive(Debug, Clone)]
pub struct IoContext {
    /// The file path involved.
    pub path: PathBuf,
    /// Format used.
    pub format: Format,
    /// Load or save.
    pub operation: IoOperation,
}

/// Stats reported on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoStats {
    /// Rows read or written.
    pub rows: usize,
    /// Columns read or written.
    pub columns: usize,
}

/// Callbacks for load/save outcomes. Every method has a no-op default.
pub trait IoObserver: Send + Sync {
    /// Called when a load/save succeeds.
    fn on_success(&self, _ctx: &IoContext, _stats: IoStats) {}

    /// Called when a load/save fails.
    fn on_failure(&self, _ctx: &IoContext, _severity: IoSeverity, _error: &EngineError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Forwards to [`Self::on_failure`] unless overridden.
    fn on_alert(&self, ctx: &IoContext, severity: IoSeverity, error: &EngineError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans every callback out to each wrapped observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IoObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn IoObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeObserver({} observers)", self.observers.len())
    }
}

impl IoObserver for CompositeObserver {
    fn on_success(&self, ctx: &IoContext, stats: IoStats) {
        self.observers.iter().for_each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IoContext, severity: IoSeverity, error: &EngineError) {
        self.observers
            .iter()
            .for_each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IoContext, severity: IoSeverity, error: &EngineError) {
        self.observers
            .iter()
            .for_each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Renders one observer callback as a single log line (without timestamp).
fn render(ctx: &IoContext, outcome: Outcome<'_>) -> String {
    let head = format!(
        "op={:?} format={:?} path={}",
        ctx.operation,
        ctx.format,
        ctx.path.display()
    );
    match outcome {
        Outcome::Ok(stats) => format!("ok {head} rows={} columns={}", stats.rows, stats.columns),
        Outcome::Failed(severity, error) => format!("fail severity={severity:?} {head} err={error}"),
        Outcome::Alert(severity, error) => format!("ALERT severity={severity:?} {head} err={error}"),
    }
}

#[derive(Clone, Copy)]
enum Outcome<'a> {
    Ok(IoStats),
    Failed(IoSeverity, &'a EngineError),
    Alert(IoSeverity, &'a EngineError),
}

/// Logs I/O events to stderr with a `[dpa][io]` prefix.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IoObserver for StdErrObserver {
    fn on_success(&self, ctx: &IoContext, stats: IoStats) {
        eprintln!("[dpa][io] {}", render(ctx, Outcome::Ok(stats)));
    }

    fn on_failure(&self, ctx: &IoContext, severity: IoSeverity, error: &EngineError) {
        eprintln!("[dpa][io] {}", render(ctx, Outcome::Failed(severity, error)));
    }

    fn on_alert(&self, ctx: &IoContext, severity: IoSeverity, error: &EngineError) {
        eprintln!("[dpa][io] {}", render(ctx, Outcome::Alert(severity, error)));
    }
}

/// Appends timestamped I/O events to a local log file, one line per callback.
///
/// Logging never fails the I/O call it reports on: open/write errors on the log are dropped.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    pub fn new(log_path: impl AsRef<Path>) -> Self {
        Self {
            path: log_path.as_ref().to_owned(),
            lock: Mutex::new(()),
        }
    }

    fn write(&self, ctx: &IoContext, outcome: Outcome<'_>) {
        let line = format!("{} {}", unix_ts(), render(ctx, outcome));
        let _serialized = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let opened = OpenOptions::new().create(true).append(true).open(&self.path);
        if let Ok(mut file) = opened {
            let _ = writeln!(file, "{line}");
        }
    }
}

impl IoObserver for FileObserver {
    fn on_success(&self, ctx: &IoContext, stats: IoStats) {
        self.write(ctx, Outcome::Ok(stats));
    }

    fn on_failure(&self, ctx: &IoContext, severity: IoSeverity, error: &EngineError) {
        self.write(ctx, Outcome::Failed(severity, error));
    }

    fn on_alert(&self, ctx: &IoContext, severity: IoSeverity, error: &EngineError) {
        self.write(ctx, Outcome::Alert(severity, error));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{render, IoContext, IoOperation, IoSeverity, IoStats, Outcome};
    use crate::error::EngineError;
    use crate::io::Format;

    fn ctx() -> IoContext {
        IoContext {
            path: PathBuf::from("data/t.csv"),
            format: Format::Csv,
            operation: IoOperation::Load,
        }
    }

    #[test]
    fn lines_carry_outcome_and_context() {
        let ok = render(&ctx(), Outcome::Ok(IoStats { rows: 4, columns: 2 }));
        assert_eq!(ok, "ok op=Load format=Csv path=data/t.csv rows=4 columns=2");

        let err = EngineError::argument("bad");
        let alert = render(&ctx(), Outcome::Alert(IoSeverity::Critical, &err));
        assert!(alert.starts_with("ALERT severity=Critical op=Load"), "{alert}");
        assert!(alert.ends_with("err=invalid argument: bad"), "{alert}");
    }

    #[test]
    fn severity_follows_error_kind() {
        let io = EngineError::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(IoSeverity::for_error(&io), IoSeverity::Critical);
        let parse = EngineError::syntax(0, "x");
        assert_eq!(IoSeverity::for_error(&parse), IoSeverity::Error);
    }
}
