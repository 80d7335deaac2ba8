//! Process-wide tracing setup: local-time formatter on stderr, an optional
//! log file attached after startup, and a filter that can be swapped at
//! runtime.

use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, reload};

const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// `time LEVEL target: fields`, dimmed and colored when ANSI is on.
struct ReportFormat;

impl ReportFormat {
    fn level_color(level: &Level) -> &'static str {
        match *level {
            Level::ERROR => "1;31",
            Level::WARN => "1;33",
            Level::INFO => "1;32",
            Level::DEBUG => "1;34",
            Level::TRACE => "1;35",
        }
    }
}

impl<S, N> FormatEvent<S, N> for ReportFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let stamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");

        if writer.has_ansi_escapes() {
            let color = Self::level_color(meta.level());
            write!(
                writer,
                "\x1b[2m{stamp}\x1b[0m \x1b[{color}m{:>5}\x1b[0m \x1b[36m{}\x1b[0m: ",
                meta.level(),
                meta.target()
            )?;
        } else {
            write!(writer, "{stamp} {:>5} {}: ", meta.level(), meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

type Shared<T> = Arc<Mutex<T>>;

fn lock<T>(shared: &Mutex<T>) -> MutexGuard<'_, T> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Log file target that drops records until a file is attached.
#[derive(Clone, Default)]
struct LogFile(Shared<Option<File>>);

struct LogFileWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for LogFileWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.as_mut().map_or(Ok(buf.len()), |f| f.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), |f| f.flush())
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileWriter(lock(&self.0))
    }
}

type ReloadFn = Box<dyn Fn(EnvFilter) -> Result<()> + Send + Sync>;

/// Handles kept after the subscriber is installed.
struct LogControl {
    reload: ReloadFn,
    file: LogFile,
}

static CONTROL: OnceLock<LogControl> = OnceLock::new();

fn control() -> Result<&'static LogControl> {
    CONTROL
        .get()
        .context("logging not yet initialized")
}

/// Parse a bare level (`DEBUG`, `warn`) or a full filter directive.
pub fn parse_filter(level: &str) -> Result<EnvFilter> {
    let level = level.trim();
    let directive = match level.to_ascii_lowercase().as_str() {
        bare @ ("error" | "warn" | "info" | "debug" | "trace" | "off") => bare.to_string(),
        _ => level.to_string(),
    };
    EnvFilter::try_new(&directive).with_context(|| format!("invalid log level '{level}'"))
}

/// Swap the active filter.
pub fn set_log_level(level: &str) -> Result<()> {
    let filter = parse_filter(level)?;
    (control()?.reload)(filter)
}

/// Append records to `path` as well. Replaces a previously attached file.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;
    *lock(&control()?.file.0) = Some(file);
    Ok(())
}

/// Install the global subscriber. Later calls are ignored.
///
/// `RUST_LOG` overrides the default of `info`. Records go to stderr so
/// command output on stdout stays clean.
pub fn init_logging() {
    let initial =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let (filter, handle) = reload::Layer::new(initial);
    let file = LogFile::default();

    let stderr = tracing_subscriber::fmt::layer()
        .event_format(ReportFormat)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);
    let to_file = tracing_subscriber::fmt::layer()
        .event_format(ReportFormat)
        .with_ansi(false)
        .with_writer(file.clone());

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(to_file)
        .try_init();

    if installed.is_ok() {
        let _ = CONTROL.set(LogControl {
            reload: Box::new(move |next| {
                handle
                    .reload(next)
                    .map_err(|e| anyhow::anyhow!("filter reload failed: {e}"))
            }),
            file,
        });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bare_levels_are_case_insensitive() {
        assert_eq!(parse_filter("DEBUG").unwrap().to_string(), "debug");
        assert_eq!(parse_filter(" warn ").unwrap().to_string(), "warn");
    }

    #[test]
    fn directives_pass_through() {
        let filter = parse_filter("report_core=trace").unwrap();

        assert_eq!(filter.to_string(), "report_core=trace");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_filter("report_core=loud").is_err());
    }

    #[test]
    fn detached_log_file_swallows_writes() {
        let file = LogFile::default();
        let mut writer = file.make_writer();

        assert_eq!(writer.write(b"dropped").unwrap(), 7);
        writer.flush().unwrap();
    }
}
