//! Log output for the CLI.
//!
//! Events always go to stderr so stdout stays free for reports, exports and
//! host messages. A log file can be attached once the config is known.

use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, reload};

// --- Event format ---

/// `12:04:56.120  WARN savings_core::reconcile: message key=value`
struct CliFormat;

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

impl<S, N> FormatEvent<S, N> for CliFormat
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
        let timestamp = Local::now().format("%H:%M:%S%.3f");

        if writer.has_ansi_escapes() {
            write!(
                writer,
                "\x1b[2m{timestamp}\x1b[0m {}{:>5}\x1b[0m \x1b[36m{}:\x1b[0m ",
                level_color(meta.level()),
                meta.level(),
                meta.target()
            )?;
        } else {
            write!(writer, "{timestamp} {:>5} {}: ", meta.level(), meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// --- Log file ---

/// Writer target that can be pointed at a file after the subscriber is
/// installed. Writes are dropped while it is empty.
#[derive(Clone, Default)]
struct LogFile(Arc<Mutex<Option<File>>>);

impl LogFile {
    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct LogFileWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for LogFileWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        match self.0.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), File::flush)
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileWriter(self.lock())
    }
}

// --- Setup ---

/// Handle to the installed subscriber.
pub struct Logging {
    filter: reload::Handle<EnvFilter, Registry>,
    file: LogFile,
}

impl Logging {
    /// Installs the global subscriber. `RUST_LOG` wins over
    /// `default_level` when set.
    pub fn init(default_level: &str) -> Self {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        let (filter, handle) = reload::Layer::new(filter);
        let file = LogFile::default();

        let stderr = tracing_subscriber::fmt::layer()
            .event_format(CliFormat)
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr);
        let to_file = tracing_subscriber::fmt::layer()
            .event_format(CliFormat)
            .with_ansi(false)
            .with_writer(file.clone());

        // A second init in the same process keeps the first subscriber.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr)
            .with(to_file)
            .try_init();

        Self {
            filter: handle,
            file,
        }
    }

    /// Replaces the filter. Takes a bare level or any `EnvFilter` directive.
    pub fn set_level(
        &self,
        directive: &str,
    ) -> Result<()> {
        let filter = EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log level '{directive}'"))?;
        self.filter
            .reload(filter)
            .map_err(|e| anyhow!("cannot change log level: {e}"))
    }

    /// Appends log output to `path`, replacing any file attached earlier.
    pub fn log_to_file(
        &self,
        path: &Path,
    ) -> Result<()> {
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open log file '{}'", path.display()))?;
        *self.file.lock() = Some(file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_log_file_discards_writes() {
        let slot = LogFile::default();

        let mut writer = slot.make_writer();

        assert_eq!(writer.write(b"dropped").unwrap(), 7);
        assert!(writer.flush().is_ok());
    }

    #[test]
    fn attached_log_file_receives_writes() {
        let path = std::env::temp_dir().join(format!("savings-log-{}.log", std::process::id()));
        let slot = LogFile(Arc::new(Mutex::new(Some(File::create(&path).unwrap()))));

        {
            let mut writer = slot.make_writer();
            writer.write_all(b"hello\n").unwrap();
            writer.flush().unwrap();
        }

        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(written, "hello\n");
    }

    #[test]
    fn each_level_has_its_own_color() {
        let colors = [
            Level::ERROR,
            Level::WARN,
            Level::INFO,
            Level::DEBUG,
            Level::TRACE,
        ]
        .map(|level| level_color(&level));

        for (i, color) in colors.iter().enumerate() {
            assert!(!colors[i + 1..].contains(color));
        }
    }
}
