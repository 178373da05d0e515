//! Process-wide logging setup.
//!
//! [`init_with_level`] installs a small stderr logger for the `log` facade:
//! `[  12.345s  INFO artag_detector] message`. Install it once, before the
//! per-frame loop begins. With the `tracing` feature, [`init_tracing`]
//! installs a `tracing-subscriber` instead.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable read by [`level_from_env`].
pub const LOG_ENV: &str = "ARTAG_LOG";

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let crate_name = record.target().split("::").next().unwrap_or_default();
        let line = format!(
            "[{:9.3}s {:>5} {}] {}\n",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            crate_name,
            record.args()
        );
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the given level filter.
///
/// Only the first call takes effect; later calls return `Ok(())`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StderrLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Level named by `ARTAG_LOG` (`off`, `error`, ..., `trace`), else `default`.
pub fn level_from_env(default: LevelFilter) -> LevelFilter {
    parse_level(std::env::var(LOG_ENV).ok().as_deref(), default)
}

fn parse_level(raw: Option<&str>, default: LevelFilter) -> LevelFilter {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

/// Install a `tracing` subscriber.
///
/// `level` forces a global level; `None` reads `RUST_LOG` (default `info`).
/// Span close events are emitted so per-frame timings show up. `json` selects
/// flattened JSON lines for log collectors.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, level: Option<LevelFilter>) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match level {
        Some(level) => EnvFilter::new(directive(level)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
    if let Err(err) = installed {
        log::debug!("tracing subscriber already installed: {err}");
    }
}

/// `EnvFilter` directive for a `log` level filter.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
fn directive(level: LevelFilter) -> String {
    level.as_str().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_keeps_the_first_level() {
        init_with_level(LevelFilter::Warn).expect("first init");
        init_with_level(LevelFilter::Trace).expect("second init is ignored");
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(parse_level(Some("debug"), LevelFilter::Info), LevelFilter::Debug);
        assert_eq!(parse_level(Some(" TRACE "), LevelFilter::Info), LevelFilter::Trace);
        assert_eq!(parse_level(Some("loud"), LevelFilter::Info), LevelFilter::Info);
        assert_eq!(parse_level(None, LevelFilter::Warn), LevelFilter::Warn);
    }

    #[test]
    fn directives_are_lowercase_level_names() {
        assert_eq!(directive(LevelFilter::Debug), "debug");
        assert_eq!(directive(LevelFilter::Off), "off");
    }
}
