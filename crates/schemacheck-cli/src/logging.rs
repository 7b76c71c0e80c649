//! # Log Output
//!
//! Builds the `tracing` subscriber that carries every line schemacheck
//! prints. The text format renders events as `LEVEL: message`, matching
//! the prefixes CI jobs grep for (`INFO:`, `WARN:`, `ERROR:`). The JSON
//! format emits one object per event.
//!
//! The subscriber is a value: the binary installs it globally, tests scope
//! it to a closure with `tracing::subscriber::with_default`.

use std::fmt;

use anyhow::Context;
use clap::ValueEnum;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// `INFO: message` lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Event formatter that prefixes each line with its level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelPrefix;

impl<S, N> FormatEvent<S, N> for LevelPrefix
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{}: ", level_prefix(event.metadata().level()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_prefix(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// Filter from `RUST_LOG`, falling back to `info`.
pub fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Build a subscriber writing `format` lines that pass `filter` to `writer`.
pub fn subscriber<W>(
    format: LogFormat,
    filter: EnvFilter,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .event_format(LevelPrefix)
                .finish(),
        ),
        LogFormat::Json => Box::new(
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_target(false)
                .finish(),
        ),
    }
}

/// Install the process-wide subscriber writing to stderr.
pub fn init(format: LogFormat) -> anyhow::Result<()> {
    tracing::subscriber::set_global_default(subscriber(
        format,
        default_filter(),
        std::io::stderr,
    ))
    .context("failed to install log subscriber")
}
