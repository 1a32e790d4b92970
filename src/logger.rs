//! Structured event logging.
//!
//! The process installs one `tracing` subscriber at startup ([`init`]).
//! Stages and handlers never reach for that global directly: they are handed
//! a [`SharedSink`] and call [`EventSink::log`], which makes the events
//! observable in tests through [`MemorySink`].
//!
//! Logged events use the same snake_case wire form as response bodies, with
//! credential-bearing keys replaced by `"[Redacted]"`.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::Error;
use crate::problem::StructuredError;

const REDACTED: &str = "[Redacted]";
const REDACTED_KEYS: &[&str] = &["password", "email", "session_id", "cookie"];

/// Output format of the process-wide subscriber.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Installs the process-wide subscriber. Call once from `main`.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init(format: LogFormat) -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|e| Error::Logger(e.to_string()))
}

// ── EventSink ─────────────────────────────────────────────────────────────────

/// Destination for structured error events.
///
/// Implementations must not panic and must not block beyond serializing the
/// event.
pub trait EventSink: Send + Sync + 'static {
    fn log(&self, level: Level, event: &StructuredError);
}

/// The sink handle passed to stages, handlers and the router.
pub type SharedSink = Arc<dyn EventSink>;

/// Emits each event through `tracing` with the JSON in an `event` field.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn shared() -> SharedSink {
        Arc::new(Self)
    }
}

impl EventSink for TracingSink {
    fn log(&self, level: Level, event: &StructuredError) {
        let json = redact(event.to_json()).to_string();
        let name = event.kind().name();

        // `tracing` needs the level at compile time.
        match level {
            Level::ERROR => tracing::error!(error = name, event = %json),
            Level::WARN => tracing::warn!(error = name, event = %json),
            Level::INFO => tracing::info!(error = name, event = %json),
            Level::DEBUG => tracing::debug!(error = name, event = %json),
            _ => tracing::trace!(error = name, event = %json),
        }
    }
}

/// One event captured by [`MemorySink`].
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub level: Level,
    pub event: Value,
}

/// Keeps every event in memory, already redacted.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Entries whose `name` equals `error_name`.
    pub fn named(&self, error_name: &str) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.event["name"] == error_name)
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl EventSink for MemorySink {
    fn log(&self, level: Level, event: &StructuredError) {
        let entry = LogEntry { level, event: redact(event.to_json()) };
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }
}

// ── Redaction ─────────────────────────────────────────────────────────────────

/// Replaces the value of every credential-bearing key, at any depth.
pub fn redact(mut value: Value) -> Value {
    redact_in_place(&mut value);
    value
}

fn redact_in_place(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if REDACTED_KEYS.contains(&key.as_str()) {
                    *v = Value::String(REDACTED.to_owned());
                } else {
                    redact_in_place(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_in_place),
        _ => {}
    }
}
