//! Request tracing hook.
//!
//! A session can be given a [`TraceSink`] with [`crate::ForceSession::trace_on`].
//! While a sink is installed, every outbound request writes one line per
//! observed field, formatted as `<prefix><field> <value>\n`. Tracing is purely
//! observational: a sink can never change the outcome of the request it watches.
//!
//! The fields are `method`, `url`, `status` and `body`. Request bodies are
//! never written, and OAuth token exchanges omit the response `body` as well,
//! so sinks never see credentials or access tokens issued by the token
//! endpoint. Bodies of other API responses are written unredacted.

use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Target used by [`TracingSink`] events.
pub const TRACE_TARGET: &str = "forcelink::trace";

/// Receiver of formatted trace lines.
pub trait TraceSink: Send + Sync {
    /// Called with a complete, newline-terminated line.
    fn write_line(&self, line: &str);
}

/// Forwards trace lines to the `tracing` ecosystem at `INFO` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn write_line(&self, line: &str) {
        tracing::info!(target: TRACE_TARGET, "{}", line.trim_end_matches('\n'));
    }
}

/// Collects trace lines in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl TraceSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

#[derive(Clone)]
struct ActiveTrace {
    prefix: String,
    sink: Arc<dyn TraceSink>,
}

/// Session-held trace configuration: at most one sink plus its prefix.
#[derive(Default)]
pub(crate) struct Tracer {
    active: RwLock<Option<ActiveTrace>>,
}

impl Tracer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Install `sink`, replacing any previous one. A non-empty prefix is
    /// separated from the field name by a single space.
    pub(crate) fn enable(&self, prefix: &str, sink: Arc<dyn TraceSink>) {
        let prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{} ", prefix)
        };
        *self.active.write().unwrap_or_else(PoisonError::into_inner) =
            Some(ActiveTrace { prefix, sink });
    }

    pub(crate) fn disable(&self) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn trace(&self, field: &str, value: &dyn Display) {
        // The sink is called after the read guard is released
        let active = self
            .active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if let Some(active) = active {
            let line = format!("{}{} {}\n", active.prefix, field, value);
            active.sink.write_line(&line);
        }
    }
}
