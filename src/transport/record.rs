//! Exchange records and the sinks that receive them

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Process-wide sequence correlating a request dump with its response dump
#[derive(Debug, Default)]
pub struct ExchangeCounter {
    value: AtomicU64,
}

impl ExchangeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next ordinal, starting at 1
    pub fn next(&self) -> u64 {
        self.value.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Number of ordinals handed out so far
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Direction {
    Request,
    /// Carries the status text shown in the record label
    Response { status: String },
}

/// One rendered side of an upstream call
#[derive(Debug, Clone)]
pub struct ExchangeRecord {
    pub ordinal: u64,
    pub direction: Direction,
    /// Highlighted header block without its blank terminator line
    pub head: String,
    /// Decoded and highlighted body, if there was one
    pub body: Option<String>,
}

impl fmt::Display for ExchangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.direction {
            Direction::Request => writeln!(f, "[REQUEST {}]", self.ordinal)?,
            Direction::Response { status } => writeln!(f, "[RESPONSE {}: {}]", self.ordinal, status)?,
        }
        write!(f, "{}\r\n\r\n", self.head)?;
        if let Some(body) = &self.body {
            f.write_str(body)?;
        }
        writeln!(f)
    }
}

/// Destination for exchange records
pub trait RecordSink: Send + Sync {
    fn emit(&self, record: &ExchangeRecord);
}

/// Writes every record as a single tracing event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn emit(&self, record: &ExchangeRecord) {
        tracing::info!(target: "sse_debug_proxy::exchange", "\n{}", record);
    }
}

/// Keeps records in memory, in emission order
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    records: Arc<Mutex<Vec<ExchangeRecord>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ExchangeRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl RecordSink for CollectingSink {
    fn emit(&self, record: &ExchangeRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

/// Independent switches for the two record directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogToggles {
    pub requests: bool,
    pub responses: bool,
}

impl Default for LogToggles {
    fn default() -> Self {
        Self {
            requests: true,
            responses: true,
        }
    }
}
