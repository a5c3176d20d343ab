//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex, Once};
use tagctx::{structural_service, Context, Service, Tag};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness writer.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(LevelFilter::TRACE)
            .with_test_writer()
            .try_init();
    });
}

/// In-memory log sink for asserting on emitted events.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut sink) = self.0.lock() {
            sink.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` under a subscriber that records every event, returning the text.
pub fn capture_logs(f: impl FnOnce()) -> String {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_ansi(false)
        .with_writer(logs.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = logs.0.lock().map(|sink| sink.clone()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

// ============================================================================
// Services
// ============================================================================

/// Listening port, compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port {
    pub port: u16,
}

/// Request timeout, compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timeout {
    pub ms: u64,
}

/// Database URL, compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseUrl(pub String);

structural_service!(Port, Timeout, DatabaseUrl);

/// Opaque handle with identity equality.
#[derive(Debug)]
pub struct ConnectionPool {
    pub size: usize,
}

impl Service for ConnectionPool {}

pub fn port(port: u16) -> Port {
    Port { port }
}

pub fn timeout(ms: u64) -> Timeout {
    Timeout { ms }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Tags used by the example scenario.
pub struct Tags {
    pub port: Tag<Port>,
    pub timeout: Tag<Timeout>,
    pub database: Tag<DatabaseUrl>,
}

impl Tags {
    pub fn new() -> Self {
        Self {
            port: Tag::global("PORT"),
            timeout: Tag::new(),
            database: Tag::global("DATABASE_URL"),
        }
    }
}

/// Context with port and timeout bound.
pub fn server_context(tags: &Tags) -> Context {
    Context::make(&tags.port, port(8080)).add(&tags.timeout, timeout(5000))
}
