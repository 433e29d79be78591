//! Test utilities.
//!
//! Shared helpers for the crate's unit and integration tests:
//! - tracing-based logging initialization
//! - phase/section macros for readable test output
//! - [`CallRecorder`] for asserting on callback invocations
//! - a no-op waker for driving futures and streams by hand

use std::sync::{Arc, Mutex};
use std::task::{Wake, Waker};

/// Records every invocation routed through closures handed out by
/// [`record`](Self::record).
///
/// Clones share the underlying log, so a recorder can both produce the
/// callback under test and observe it afterwards.
#[derive(Debug)]
pub struct CallRecorder<A> {
    calls: Arc<Mutex<Vec<A>>>,
}

impl<A> Default for CallRecorder<A> {
    fn default() -> Self {
        Self {
            calls: Arc::default(),
        }
    }
}

impl<A: Send + 'static> CallRecorder<A> {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a closure that records its argument when invoked.
    pub fn record(&self) -> impl FnOnce(A) + Send + 'static {
        let calls = Arc::clone(&self.calls);
        move |args| calls.lock().expect("lock poisoned").push(args)
    }

    /// Number of recorded invocations.
    #[must_use]
    pub fn count(&self) -> usize {
        self.calls.lock().expect("lock poisoned").len()
    }

    /// Snapshot of the recorded arguments, in invocation order.
    #[must_use]
    pub fn calls(&self) -> Vec<A>
    where
        A: Clone,
    {
        self.calls.lock().expect("lock poisoned").clone()
    }
}

impl<A> Clone for CallRecorder<A> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

struct NoopWaker;

impl Wake for NoopWaker {
    fn wake(self: Arc<Self>) {}
}

/// Creates a waker that does nothing, for driving futures by hand.
#[must_use]
pub fn noop_waker() -> Waker {
    Arc::new(NoopWaker).into()
}

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
#[cfg(test)]
pub fn init_test_logging() {
    use std::sync::Once;
    static INIT_LOGGING: Once = Once::new();
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_target(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log a section within a test phase.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        tracing::debug!(section = %$name, "--- {} ---", $name);
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}
