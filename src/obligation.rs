//! The per-decoration-level obligation as an RAII scope guard.
//!
//! Entering a decorated unit of work creates one [`Obligation`]; it is
//! ephemeral, scoped to that unit of work, and performs the obligation
//! check on every exit path:
//!
//! - released guard → do nothing;
//! - guard not yet invoked → fire the callback with the owed fallback
//!   arguments, exactly once;
//! - then the unit of work's own outcome propagates unchanged.
//!
//! The check runs on explicit [`discharge`](Obligation::discharge) (normal
//! completion) and on `Drop` (panic unwinding, early iterator abandonment,
//! future cancellation). Discharge is idempotent per obligation, and the
//! guard itself fires at most once across all obligations sharing it.

use crate::guard::CallbackGuard;
use std::sync::Arc;

/// One decoration level's responsibility to fire the fallback if, by its
/// own exit, the guard is still unfired and unreleased.
///
/// Holds the guard by reference; carries no private copy of the fallback
/// arguments — automatic firing always uses the guard's current (most
/// recently re-obligated) ones.
#[must_use = "dropping an obligation immediately runs the fallback check"]
pub struct Obligation<A> {
    guard: Arc<CallbackGuard<A>>,
    discharged: bool,
}

impl<A> Obligation<A> {
    pub(crate) fn new(guard: Arc<CallbackGuard<A>>) -> Self {
        Self {
            guard,
            discharged: false,
        }
    }

    /// Runs the obligation check now instead of at drop time.
    ///
    /// Execution wrappers call this on the normal-completion path so the
    /// fallback observably fires before control returns to their caller;
    /// repeated calls (and the later drop) are no-ops.
    pub fn discharge(&mut self) {
        if self.discharged {
            return;
        }
        self.discharged = true;
        if self.guard.fire_fallback() {
            tracing::debug!("obligation discharged by fallback invocation");
        } else {
            tracing::trace!("obligation discharged; guard already settled");
        }
    }

    /// Returns true once the check has run for this level.
    #[must_use]
    pub fn is_discharged(&self) -> bool {
        self.discharged
    }
}

impl<A> Drop for Obligation<A> {
    fn drop(&mut self) {
        // Covers panic unwinding, abandoned iteration, and cancelled
        // futures; the callback may therefore run during unwind.
        self.discharge();
    }
}

impl<A> std::fmt::Debug for Obligation<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Obligation")
            .field("discharged", &self.discharged)
            .finish()
    }
}
