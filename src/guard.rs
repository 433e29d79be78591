//! The callback guard, its proxy, and the release escape hatch.
//!
//! A [`CallbackGuard`] is the shared tracked state for one logical callback:
//! the callback itself, the fallback arguments owed to it, and whether it
//! has been invoked or released. The guard is created by the first
//! decoration site to see a raw callback value and shared by reference
//! (`Arc`) with every site the callback is subsequently delegated to —
//! delegation never creates a second guard.
//!
//! # At-most-once, structurally
//!
//! The guard holds a three-state slot:
//!
//! ```text
//! Armed { callback, fallback } --fire--> Invoked
//! Armed { callback, fallback } --release--> Released
//! ```
//!
//! Firing *moves the callback out* of the slot, so a second fire has
//! nothing to call; the "invoked transitions false→true at most once"
//! invariant holds by construction rather than by flag discipline. The
//! state transition is serialized by a mutex and the callback itself is
//! invoked outside the lock, so two wrappers racing to discharge the same
//! obligation cannot both fire.
//!
//! # Detection by type, not by probe
//!
//! "Is this value already guarded?" is answered by the [`CallbackArg`] sum
//! type: a decoration site receives either `Raw` (wrap it, creating a new
//! guard) or `Guarded` (reuse the existing guard). There is no runtime
//! attribute probing.

use crate::error::GuardError;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The callback invocable: consumed on its single invocation.
///
/// Callbacks taking several arguments use a tuple for `A`.
pub type Callback<A> = Box<dyn FnOnce(A) + Send + 'static>;

// ============================================================================
// CallbackGuard (crate-private shared state)
// ============================================================================

enum GuardSlot<A> {
    /// Callback still owed; `fallback` belongs to the most recent
    /// decoration site to create or re-obligate this guard.
    Armed { callback: Callback<A>, fallback: A },
    /// Callback fired (explicitly or as a fallback).
    Invoked,
    /// Guarantee severed; no wrapper may auto-fire.
    Released,
}

pub(crate) struct CallbackGuard<A> {
    slot: Mutex<GuardSlot<A>>,
}

impl<A> CallbackGuard<A> {
    pub(crate) fn new(callback: Callback<A>, fallback: A) -> Self {
        Self {
            slot: Mutex::new(GuardSlot::Armed { callback, fallback }),
        }
    }

    /// A poisoned slot is still coherent (transitions happen after the
    /// lock is taken, not mid-update), so recover the inner value rather
    /// than propagating the poison. This also keeps drop-time discharge
    /// from double-panicking during unwind.
    fn lock(&self) -> MutexGuard<'_, GuardSlot<A>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrites the fallback arguments; the calling decoration site
    /// becomes responsible for the next automatic firing (LIFO ownership).
    pub(crate) fn set_fallback(&self, fallback: A) {
        if let GuardSlot::Armed { fallback: owed, .. } = &mut *self.lock() {
            *owed = fallback;
        }
    }

    /// Fires the callback with caller-supplied arguments.
    ///
    /// Returns whether this call fired it; a spent guard is a no-op.
    pub(crate) fn fire_explicit(&self, args: A) -> bool {
        let Some(callback) = self.take_if_armed() else {
            tracing::trace!("explicit callback invocation on spent guard; ignoring");
            return false;
        };
        tracing::debug!("callback fired explicitly");
        callback(args);
        true
    }

    /// Fires the callback with the owed fallback arguments.
    ///
    /// Returns whether this call fired it (false when already invoked or
    /// released).
    pub(crate) fn fire_fallback(&self) -> bool {
        let taken = {
            let mut slot = self.lock();
            match mem::replace(&mut *slot, GuardSlot::Invoked) {
                GuardSlot::Armed { callback, fallback } => Some((callback, fallback)),
                other => {
                    *slot = other;
                    None
                }
            }
        };
        let Some((callback, fallback)) = taken else {
            return false;
        };
        tracing::debug!("fallback callback fired");
        callback(fallback);
        true
    }

    /// Severs the guarantee, returning the untracked callback.
    pub(crate) fn release(&self) -> Result<Callback<A>, GuardError> {
        let mut slot = self.lock();
        match mem::replace(&mut *slot, GuardSlot::Released) {
            GuardSlot::Armed { callback, .. } => {
                tracing::debug!("callback guard released");
                Ok(callback)
            }
            GuardSlot::Invoked => {
                *slot = GuardSlot::Invoked;
                Err(GuardError::AlreadyInvoked)
            }
            GuardSlot::Released => Err(GuardError::AlreadyReleased),
        }
    }

    pub(crate) fn is_invoked(&self) -> bool {
        matches!(*self.lock(), GuardSlot::Invoked)
    }

    pub(crate) fn is_released(&self) -> bool {
        matches!(*self.lock(), GuardSlot::Released)
    }

    /// Armed → Invoked, returning the callback; any other state is left
    /// untouched. The caller invokes the callback outside the lock.
    fn take_if_armed(&self) -> Option<Callback<A>> {
        let mut slot = self.lock();
        match mem::replace(&mut *slot, GuardSlot::Invoked) {
            GuardSlot::Armed { callback, .. } => Some(callback),
            other => {
                *slot = other;
                None
            }
        }
    }

    fn state_name(&self) -> &'static str {
        match *self.lock() {
            GuardSlot::Armed { .. } => "armed",
            GuardSlot::Invoked => "invoked",
            GuardSlot::Released => "released",
        }
    }
}

// ============================================================================
// GuardedCallback (the proxy)
// ============================================================================

/// The guard-aware proxy substituted for the original callback.
///
/// Cloning shares the underlying guard; a delegation chain of any depth
/// observes one guard and therefore at most one firing.
///
/// # Double invocation policy
///
/// Invoking a proxy whose guard already fired is a no-op; [`call`]
/// (Self::call) returns `false` so the caller can observe it. This matches
/// the reference behavior and is pinned by tests.
pub struct GuardedCallback<A> {
    guard: Arc<CallbackGuard<A>>,
}

impl<A> GuardedCallback<A> {
    pub(crate) fn new(guard: Arc<CallbackGuard<A>>) -> Self {
        Self { guard }
    }

    pub(crate) fn guard(&self) -> &Arc<CallbackGuard<A>> {
        &self.guard
    }

    /// Invokes the real callback with the caller-supplied arguments.
    ///
    /// Returns whether this call fired it: `false` if the guard was
    /// already invoked or released.
    pub fn call(&self, args: A) -> bool {
        self.guard.fire_explicit(args)
    }

    /// Repackages the proxy for delegation to another decoration site.
    #[must_use]
    pub fn to_arg(&self) -> CallbackArg<A> {
        CallbackArg::Guarded(self.clone())
    }

    /// Returns true once the callback has fired (explicitly or as a
    /// fallback).
    #[must_use]
    pub fn is_invoked(&self) -> bool {
        self.guard.is_invoked()
    }

    /// Returns true once the guard has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.guard.is_released()
    }

    /// Severs the guarantee for every wrapper sharing this guard, past and
    /// future, and returns the untracked callback.
    ///
    /// # Errors
    ///
    /// [`GuardError::AlreadyInvoked`] or [`GuardError::AlreadyReleased`]
    /// when the guard is already spent.
    pub fn release(self) -> Result<PlainCallback<A>, GuardError> {
        self.guard.release().map(|callback| PlainCallback { callback })
    }
}

impl<A> Clone for GuardedCallback<A> {
    fn clone(&self) -> Self {
        Self {
            guard: Arc::clone(&self.guard),
        }
    }
}

impl<A> std::fmt::Debug for GuardedCallback<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedCallback")
            .field("state", &self.guard.state_name())
            .finish()
    }
}

// ============================================================================
// CallbackArg
// ============================================================================

/// A callback argument as a decoration site receives it.
///
/// The tagged sum makes "already guarded?" a type-level match: `Raw` values
/// get a fresh guard, `Guarded` values re-obligate the existing one.
pub enum CallbackArg<A> {
    /// An original, untracked callback from the outermost caller.
    Raw(Callback<A>),
    /// A proxy forwarded through delegation.
    Guarded(GuardedCallback<A>),
}

impl<A> CallbackArg<A> {
    /// Wraps a plain closure as a raw callback argument.
    pub fn raw(callback: impl FnOnce(A) + Send + 'static) -> Self {
        Self::Raw(Box::new(callback))
    }

    /// Returns true if the value already carries a guard.
    #[must_use]
    pub fn is_guarded(&self) -> bool {
        matches!(self, Self::Guarded(_))
    }
}

impl<A> From<GuardedCallback<A>> for CallbackArg<A> {
    fn from(proxy: GuardedCallback<A>) -> Self {
        Self::Guarded(proxy)
    }
}

impl<A> std::fmt::Debug for CallbackArg<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw(_) => f.write_str("CallbackArg::Raw"),
            Self::Guarded(proxy) => f.debug_tuple("CallbackArg::Guarded").field(proxy).finish(),
        }
    }
}

// ============================================================================
// Release operation
// ============================================================================

/// The untracked callable returned by [`release`].
///
/// Invoking it calls the underlying callback directly, without marking the
/// guard invoked and without any further obligation tracking. Whoever holds
/// it owns the sole remaining responsibility for the callback ever firing.
#[must_use = "dropping a released callback means it will never be invoked"]
pub struct PlainCallback<A> {
    callback: Callback<A>,
}

impl<A> PlainCallback<A> {
    /// Invokes the underlying callback.
    pub fn call(self, args: A) {
        (self.callback)(args);
    }
}

impl<A> std::fmt::Debug for PlainCallback<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PlainCallback")
    }
}

/// Error returned by [`release`].
///
/// Rejecting a value must not destroy it: a raw callback refused by
/// [`release`] may be the caller's only handle to it, so the error carries
/// the value back out via [`into_callback`](Self::into_callback).
pub struct ReleaseError<A> {
    kind: GuardError,
    callback: Option<CallbackArg<A>>,
}

impl<A> ReleaseError<A> {
    /// The underlying failure.
    #[must_use]
    pub fn kind(&self) -> &GuardError {
        &self.kind
    }

    /// Recovers the rejected value, when there was one to reject.
    ///
    /// `Some` for [`GuardError::NotAGuardedCallback`] (the raw value,
    /// unchanged); `None` for the spent-guard failures, where the callback
    /// is no longer anyone's to hand back.
    #[must_use]
    pub fn into_callback(self) -> Option<CallbackArg<A>> {
        self.callback
    }
}

impl<A> std::fmt::Debug for ReleaseError<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseError")
            .field("kind", &self.kind)
            .field("carries_callback", &self.callback.is_some())
            .finish()
    }
}

impl<A> std::fmt::Display for ReleaseError<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

impl<A> std::error::Error for ReleaseError<A> {}

/// Severs the callback guarantee at this point in the chain.
///
/// Marks the guard released — no execution wrapper holding it, past or
/// future, will auto-fire — and returns a plain callable suitable for
/// handing to code with no guarantee participation. This is the documented
/// way to interoperate with such code; it deliberately voids the guarantee.
///
/// # Errors
///
/// - [`GuardError::NotAGuardedCallback`] if `value` was never guarded; the
///   value is handed back inside the error.
/// - [`GuardError::AlreadyInvoked`] / [`GuardError::AlreadyReleased`] if
///   the guard is already spent.
pub fn release<A>(value: CallbackArg<A>) -> Result<PlainCallback<A>, ReleaseError<A>> {
    match value {
        CallbackArg::Guarded(proxy) => proxy.release().map_err(|kind| ReleaseError {
            kind,
            callback: None,
        }),
        CallbackArg::Raw(callback) => Err(ReleaseError {
            kind: GuardError::NotAGuardedCallback,
            callback: Some(CallbackArg::Raw(callback)),
        }),
    }
}
