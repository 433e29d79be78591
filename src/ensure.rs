//! Decoration sites: wiring a callback guarantee onto a unit of work.
//!
//! An [`EnsureCallback`] is one decoration site: a callable's signature,
//! the name of its callback parameter, and the fallback arguments this
//! site owes if the callback never fires on its watch. Each invocation of
//! the wrapped callable goes through the same sequence:
//!
//! 1. locate the callback slot by name ([`GuardError::UnknownArgument`] on
//!    the first invocation if the name is a typo — never at decoration
//!    time);
//! 2. reuse the guard if the incoming value is already guarded, overwriting
//!    the owed fallback arguments with this site's (the innermost pending
//!    level completes first, so it owns the next automatic firing);
//!    otherwise create a fresh guard around the raw callback;
//! 3. substitute a new proxy for the callback and drive the body under an
//!    [`Obligation`] that checks the guard on every exit path.
//!
//! # Example
//!
//! ```
//! use callguard::{CallableSignature, CallbackArg, EnsureCallback};
//! use std::sync::mpsc;
//!
//! let site = EnsureCallback::new(
//!     CallableSignature::new("function_b").required("cb"),
//!     "cb",
//!     "decorator",
//! );
//!
//! let (tx, rx) = mpsc::channel();
//! let cb = CallbackArg::raw(move |who| tx.send(who).unwrap());
//!
//! // The body never calls `cb`, so the fallback fires on exit.
//! site.wrap_call(cb, |_cb| {}).unwrap();
//! assert_eq!(rx.recv().unwrap(), "decorator");
//! ```

use crate::error::GuardError;
use crate::future::GuardedFuture;
use crate::guard::{CallbackArg, CallbackGuard, GuardedCallback};
use crate::iter::GuardedIter;
use crate::obligation::Obligation;
use crate::signature::CallableSignature;
use crate::stream::{GuardedStream, Stream};
use std::future::Future;
use std::sync::Arc;

/// One decoration site for a callback-carrying callable.
///
/// Construction is infallible; argument-name validation happens on each
/// invocation, before the wrapped body runs.
#[derive(Debug, Clone)]
pub struct EnsureCallback<A> {
    signature: CallableSignature,
    target: String,
    fallback: A,
}

impl<A> EnsureCallback<A>
where
    A: Clone + Send + 'static,
{
    /// Creates a decoration site.
    ///
    /// `target` names the parameter of `signature` that carries the
    /// callback; `fallback` is the argument payload used if this site must
    /// fire the callback automatically.
    #[must_use]
    pub fn new(signature: CallableSignature, target: impl Into<String>, fallback: A) -> Self {
        Self {
            signature,
            target: target.into(),
            fallback,
        }
    }

    /// Returns the declared signature.
    #[must_use]
    pub fn signature(&self) -> &CallableSignature {
        &self.signature
    }

    /// Returns the callback parameter name this site targets.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Performs steps 1–2 of the per-call sequence, returning the proxy to
    /// substitute into the call and this level's obligation.
    ///
    /// Most callers want one of the `wrap_*` shapes; this is the raw pair
    /// for integrating with an execution shape the crate does not model.
    ///
    /// # Errors
    ///
    /// [`GuardError::UnknownArgument`] if the target name is not a
    /// parameter of the signature.
    pub fn obligate(
        &self,
        value: CallbackArg<A>,
    ) -> Result<(GuardedCallback<A>, Obligation<A>), GuardError> {
        let slot = self.signature.locate(&self.target)?;
        let guard = match value {
            CallbackArg::Guarded(proxy) => {
                let guard = Arc::clone(proxy.guard());
                guard.set_fallback(self.fallback.clone());
                tracing::trace!(
                    callable = %self.signature.callable(),
                    argument = %self.target,
                    index = slot.index(),
                    "reusing callback guard; fallback re-obligated"
                );
                guard
            }
            CallbackArg::Raw(callback) => {
                tracing::debug!(
                    callable = %self.signature.callable(),
                    argument = %self.target,
                    index = slot.index(),
                    "callback guard created"
                );
                Arc::new(CallbackGuard::new(callback, self.fallback.clone()))
            }
        };
        Ok((
            GuardedCallback::new(Arc::clone(&guard)),
            Obligation::new(guard),
        ))
    }

    /// Plain-call shape: runs `body` with the substituted proxy.
    ///
    /// The obligation check runs after the body returns — or while it
    /// unwinds — and before control returns to the caller, so "notify on
    /// early exit" holds even when the body fails before ever reaching the
    /// callback. The body's own outcome propagates unchanged.
    ///
    /// # Errors
    ///
    /// [`GuardError::UnknownArgument`] on a typo'd target name.
    pub fn wrap_call<R>(
        &self,
        value: CallbackArg<A>,
        body: impl FnOnce(GuardedCallback<A>) -> R,
    ) -> Result<R, GuardError> {
        let (proxy, mut obligation) = self.obligate(value)?;
        // The obligation is live across the body: unwinding discharges it.
        let result = body(proxy);
        obligation.discharge();
        Ok(result)
    }

    /// Lazy-sequence shape: `make_iter` builds the iterator body around the
    /// substituted proxy; the returned [`GuardedIter`] discharges on
    /// exhaustion or early abandonment.
    ///
    /// # Errors
    ///
    /// [`GuardError::UnknownArgument`] on a typo'd target name.
    pub fn wrap_iter<I>(
        &self,
        value: CallbackArg<A>,
        make_iter: impl FnOnce(GuardedCallback<A>) -> I,
    ) -> Result<GuardedIter<I, A>, GuardError>
    where
        I: Iterator,
    {
        let (proxy, obligation) = self.obligate(value)?;
        Ok(GuardedIter::new(make_iter(proxy), obligation))
    }

    /// Asynchronous shape: `make_future` builds the future body around the
    /// substituted proxy; the returned [`GuardedFuture`] discharges when
    /// the inner future settles or when it is dropped before completion
    /// (cancellation).
    ///
    /// # Errors
    ///
    /// [`GuardError::UnknownArgument`] on a typo'd target name.
    pub fn wrap_future<F>(
        &self,
        value: CallbackArg<A>,
        make_future: impl FnOnce(GuardedCallback<A>) -> F,
    ) -> Result<GuardedFuture<F, A>, GuardError>
    where
        F: Future + Unpin,
    {
        let (proxy, obligation) = self.obligate(value)?;
        Ok(GuardedFuture::new(make_future(proxy), obligation))
    }

    /// Asynchronous-sequence shape: the stream analogue of
    /// [`wrap_iter`](Self::wrap_iter).
    ///
    /// # Errors
    ///
    /// [`GuardError::UnknownArgument`] on a typo'd target name.
    pub fn wrap_stream<S>(
        &self,
        value: CallbackArg<A>,
        make_stream: impl FnOnce(GuardedCallback<A>) -> S,
    ) -> Result<GuardedStream<S, A>, GuardError>
    where
        S: Stream + Unpin,
    {
        let (proxy, obligation) = self.obligate(value)?;
        Ok(GuardedStream::new(make_stream(proxy), obligation))
    }
}
