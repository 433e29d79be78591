//! Guarded streams: the asynchronous-sequence execution shape.
//!
//! A [`Stream`] is the async analogue of [`Iterator`], producing values
//! over time. The crate defines the minimal trait surface it needs —
//! [`poll_next`](Stream::poll_next) and the [`iter`] source adapter —
//! rather than depending on an external streams crate.
//!
//! [`GuardedStream`] mirrors [`GuardedIter`](crate::GuardedIter): items
//! pass through transparently, and the obligation check runs on exhaustion
//! (before the final `None` is observed) or when the consumer drops the
//! stream early.

use crate::obligation::Obligation;
use std::pin::Pin;
use std::task::{Context, Poll};

// ============================================================================
// Stream trait
// ============================================================================

/// An asynchronous sequence of values.
pub trait Stream {
    /// The type of value produced.
    type Item;

    /// Attempts to produce the next value.
    ///
    /// - `Poll::Ready(Some(item))`: a value is available
    /// - `Poll::Ready(None)`: the stream is exhausted
    /// - `Poll::Pending`: no value yet; the waker will be notified
    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>>;
}

/// A stream backed by a synchronous iterator; every value is immediately
/// ready.
#[derive(Debug)]
pub struct Iter<I> {
    iter: I,
}

/// Converts an iterator into a [`Stream`].
pub fn iter<I: Iterator>(iter: I) -> Iter<I> {
    Iter { iter }
}

impl<I> Unpin for Iter<I> {}

impl<I: Iterator> Stream for Iter<I> {
    type Item = I::Item;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.iter.next())
    }
}

// ============================================================================
// GuardedStream
// ============================================================================

/// Stream wrapper that discharges a callback obligation on every way out
/// of the sequence.
///
/// Created by
/// [`EnsureCallback::wrap_stream`](crate::EnsureCallback::wrap_stream).
/// Fused after exhaustion. The inner stream must be `Unpin`; box it if it
/// is not.
#[derive(Debug)]
pub struct GuardedStream<S, A> {
    stream: S,
    obligation: Obligation<A>,
    exhausted: bool,
}

impl<S, A> GuardedStream<S, A> {
    pub(crate) fn new(stream: S, obligation: Obligation<A>) -> Self {
        Self {
            stream,
            obligation,
            exhausted: false,
        }
    }

    /// Returns a reference to the wrapped stream.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.stream
    }

    /// Returns true once the wrapped stream has reported exhaustion.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<S: Stream + Unpin, A> Stream for GuardedStream<S, A> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.exhausted {
            return Poll::Ready(None);
        }
        match Pin::new(&mut this.stream).poll_next(cx) {
            Poll::Ready(Some(item)) => Poll::Ready(Some(item)),
            Poll::Ready(None) => {
                this.exhausted = true;
                // Check runs before the consumer observes the end.
                this.obligation.discharge();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
