//! Guarded iterators: the lazy-sequence execution shape.
//!
//! Every element of the wrapped iterator passes through transparently; the
//! obligation check runs when the sequence is exhausted (before the final
//! `None` is observed) or when the consumer abandons iteration early and
//! drops the wrapper. The wrapped sequence is finite or infinite exactly as
//! the body is, and is fused after exhaustion.

use crate::obligation::Obligation;

/// Iterator wrapper that discharges a callback obligation on every way out
/// of the iteration.
///
/// Created by [`EnsureCallback::wrap_iter`](crate::EnsureCallback::wrap_iter).
#[derive(Debug)]
pub struct GuardedIter<I, A> {
    iter: I,
    obligation: Obligation<A>,
    exhausted: bool,
}

impl<I, A> GuardedIter<I, A> {
    pub(crate) fn new(iter: I, obligation: Obligation<A>) -> Self {
        Self {
            iter,
            obligation,
            exhausted: false,
        }
    }

    /// Returns a reference to the wrapped iterator.
    #[must_use]
    pub fn inner(&self) -> &I {
        &self.iter
    }

    /// Returns true once the wrapped iterator has reported exhaustion.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<I: Iterator, A> Iterator for GuardedIter<I, A> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.iter.next() {
            Some(item) => Some(item),
            None => {
                self.exhausted = true;
                // Check runs before the consumer observes the end.
                self.obligation.discharge();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            (0, Some(0))
        } else {
            self.iter.size_hint()
        }
    }
}
