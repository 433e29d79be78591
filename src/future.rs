//! Guarded futures: the asynchronous execution shape.
//!
//! The obligation check runs when the awaited computation settles — before
//! the settlement is observed by the caller — and on cancellation: dropping
//! the wrapper before completion is an early-exit path and discharges the
//! obligation all the same, unless the guard was released.
//!
//! # Cancel Safety
//!
//! Dropping a [`GuardedFuture`] is always safe; it is precisely the
//! cancellation path the obligation exists to cover. Side effects the inner
//! future performed before the drop are, as everywhere else, not rolled
//! back.

use crate::obligation::Obligation;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Future wrapper that discharges a callback obligation on settlement or
/// cancellation.
///
/// Created by
/// [`EnsureCallback::wrap_future`](crate::EnsureCallback::wrap_future).
/// The inner future must be `Unpin`; box it if it is not.
#[derive(Debug)]
pub struct GuardedFuture<F, A> {
    future: F,
    obligation: Obligation<A>,
}

impl<F, A> GuardedFuture<F, A> {
    pub(crate) fn new(future: F, obligation: Obligation<A>) -> Self {
        Self { future, obligation }
    }

    /// Returns a reference to the inner future.
    #[must_use]
    pub fn inner(&self) -> &F {
        &self.future
    }
}

impl<F: Future + Unpin, A> Future for GuardedFuture<F, A> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.future).poll(cx) {
            Poll::Ready(output) => {
                // Discharge before the caller observes the settlement.
                this.obligation.discharge();
                Poll::Ready(output)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{init_test_logging, noop_waker, CallRecorder};
    use crate::{CallableSignature, CallbackArg, EnsureCallback};
    use std::future::{pending, ready};

    fn init_test(name: &str) {
        init_test_logging();
        crate::test_phase!(name);
    }

    fn site() -> EnsureCallback<&'static str> {
        EnsureCallback::new(
            CallableSignature::new("task_b").required("cb"),
            "cb",
            "task b",
        )
    }

    struct CountdownFuture {
        polls_left: u32,
    }

    impl Future for CountdownFuture {
        type Output = &'static str;

        fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
            if self.polls_left == 0 {
                Poll::Ready("done")
            } else {
                self.polls_left -= 1;
                Poll::Pending
            }
        }
    }

    impl Unpin for CountdownFuture {}

    #[test]
    fn completion_discharges_before_ready_is_observed() {
        init_test("completion_discharges_before_ready_is_observed");
        let recorder = CallRecorder::new();
        let count_at_ready = {
            let recorder = recorder.clone();
            let mut future = site()
                .wrap_future(CallbackArg::raw(recorder.record()), |_cb| ready(42))
                .expect("valid target name");
            let waker = noop_waker();
            let mut cx = Context::from_waker(&waker);
            match Pin::new(&mut future).poll(&mut cx) {
                Poll::Ready(value) => {
                    assert_eq!(value, 42);
                    recorder.count()
                }
                Poll::Pending => unreachable!("ready future must settle"),
            }
        };
        crate::assert_with_log!(count_at_ready == 1, "fired before Ready observed", 1, count_at_ready);
        crate::assert_with_log!(recorder.count() == 1, "exactly once", 1, recorder.count());
        crate::test_complete!("completion_discharges_before_ready_is_observed");
    }

    #[test]
    fn pending_polls_do_not_fire() {
        init_test("pending_polls_do_not_fire");
        let recorder = CallRecorder::new();
        let mut future = site()
            .wrap_future(CallbackArg::raw(recorder.record()), |_cb| CountdownFuture {
                polls_left: 2,
            })
            .expect("valid target name");
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        let first = Pin::new(&mut future).poll(&mut cx).is_pending();
        crate::assert_with_log!(first, "pending 1", true, first);
        let second = Pin::new(&mut future).poll(&mut cx).is_pending();
        crate::assert_with_log!(second, "pending 2", true, second);
        crate::assert_with_log!(recorder.count() == 0, "no firing while pending", 0, recorder.count());

        let third = Pin::new(&mut future).poll(&mut cx);
        let done = matches!(third, Poll::Ready("done"));
        crate::assert_with_log!(done, "settles", true, done);
        crate::assert_with_log!(recorder.count() == 1, "fired at settlement", 1, recorder.count());
        crate::test_complete!("pending_polls_do_not_fire");
    }

    #[test]
    fn cancellation_discharges_obligation() {
        init_test("cancellation_discharges_obligation");
        let recorder = CallRecorder::new();
        let mut future = site()
            .wrap_future(CallbackArg::raw(recorder.record()), |_cb| pending::<()>())
            .expect("valid target name");
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let _ = Pin::new(&mut future).poll(&mut cx);

        drop(future);
        crate::assert_with_log!(recorder.count() == 1, "fired on cancel", 1, recorder.count());
        crate::test_complete!("cancellation_discharges_obligation");
    }

    #[test]
    fn cancellation_respects_release() {
        init_test("cancellation_respects_release");
        let recorder = CallRecorder::new();
        let future = site()
            .wrap_future(CallbackArg::raw(recorder.record()), |cb| {
                let _plain = cb.release().expect("armed guard releases");
                pending::<()>()
            })
            .expect("valid target name");

        drop(future);
        crate::assert_with_log!(recorder.count() == 0, "suppressed", 0, recorder.count());
        crate::test_complete!("cancellation_respects_release");
    }

    #[test]
    fn explicit_call_in_async_body_suppresses_fallback() {
        init_test("explicit_call_in_async_body_suppresses_fallback");
        let recorder = CallRecorder::new();
        let mut future = site()
            .wrap_future(CallbackArg::raw(recorder.record()), |cb| {
                cb.call("from-task");
                ready(())
            })
            .expect("valid target name");
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let settled = Pin::new(&mut future).poll(&mut cx).is_ready();
        crate::assert_with_log!(settled, "settles", true, settled);

        let calls = recorder.calls();
        crate::assert_with_log!(calls == vec!["from-task"], "explicit only", vec!["from-task"], calls);
        crate::test_complete!("explicit_call_in_async_body_suppresses_fallback");
    }
}
