//! Callguard: exactly-once callback guarantees across delegation, iteration,
//! streams, and async completion.
//!
//! # Overview
//!
//! A callback handed into a call chain is easy to lose: some layer forgets
//! to invoke it, or an error exits the chain before the invocation site is
//! reached. Callguard makes the guarantee structural instead of
//! conventional. A decoration site wraps the callback in a shared guard;
//! every layer the callback is delegated to reuses that guard rather than
//! stacking another; and each wrapped unit of work carries an obligation
//! that fires the callback with configured fallback arguments if, by the
//! time the unit of work exits — returns, errors, panics, exhausts, or is
//! cancelled — nobody has fired it yet.
//!
//! # Core Guarantees
//!
//! - **At most one firing**: the guard consumes the callback on its first
//!   firing; delegation of any depth cannot produce a second
//! - **At least one firing**: every execution shape checks the guard on
//!   every exit path, including panic unwinding and future cancellation
//! - **Innermost pending level owns the fallback**: re-obligation
//!   overwrites the owed fallback arguments, matching LIFO completion order
//! - **Explicit escape hatch**: [`release`] deliberately severs the
//!   guarantee and hands back an untracked callable
//! - **Transparent outcomes**: body errors, panics, produced elements, and
//!   settled values pass through unchanged
//!
//! # Module Structure
//!
//! - [`signature`]: callable parameter manifests and the argument locator
//! - [`guard`]: the shared callback guard, its proxy, and [`release`]
//! - [`obligation`]: the per-level RAII obligation record
//! - [`ensure`]: decoration sites and the plain-call shape
//! - [`iter`]: the lazy-sequence (iterator) shape
//! - [`future`]: the asynchronous shape
//! - [`stream`]: the asynchronous-sequence shape
//! - [`error`]: typed errors
//!
//! # Example
//!
//! ```
//! use callguard::{CallableSignature, CallbackArg, EnsureCallback};
//!
//! let function_b = EnsureCallback::new(
//!     CallableSignature::new("function_b").required("cb"),
//!     "cb",
//!     "decorator b",
//! );
//! let function_a = EnsureCallback::new(
//!     CallableSignature::new("function_a").required("callme"),
//!     "callme",
//!     "decorator a",
//! );
//!
//! // function_a delegates the callback to function_b; neither calls it.
//! // The innermost pending site (b) fires the fallback exactly once.
//! function_a.wrap_call(
//!     CallbackArg::raw(|who| println!("callback called from {who}")),
//!     |callme| {
//!         function_b.wrap_call(callme.to_arg(), |_cb| ()).unwrap();
//!     },
//! ).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod ensure;
pub mod error;
pub mod future;
pub mod guard;
pub mod iter;
pub mod obligation;
pub mod signature;
pub mod stream;
pub mod test_utils;

pub use ensure::EnsureCallback;
pub use error::{ErrorCategory, GuardError};
pub use future::GuardedFuture;
pub use guard::{release, Callback, CallbackArg, GuardedCallback, PlainCallback, ReleaseError};
pub use iter::GuardedIter;
pub use obligation::Obligation;
pub use signature::{ArgSlot, CallableSignature, ParamKind};
pub use stream::{GuardedStream, Stream};
