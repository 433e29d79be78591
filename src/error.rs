//! Error types for the callback-guarantee mechanism.
//!
//! Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Errors raised inside a wrapped body are never intercepted; the
//!   obligation check runs and the original outcome propagates unchanged
//! - Misuse of the guard surface (unknown argument names, releasing a value
//!   that was never guarded, releasing a spent guard) surfaces immediately
//!   to the caller and is never retried
//!
//! # Error Categories
//!
//! - **Binding**: the target argument name does not exist on the callable;
//!   a programming mistake, surfaced on the first invocation attempt
//! - **Release**: the release escape hatch was applied to the wrong value
//!   or to a guard that is already spent

use core::fmt;

/// Errors surfaced by the guard mechanism itself.
///
/// None of these originate from a wrapped body; body errors always
/// propagate through the wrappers unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// The callable has no parameter with the requested name.
    ///
    /// Surfaced on the first invocation attempt of the decorated callable,
    /// before the wrapped body runs — binding happens per call, so the
    /// failure cannot occur at decoration time.
    UnknownArgument {
        /// Name of the callable whose signature was searched.
        callable: String,
        /// The argument name that was requested.
        argument: String,
    },

    /// `release` was applied to a value that is not a guarded proxy.
    NotAGuardedCallback,

    /// `release` was applied to a guard whose callback already fired.
    AlreadyInvoked,

    /// `release` was applied to a guard that was already released.
    AlreadyReleased,
}

/// Coarse classification of a [`GuardError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Argument-binding failure (typo'd argument name).
    Binding,
    /// Misuse of the release escape hatch.
    Release,
}

impl GuardError {
    /// Returns the category for this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownArgument { .. } => ErrorCategory::Binding,
            Self::NotAGuardedCallback | Self::AlreadyInvoked | Self::AlreadyReleased => {
                ErrorCategory::Release
            }
        }
    }
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownArgument { callable, argument } => {
                write!(f, "callable '{callable}' has no parameter named '{argument}'")
            }
            Self::NotAGuardedCallback => {
                f.write_str("value is not a guarded callback; nothing to release")
            }
            Self::AlreadyInvoked => {
                f.write_str("cannot release a callback that has already been invoked")
            }
            Self::AlreadyReleased => {
                f.write_str("cannot release a callback that was already released")
            }
        }
    }
}

impl std::error::Error for GuardError {}
