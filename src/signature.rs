//! Callable signatures and the argument locator.
//!
//! Rust has no call-site reflection, so "bind by name" is realized as an
//! explicit manifest: a [`CallableSignature`] declares a callable's
//! parameter names in declaration order, with the required/optional
//! distinction. The locator resolves a target name to an [`ArgSlot`] at
//! invocation time; a name that does not exist among the parameters fails
//! with [`GuardError::UnknownArgument`], naming both the callable and the
//! requested argument.
//!
//! Location is a per-invocation step, not a construction-time check:
//! decoration sites store only the target name, and the first call through
//! the wrapper is where a typo surfaces.
//!
//! # Example
//!
//! ```
//! use callguard::CallableSignature;
//!
//! let sig = CallableSignature::new("function_b")
//!     .required("cb")
//!     .optional("verbose");
//!
//! let slot = sig.locate("cb").expect("declared above");
//! assert_eq!(slot.index(), 0);
//! assert!(sig.locate("missing_name").is_err());
//! ```

use crate::error::GuardError;
use core::fmt;

// ============================================================================
// ParamKind
// ============================================================================

/// Whether a parameter must be supplied at every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// The caller must always bind this parameter.
    Required,
    /// The parameter has a default and may be omitted.
    Optional,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("required"),
            Self::Optional => f.write_str("optional"),
        }
    }
}

// ============================================================================
// CallableSignature
// ============================================================================

/// One declared parameter of a callable.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Param {
    name: String,
    kind: ParamKind,
}

/// Ordered parameter manifest for one callable.
///
/// Built at decoration time with the builder methods; consulted on every
/// invocation by [`locate`](Self::locate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableSignature {
    callable: String,
    params: Vec<Param>,
}

impl CallableSignature {
    /// Starts a signature for the callable with the given name.
    ///
    /// The name appears in [`GuardError::UnknownArgument`] and in log
    /// output; use the source-level function name.
    #[must_use]
    pub fn new(callable: impl Into<String>) -> Self {
        Self {
            callable: callable.into(),
            params: Vec::new(),
        }
    }

    /// Appends a required parameter.
    #[must_use]
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind: ParamKind::Required,
        });
        self
    }

    /// Appends an optional (defaulted) parameter.
    #[must_use]
    pub fn optional(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind: ParamKind::Optional,
        });
        self
    }

    /// Returns the callable's name.
    #[must_use]
    pub fn callable(&self) -> &str {
        &self.callable
    }

    /// Returns the number of declared parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if no parameters are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Resolves a parameter name to its slot.
    ///
    /// # Errors
    ///
    /// [`GuardError::UnknownArgument`] if no parameter has that name.
    pub fn locate(&self, name: &str) -> Result<ArgSlot, GuardError> {
        self.params
            .iter()
            .position(|p| p.name == name)
            .map(|index| ArgSlot {
                index,
                kind: self.params[index].kind,
            })
            .ok_or_else(|| {
                tracing::debug!(
                    callable = %self.callable,
                    argument = %name,
                    "argument locate failed"
                );
                GuardError::UnknownArgument {
                    callable: self.callable.clone(),
                    argument: name.to_owned(),
                }
            })
    }
}

// ============================================================================
// ArgSlot
// ============================================================================

/// A resolved parameter position within a [`CallableSignature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSlot {
    index: usize,
    kind: ParamKind,
}

impl ArgSlot {
    /// Zero-based position in declaration order.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Required/optional distinction of the located parameter.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        self.kind
    }
}
