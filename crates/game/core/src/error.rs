//! Common error infrastructure for gridrule-core.
//!
//! Domain-specific errors (`DefinitionError`, `ActionError`, `EngineError`) live
//! next to the modules that raise them. They all implement [`GameError`] so the
//! runtime and tools can classify failures uniformly.
//!
//! Outcomes that the rules expect to happen during play (a blocked move, a
//! missing behaviour, a failed precondition) are not errors. They surface as
//! `abort_action = true` on a [`crate::BehaviourResult`].

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same request may succeed later or in another state
/// - **Validation**: the request or definition is malformed
/// - **Internal**: unexpected state inconsistency, indicates a bug
/// - **Fatal**: the game state can no longer be trusted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative input.
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: unknown command name, undeclared metadata key
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: a behaviour referencing an object the arena no longer holds
    Internal,

    /// Fatal error - the simulation cannot continue.
    ///
    /// Examples: runaway cascade, initialising a process twice
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug or corrupted state.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

impl core::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common trait for all gridrule errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for the Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Error codes are stable `SCREAMING_SNAKE` identifiers used by tests and logs
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_classification() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Internal.is_internal());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert_eq!(ErrorSeverity::Fatal.to_string(), "fatal");
    }
}
