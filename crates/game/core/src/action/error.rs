//! Action resolution errors.

use crate::error::{ErrorSeverity, GameError};

// ============================================================================
// Action Errors
// ============================================================================

/// Errors raised while reading an action or resolving its input mapping.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    /// A behaviour read `meta.<key>` from an action that does not carry it.
    #[error("cannot resolve action metadata variable meta.{key}")]
    UnresolvedMetadata { key: String },

    /// No input definition registered for the action name.
    #[error("action {action} not found in input definitions")]
    MissingInputsDefinition { action: String },

    /// The action's input definition has no mapping with this id.
    #[error("action {action} has no input mapping with id {action_id}")]
    MissingInputMapping { action: String, action_id: u32 },
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnresolvedMetadata { .. } => "ACTION_UNRESOLVED_METADATA",
            Self::MissingInputsDefinition { .. } => "ACTION_MISSING_INPUTS_DEFINITION",
            Self::MissingInputMapping { .. } => "ACTION_MISSING_INPUT_MAPPING",
        }
    }
}
