use crate::action::ActionError;
use crate::behaviour::DefinitionError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{ObjectId, PlacementError};

/// Hard failures while resolving actions. Rule-level outcomes such as a
/// blocked move are reported through `abort_action` instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("unknown object type `{name}`")]
    UnknownObjectType { name: String },

    #[error("`{object}` cannot resolve variable `{variable}`")]
    UnresolvedVariable { object: String, variable: String },

    #[error("behaviour nesting exceeded the limit of {limit}")]
    RecursionLimit { limit: usize },

    #[error("object {id} not found")]
    ObjectNotFound { id: ObjectId },
}

impl GameError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Definition(err) => err.severity(),
            Self::Action(err) => err.severity(),
            Self::Placement(err) => err.severity(),
            Self::UnknownObjectType { .. } | Self::UnresolvedVariable { .. } => {
                ErrorSeverity::Validation
            }
            Self::ObjectNotFound { .. } => ErrorSeverity::Internal,
            Self::RecursionLimit { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Definition(err) => err.error_code(),
            Self::Action(err) => err.error_code(),
            Self::Placement(err) => err.error_code(),
            Self::UnknownObjectType { .. } => "ENGINE_UNKNOWN_OBJECT_TYPE",
            Self::UnresolvedVariable { .. } => "ENGINE_UNRESOLVED_VARIABLE",
            Self::RecursionLimit { .. } => "ENGINE_RECURSION_LIMIT",
            Self::ObjectNotFound { .. } => "ENGINE_OBJECT_NOT_FOUND",
        }
    }
}
