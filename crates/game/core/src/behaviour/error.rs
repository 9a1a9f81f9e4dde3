use crate::error::{ErrorSeverity, GameError};

/// Faults in object definitions, raised while the generator compiles them.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("{object}: unknown command `{command}`")]
    UnknownCommand { object: String, command: String },

    #[error("{object}: unknown or badly defined condition `{operator}`")]
    UnknownComparison { object: String, operator: String },

    #[error("{object}: undefined variable `{variable}`")]
    UndefinedVariable { object: String, variable: String },

    #[error("{object}: variable `{variable}` is read-only")]
    ReadOnlyVariable { object: String, variable: String },

    #[error("{object}: variable `{variable}` declared twice")]
    DuplicateVariable { object: String, variable: String },

    #[error("object `{object}` defined twice")]
    DuplicateObject { object: String },

    #[error("object name `{object}` is reserved")]
    ReservedObjectName { object: String },

    #[error("{object}: unknown object type `{referenced}`")]
    UnknownObjectType { object: String, referenced: String },

    #[error("{object}: `{command}` {reason}")]
    MalformedArguments {
        object: String,
        command: String,
        reason: &'static str,
    },

    #[error("{object}: rot only supports `_dir`, got `{argument}`")]
    InvalidRotation { object: String, argument: String },

    #[error("{object}: invalid executor `{executor}`, expected `action` or `object`")]
    InvalidExecutor { object: String, executor: String },
}

impl GameError for DefinitionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCommand { .. } => "DEFINITION_UNKNOWN_COMMAND",
            Self::UnknownComparison { .. } => "DEFINITION_UNKNOWN_COMPARISON",
            Self::UndefinedVariable { .. } => "DEFINITION_UNDEFINED_VARIABLE",
            Self::ReadOnlyVariable { .. } => "DEFINITION_READ_ONLY_VARIABLE",
            Self::DuplicateVariable { .. } => "DEFINITION_DUPLICATE_VARIABLE",
            Self::DuplicateObject { .. } => "DEFINITION_DUPLICATE_OBJECT",
            Self::ReservedObjectName { .. } => "DEFINITION_RESERVED_OBJECT_NAME",
            Self::UnknownObjectType { .. } => "DEFINITION_UNKNOWN_OBJECT_TYPE",
            Self::MalformedArguments { .. } => "DEFINITION_MALFORMED_ARGUMENTS",
            Self::InvalidRotation { .. } => "DEFINITION_INVALID_ROTATION",
            Self::InvalidExecutor { .. } => "DEFINITION_INVALID_EXECUTOR",
        }
    }
}
