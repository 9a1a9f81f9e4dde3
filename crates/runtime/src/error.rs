//! Unified error type surfaced by the game process.
//!
//! Engine failures are wrapped unchanged so callers can still inspect their
//! severity and error code through [`GameError`].
use thiserror::Error;

use gridrule_core::{EngineError, ErrorSeverity, GameError, PlacementError, PlayerId, Position};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("game process is already initialized")]
    AlreadyInitialized,

    #[error("game process is not initialized")]
    NotInitialized,

    #[error("the environment supports at most {limit} player(s)")]
    TooManyPlayers { limit: u32 },

    #[error("the environment requires {expected} player(s), but {registered} have been registered")]
    PlayerCountMismatch { expected: u32, registered: u32 },

    #[error("player {player} is not registered")]
    UnknownPlayer { player: PlayerId },

    #[error("player {player} has no avatar")]
    NoAvatar { player: PlayerId },

    #[error("cannot place `{object}`")]
    Placement {
        object: String,
        #[source]
        source: PlacementError,
    },

    #[error("level line {line}: unknown glyph `{glyph}`")]
    UnknownGlyph { glyph: char, line: usize },

    #[error("level line {line}: expected {expected} cells, found {found}")]
    RaggedLevel {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("`{object}` is placed for player {player}, but the environment has {player_count} player(s)")]
    PlacementPlayer {
        object: String,
        player: PlayerId,
        player_count: u32,
    },

    #[error("level placement at {position} is outside the {width}x{height} grid")]
    OutsideLevel {
        position: Position,
        width: u32,
        height: u32,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AlreadyInitialized | Self::NotInitialized => ErrorSeverity::Fatal,
            Self::TooManyPlayers { .. }
            | Self::PlayerCountMismatch { .. }
            | Self::UnknownPlayer { .. }
            | Self::UnknownGlyph { .. }
            | Self::RaggedLevel { .. }
            | Self::OutsideLevel { .. }
            | Self::PlacementPlayer { .. }
            | Self::Placement { .. } => ErrorSeverity::Validation,
            Self::NoAvatar { .. } => ErrorSeverity::Recoverable,
            Self::Engine(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyInitialized => "RUNTIME_ALREADY_INITIALIZED",
            Self::NotInitialized => "RUNTIME_NOT_INITIALIZED",
            Self::TooManyPlayers { .. } => "RUNTIME_TOO_MANY_PLAYERS",
            Self::PlayerCountMismatch { .. } => "RUNTIME_PLAYER_COUNT_MISMATCH",
            Self::UnknownPlayer { .. } => "RUNTIME_UNKNOWN_PLAYER",
            Self::NoAvatar { .. } => "RUNTIME_NO_AVATAR",
            Self::Placement { .. } => "RUNTIME_PLACEMENT",
            Self::UnknownGlyph { .. } => "RUNTIME_UNKNOWN_GLYPH",
            Self::RaggedLevel { .. } => "RUNTIME_RAGGED_LEVEL",
            Self::OutsideLevel { .. } => "RUNTIME_OUTSIDE_LEVEL",
            Self::PlacementPlayer { .. } => "RUNTIME_PLACEMENT_PLAYER",
            Self::Engine(err) => err.error_code(),
        }
    }
}
