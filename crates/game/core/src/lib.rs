//! Deterministic grid-world rule engine.
//!
//! `gridrule-core` holds the rules of a tick-based grid simulation: object
//! definitions compiled into behaviour tables, the [`Grid`] that owns every
//! object, and the [`RuleEngine`] that resolves actions against it. It has no
//! notion of players joining, episodes or rendering; `gridrule-runtime`
//! layers those on top. All state mutation flows through [`engine::RuleEngine`].
pub mod action;
pub mod behaviour;
pub mod config;
pub mod engine;
pub mod error;
pub mod object;
pub mod search;
pub mod state;
pub mod termination;

pub use action::{
    Action, ActionBuilder, ActionError, ActionInputsDefinition, ActionTarget, InputMapping,
    ResolvedInput, resolve_input_mapping,
};
pub use behaviour::{
    ArgValue, BehaviourResult, Command, CommandSpec, Comparison, Condition, DefinitionError,
    Rewards,
};
pub use config::EngineConfig;
pub use engine::{EngineError, PlacedObject, RuleEngine};
pub use error::{ErrorSeverity, GameError};
pub use object::{
    BOUNDARY_OBJECT, EMPTY_OBJECT, GlobalVariableDefinition, InitialActionDefinition, Object,
    ObjectDefinition, ObjectGenerator, ObjectGeneratorBuilder, ObjectType,
    PreconditionDefinition, VariableDefinition,
};
pub use search::{
    AStarPathFinder, CollisionDetector, CollisionResult, PathFinder, PathResult,
    SpatialHashCollisionDetector,
};
pub use state::{
    Direction, GlobalVariables, Grid, ObjectId, Offset, PcgRng, PlacementError, PlayerId,
    Position, Tick,
};
pub use termination::{
    TerminationCondition, TerminationDefinition, TerminationKind, TerminationState,
    evaluate_termination,
};
