//! Object definitions, compiled object types, live instances and the
//! generator that ties them together.
pub mod definition;
pub mod generator;
pub mod instance;
pub mod layout;
pub mod object_type;

pub use definition::{
    BehaviourDefinition, BehaviourSide, GlobalVariableDefinition, InitialActionDefinition,
    ObjectDefinition, PreconditionDefinition, VariableDefinition,
};
pub use generator::{ObjectGenerator, ObjectGeneratorBuilder};
pub use instance::Object;
pub use layout::{PLAYER_SLOT, RESERVED_VARIABLES, VariableLayout, X_SLOT, Y_SLOT};
pub use object_type::{ActionTable, BehaviourTable, ObjectType, PreconditionTable};

/// Partner name of empty cells, and the type of the per-player default objects.
pub const EMPTY_OBJECT: &str = "_empty";

/// Partner name of destinations outside the grid.
pub const BOUNDARY_OBJECT: &str = "_boundary";
