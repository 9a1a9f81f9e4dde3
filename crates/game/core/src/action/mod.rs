//! Actions and their input mappings.
//!
//! # Module Structure
//!
//! - `types`: [`Action`], its addressing modes and builder
//! - `input`: input tables per action name and mapping resolution
//! - `error`: [`ActionError`]
//!
//! An action only describes *who acts on what*. What happens is decided by
//! the behaviours of the objects at both ends, see [`crate::engine`].

pub mod error;
pub mod input;
pub mod types;

pub use error::ActionError;
pub use input::{ActionInputsDefinition, InputMapping, ResolvedInput, resolve_input_mapping};
pub use types::{Action, ActionBuilder, ActionTarget};
