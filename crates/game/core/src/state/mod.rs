//! Spatial and temporal simulation state.
//!
//! [`Grid`] is the single owner of objects and everything indexed by them.
//! The smaller types here are its building blocks and are exposed so callers
//! can inspect state without going through the grid.
pub mod common;
pub mod delayed;
pub mod dirty;
pub mod globals;
pub mod grid;
pub mod occupancy;
pub mod orientation;
pub mod rng;

pub use common::{ObjectId, Offset, PlayerId, Position, Tick};
pub use delayed::{DelayedActionQueue, ScheduledAction};
pub use dirty::DirtyLocations;
pub use globals::{GlobalId, GlobalVariables};
pub use grid::{Grid, PlacementError};
pub use occupancy::{CellOccupants, OccupancyMap};
pub use orientation::Direction;
pub use rng::PcgRng;
