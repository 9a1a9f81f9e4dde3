//! Pathfinding and spatial lookup services used by `exec` searches.
pub mod astar;
pub mod collision;

use std::collections::BTreeSet;

pub use astar::AStarPathFinder;
pub use collision::SpatialHashCollisionDetector;

use crate::state::{ObjectId, Offset, Position};

/// First step of a path: the input mapping id to take from the start, and the
/// visited positions. `action_id == 0` means no path was found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathResult {
    pub action_id: u32,
    pub path: Vec<Position>,
}

impl PathResult {
    pub fn found(&self) -> bool {
        self.action_id != 0
    }
}

pub trait PathFinder {
    /// Searches from `start` (facing along `facing`) towards `goal`, expanding
    /// at most `max_depth` nodes.
    fn search(&self, start: Position, goal: Position, facing: Offset, max_depth: u32) -> PathResult;
}

/// Objects within a detector's range of a search origin.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionResult {
    pub objects: BTreeSet<ObjectId>,
    /// The same objects ordered nearest first, ties by id.
    pub closest: Vec<ObjectId>,
}

pub trait CollisionDetector {
    /// Inserts or relocates an object.
    fn upsert(&mut self, object: ObjectId, position: Position);

    fn remove(&mut self, object: ObjectId) -> bool;

    fn search(&self, origin: Position) -> CollisionResult;
}
