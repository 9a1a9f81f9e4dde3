use std::collections::BTreeMap;

use super::ActionError;
use crate::state::{Grid, ObjectId, Offset, PlayerId, Position};

/// How an action addresses its two ends. Exactly one mode per action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionTarget {
    LocationToLocation {
        source: Position,
        destination: Position,
    },
    ObjectToLocation {
        source: ObjectId,
        destination: Position,
    },
    ObjectToObject {
        source: ObjectId,
        destination: ObjectId,
    },
    ObjectToVector {
        source: ObjectId,
        vector_to_dest: Offset,
        orientation_vector: Offset,
    },
}

/// A request for one object to act on a location or another object.
///
/// Actions are immutable once built. Objects are referenced by id and
/// locations are derived from the grid when read, so an action stays valid
/// while it waits in the delayed queue even if its source moves.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    name: String,
    player_id: PlayerId,
    delay: u32,
    meta_data: BTreeMap<String, i32>,
    target: ActionTarget,
}

impl Action {
    pub fn builder(name: impl Into<String>, player_id: PlayerId) -> ActionBuilder {
        ActionBuilder {
            name: name.into(),
            player_id,
            delay: 0,
            meta_data: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn delay(&self) -> u32 {
        self.delay
    }

    pub fn target(&self) -> &ActionTarget {
        &self.target
    }

    pub fn meta_data(&self) -> &BTreeMap<String, i32> {
        &self.meta_data
    }

    pub fn meta(&self, key: &str) -> Result<i32, ActionError> {
        self.meta_data
            .get(key)
            .copied()
            .ok_or_else(|| ActionError::UnresolvedMetadata {
                key: key.to_owned(),
            })
    }

    /// `None` when the source object is no longer in the grid.
    pub fn source_location(&self, grid: &Grid) -> Option<Position> {
        match &self.target {
            ActionTarget::LocationToLocation { source, .. } => Some(*source),
            ActionTarget::ObjectToLocation { source, .. }
            | ActionTarget::ObjectToObject { source, .. }
            | ActionTarget::ObjectToVector { source, .. } => {
                grid.object(*source).map(|object| object.position())
            }
        }
    }

    pub fn destination_location(&self, grid: &Grid) -> Option<Position> {
        match &self.target {
            ActionTarget::LocationToLocation { destination, .. }
            | ActionTarget::ObjectToLocation { destination, .. } => Some(*destination),
            ActionTarget::ObjectToObject { destination, .. } => {
                grid.object(*destination).map(|object| object.position())
            }
            ActionTarget::ObjectToVector { vector_to_dest, .. } => self
                .source_location(grid)
                .map(|source| source + *vector_to_dest),
        }
    }

    pub fn vector_to_dest(&self, grid: &Grid) -> Offset {
        if let ActionTarget::ObjectToVector { vector_to_dest, .. } = &self.target {
            return *vector_to_dest;
        }
        match (self.source_location(grid), self.destination_location(grid)) {
            (Some(source), Some(destination)) => destination - source,
            _ => Offset::ZERO,
        }
    }

    /// Orientation carried by vector actions; zero for the other modes.
    pub fn orientation_vector(&self) -> Offset {
        match &self.target {
            ActionTarget::ObjectToVector {
                orientation_vector, ..
            } => *orientation_vector,
            _ => Offset::ZERO,
        }
    }

    /// Explicit source, else the top object at the source location, else the
    /// acting player's `_empty` object.
    pub fn source_object(&self, grid: &Grid) -> ObjectId {
        match &self.target {
            ActionTarget::LocationToLocation { source, .. } => grid
                .object_at(*source)
                .unwrap_or_else(|| grid.default_object(self.player_id)),
            ActionTarget::ObjectToLocation { source, .. }
            | ActionTarget::ObjectToObject { source, .. }
            | ActionTarget::ObjectToVector { source, .. } => *source,
        }
    }

    /// Explicit destination, else the top object at the destination
    /// location, else the acting player's `_empty` object.
    pub fn destination_object(&self, grid: &Grid) -> ObjectId {
        if let ActionTarget::ObjectToObject { destination, .. } = &self.target {
            return *destination;
        }
        self.destination_location(grid)
            .and_then(|location| grid.object_at(location))
            .unwrap_or_else(|| grid.default_object(self.player_id))
    }

    pub fn description(&self, grid: &Grid) -> String {
        let source = self.source_location(grid).unwrap_or_default();
        let destination = self.destination_location(grid).unwrap_or_default();
        let vector = self.vector_to_dest(grid);
        format!(
            "Action: {} [{}, {}]->[{}, {}] [{}, {}] Delay: [{}]",
            self.name,
            source.x,
            source.y,
            destination.x,
            destination.y,
            vector.x,
            vector.y,
            self.delay
        )
    }

    /// Same action with object references translated through `mapping`.
    /// Ids missing from the mapping are kept.
    pub fn remap_objects(&self, mapping: &BTreeMap<ObjectId, ObjectId>) -> Action {
        let remap = |id: ObjectId| mapping.get(&id).copied().unwrap_or(id);
        let target = match &self.target {
            ActionTarget::LocationToLocation { .. } => self.target.clone(),
            ActionTarget::ObjectToLocation {
                source,
                destination,
            } => ActionTarget::ObjectToLocation {
                source: remap(*source),
                destination: *destination,
            },
            ActionTarget::ObjectToObject {
                source,
                destination,
            } => ActionTarget::ObjectToObject {
                source: remap(*source),
                destination: remap(*destination),
            },
            ActionTarget::ObjectToVector {
                source,
                vector_to_dest,
                orientation_vector,
            } => ActionTarget::ObjectToVector {
                source: remap(*source),
                vector_to_dest: *vector_to_dest,
                orientation_vector: *orientation_vector,
            },
        };
        Action {
            target,
            ..self.clone()
        }
    }
}

/// Collects name, player, delay and metadata; a terminal method picks the
/// addressing mode.
#[derive(Clone, Debug)]
pub struct ActionBuilder {
    name: String,
    player_id: PlayerId,
    delay: u32,
    meta_data: BTreeMap<String, i32>,
}

impl ActionBuilder {
    #[must_use]
    pub fn delay(mut self, delay: u32) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn meta(mut self, meta_data: BTreeMap<String, i32>) -> Self {
        self.meta_data = meta_data;
        self
    }

    #[must_use]
    pub fn meta_value(mut self, key: impl Into<String>, value: i32) -> Self {
        self.meta_data.insert(key.into(), value);
        self
    }

    pub fn between_locations(self, source: Position, destination: Position) -> Action {
        self.finish(ActionTarget::LocationToLocation {
            source,
            destination,
        })
    }

    pub fn from_object_to_location(self, source: ObjectId, destination: Position) -> Action {
        self.finish(ActionTarget::ObjectToLocation {
            source,
            destination,
        })
    }

    pub fn between_objects(self, source: ObjectId, destination: ObjectId) -> Action {
        self.finish(ActionTarget::ObjectToObject {
            source,
            destination,
        })
    }

    /// With `relative`, both vectors are rotated into the source object's
    /// facing frame.
    pub fn from_object_by_vector(
        self,
        grid: &Grid,
        source: ObjectId,
        vector: Offset,
        orientation: Offset,
        relative: bool,
    ) -> Action {
        let (vector_to_dest, orientation_vector) = if relative {
            let facing = grid
                .object(source)
                .map(|object| object.orientation())
                .unwrap_or_default();
            (facing.rotate(vector), facing.rotate(orientation))
        } else {
            (vector, orientation)
        };
        self.finish(ActionTarget::ObjectToVector {
            source,
            vector_to_dest,
            orientation_vector,
        })
    }

    fn finish(self, target: ActionTarget) -> Action {
        Action {
            name: self.name,
            player_id: self.player_id,
            delay: self.delay,
            meta_data: self.meta_data,
            target,
        }
    }
}
