use std::collections::BTreeMap;

use super::{ObjectId, Position};

/// Objects stacked on one cell, keyed by z-index. At most one object per layer.
pub type CellOccupants = BTreeMap<i32, ObjectId>;

/// Location index of placed objects: `position -> (z-index -> object)`.
///
/// The top of a cell is its highest z-index. Empty cells are pruned so the
/// index only holds occupied positions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OccupancyMap {
    occupancy: BTreeMap<Position, CellOccupants>,
}

impl OccupancyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupancy(&self) -> &BTreeMap<Position, CellOccupants> {
        &self.occupancy
    }

    pub fn occupants(&self, position: &Position) -> Option<&CellOccupants> {
        self.occupancy.get(position)
    }

    /// Highest object on the cell.
    pub fn top(&self, position: &Position) -> Option<ObjectId> {
        self.occupancy
            .get(position)
            .and_then(|slots| slots.last_key_value())
            .map(|(_, id)| *id)
    }

    pub fn is_layer_free(&self, position: &Position, z_index: i32) -> bool {
        self.occupancy
            .get(position)
            .is_none_or(|slots| !slots.contains_key(&z_index))
    }

    /// Places an object on a layer. Returns false if the layer is taken.
    pub fn add_occupant(&mut self, position: Position, z_index: i32, object: ObjectId) -> bool {
        let slots = self.occupancy.entry(position).or_default();
        if slots.contains_key(&z_index) {
            return false;
        }
        slots.insert(z_index, object);
        true
    }

    /// Removes an object from a layer. Returns false if it was not there.
    pub fn remove_occupant(&mut self, position: &Position, z_index: i32, object: ObjectId) -> bool {
        let Some(slots) = self.occupancy.get_mut(position) else {
            return false;
        };
        if slots.get(&z_index) != Some(&object) {
            return false;
        }
        slots.remove(&z_index);
        if slots.is_empty() {
            self.occupancy.remove(position);
        }
        true
    }

    pub fn clear(&mut self) {
        self.occupancy.clear();
    }

    /// Number of indexed objects across all cells.
    pub fn len(&self) -> usize {
        self.occupancy.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.occupancy.is_empty()
    }
}
