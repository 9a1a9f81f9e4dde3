use std::collections::BTreeSet;

use super::{PlayerId, Position};

/// Per-observer sets of locations whose contents changed since the observer
/// last purged. Observer 0 is the global view; every player id has its own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtyLocations {
    observers: Vec<BTreeSet<Position>>,
}

impl DirtyLocations {
    /// Tracks observer 0 plus players `1..=player_count`.
    pub fn new(player_count: u32) -> Self {
        Self {
            observers: vec![BTreeSet::new(); player_count as usize + 1],
        }
    }

    pub fn invalidate(&mut self, position: Position) {
        for set in &mut self.observers {
            set.insert(position);
        }
    }

    pub fn peek(&self, observer: PlayerId) -> Option<&BTreeSet<Position>> {
        self.observers.get(observer as usize)
    }

    /// Returns and clears the observer's set. Unknown observers get an empty set.
    pub fn purge(&mut self, observer: PlayerId) -> BTreeSet<Position> {
        self.observers
            .get_mut(observer as usize)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        for set in &mut self.observers {
            set.clear();
        }
    }
}
