//! Spatial hash of the objects an `exec` search looks for.

use std::collections::{BTreeMap, BTreeSet};

use super::{CollisionDetector, CollisionResult};
use crate::state::{ObjectId, Position};

/// Buckets objects by `cell_size`-sized squares so a search only visits the
/// buckets overlapping its range box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpatialHashCollisionDetector {
    cell_size: i32,
    range: u32,
    buckets: BTreeMap<(i32, i32), BTreeSet<ObjectId>>,
    positions: BTreeMap<ObjectId, Position>,
}

impl SpatialHashCollisionDetector {
    pub fn new(cell_size: u32, range: u32) -> Self {
        Self {
            cell_size: cell_size.max(1) as i32,
            range,
            buckets: BTreeMap::new(),
            positions: BTreeMap::new(),
        }
    }

    #[inline]
    fn bucket(&self, position: Position) -> (i32, i32) {
        (
            position.x.div_euclid(self.cell_size),
            position.y.div_euclid(self.cell_size),
        )
    }

    pub fn range(&self) -> u32 {
        self.range
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.positions.clear();
    }
}

impl CollisionDetector for SpatialHashCollisionDetector {
    fn upsert(&mut self, object: ObjectId, position: Position) {
        self.remove(object);
        let bucket = self.bucket(position);
        self.buckets.entry(bucket).or_default().insert(object);
        self.positions.insert(object, position);
    }

    fn remove(&mut self, object: ObjectId) -> bool {
        let Some(position) = self.positions.remove(&object) else {
            return false;
        };
        let bucket = self.bucket(position);
        if let Some(members) = self.buckets.get_mut(&bucket) {
            members.remove(&object);
            if members.is_empty() {
                self.buckets.remove(&bucket);
            }
        }
        true
    }

    fn search(&self, origin: Position) -> CollisionResult {
        let range = self.range.min(i32::MAX as u32) as i32;
        let low = self.bucket(Position::new(
            origin.x.saturating_sub(range),
            origin.y.saturating_sub(range),
        ));
        let high = self.bucket(Position::new(
            origin.x.saturating_add(range),
            origin.y.saturating_add(range),
        ));

        let mut hits: Vec<(u64, ObjectId)> = Vec::new();
        for (_, members) in self.buckets.range(low..=(high.0, high.1)) {
            for object in members {
                let Some(position) = self.positions.get(object) else {
                    continue;
                };
                let dx = position.x.abs_diff(origin.x);
                let dy = position.y.abs_diff(origin.y);
                if dx <= self.range && dy <= self.range {
                    let distance = u64::from(dx) * u64::from(dx) + u64::from(dy) * u64::from(dy);
                    hits.push((distance, *object));
                }
            }
        }
        hits.sort_unstable();
        hits.dedup();

        CollisionResult {
            objects: hits.iter().map(|(_, object)| *object).collect(),
            closest: hits.into_iter().map(|(_, object)| object).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_is_bounded_by_range() {
        let mut detector = SpatialHashCollisionDetector::new(2, 3);
        detector.upsert(ObjectId(1), Position::new(1, 1));
        detector.upsert(ObjectId(2), Position::new(4, 4));
        detector.upsert(ObjectId(3), Position::new(9, 9));

        let result = detector.search(Position::new(1, 2));
        assert!(result.objects.contains(&ObjectId(1)));
        assert!(result.objects.contains(&ObjectId(2)));
        assert!(!result.objects.contains(&ObjectId(3)));
        assert_eq!(result.closest, vec![ObjectId(1), ObjectId(2)]);
    }

    #[test]
    fn upsert_moves_and_remove_forgets() {
        let mut detector = SpatialHashCollisionDetector::new(4, 10);
        detector.upsert(ObjectId(1), Position::new(0, 0));
        detector.upsert(ObjectId(1), Position::new(7, 7));
        assert_eq!(detector.len(), 1);
        assert_eq!(detector.search(Position::new(7, 6)).closest, vec![ObjectId(1)]);

        assert!(detector.remove(ObjectId(1)));
        assert!(!detector.remove(ObjectId(1)));
        assert!(detector.search(Position::new(7, 6)).objects.is_empty());
    }

    #[test]
    fn negative_coordinates_bucket_correctly() {
        let mut detector = SpatialHashCollisionDetector::new(3, 2);
        detector.upsert(ObjectId(4), Position::new(-1, -1));
        let result = detector.search(Position::new(0, 0));
        assert_eq!(result.closest, vec![ObjectId(4)]);
    }
}
