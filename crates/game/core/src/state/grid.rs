use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{
    DelayedActionQueue, DirtyLocations, Direction, GlobalVariables, ObjectId, OccupancyMap,
    PcgRng, PlayerId, Position, ScheduledAction, Tick,
};
use crate::action::{Action, ActionTarget};
use crate::config::EngineConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::object::{Object, ObjectGenerator, ObjectType};
use crate::search::{CollisionDetector, SpatialHashCollisionDetector};

/// Bucket edge of the spatial hash behind registered collision detectors.
const DETECTOR_CELL_SIZE: u32 = 10;

/// Why the grid refused to place an object.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlacementError {
    #[error("position {position} is outside the grid")]
    OutOfBounds { position: Position },

    #[error("layer {z_index} at {position} is already occupied")]
    Occupied { position: Position, z_index: i32 },
}

impl GameError for PlacementError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "PLACEMENT_OUT_OF_BOUNDS",
            Self::Occupied { .. } => "PLACEMENT_OCCUPIED",
        }
    }
}

#[derive(Clone, Debug)]
struct RegisteredDetector {
    target: String,
    detector: SpatialHashCollisionDetector,
}

/// Spatial and temporal state of one simulation.
///
/// The grid owns every object (an arena keyed by [`ObjectId`]) together with
/// the occupancy index, globals, the delayed-action queue, dirty tracking, the
/// collision detector registry and the RNG. Every placed object has exactly
/// one entry in the occupancy index; all mutations go through methods that
/// keep both sides in step.
///
/// Default objects (`_empty` per player id including 0, and one `_boundary`)
/// live outside the occupancy index and are never placed or removed.
#[derive(Debug)]
pub struct Grid {
    generator: Arc<ObjectGenerator>,
    config: EngineConfig,
    width: u32,
    height: u32,
    tick: Tick,
    objects: BTreeMap<ObjectId, Object>,
    defaults: BTreeMap<ObjectId, Object>,
    next_object_id: u32,
    occupancy: OccupancyMap,
    globals: GlobalVariables,
    delayed: DelayedActionQueue,
    dirty: DirtyLocations,
    detectors: BTreeMap<String, RegisteredDetector>,
    rng: PcgRng,
}

impl Grid {
    pub fn new(generator: Arc<ObjectGenerator>, width: u32, height: u32, config: EngineConfig) -> Self {
        let player_count = generator.player_count();
        let mut defaults = BTreeMap::new();
        for player in 0..=player_count {
            let mut empty = generator.empty_instance(player);
            empty.set_id(ObjectId(player));
            defaults.insert(empty.id(), empty);
        }
        let mut boundary = generator.boundary_instance();
        boundary.set_id(ObjectId(player_count + 1));
        defaults.insert(boundary.id(), boundary);

        Self {
            globals: GlobalVariables::from_definitions(generator.globals(), player_count),
            dirty: DirtyLocations::new(player_count),
            rng: PcgRng::seeded(config.seed),
            next_object_id: player_count + 2,
            generator,
            config,
            width,
            height,
            tick: Tick::ZERO,
            objects: BTreeMap::new(),
            defaults,
            occupancy: OccupancyMap::new(),
            delayed: DelayedActionQueue::new(),
            detectors: BTreeMap::new(),
        }
    }

    // ========================================================================
    // Dimensions & time
    // ========================================================================

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn set_tick(&mut self, tick: Tick) {
        self.tick = tick;
    }

    pub fn advance_tick(&mut self) -> Tick {
        self.tick = self.tick.next();
        self.tick
    }

    pub fn generator(&self) -> &Arc<ObjectGenerator> {
        &self.generator
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn player_count(&self) -> u32 {
        self.generator.player_count()
    }

    pub fn rng_mut(&mut self) -> &mut PcgRng {
        &mut self.rng
    }

    /// Clears objects, queue, dirty sets and detectors, and resizes the grid.
    /// Globals and the RNG are left alone.
    pub fn reset_map(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.tick = Tick::ZERO;
        self.objects.clear();
        self.occupancy.clear();
        self.delayed.clear();
        self.detectors.clear();
        self.dirty = DirtyLocations::new(self.player_count());
        self.next_object_id = self.player_count() + 2;
    }

    // ========================================================================
    // Objects
    // ========================================================================

    /// Placed object or default object by id.
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id).or_else(|| self.defaults.get(&id))
    }

    /// Whether `id` is currently placed on the grid.
    pub fn contains_object(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn is_default_object(&self, id: ObjectId) -> bool {
        self.defaults.contains_key(&id)
    }

    /// Placed objects in id order.
    pub fn objects(&self) -> impl Iterator<Item = &Object> + '_ {
        self.objects.values()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Top object of a cell.
    pub fn object_at(&self, position: Position) -> Option<ObjectId> {
        self.occupancy.top(&position)
    }

    /// Objects of a cell from the lowest layer up.
    pub fn objects_at(&self, position: Position) -> impl Iterator<Item = &Object> + '_ {
        self.occupancy
            .occupants(&position)
            .into_iter()
            .flat_map(|slots| slots.values())
            .filter_map(|id| self.objects.get(id))
    }

    pub fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    /// `_empty` object of `player`; unknown players get the environment's.
    pub fn default_object(&self, player: PlayerId) -> ObjectId {
        if player <= self.player_count() {
            ObjectId(player)
        } else {
            ObjectId(0)
        }
    }

    pub fn boundary_object(&self) -> ObjectId {
        ObjectId(self.player_count() + 1)
    }

    /// Takes ownership of `object` and places it. The object keeps its
    /// variables; its position cells are set to `position`.
    pub fn add_object(&mut self, position: Position, object: Object) -> Result<ObjectId, PlacementError> {
        if !self.contains(position) {
            return Err(PlacementError::OutOfBounds { position });
        }
        let z_index = object.z_index();
        if !self.occupancy.is_layer_free(&position, z_index) {
            return Err(PlacementError::Occupied { position, z_index });
        }
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        self.insert_object(id, position, object);
        debug!(target: "gridrule::grid", object = %id, %position, "added object");
        Ok(id)
    }

    fn insert_object(&mut self, id: ObjectId, position: Position, mut object: Object) {
        object.set_id(id);
        object.set_position(position);
        self.occupancy.add_occupant(position, object.z_index(), id);
        let object_type = Arc::clone(object.object_type());
        self.register_detectors(&object_type);
        for registered in self.detectors.values_mut() {
            if registered.target == object.name() {
                registered.detector.upsert(id, position);
            }
        }
        self.objects.insert(id, object);
        self.dirty.invalidate(position);
    }

    /// Detaches an object. Default objects cannot be removed.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<Object> {
        if self.defaults.contains_key(&id) {
            warn!(target: "gridrule::grid", object = %id, "default objects cannot be removed");
            return None;
        }
        let object = self.objects.remove(&id)?;
        let position = object.position();
        self.occupancy.remove_occupant(&position, object.z_index(), id);
        for registered in self.detectors.values_mut() {
            registered.detector.remove(id);
        }
        self.dirty.invalidate(position);
        debug!(target: "gridrule::grid", object = %id, %position, "removed object");
        Some(object)
    }

    /// Moves an object. Either the position cells and the index both change or
    /// neither does; out-of-bounds or occupied layers reject the move.
    pub fn move_object(&mut self, id: ObjectId, to: Position) -> bool {
        let Some(object) = self.objects.get(&id) else {
            return false;
        };
        let from = object.position();
        let z_index = object.z_index();
        let name = object.name().to_owned();
        if !self.contains(to) || !self.occupancy.is_layer_free(&to, z_index) {
            return false;
        }

        self.occupancy.remove_occupant(&from, z_index, id);
        self.occupancy.add_occupant(to, z_index, id);
        if let Some(object) = self.objects.get_mut(&id) {
            object.set_position(to);
        }
        for registered in self.detectors.values_mut() {
            if registered.target == name {
                registered.detector.upsert(id, to);
            }
        }
        self.dirty.invalidate(from);
        self.dirty.invalidate(to);
        true
    }

    pub fn set_orientation(&mut self, id: ObjectId, orientation: Direction) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.set_orientation(orientation);
            let position = object.position();
            self.dirty.invalidate(position);
        }
    }

    pub fn set_render_tile(&mut self, id: ObjectId, tile: i32) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.set_render_tile(tile);
            let position = object.position();
            self.dirty.invalidate(position);
        }
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    // ========================================================================
    // Globals & dirty tracking
    // ========================================================================

    pub fn globals(&self) -> &GlobalVariables {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut GlobalVariables {
        &mut self.globals
    }

    pub fn reset_global_variables(&mut self) {
        self.globals.reset();
    }

    pub fn invalidate_location(&mut self, position: Position) {
        self.dirty.invalidate(position);
    }

    pub fn dirty_locations(&self, observer: PlayerId) -> Option<&BTreeSet<Position>> {
        self.dirty.peek(observer)
    }

    /// Returns the locations changed since `observer` last purged, and forgets them.
    pub fn purge_dirty_locations(&mut self, observer: PlayerId) -> BTreeSet<Position> {
        self.dirty.purge(observer)
    }

    // ========================================================================
    // Delayed actions
    // ========================================================================

    /// Queues `action` for tick `now + action.delay()`.
    pub fn schedule_delayed(&mut self, player_id: PlayerId, action: Action) {
        let due = self.tick + u64::from(action.delay());
        debug!(
            target: "gridrule::grid",
            action = action.name(),
            due = due.0,
            "scheduled delayed action"
        );
        self.delayed.schedule(due, player_id, action);
    }

    pub fn pop_due_delayed(&mut self) -> Option<ScheduledAction> {
        self.delayed.pop_due(self.tick)
    }

    pub fn delayed_actions(&self) -> &DelayedActionQueue {
        &self.delayed
    }

    // ========================================================================
    // Collision detectors
    // ========================================================================

    /// Registers the detectors an object type's `exec` searches need. Each
    /// name is registered once and seeded with the placed targets.
    pub fn register_detectors(&mut self, object_type: &ObjectType) {
        for requirement in object_type.detectors() {
            if self.detectors.contains_key(&requirement.name) {
                continue;
            }
            let range = self.width.max(self.height);
            let mut detector = SpatialHashCollisionDetector::new(DETECTOR_CELL_SIZE, range);
            for object in self.objects.values() {
                if object.name() == requirement.target {
                    detector.upsert(object.id(), object.position());
                }
            }
            debug!(
                target: "gridrule::grid",
                detector = %requirement.name,
                target_object = %requirement.target,
                "registered collision detector"
            );
            self.detectors.insert(
                requirement.name.clone(),
                RegisteredDetector {
                    target: requirement.target.clone(),
                    detector,
                },
            );
        }
    }

    pub fn collision_detector(&self, name: &str) -> Option<&SpatialHashCollisionDetector> {
        self.detectors.get(name).map(|registered| &registered.detector)
    }

    pub fn collision_detector_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.detectors.keys().map(String::as_str)
    }

    // ========================================================================
    // Cloning & digests
    // ========================================================================

    /// Independent copy of this grid plus the old-to-new object id mapping.
    ///
    /// Ids are preserved, so the mapping is the identity; delayed actions are
    /// still rebound through it. Dirty sets start empty in the copy.
    pub fn clone_state(&self) -> (Grid, BTreeMap<ObjectId, ObjectId>) {
        let mut clone = Grid {
            generator: Arc::clone(&self.generator),
            config: self.config.clone(),
            width: self.width,
            height: self.height,
            tick: self.tick,
            objects: BTreeMap::new(),
            defaults: self.defaults.clone(),
            next_object_id: self.next_object_id,
            occupancy: OccupancyMap::new(),
            globals: self.globals.clone(),
            delayed: DelayedActionQueue::new(),
            dirty: DirtyLocations::new(self.player_count()),
            detectors: BTreeMap::new(),
            rng: self.rng.clone(),
        };

        let mut mapping: BTreeMap<ObjectId, ObjectId> =
            self.defaults.keys().map(|id| (*id, *id)).collect();
        for (id, object) in &self.objects {
            let copy = self.generator.clone_instance(object);
            clone.insert_object(*id, object.position(), copy);
            mapping.insert(*id, *id);
        }
        for scheduled in self.delayed.iter() {
            clone.delayed.schedule(
                scheduled.due,
                scheduled.player_id,
                scheduled.action.remap_objects(&mapping),
            );
        }
        clone.dirty.clear();
        (clone, mapping)
    }

    /// SHA-256 over tick, globals, objects, delayed queue and RNG state.
    pub fn state_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"gridrule-state-v1");
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        hasher.update(self.tick.0.to_le_bytes());

        for (name, per_player, values) in self.globals.iter() {
            hash_str(&mut hasher, name);
            hasher.update([u8::from(per_player)]);
            for value in values {
                hasher.update(value.to_le_bytes());
            }
        }

        hasher.update((self.objects.len() as u64).to_le_bytes());
        for object in self.objects.values() {
            hasher.update(object.id().0.to_le_bytes());
            hash_str(&mut hasher, object.name());
            hasher.update(object.z_index().to_le_bytes());
            hasher.update([object.orientation().digest_byte(), u8::from(object.is_avatar())]);
            hasher.update(object.render_tile().to_le_bytes());
            for value in object.slot_values() {
                hasher.update(value.to_le_bytes());
            }
        }

        hasher.update((self.delayed.len() as u64).to_le_bytes());
        for scheduled in self.delayed.iter() {
            hasher.update(scheduled.due.0.to_le_bytes());
            hasher.update(scheduled.player_id.to_le_bytes());
            hash_action(&mut hasher, &scheduled.action);
        }

        hasher.update(self.rng.state().to_le_bytes());
        hasher.finalize().into()
    }
}

fn hash_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn hash_action(hasher: &mut Sha256, action: &Action) {
    hash_str(hasher, action.name());
    hasher.update(action.player_id().to_le_bytes());
    hasher.update(action.delay().to_le_bytes());
    for (key, value) in action.meta_data() {
        hash_str(hasher, key);
        hasher.update(value.to_le_bytes());
    }
    let coordinates = |hasher: &mut Sha256, values: [i32; 4]| {
        for value in values {
            hasher.update(value.to_le_bytes());
        }
    };
    match action.target() {
        ActionTarget::LocationToLocation {
            source,
            destination,
        } => {
            hasher.update([0]);
            coordinates(hasher, [source.x, source.y, destination.x, destination.y]);
        }
        ActionTarget::ObjectToLocation {
            source,
            destination,
        } => {
            hasher.update([1]);
            hasher.update(source.0.to_le_bytes());
            coordinates(hasher, [destination.x, destination.y, 0, 0]);
        }
        ActionTarget::ObjectToObject {
            source,
            destination,
        } => {
            hasher.update([2]);
            hasher.update(source.0.to_le_bytes());
            hasher.update(destination.0.to_le_bytes());
        }
        ActionTarget::ObjectToVector {
            source,
            vector_to_dest,
            orientation_vector,
        } => {
            hasher.update([3]);
            hasher.update(source.0.to_le_bytes());
            coordinates(
                hasher,
                [
                    vector_to_dest.x,
                    vector_to_dest.y,
                    orientation_vector.x,
                    orientation_vector.y,
                ],
            );
        }
    }
}
