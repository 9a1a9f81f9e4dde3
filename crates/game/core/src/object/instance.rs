use std::sync::Arc;

use super::{ObjectType, PLAYER_SLOT, X_SLOT, Y_SLOT};
use crate::state::{Direction, ObjectId, PlayerId, Position};

/// Live object: variable cells plus a shared reference to its compiled type.
///
/// Instances are created by the [`super::ObjectGenerator`] and receive their id
/// when the grid takes ownership of them.
#[derive(Clone, Debug)]
pub struct Object {
    id: ObjectId,
    object_type: Arc<ObjectType>,
    variables: Vec<i32>,
    orientation: Direction,
    render_tile: i32,
    avatar: bool,
}

impl Object {
    pub(crate) fn new(object_type: Arc<ObjectType>, player_id: PlayerId, avatar: bool) -> Self {
        let mut variables = object_type.layout().initial_values();
        variables[PLAYER_SLOT] = player_id as i32;
        Self {
            id: ObjectId::UNASSIGNED,
            object_type,
            variables,
            orientation: Direction::None,
            render_tile: 0,
            avatar,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.object_type.name()
    }

    pub fn object_type(&self) -> &Arc<ObjectType> {
        &self.object_type
    }

    pub fn z_index(&self) -> i32 {
        self.object_type.z_index()
    }

    pub fn position(&self) -> Position {
        Position::new(self.variables[X_SLOT], self.variables[Y_SLOT])
    }

    pub fn player_id(&self) -> PlayerId {
        self.variables[PLAYER_SLOT] as PlayerId
    }

    pub fn orientation(&self) -> Direction {
        self.orientation
    }

    pub fn render_tile(&self) -> i32 {
        self.render_tile
    }

    /// Tile name observers use, e.g. `wall2`.
    pub fn render_tile_name(&self) -> String {
        format!("{}{}", self.name(), self.render_tile)
    }

    pub fn is_avatar(&self) -> bool {
        self.avatar
    }

    pub fn variable(&self, name: &str) -> Option<i32> {
        self.object_type
            .layout()
            .slot(name)
            .and_then(|slot| self.variables.get(slot).copied())
    }

    /// `(name, value)` pairs in slot order, positional cells included.
    pub fn variables(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.object_type
            .layout()
            .names()
            .zip(self.variables.iter().copied())
    }

    pub fn description(&self) -> String {
        format!("{}@{}", self.name(), self.position())
    }

    pub(crate) fn slot(&self, slot: usize) -> Option<i32> {
        self.variables.get(slot).copied()
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> Option<&mut i32> {
        self.variables.get_mut(slot)
    }

    pub(crate) fn slot_values(&self) -> &[i32] {
        &self.variables
    }

    pub(crate) fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.variables[X_SLOT] = position.x;
        self.variables[Y_SLOT] = position.y;
    }

    pub(crate) fn set_orientation(&mut self, orientation: Direction) {
        self.orientation = orientation;
    }

    pub(crate) fn set_render_tile(&mut self, tile: i32) {
        self.render_tile = tile;
    }
}
