use std::sync::Arc;

use super::{EngineError, perform_at_depth};
use crate::action::{Action, InputMapping, resolve_input_mapping};
use crate::behaviour::Rewards;
use crate::object::Object;
use crate::state::{Grid, ObjectId, Position};

/// A placed object and the rewards its initial actions produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedObject {
    pub id: ObjectId,
    pub rewards: Rewards,
}

/// Adds `object` at `position` and runs its initial actions.
///
/// Initial actions without an explicit mapping inherit the vector and
/// metadata of `originating`, the action whose behaviour created the object.
pub(crate) fn place_at_depth(
    grid: &mut Grid,
    position: Position,
    object: Object,
    originating: Option<&Action>,
    depth: usize,
) -> Result<PlacedObject, EngineError> {
    let id = grid.add_object(position, object)?;
    let actions = initial_actions(grid, id, originating)?;
    let rewards = if actions.is_empty() {
        Rewards::new()
    } else {
        perform_at_depth(grid, 0, &actions, depth + 1)?
    };
    Ok(PlacedObject { id, rewards })
}

fn initial_actions(
    grid: &mut Grid,
    id: ObjectId,
    originating: Option<&Action>,
) -> Result<Vec<Action>, EngineError> {
    let object = grid.object(id).ok_or(EngineError::ObjectNotFound { id })?;
    let object_type = Arc::clone(object.object_type());
    let position = object.position();
    if object_type.initial_actions().is_empty() {
        return Ok(Vec::new());
    }

    let fallback = originating
        .map(|action| InputMapping {
            vector_to_dest: action.vector_to_dest(grid),
            orientation_vector: action.orientation_vector(),
            description: String::new(),
            meta_data: action.meta_data().clone(),
        })
        .unwrap_or_default();

    let mut actions = Vec::with_capacity(object_type.initial_actions().len());
    for definition in object_type.initial_actions() {
        let resolved = resolve_input_mapping(
            grid,
            &definition.action,
            definition.action_id,
            definition.randomize,
            fallback.clone(),
        )?;
        let vector = if resolved.mapped_to_grid {
            resolved.destination - position
        } else {
            resolved.vector_to_dest
        };
        actions.push(
            Action::builder(definition.action.as_str(), 0)
                .delay(definition.delay)
                .meta(resolved.meta_data)
                .from_object_by_vector(
                    grid,
                    id,
                    vector,
                    resolved.orientation_vector,
                    resolved.relative,
                ),
        );
    }
    Ok(actions)
}
