//! Legality checks and source/destination dispatch of a single action.

use std::sync::Arc;

use tracing::debug;

use super::interpret::{Frame, evaluate_condition, run_chain};
use super::EngineError;
use crate::action::Action;
use crate::behaviour::{BehaviourResult, Rewards, accumulate_rewards};
use crate::object::{BOUNDARY_OBJECT, EMPTY_OBJECT};
use crate::state::{Grid, ObjectId, PlayerId};

/// Partner name the source looks its behaviours up under: the destination
/// object's type, or `_boundary` when the destination lies off the grid and
/// only the default object was found there.
pub fn destination_partner(grid: &Grid, action: &Action, destination: ObjectId) -> String {
    let name = grid
        .object(destination)
        .map(|object| object.name())
        .unwrap_or(EMPTY_OBJECT);
    if name == EMPTY_OBJECT
        && grid.is_default_object(destination)
        && action
            .destination_location(grid)
            .is_some_and(|location| !grid.contains(location))
    {
        return BOUNDARY_OBJECT.to_owned();
    }
    name.to_owned()
}

/// Whether `object` may perform `action`: it has source behaviours for the
/// action name and the destination's partner name, and every precondition
/// registered for that pair holds.
pub fn is_valid_action(grid: &Grid, object: ObjectId, action: &Action) -> Result<bool, EngineError> {
    let Some(source) = grid.object(object) else {
        return Ok(false);
    };
    let object_type = Arc::clone(source.object_type());
    if !object_type.can_perform(action.name()) {
        return Ok(false);
    }

    let destination = action.destination_object(grid);
    let partner = destination_partner(grid, action, destination);
    if object_type
        .source_behaviours()
        .get(action.name(), &partner)
        .is_none()
    {
        debug!(
            target: "gridrule::engine",
            object = object_type.name(),
            action = action.name(),
            partner = %partner,
            "no behaviour for partner"
        );
        return Ok(false);
    }

    for condition in object_type.preconditions(action.name(), &partner) {
        if !evaluate_condition(grid, object, action, condition)? {
            debug!(
                target: "gridrule::engine",
                object = object_type.name(),
                action = action.name(),
                comparison = %condition.comparison,
                "precondition failed"
            );
            return Ok(false);
        }
    }
    Ok(true)
}

/// Runs the source-side behaviours of `object` for `action`. A missing entry
/// aborts with no reward.
pub fn on_action_src(
    grid: &mut Grid,
    object: ObjectId,
    action: &Action,
    depth: usize,
) -> Result<BehaviourResult, EngineError> {
    let object_type = Arc::clone(
        grid.object(object)
            .ok_or(EngineError::ObjectNotFound { id: object })?
            .object_type(),
    );
    let destination = action.destination_object(grid);
    let partner = destination_partner(grid, action, destination);
    let Some(commands) = object_type.source_behaviours().get(action.name(), &partner) else {
        return Ok(BehaviourResult::abort());
    };
    run_chain(grid, &Frame::new(object, action, depth), commands)
}

/// Runs the destination-side behaviours of `object` for `action`, keyed by
/// the source object's type name.
pub fn on_action_dst(
    grid: &mut Grid,
    object: ObjectId,
    action: &Action,
    depth: usize,
) -> Result<BehaviourResult, EngineError> {
    let object_type = Arc::clone(
        grid.object(object)
            .ok_or(EngineError::ObjectNotFound { id: object })?
            .object_type(),
    );
    let source = action.source_object(grid);
    let partner = grid
        .object(source)
        .map(|object| object.name().to_owned())
        .unwrap_or_else(|| EMPTY_OBJECT.to_owned());
    let Some(commands) = object_type
        .destination_behaviours()
        .get(action.name(), &partner)
    else {
        return Ok(BehaviourResult::abort());
    };
    run_chain(grid, &Frame::new(object, action, depth), commands)
}

/// Resolves one due action: ownership, legality, source chain, then the
/// destination chain unless the source aborted or either end was removed.
pub fn execute_action(
    grid: &mut Grid,
    player_id: PlayerId,
    action: &Action,
    depth: usize,
) -> Result<Rewards, EngineError> {
    let mut rewards = Rewards::new();
    let source = action.source_object(grid);
    let Some(source_object) = grid.object(source) else {
        debug!(target: "gridrule::engine", action = action.name(), "source object is gone");
        return Ok(rewards);
    };
    if player_id != 0 && source_object.player_id() != player_id {
        debug!(
            target: "gridrule::engine",
            action = action.name(),
            player = player_id,
            owner = source_object.player_id(),
            "player does not control the source object"
        );
        return Ok(rewards);
    }
    if !is_valid_action(grid, source, action)? {
        return Ok(rewards);
    }

    let destination = action.destination_object(grid);
    debug!(target: "gridrule::engine", "{}", action.description(grid));

    let source_result = on_action_src(grid, source, action, depth)?;
    accumulate_rewards(&mut rewards, &source_result.rewards);
    if source_result.abort_action
        || destination == source
        || !grid.contains_object(source)
        || grid.object(destination).is_none()
    {
        return Ok(rewards);
    }

    let destination_result = on_action_dst(grid, destination, action, depth)?;
    accumulate_rewards(&mut rewards, &destination_result.rewards);
    Ok(rewards)
}
