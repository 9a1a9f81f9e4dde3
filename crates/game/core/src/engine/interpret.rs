//! Interpreter for compiled behaviour chains.

use std::sync::Arc;

use tracing::{debug, warn};

use super::placement::place_at_depth;
use super::{EngineError, perform_at_depth};
use crate::action::{Action, ActionError, InputMapping, resolve_input_mapping};
use crate::behaviour::{
    ActionOperand, ArithmeticOp, BehaviourResult, Command, Condition, DefinitionError,
    ExecCommand, Executor, MoveTarget, Operand, Rewards, SearchSpec, VariableRef,
};
use crate::object::{Object, RESERVED_VARIABLES, VariableLayout};
use crate::search::{AStarPathFinder, CollisionDetector, PathFinder};
use crate::state::{Direction, GlobalId, Grid, ObjectId, PlayerId, Position};

/// The object running a chain and the action that triggered it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Frame<'a> {
    pub owner: ObjectId,
    pub action: &'a Action,
    pub depth: usize,
}

impl<'a> Frame<'a> {
    pub fn new(owner: ObjectId, action: &'a Action, depth: usize) -> Self {
        Self {
            owner,
            action,
            depth,
        }
    }
}

/// Runs `commands` in order. Stops after the first abort, or as soon as the
/// owner has left the grid.
pub(crate) fn run_chain(
    grid: &mut Grid,
    frame: &Frame<'_>,
    commands: &[Command],
) -> Result<BehaviourResult, EngineError> {
    let mut result = BehaviourResult::neutral();
    for command in commands {
        if grid.object(frame.owner).is_none() {
            break;
        }
        let step = execute_command(grid, frame, command)?;
        let abort = step.abort_action;
        result.merge(step);
        if abort {
            break;
        }
    }
    Ok(result)
}

pub(crate) fn evaluate_condition(
    grid: &Grid,
    owner: ObjectId,
    action: &Action,
    condition: &Condition,
) -> Result<bool, EngineError> {
    let lhs = read_operand(grid, owner, action, &condition.lhs)?;
    let rhs = read_operand(grid, owner, action, &condition.rhs)?;
    Ok(condition.comparison.holds(lhs, rhs))
}

fn execute_command(
    grid: &mut Grid,
    frame: &Frame<'_>,
    command: &Command,
) -> Result<BehaviourResult, EngineError> {
    match command {
        Command::Nop => Ok(BehaviourResult::neutral()),
        Command::Reward(amount) => reward(grid, frame, amount),
        Command::ChangeTo { object_type } => change_to(grid, frame, object_type),
        Command::Arithmetic { op, target, value } => arithmetic(grid, frame, *op, target, value),
        Command::RotateToAction => {
            let facing = Direction::from_vector(frame.action.orientation_vector());
            grid.set_orientation(frame.owner, facing);
            Ok(BehaviourResult::neutral())
        }
        Command::Move(target) => {
            let destination = match target {
                MoveTarget::Destination => frame.action.destination_location(grid),
                MoveTarget::Source => frame.action.source_location(grid),
                MoveTarget::Coordinates { x, y } => Some(Position::new(
                    read_operand(grid, frame.owner, frame.action, x)?,
                    read_operand(grid, frame.owner, frame.action, y)?,
                )),
            };
            let moved = destination.is_some_and(|to| grid.move_object(frame.owner, to));
            Ok(BehaviourResult::from_abort(!moved))
        }
        Command::Cascade { pivot } => cascade(grid, frame, pivot),
        Command::Exec(exec) => execute_exec(grid, frame, exec),
        Command::Remove => {
            grid.remove_object(frame.owner);
            Ok(BehaviourResult::neutral())
        }
        Command::SetTile(tile) => {
            let tile = read_operand(grid, frame.owner, frame.action, tile)?;
            grid.set_render_tile(frame.owner, tile);
            Ok(BehaviourResult::neutral())
        }
        Command::Spawn { object_type } => spawn(grid, frame, object_type),
        Command::Conditional { condition, body } => {
            if evaluate_condition(grid, frame.owner, frame.action, condition)? {
                run_chain(grid, frame, body)
            } else {
                Ok(BehaviourResult::neutral())
            }
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Credits the owner's player, or the acting player for neutral objects.
fn reward(grid: &Grid, frame: &Frame<'_>, amount: &Operand) -> Result<BehaviourResult, EngineError> {
    let value = read_operand(grid, frame.owner, frame.action, amount)?;
    let owner_player = owner_player(grid, frame.owner)?;
    let player = if owner_player != 0 {
        owner_player
    } else {
        frame.action.player_id()
    };
    if player == 0 || player > grid.player_count() {
        warn!(
            target: "gridrule::engine",
            action = frame.action.name(),
            player,
            "reward has no player to credit"
        );
        return Ok(BehaviourResult::neutral());
    }
    Ok(BehaviourResult::with_rewards(Rewards::from([(player, value)])))
}

fn arithmetic(
    grid: &mut Grid,
    frame: &Frame<'_>,
    op: ArithmeticOp,
    target: &Operand,
    value: &Operand,
) -> Result<BehaviourResult, EngineError> {
    let value = read_operand(grid, frame.owner, frame.action, value)?;
    let cell = resolve_cell(grid, frame.owner, frame.action, target)?;
    write_cell(grid, cell, |current| op.apply(current, value))?;
    if let Some(owner) = grid.object(frame.owner) {
        let position = owner.position();
        grid.invalidate_location(position);
    }
    Ok(BehaviourResult::neutral())
}

/// Replaces the owner with a fresh instance of `object_type` on the same cell
/// and for the same player. Aborts when the new type's layer is taken.
fn change_to(grid: &mut Grid, frame: &Frame<'_>, object_type: &str) -> Result<BehaviourResult, EngineError> {
    let owner = grid
        .object(frame.owner)
        .ok_or(EngineError::ObjectNotFound { id: frame.owner })?;
    let position = owner.position();
    let old_z = owner.z_index();
    let replacement = grid.generator().new_instance(object_type, owner.player_id())?;

    let new_z = replacement.z_index();
    if new_z != old_z && !grid.occupancy().is_layer_free(&position, new_z) {
        debug!(
            target: "gridrule::engine",
            object = %frame.owner,
            into = object_type,
            "change_to blocked by occupied layer"
        );
        return Ok(BehaviourResult::abort());
    }

    grid.remove_object(frame.owner);
    place_or_abort(grid, position, replacement, frame)
}

fn spawn(grid: &mut Grid, frame: &Frame<'_>, object_type: &str) -> Result<BehaviourResult, EngineError> {
    let Some(position) = frame.action.destination_location(grid) else {
        return Ok(BehaviourResult::abort());
    };
    let player = owner_player(grid, frame.owner)?;
    let object = grid.generator().new_instance(object_type, player)?;
    place_or_abort(grid, position, object, frame)
}

fn place_or_abort(
    grid: &mut Grid,
    position: Position,
    object: Object,
    frame: &Frame<'_>,
) -> Result<BehaviourResult, EngineError> {
    match place_at_depth(grid, position, object, Some(frame.action), frame.depth) {
        Ok(placed) => Ok(BehaviourResult::with_rewards(placed.rewards)),
        Err(EngineError::Placement(reason)) => {
            debug!(target: "gridrule::engine", %reason, "placement rejected");
            Ok(BehaviourResult::abort())
        }
        Err(err) => Err(err),
    }
}

/// Re-issues the action from the object at the destination, same vector.
fn cascade(grid: &mut Grid, frame: &Frame<'_>, pivot: &str) -> Result<BehaviourResult, EngineError> {
    if pivot != "_dest" {
        warn!(target: "gridrule::engine", pivot, "cascade only supports _dest");
        return Ok(BehaviourResult::abort());
    }
    let destination = frame.action.destination_object(grid);
    let cascaded = Action::builder(frame.action.name(), frame.action.player_id())
        .meta(frame.action.meta_data().clone())
        .from_object_by_vector(
            grid,
            destination,
            frame.action.vector_to_dest(grid),
            frame.action.orientation_vector(),
            false,
        );
    let rewards = perform_at_depth(grid, 0, std::slice::from_ref(&cascaded), frame.depth + 1)?;
    Ok(BehaviourResult::with_rewards(rewards))
}

fn execute_exec(grid: &mut Grid, frame: &Frame<'_>, exec: &ExecCommand) -> Result<BehaviourResult, EngineError> {
    let owner = grid
        .object(frame.owner)
        .ok_or(EngineError::ObjectNotFound { id: frame.owner })?;
    let origin = owner.position();
    let owner_player = owner.player_id();

    let fallback = InputMapping {
        vector_to_dest: frame.action.vector_to_dest(grid),
        orientation_vector: frame.action.orientation_vector(),
        ..InputMapping::default()
    };
    let resolved = match &exec.search {
        Some(search) => {
            let Some(action_id) = search_action_id(grid, frame.owner, &exec.action, search)? else {
                return Ok(BehaviourResult::neutral());
            };
            resolve_input_mapping(grid, &exec.action, action_id, false, fallback)?
        }
        None => resolve_input_mapping(grid, &exec.action, exec.action_id, exec.randomize, fallback)?,
    };

    let vector = if resolved.mapped_to_grid {
        resolved.destination - origin
    } else {
        resolved.vector_to_dest
    };
    let player = match exec.executor {
        Executor::Action => frame.action.player_id(),
        Executor::Object => owner_player,
    };
    let action = Action::builder(exec.action.as_str(), player)
        .delay(exec.delay)
        .meta(resolved.meta_data)
        .from_object_by_vector(
            grid,
            frame.owner,
            vector,
            resolved.orientation_vector,
            resolved.relative,
        );
    let rewards = perform_at_depth(grid, 0, std::slice::from_ref(&action), frame.depth + 1)?;
    Ok(BehaviourResult::with_rewards(rewards))
}

/// First input mapping id on a path towards the search goal. `None` when the
/// search names a target type but no such object is in range.
fn search_action_id(
    grid: &Grid,
    owner_id: ObjectId,
    action: &str,
    search: &SearchSpec,
) -> Result<Option<u32>, EngineError> {
    let owner = grid
        .object(owner_id)
        .ok_or(EngineError::ObjectNotFound { id: owner_id })?;
    let start = owner.position();
    let facing = owner.orientation().unit_vector();

    let mut goal = search.target_location.unwrap_or(start);
    if let Some(detector) = &search.detector {
        let nearest = grid.collision_detector(detector).and_then(|detector| {
            detector
                .search(start)
                .closest
                .into_iter()
                .find(|candidate| *candidate != owner_id)
        });
        let Some(target) = nearest.and_then(|id| grid.object(id)) else {
            debug!(target: "gridrule::engine", detector = %detector, "search found no target in range");
            return Ok(None);
        };
        goal = target.position();
    }

    let generator = Arc::clone(grid.generator());
    let inputs = generator
        .action_inputs(action)
        .ok_or_else(|| ActionError::MissingInputsDefinition {
            action: action.to_owned(),
        })?;
    let max_depth = search
        .max_depth
        .unwrap_or(grid.config().default_search_depth);
    let finder = AStarPathFinder::new(grid, &search.impassable, inputs);
    let result = finder.search(start, goal, facing, max_depth);
    debug!(
        target: "gridrule::engine",
        action,
        action_id = result.action_id,
        steps = result.path.len(),
        "path search"
    );
    Ok(Some(result.action_id))
}

// ============================================================================
// Operands
// ============================================================================

/// Storage a write resolves to.
#[derive(Clone, Copy, Debug)]
enum CellAddress {
    Object { id: ObjectId, slot: usize },
    Global { id: GlobalId, player: PlayerId },
}

fn owner_player(grid: &Grid, owner: ObjectId) -> Result<PlayerId, EngineError> {
    grid.object(owner)
        .map(|object| object.player_id())
        .ok_or(EngineError::ObjectNotFound { id: owner })
}

pub(crate) fn read_operand(
    grid: &Grid,
    owner: ObjectId,
    action: &Action,
    operand: &Operand,
) -> Result<i32, EngineError> {
    match operand {
        Operand::Constant(value) => Ok(*value),
        Operand::Action(ActionOperand::Meta(key)) => Ok(action.meta(key)?),
        Operand::Cell(_)
        | Operand::Action(ActionOperand::Source(_) | ActionOperand::Destination(_)) => {
            let cell = resolve_cell(grid, owner, action, operand)?;
            read_cell(grid, cell)
        }
    }
}

fn resolve_cell(
    grid: &Grid,
    owner: ObjectId,
    action: &Action,
    operand: &Operand,
) -> Result<CellAddress, EngineError> {
    match operand {
        Operand::Cell(VariableRef::Local(slot)) => Ok(CellAddress::Object {
            id: owner,
            slot: *slot,
        }),
        Operand::Cell(VariableRef::Global { id, per_player }) => Ok(CellAddress::Global {
            id: *id,
            player: if *per_player { owner_player(grid, owner)? } else { 0 },
        }),
        Operand::Action(ActionOperand::Source(name)) => {
            object_cell(grid, action.source_object(grid), name)
        }
        Operand::Action(ActionOperand::Destination(name)) => {
            object_cell(grid, action.destination_object(grid), name)
        }
        Operand::Constant(_) | Operand::Action(ActionOperand::Meta(_)) => {
            Err(EngineError::UnresolvedVariable {
                object: owner.to_string(),
                variable: operand.to_string(),
            })
        }
    }
}

/// Object variables shadow globals of the same name.
fn object_cell(grid: &Grid, id: ObjectId, name: &str) -> Result<CellAddress, EngineError> {
    let object = grid.object(id).ok_or(EngineError::ObjectNotFound { id })?;
    if let Some(slot) = object.object_type().layout().slot(name) {
        return Ok(CellAddress::Object { id, slot });
    }
    if let Some(global) = grid.globals().id_of(name) {
        return Ok(CellAddress::Global {
            id: global,
            player: object.player_id(),
        });
    }
    Err(EngineError::UnresolvedVariable {
        object: object.name().to_owned(),
        variable: name.to_owned(),
    })
}

fn read_cell(grid: &Grid, cell: CellAddress) -> Result<i32, EngineError> {
    match cell {
        CellAddress::Object { id, slot } => grid
            .object(id)
            .ok_or(EngineError::ObjectNotFound { id })?
            .slot(slot)
            .ok_or_else(|| unresolved_slot(grid, id, slot)),
        CellAddress::Global { id, player } => {
            grid.globals()
                .get(id, player)
                .ok_or_else(|| EngineError::UnresolvedVariable {
                    object: format!("player {player}"),
                    variable: format!("global[{}]", id.0),
                })
        }
    }
}

fn write_cell(
    grid: &mut Grid,
    cell: CellAddress,
    update: impl FnOnce(i32) -> i32,
) -> Result<(), EngineError> {
    match cell {
        CellAddress::Object { id, slot } => {
            if !grid.contains_object(id) {
                return Err(EngineError::ObjectNotFound { id });
            }
            if VariableLayout::is_reserved_slot(slot) {
                let object = grid.object(id).map(|object| object.name()).unwrap_or_default();
                return Err(DefinitionError::ReadOnlyVariable {
                    object: object.to_owned(),
                    variable: RESERVED_VARIABLES[slot].to_owned(),
                }
                .into());
            }
            let error = unresolved_slot(grid, id, slot);
            let object = grid
                .object_mut(id)
                .ok_or(EngineError::ObjectNotFound { id })?;
            let value = object.slot_mut(slot).ok_or(error)?;
            *value = update(*value);
            let position = object.position();
            grid.invalidate_location(position);
        }
        CellAddress::Global { id, player } => {
            let value = grid.globals_mut().get_mut(id, player).ok_or_else(|| {
                EngineError::UnresolvedVariable {
                    object: format!("player {player}"),
                    variable: format!("global[{}]", id.0),
                }
            })?;
            *value = update(*value);
        }
    }
    Ok(())
}

fn unresolved_slot(grid: &Grid, id: ObjectId, slot: usize) -> EngineError {
    EngineError::UnresolvedVariable {
        object: grid
            .object(id)
            .map(|object| object.name().to_owned())
            .unwrap_or_else(|| id.to_string()),
        variable: format!("slot {slot}"),
    }
}
