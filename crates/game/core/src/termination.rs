//! Episode termination conditions.
//!
//! A condition compares two operands after every tick. Operands are integer
//! constants, `_steps` (the current tick), `<object>:count` (objects of that
//! type owned by the evaluated player or by nobody) and global variable names,
//! read per player for per-player globals.
//!
//! Conditions are tried in declaration order, for players `1..=player_count`.
//! The first one that holds for some player ends the episode:
//!
//! | kind   | that player | every other player |
//! |--------|-------------|--------------------|
//! | `Win`  | `Win`       | `Lose`             |
//! | `Lose` | `Lose`      | `Win`              |
//! | `End`  | `None`      | `None`             |

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::behaviour::{ArgValue, CommandSpec, Comparison, DefinitionError};
use crate::object::GlobalVariableDefinition;
use crate::state::{GlobalId, Grid, PlayerId};

const SCOPE: &str = "termination";
const STEPS: &str = "_steps";
const COUNT_SUFFIX: &str = ":count";

/// Final state of one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TerminationState {
    Win,
    Lose,
    None,
}

/// What a holding condition means for the player it holds for.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TerminationKind {
    Win,
    Lose,
    End,
}

/// Uncompiled condition, e.g. `Win` with `eq [gem:count, 0]`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerminationDefinition {
    pub kind: TerminationKind,
    pub condition: CommandSpec,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminationOperand {
    Constant(i32),
    Steps,
    ObjectCount(String),
    Global(GlobalId),
}

/// Compiled termination condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminationCondition {
    pub kind: TerminationKind,
    pub comparison: Comparison,
    pub lhs: TerminationOperand,
    pub rhs: TerminationOperand,
}

impl TerminationCondition {
    pub fn compile(
        definition: &TerminationDefinition,
        globals: &[GlobalVariableDefinition],
        known_objects: &BTreeSet<String>,
    ) -> Result<Self, DefinitionError> {
        let spec = &definition.condition;
        let comparison = spec
            .name
            .parse::<Comparison>()
            .map_err(|_| DefinitionError::UnknownComparison {
                object: SCOPE.to_owned(),
                operator: spec.name.clone(),
            })?;
        let operand = |index| compile_operand(spec, spec.positional(index), globals, known_objects);
        Ok(Self {
            kind: definition.kind,
            comparison,
            lhs: operand(0)?,
            rhs: operand(1)?,
        })
    }

    pub fn holds(&self, grid: &Grid, player: PlayerId) -> bool {
        let lhs = read_operand(grid, player, &self.lhs);
        let rhs = read_operand(grid, player, &self.rhs);
        self.comparison.holds(lhs, rhs)
    }
}

fn compile_operand(
    spec: &CommandSpec,
    value: Option<&ArgValue>,
    globals: &[GlobalVariableDefinition],
    known_objects: &BTreeSet<String>,
) -> Result<TerminationOperand, DefinitionError> {
    let malformed = |reason| DefinitionError::MalformedArguments {
        object: SCOPE.to_owned(),
        command: spec.name.clone(),
        reason,
    };
    let token = match value {
        None => return Err(malformed("is missing an argument")),
        Some(ArgValue::Int(value)) => {
            return i32::try_from(*value)
                .map(TerminationOperand::Constant)
                .map_err(|_| malformed("argument does not fit in 32 bits"));
        }
        Some(ArgValue::Text(token)) => token.trim(),
        Some(_) => return Err(malformed("expects a scalar argument")),
    };

    if let Ok(value) = token.parse::<i32>() {
        return Ok(TerminationOperand::Constant(value));
    }
    if token == STEPS {
        return Ok(TerminationOperand::Steps);
    }
    if let Some(object) = token.strip_suffix(COUNT_SUFFIX) {
        if !known_objects.contains(object) {
            return Err(DefinitionError::UnknownObjectType {
                object: SCOPE.to_owned(),
                referenced: object.to_owned(),
            });
        }
        return Ok(TerminationOperand::ObjectCount(object.to_owned()));
    }
    globals
        .iter()
        .position(|global| global.name == token)
        .map(|index| TerminationOperand::Global(GlobalId(index as u32)))
        .ok_or_else(|| DefinitionError::UndefinedVariable {
            object: SCOPE.to_owned(),
            variable: token.to_owned(),
        })
}

fn read_operand(grid: &Grid, player: PlayerId, operand: &TerminationOperand) -> i32 {
    match operand {
        TerminationOperand::Constant(value) => *value,
        TerminationOperand::Steps => i32::try_from(grid.tick().0).unwrap_or(i32::MAX),
        TerminationOperand::ObjectCount(name) => {
            let count = grid
                .objects()
                .filter(|object| object.name() == name)
                .filter(|object| object.player_id() == player || object.player_id() == 0)
                .count();
            i32::try_from(count).unwrap_or(i32::MAX)
        }
        TerminationOperand::Global(id) => grid.globals().get(*id, player).unwrap_or(0),
    }
}

/// Per-player final states if a termination condition holds, else `None`.
pub fn evaluate_termination(grid: &Grid) -> Option<BTreeMap<PlayerId, TerminationState>> {
    let players: Vec<PlayerId> = match grid.player_count() {
        0 => vec![0],
        count => (1..=count).collect(),
    };

    for condition in grid.generator().terminations() {
        let Some(&player) = players.iter().find(|player| condition.holds(grid, **player)) else {
            continue;
        };
        debug!(
            target: "gridrule::termination",
            kind = %condition.kind,
            player,
            tick = grid.tick().0,
            "termination condition holds"
        );
        let states = players
            .iter()
            .map(|&other| {
                let state = match (condition.kind, other == player) {
                    (TerminationKind::End, _) => TerminationState::None,
                    (TerminationKind::Win, true) | (TerminationKind::Lose, false) => {
                        TerminationState::Win
                    }
                    (TerminationKind::Win, false) | (TerminationKind::Lose, true) => {
                        TerminationState::Lose
                    }
                };
                (other, state)
            })
            .collect();
        return Some(states);
    }
    None
}
