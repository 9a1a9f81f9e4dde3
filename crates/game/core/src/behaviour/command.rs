use std::collections::BTreeSet;

use super::{Condition, Operand};
use crate::state::Position;

/// Names of the commands a behaviour list may use.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum CommandName {
    Nop,
    Reward,
    ChangeTo,
    Add,
    Sub,
    Set,
    Incr,
    Decr,
    Rot,
    Mov,
    Cascade,
    Exec,
    Remove,
    SetTile,
    Spawn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ArithmeticOp {
    Add,
    Sub,
    Set,
}

impl ArithmeticOp {
    pub fn apply(self, current: i32, value: i32) -> i32 {
        match self {
            Self::Add => current.wrapping_add(value),
            Self::Sub => current.wrapping_sub(value),
            Self::Set => value,
        }
    }
}

/// Where `mov` sends its object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveTarget {
    /// `_dest`: the action's destination location.
    Destination,
    /// `_src`: the action's source location.
    Source,
    /// Explicit `(x, y)` resolved at run time.
    Coordinates { x: Operand, y: Operand },
}

/// Which player a synthesised `exec` action is attributed to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Executor {
    /// The player of the action that triggered the behaviour.
    #[default]
    Action,
    /// The player owning the object running the behaviour.
    Object,
}

/// Pathfinding parameters of an `exec` command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchSpec {
    /// Collision detector that locates the nearest target, when the search
    /// names a target object type.
    pub detector: Option<String>,
    pub target_location: Option<Position>,
    pub impassable: BTreeSet<String>,
    /// Falls back to the engine's default search depth when unset.
    pub max_depth: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecCommand {
    pub action: String,
    pub delay: u32,
    pub randomize: bool,
    pub action_id: u32,
    pub executor: Executor,
    pub search: Option<SearchSpec>,
}

/// A compiled behaviour step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Nop,
    Reward(Operand),
    ChangeTo {
        object_type: String,
    },
    Arithmetic {
        op: ArithmeticOp,
        target: Operand,
        value: Operand,
    },
    /// `rot _dir`
    RotateToAction,
    Move(MoveTarget),
    Cascade {
        pivot: String,
    },
    Exec(Box<ExecCommand>),
    Remove,
    SetTile(Operand),
    Spawn {
        object_type: String,
    },
    /// Runs `body` with chain semantics when the condition holds.
    Conditional {
        condition: Condition,
        body: Vec<Command>,
    },
}
