use std::fmt;

use crate::state::GlobalId;

/// Variable cell an operand is bound to at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableRef {
    /// Slot in the owning object's variable vector.
    Local(usize),
    /// Grid global. Per-player globals select the owner's cell.
    Global { id: GlobalId, per_player: bool },
}

/// Value looked up on the triggering action when the command runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOperand {
    /// `src.<variable>`
    Source(String),
    /// `dst.<variable>`
    Destination(String),
    /// `meta.<key>`
    Meta(String),
}

/// Compiled command argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Constant(i32),
    Cell(VariableRef),
    Action(ActionOperand),
}

impl Operand {
    /// Whether commands may write through this operand. Positional cells are
    /// rejected during compilation, so only the operand kind matters here.
    pub fn is_writable(&self) -> bool {
        matches!(
            self,
            Self::Cell(_) | Self::Action(ActionOperand::Source(_) | ActionOperand::Destination(_))
        )
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "{value}"),
            Self::Cell(VariableRef::Local(slot)) => write!(f, "local[{slot}]"),
            Self::Cell(VariableRef::Global { id, .. }) => write!(f, "global[{}]", id.0),
            Self::Action(ActionOperand::Source(name)) => write!(f, "src.{name}"),
            Self::Action(ActionOperand::Destination(name)) => write!(f, "dst.{name}"),
            Self::Action(ActionOperand::Meta(key)) => write!(f, "meta.{key}"),
        }
    }
}
