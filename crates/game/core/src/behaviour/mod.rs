//! Behaviour definitions and their compiled form.
//!
//! A behaviour list is written as [`CommandSpec`] values and compiled once per
//! object type by [`CompileScope`] into [`Command`] values whose operands are
//! already bound to variable slots. The engine interprets the compiled form.
pub mod command;
pub mod compile;
pub mod condition;
pub mod error;
pub mod operand;
pub mod result;
pub mod spec;

pub use command::{
    ArithmeticOp, Command, CommandName, ExecCommand, Executor, MoveTarget, SearchSpec,
};
pub use compile::{CompileScope, DetectorRequirement};
pub use condition::{Comparison, Condition};
pub use error::DefinitionError;
pub use operand::{ActionOperand, Operand, VariableRef};
pub use result::{BehaviourResult, Rewards, accumulate_rewards};
pub use spec::{ArgValue, CommandSpec};
