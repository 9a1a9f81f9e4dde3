//! Compilation of command definitions into [`Command`] values.
//!
//! Operand tokens are bound once, per object type:
//!
//! | token          | binding                                   |
//! |----------------|-------------------------------------------|
//! | `12`, `-3`     | [`Operand::Constant`]                     |
//! | `health`       | object slot, else global, else error      |
//! | `src.health`   | source object's variable at run time      |
//! | `dst.health`   | destination object's variable at run time |
//! | `meta.amount`  | action metadata at run time               |

use std::collections::BTreeSet;

use super::{
    ActionOperand, ArgValue, ArithmeticOp, Command, CommandName, CommandSpec, Comparison,
    Condition, DefinitionError, ExecCommand, Executor, MoveTarget, Operand, SearchSpec,
    VariableRef,
};
use crate::object::{GlobalVariableDefinition, RESERVED_VARIABLES, VariableLayout};
use crate::state::{GlobalId, Position};

/// Spatial index an object type needs for its `exec` searches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectorRequirement {
    /// Registry name, `{action}:{object type}:{n}`.
    pub name: String,
    /// Object type the detector tracks.
    pub target: String,
}

/// Name bindings available while compiling one object type.
pub struct CompileScope<'a> {
    object: &'a str,
    layout: &'a VariableLayout,
    globals: &'a [GlobalVariableDefinition],
    known_objects: &'a BTreeSet<String>,
    detectors: Vec<DetectorRequirement>,
}

impl<'a> CompileScope<'a> {
    pub fn new(
        object: &'a str,
        layout: &'a VariableLayout,
        globals: &'a [GlobalVariableDefinition],
        known_objects: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            object,
            layout,
            globals,
            known_objects,
            detectors: Vec::new(),
        }
    }

    pub fn into_detectors(self) -> Vec<DetectorRequirement> {
        self.detectors
    }

    pub fn compile_command(&mut self, spec: &CommandSpec) -> Result<Command, DefinitionError> {
        if spec.is_conditional() {
            let condition = self.compile_condition(spec)?;
            let body = spec
                .then
                .iter()
                .map(|command| self.compile_command(command))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Command::Conditional { condition, body });
        }

        let name = spec
            .name
            .parse::<CommandName>()
            .map_err(|_| DefinitionError::UnknownCommand {
                object: self.object.to_owned(),
                command: spec.name.clone(),
            })?;

        let command = match name {
            CommandName::Nop => Command::Nop,
            CommandName::Reward => Command::Reward(self.operand(spec, spec.positional(0))?),
            CommandName::ChangeTo => Command::ChangeTo {
                object_type: self.object_reference(spec)?,
            },
            CommandName::Add | CommandName::Sub | CommandName::Set => {
                let op = match name {
                    CommandName::Add => ArithmeticOp::Add,
                    CommandName::Sub => ArithmeticOp::Sub,
                    _ => ArithmeticOp::Set,
                };
                Command::Arithmetic {
                    op,
                    target: self.write_target(spec)?,
                    value: self.operand(spec, spec.positional(1))?,
                }
            }
            CommandName::Incr | CommandName::Decr => Command::Arithmetic {
                op: if name == CommandName::Incr {
                    ArithmeticOp::Add
                } else {
                    ArithmeticOp::Sub
                },
                target: self.write_target(spec)?,
                value: Operand::Constant(1),
            },
            CommandName::Rot => match spec.positional(0).and_then(ArgValue::as_text) {
                Some("_dir") => Command::RotateToAction,
                other => {
                    return Err(DefinitionError::InvalidRotation {
                        object: self.object.to_owned(),
                        argument: other.unwrap_or_default().to_owned(),
                    });
                }
            },
            CommandName::Mov => Command::Move(self.move_target(spec)?),
            CommandName::Cascade => Command::Cascade {
                pivot: spec
                    .positional(0)
                    .and_then(ArgValue::as_text)
                    .ok_or_else(|| self.malformed(spec, "requires a pivot such as `_dest`"))?
                    .to_owned(),
            },
            CommandName::Exec => Command::Exec(Box::new(self.exec(spec)?)),
            CommandName::Remove => Command::Remove,
            CommandName::SetTile => Command::SetTile(self.operand(spec, spec.positional(0))?),
            CommandName::Spawn => Command::Spawn {
                object_type: self.object_reference(spec)?,
            },
        };
        Ok(command)
    }

    pub fn compile_condition(&self, spec: &CommandSpec) -> Result<Condition, DefinitionError> {
        let comparison = spec
            .name
            .parse::<Comparison>()
            .map_err(|_| DefinitionError::UnknownComparison {
                object: self.object.to_owned(),
                operator: spec.name.clone(),
            })?;
        Ok(Condition {
            comparison,
            lhs: self.operand(spec, spec.positional(0))?,
            rhs: self.operand(spec, spec.positional(1))?,
        })
    }

    fn operand(
        &self,
        spec: &CommandSpec,
        value: Option<&ArgValue>,
    ) -> Result<Operand, DefinitionError> {
        match value {
            None => Err(self.malformed(spec, "is missing an argument")),
            Some(ArgValue::Int(value)) => i32::try_from(*value)
                .map(Operand::Constant)
                .map_err(|_| self.malformed(spec, "argument does not fit in 32 bits")),
            Some(ArgValue::Bool(value)) => Ok(Operand::Constant(i32::from(*value))),
            Some(ArgValue::Text(token)) => self.token(token.trim()),
            Some(_) => Err(self.malformed(spec, "expects a scalar argument")),
        }
    }

    fn token(&self, token: &str) -> Result<Operand, DefinitionError> {
        if let Ok(value) = token.parse::<i32>() {
            return Ok(Operand::Constant(value));
        }
        if let Some(name) = token.strip_prefix("src.") {
            return Ok(Operand::Action(ActionOperand::Source(name.to_owned())));
        }
        if let Some(name) = token.strip_prefix("dst.") {
            return Ok(Operand::Action(ActionOperand::Destination(name.to_owned())));
        }
        if let Some(key) = token.strip_prefix("meta.") {
            return Ok(Operand::Action(ActionOperand::Meta(key.to_owned())));
        }
        if let Some(slot) = self.layout.slot(token) {
            return Ok(Operand::Cell(VariableRef::Local(slot)));
        }
        if let Some(index) = self.globals.iter().position(|global| global.name == token) {
            return Ok(Operand::Cell(VariableRef::Global {
                id: GlobalId(index as u32),
                per_player: self.globals[index].per_player,
            }));
        }
        Err(DefinitionError::UndefinedVariable {
            object: self.object.to_owned(),
            variable: token.to_owned(),
        })
    }

    fn write_target(&self, spec: &CommandSpec) -> Result<Operand, DefinitionError> {
        let operand = self.operand(spec, spec.positional(0))?;
        let read_only = match &operand {
            Operand::Cell(VariableRef::Local(slot)) if VariableLayout::is_reserved_slot(*slot) => {
                self.layout.name(*slot).map(str::to_owned)
            }
            Operand::Action(ActionOperand::Source(name) | ActionOperand::Destination(name))
                if RESERVED_VARIABLES.contains(&name.as_str()) =>
            {
                Some(name.clone())
            }
            _ => None,
        };
        if let Some(variable) = read_only {
            return Err(DefinitionError::ReadOnlyVariable {
                object: self.object.to_owned(),
                variable,
            });
        }
        if !operand.is_writable() {
            return Err(self.malformed(spec, "target must be a variable"));
        }
        Ok(operand)
    }

    fn move_target(&self, spec: &CommandSpec) -> Result<MoveTarget, DefinitionError> {
        match spec.positional_len() {
            1 => match spec.positional(0).and_then(ArgValue::as_text) {
                Some("_dest") => Ok(MoveTarget::Destination),
                Some("_src") => Ok(MoveTarget::Source),
                _ => Err(self.malformed(spec, "takes `_dest`, `_src` or two coordinates")),
            },
            2 => Ok(MoveTarget::Coordinates {
                x: self.operand(spec, spec.positional(0))?,
                y: self.operand(spec, spec.positional(1))?,
            }),
            _ => Err(self.malformed(spec, "takes `_dest`, `_src` or two coordinates")),
        }
    }

    fn object_reference(&self, spec: &CommandSpec) -> Result<String, DefinitionError> {
        let name = spec
            .positional(0)
            .and_then(ArgValue::as_text)
            .ok_or_else(|| self.malformed(spec, "requires an object type"))?;
        if !self.known_objects.contains(name) {
            return Err(DefinitionError::UnknownObjectType {
                object: self.object.to_owned(),
                referenced: name.to_owned(),
            });
        }
        Ok(name.to_owned())
    }

    fn exec(&mut self, spec: &CommandSpec) -> Result<ExecCommand, DefinitionError> {
        let action = spec
            .get("Action")
            .and_then(ArgValue::as_text)
            .ok_or_else(|| self.malformed(spec, "requires an `Action`"))?
            .to_owned();
        let delay = self.unsigned(spec, "Delay", "`Delay` must be a non-negative integer")?;
        let action_id =
            self.unsigned(spec, "ActionId", "`ActionId` must be a non-negative integer")?;
        let randomize = match spec.get("Randomize") {
            None => false,
            Some(value) => value
                .as_bool()
                .ok_or_else(|| self.malformed(spec, "`Randomize` must be a boolean"))?,
        };
        let executor = match spec.get("Executor") {
            None => Executor::default(),
            Some(value) => {
                let text = value.as_text().unwrap_or_default();
                text.parse::<Executor>().map_err(|_| DefinitionError::InvalidExecutor {
                    object: self.object.to_owned(),
                    executor: text.to_owned(),
                })?
            }
        };
        let search = match spec.get("Search") {
            None => None,
            Some(value) => Some(self.search(spec, &action, value)?),
        };

        Ok(ExecCommand {
            action,
            delay,
            randomize,
            action_id,
            executor,
            search,
        })
    }

    fn search(
        &mut self,
        spec: &CommandSpec,
        action: &str,
        value: &ArgValue,
    ) -> Result<SearchSpec, DefinitionError> {
        let ArgValue::Map(entries) = value else {
            return Err(self.malformed(spec, "`Search` must be a map"));
        };

        let detector = match entries.get("TargetObjectName") {
            None => None,
            Some(target) => {
                let target = target
                    .as_text()
                    .ok_or_else(|| self.malformed(spec, "`TargetObjectName` must be a name"))?;
                if !self.known_objects.contains(target) {
                    return Err(DefinitionError::UnknownObjectType {
                        object: self.object.to_owned(),
                        referenced: target.to_owned(),
                    });
                }
                let name = format!("{action}:{}:{}", self.object, self.detectors.len());
                self.detectors.push(DetectorRequirement {
                    name: name.clone(),
                    target: target.to_owned(),
                });
                Some(name)
            }
        };

        let target_location = match entries.get("TargetLocation") {
            None => None,
            Some(ArgValue::List(items)) if items.len() == 2 => {
                let coordinate = |item: &ArgValue| item.as_int().and_then(|v| i32::try_from(v).ok());
                match (coordinate(&items[0]), coordinate(&items[1])) {
                    (Some(x), Some(y)) => Some(Position::new(x, y)),
                    _ => return Err(self.malformed(spec, "`TargetLocation` must be two integers")),
                }
            }
            Some(_) => return Err(self.malformed(spec, "`TargetLocation` must be two integers")),
        };

        let impassable = match entries.get("ImpassableObjects") {
            None => BTreeSet::new(),
            Some(ArgValue::Text(name)) => BTreeSet::from([name.clone()]),
            Some(ArgValue::List(items)) => items
                .iter()
                .map(|item| item.as_text().map(str::to_owned))
                .collect::<Option<BTreeSet<_>>>()
                .ok_or_else(|| self.malformed(spec, "`ImpassableObjects` must list names"))?,
            Some(_) => return Err(self.malformed(spec, "`ImpassableObjects` must list names")),
        };

        let max_depth = match entries.get("MaxDepth") {
            None => None,
            Some(value) => Some(
                value
                    .as_int()
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(|| self.malformed(spec, "`MaxDepth` must be a non-negative integer"))?,
            ),
        };

        Ok(SearchSpec {
            detector,
            target_location,
            impassable,
            max_depth,
        })
    }

    fn unsigned(
        &self,
        spec: &CommandSpec,
        key: &str,
        reason: &'static str,
    ) -> Result<u32, DefinitionError> {
        match spec.get(key) {
            None => Ok(0),
            Some(value) => value
                .as_int()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| self.malformed(spec, reason)),
        }
    }

    fn malformed(&self, spec: &CommandSpec, reason: &'static str) -> DefinitionError {
        DefinitionError::MalformedArguments {
            object: self.object.to_owned(),
            command: spec.name.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::VariableDefinition;

    struct Fixture {
        layout: VariableLayout,
        globals: Vec<GlobalVariableDefinition>,
        known: BTreeSet<String>,
    }

    impl Fixture {
        fn new() -> Self {
            let layout = VariableLayout::from_definitions(
                "agent",
                &[VariableDefinition {
                    name: "health".into(),
                    initial: 3,
                }],
            )
            .unwrap();
            Self {
                layout,
                globals: vec![
                    GlobalVariableDefinition::shared("spawned", 0),
                    GlobalVariableDefinition::per_player("score", 0),
                ],
                known: BTreeSet::from(["agent".to_owned(), "gem".to_owned()]),
            }
        }

        fn scope(&self) -> CompileScope<'_> {
            CompileScope::new("agent", &self.layout, &self.globals, &self.known)
        }
    }

    #[test]
    fn tokens_bind_to_cells() {
        let fixture = Fixture::new();
        let mut scope = fixture.scope();

        let add = scope
            .compile_command(&CommandSpec::new("add").arg("health").arg("score"))
            .unwrap();
        assert_eq!(
            add,
            Command::Arithmetic {
                op: ArithmeticOp::Add,
                target: Operand::Cell(VariableRef::Local(3)),
                value: Operand::Cell(VariableRef::Global {
                    id: GlobalId(1),
                    per_player: true
                }),
            }
        );

        let reward = scope
            .compile_command(&CommandSpec::new("reward").arg("meta.bonus"))
            .unwrap();
        assert_eq!(
            reward,
            Command::Reward(Operand::Action(ActionOperand::Meta("bonus".into())))
        );

        let literal = scope
            .compile_command(&CommandSpec::new("reward").arg("-2"))
            .unwrap();
        assert_eq!(literal, Command::Reward(Operand::Constant(-2)));
    }

    #[test]
    fn undefined_names_fail() {
        let fixture = Fixture::new();
        let err = fixture
            .scope()
            .compile_command(&CommandSpec::new("incr").arg("mana"))
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UndefinedVariable { ref variable, .. } if variable == "mana"));
    }

    #[test]
    fn unknown_commands_fail() {
        let fixture = Fixture::new();
        let err = fixture
            .scope()
            .compile_command(&CommandSpec::new("teleport"))
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownCommand { .. }));

        // a comparison without a body is not a command
        let err = fixture
            .scope()
            .compile_command(&CommandSpec::new("eq").arg(1).arg(1))
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownCommand { .. }));
    }

    #[test]
    fn positional_cells_are_read_only() {
        let fixture = Fixture::new();
        let err = fixture
            .scope()
            .compile_command(&CommandSpec::new("set").arg("_x").arg(4))
            .unwrap_err();
        assert!(matches!(err, DefinitionError::ReadOnlyVariable { .. }));

        let err = fixture
            .scope()
            .compile_command(&CommandSpec::new("incr").arg("dst._y"))
            .unwrap_err();
        assert!(matches!(err, DefinitionError::ReadOnlyVariable { .. }));

        let err = fixture
            .scope()
            .compile_command(&CommandSpec::new("set").arg("meta.bonus").arg(1))
            .unwrap_err();
        assert!(matches!(err, DefinitionError::MalformedArguments { .. }));
    }

    #[test]
    fn rot_and_mov_arguments_are_checked() {
        let fixture = Fixture::new();
        let mut scope = fixture.scope();
        assert!(matches!(
            scope.compile_command(&CommandSpec::new("rot").arg("_dest")),
            Err(DefinitionError::InvalidRotation { .. })
        ));
        assert_eq!(
            scope.compile_command(&CommandSpec::new("rot").arg("_dir")),
            Ok(Command::RotateToAction)
        );
        assert!(matches!(
            scope.compile_command(&CommandSpec::new("mov").arg("_dest").arg(1).arg(2)),
            Err(DefinitionError::MalformedArguments { .. })
        ));
        assert_eq!(
            scope.compile_command(&CommandSpec::new("mov").arg("_src")),
            Ok(Command::Move(MoveTarget::Source))
        );
    }

    #[test]
    fn conditional_compiles_body() {
        let fixture = Fixture::new();
        let spec = CommandSpec::new("gt")
            .arg("health")
            .arg(0)
            .then(vec![CommandSpec::new("decr").arg("health")]);
        let Command::Conditional { condition, body } =
            fixture.scope().compile_command(&spec).unwrap()
        else {
            panic!("expected conditional");
        };
        assert_eq!(condition.comparison, Comparison::Gt);
        assert_eq!(body.len(), 1);

        let bad = CommandSpec::new("within")
            .arg(1)
            .arg(2)
            .then(vec![CommandSpec::new("nop")]);
        assert!(matches!(
            fixture.scope().compile_command(&bad),
            Err(DefinitionError::UnknownComparison { .. })
        ));
    }

    #[test]
    fn exec_registers_detectors() {
        let fixture = Fixture::new();
        let mut scope = fixture.scope();
        let spec = CommandSpec::new("exec")
            .named("Action", "chase")
            .named("Delay", 2)
            .named("Executor", "object")
            .named(
                "Search",
                ArgValue::map([
                    ("TargetObjectName", ArgValue::from("gem")),
                    ("ImpassableObjects", ArgValue::from(vec!["agent"])),
                ]),
            );
        let Command::Exec(exec) = scope.compile_command(&spec).unwrap() else {
            panic!("expected exec");
        };
        assert_eq!(exec.delay, 2);
        assert_eq!(exec.executor, Executor::Object);
        let search = exec.search.unwrap();
        assert_eq!(search.detector.as_deref(), Some("chase:agent:0"));
        assert!(search.impassable.contains("agent"));
        assert_eq!(search.max_depth, None);

        let detectors = scope.into_detectors();
        assert_eq!(detectors.len(), 1);
        assert_eq!(detectors[0].target, "gem");
    }

    #[test]
    fn exec_rejects_unknown_executor() {
        let fixture = Fixture::new();
        let spec = CommandSpec::new("exec")
            .named("Action", "chase")
            .named("Executor", "player");
        assert!(matches!(
            fixture.scope().compile_command(&spec),
            Err(DefinitionError::InvalidExecutor { .. })
        ));
    }

    #[test]
    fn spawn_requires_known_type() {
        let fixture = Fixture::new();
        assert!(matches!(
            fixture
                .scope()
                .compile_command(&CommandSpec::new("spawn").arg("dragon")),
            Err(DefinitionError::UnknownObjectType { .. })
        ));
    }
}
