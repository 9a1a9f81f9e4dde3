use std::collections::{BTreeMap, BTreeSet};

use super::{
    BehaviourSide, GlobalVariableDefinition, InitialActionDefinition, ObjectDefinition,
    VariableLayout,
};
use crate::behaviour::{Command, CompileScope, Condition, DefinitionError, DetectorRequirement};

/// Entries keyed by `action name -> partner object name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionTable<T> {
    entries: BTreeMap<String, BTreeMap<String, Vec<T>>>,
}

impl<T> Default for ActionTable<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> ActionTable<T> {
    pub fn get(&self, action: &str, partner: &str) -> Option<&[T]> {
        self.entries
            .get(action)
            .and_then(|partners| partners.get(partner))
            .map(Vec::as_slice)
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.entries.contains_key(action)
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn partners(&self, action: &str) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .get(action)
            .into_iter()
            .flat_map(|partners| partners.keys().map(String::as_str))
    }

    fn push(&mut self, action: &str, partner: &str, item: T) {
        self.entries
            .entry(action.to_owned())
            .or_default()
            .entry(partner.to_owned())
            .or_default()
            .push(item);
    }
}

pub type BehaviourTable = ActionTable<Command>;
pub type PreconditionTable = ActionTable<Condition>;

/// Compiled, immutable description of an object type, shared by every
/// instance through an `Arc`.
#[derive(Debug)]
pub struct ObjectType {
    name: String,
    glyph: Option<char>,
    z_index: i32,
    layout: VariableLayout,
    source_behaviours: BehaviourTable,
    destination_behaviours: BehaviourTable,
    preconditions: PreconditionTable,
    initial_actions: Vec<InitialActionDefinition>,
    detectors: Vec<DetectorRequirement>,
}

impl ObjectType {
    pub fn compile(
        definition: &ObjectDefinition,
        globals: &[GlobalVariableDefinition],
        known_objects: &BTreeSet<String>,
    ) -> Result<Self, DefinitionError> {
        let layout = VariableLayout::from_definitions(&definition.name, &definition.variables)?;
        let mut source_behaviours = BehaviourTable::default();
        let mut destination_behaviours = BehaviourTable::default();
        let mut preconditions = PreconditionTable::default();

        let mut scope = CompileScope::new(&definition.name, &layout, globals, known_objects);

        for behaviour in &definition.behaviours {
            let table = match behaviour.side {
                BehaviourSide::Source => &mut source_behaviours,
                BehaviourSide::Destination => &mut destination_behaviours,
            };
            // Each behaviour compiles once; its partners share the commands.
            let mut commands = behaviour
                .commands
                .iter()
                .map(|spec| scope.compile_command(spec))
                .collect::<Result<Vec<_>, _>>()?;
            if commands.is_empty() {
                commands.push(Command::Nop);
            }
            for partner in &behaviour.partners {
                for command in &commands {
                    table.push(&behaviour.action, partner, command.clone());
                }
            }
        }

        for precondition in &definition.preconditions {
            let condition = scope.compile_condition(&precondition.condition)?;
            for partner in &precondition.partners {
                preconditions.push(&precondition.action, partner, condition.clone());
            }
        }

        let detectors = scope.into_detectors();

        Ok(Self {
            name: definition.name.clone(),
            glyph: definition.glyph,
            z_index: definition.z_index,
            layout,
            source_behaviours,
            destination_behaviours,
            preconditions,
            initial_actions: definition.initial_actions.clone(),
            detectors,
        })
    }

    /// Behaviour-less type of the `_empty` and `_boundary` default objects.
    pub fn sentinel(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            glyph: None,
            z_index: 0,
            layout: VariableLayout::reserved(),
            source_behaviours: BehaviourTable::default(),
            destination_behaviours: BehaviourTable::default(),
            preconditions: PreconditionTable::default(),
            initial_actions: Vec::new(),
            detectors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn glyph(&self) -> Option<char> {
        self.glyph
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    pub fn source_behaviours(&self) -> &BehaviourTable {
        &self.source_behaviours
    }

    pub fn destination_behaviours(&self) -> &BehaviourTable {
        &self.destination_behaviours
    }

    /// Preconditions for `(action, partner)`; none registered means none apply.
    pub fn preconditions(&self, action: &str, partner: &str) -> &[Condition] {
        self.preconditions.get(action, partner).unwrap_or_default()
    }

    /// Whether this type has any source behaviour for `action`.
    pub fn can_perform(&self, action: &str) -> bool {
        self.source_behaviours.has_action(action)
    }

    /// Action names this type can perform, in name order.
    pub fn available_actions(&self) -> impl Iterator<Item = &str> + '_ {
        self.source_behaviours.actions()
    }

    pub fn initial_actions(&self) -> &[InitialActionDefinition] {
        &self.initial_actions
    }

    pub fn detectors(&self) -> &[DetectorRequirement] {
        &self.detectors
    }
}
