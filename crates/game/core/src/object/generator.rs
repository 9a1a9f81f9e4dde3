use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use super::{
    BOUNDARY_OBJECT, EMPTY_OBJECT, GlobalVariableDefinition, Object, ObjectDefinition, ObjectType,
};
use crate::action::ActionInputsDefinition;
use crate::behaviour::DefinitionError;
use crate::behaviour::CommandSpec;
use crate::engine::EngineError;
use crate::state::PlayerId;
use crate::termination::{TerminationCondition, TerminationDefinition, TerminationKind};

/// Owns every compiled object type and the action input table, and creates
/// object instances.
///
/// A generator is immutable once built and is shared (`Arc`) by every grid
/// created from it, including cloned grids.
#[derive(Debug)]
pub struct ObjectGenerator {
    player_count: u32,
    avatar_object: Option<String>,
    globals: Vec<GlobalVariableDefinition>,
    object_types: BTreeMap<String, Arc<ObjectType>>,
    action_inputs: BTreeMap<String, ActionInputsDefinition>,
    terminations: Vec<TerminationCondition>,
    empty_type: Arc<ObjectType>,
    boundary_type: Arc<ObjectType>,
}

impl ObjectGenerator {
    pub fn builder(player_count: u32) -> ObjectGeneratorBuilder {
        ObjectGeneratorBuilder {
            player_count,
            avatar_object: None,
            globals: Vec::new(),
            objects: Vec::new(),
            action_inputs: BTreeMap::new(),
            terminations: Vec::new(),
        }
    }

    pub fn player_count(&self) -> u32 {
        self.player_count
    }

    pub fn avatar_object(&self) -> Option<&str> {
        self.avatar_object.as_deref()
    }

    pub fn globals(&self) -> &[GlobalVariableDefinition] {
        &self.globals
    }

    pub fn object_type(&self, name: &str) -> Option<&Arc<ObjectType>> {
        self.object_types.get(name)
    }

    pub fn object_types(&self) -> impl Iterator<Item = &Arc<ObjectType>> + '_ {
        self.object_types.values()
    }

    pub fn action_inputs(&self, action: &str) -> Option<&ActionInputsDefinition> {
        self.action_inputs.get(action)
    }

    pub fn action_input_definitions(&self) -> &BTreeMap<String, ActionInputsDefinition> {
        &self.action_inputs
    }

    /// Termination conditions in declaration order.
    pub fn terminations(&self) -> &[TerminationCondition] {
        &self.terminations
    }

    /// Fresh instance of `name` owned by `player_id`, with declared initial
    /// variable values and no id yet.
    pub fn new_instance(&self, name: &str, player_id: PlayerId) -> Result<Object, EngineError> {
        let object_type = self
            .object_types
            .get(name)
            .ok_or_else(|| EngineError::UnknownObjectType {
                name: name.to_owned(),
            })?;
        let avatar = self.avatar_object.as_deref() == Some(name);
        Ok(Object::new(Arc::clone(object_type), player_id, avatar))
    }

    /// Copy of `object` sharing its compiled type, keeping variables,
    /// orientation and tile. The copy keeps the source id.
    pub fn clone_instance(&self, object: &Object) -> Object {
        object.clone()
    }

    pub(crate) fn empty_instance(&self, player_id: PlayerId) -> Object {
        Object::new(Arc::clone(&self.empty_type), player_id, false)
    }

    pub(crate) fn boundary_instance(&self) -> Object {
        Object::new(Arc::clone(&self.boundary_type), 0, false)
    }
}

/// Collects definitions and compiles them in one pass so behaviours can
/// reference globals and object types regardless of declaration order.
#[derive(Debug)]
pub struct ObjectGeneratorBuilder {
    player_count: u32,
    avatar_object: Option<String>,
    globals: Vec<GlobalVariableDefinition>,
    objects: Vec<ObjectDefinition>,
    action_inputs: BTreeMap<String, ActionInputsDefinition>,
    terminations: Vec<TerminationDefinition>,
}

impl ObjectGeneratorBuilder {
    #[must_use]
    pub fn avatar(mut self, object: impl Into<String>) -> Self {
        self.avatar_object = Some(object.into());
        self
    }

    #[must_use]
    pub fn global(mut self, global: GlobalVariableDefinition) -> Self {
        self.globals.push(global);
        self
    }

    #[must_use]
    pub fn object(mut self, definition: ObjectDefinition) -> Self {
        self.objects.push(definition);
        self
    }

    #[must_use]
    pub fn action_inputs(mut self, action: impl Into<String>, inputs: ActionInputsDefinition) -> Self {
        self.action_inputs.insert(action.into(), inputs);
        self
    }

    #[must_use]
    pub fn termination(mut self, kind: TerminationKind, condition: CommandSpec) -> Self {
        self.terminations.push(TerminationDefinition { kind, condition });
        self
    }

    pub fn build(self) -> Result<ObjectGenerator, DefinitionError> {
        let mut known = BTreeSet::new();
        for definition in &self.objects {
            if definition.name == EMPTY_OBJECT || definition.name == BOUNDARY_OBJECT {
                return Err(DefinitionError::ReservedObjectName {
                    object: definition.name.clone(),
                });
            }
            if !known.insert(definition.name.clone()) {
                return Err(DefinitionError::DuplicateObject {
                    object: definition.name.clone(),
                });
            }
        }

        let mut object_types = BTreeMap::new();
        for definition in &self.objects {
            let object_type = ObjectType::compile(definition, &self.globals, &known)?;
            debug!(
                target: "gridrule::generator",
                object = %definition.name,
                actions = object_type.available_actions().count(),
                "compiled object type"
            );
            object_types.insert(definition.name.clone(), Arc::new(object_type));
        }

        let terminations = self
            .terminations
            .iter()
            .map(|definition| TerminationCondition::compile(definition, &self.globals, &known))
            .collect::<Result<Vec<_>, _>>()?;

        let action_inputs = self
            .action_inputs
            .into_iter()
            .map(|(action, inputs)| (action, inputs.with_default_mappings()))
            .collect();

        Ok(ObjectGenerator {
            player_count: self.player_count,
            avatar_object: self.avatar_object,
            globals: self.globals,
            object_types,
            action_inputs,
            terminations,
            empty_type: Arc::new(ObjectType::sentinel(EMPTY_OBJECT)),
            boundary_type: Arc::new(ObjectType::sentinel(BOUNDARY_OBJECT)),
        })
    }
}
