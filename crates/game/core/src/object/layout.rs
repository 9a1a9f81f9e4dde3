use std::collections::BTreeMap;

use super::VariableDefinition;
use crate::behaviour::DefinitionError;

/// Slot of the `_x` cell in every object.
pub const X_SLOT: usize = 0;
/// Slot of the `_y` cell in every object.
pub const Y_SLOT: usize = 1;
/// Slot of the `_playerId` cell in every object.
pub const PLAYER_SLOT: usize = 2;

/// Variables every object carries, in slot order.
pub const RESERVED_VARIABLES: [&str; 3] = ["_x", "_y", "_playerId"];

/// Fixed `name -> slot` layout of an object type's variables.
///
/// The reserved positional cells occupy the first slots; declared variables
/// follow in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableLayout {
    names: Vec<String>,
    initial: Vec<i32>,
    slots: BTreeMap<String, usize>,
}

impl VariableLayout {
    pub fn from_definitions(
        object: &str,
        variables: &[VariableDefinition],
    ) -> Result<Self, DefinitionError> {
        let mut layout = Self::reserved();
        for variable in variables {
            if layout.slots.contains_key(&variable.name) {
                return Err(DefinitionError::DuplicateVariable {
                    object: object.to_owned(),
                    variable: variable.name.clone(),
                });
            }
            layout
                .slots
                .insert(variable.name.clone(), layout.names.len());
            layout.names.push(variable.name.clone());
            layout.initial.push(variable.initial);
        }
        Ok(layout)
    }

    /// Layout with only the positional cells, used by sentinel objects.
    pub fn reserved() -> Self {
        let names: Vec<String> = RESERVED_VARIABLES.iter().map(|s| s.to_string()).collect();
        let slots = names
            .iter()
            .enumerate()
            .map(|(slot, name)| (name.clone(), slot))
            .collect();
        Self {
            initial: vec![0; names.len()],
            names,
            slots,
        }
    }

    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub fn name(&self, slot: usize) -> Option<&str> {
        self.names.get(slot).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    pub fn initial_values(&self) -> Vec<i32> {
        self.initial.clone()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// True for `_x`, `_y` and `_playerId`.
    pub fn is_reserved_slot(slot: usize) -> bool {
        slot < RESERVED_VARIABLES.len()
    }
}
