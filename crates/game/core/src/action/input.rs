//! Input mappings: how an action id chosen by a player or a search becomes a
//! vector, an orientation and metadata.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::ActionError;
use crate::state::{Grid, Offset, Position};

/// One selectable variant of an action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputMapping {
    pub vector_to_dest: Offset,
    pub orientation_vector: Offset,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub meta_data: BTreeMap<String, i32>,
}

impl InputMapping {
    /// Moves by `vector` and faces along it.
    pub fn directional(vector: Offset, description: impl Into<String>) -> Self {
        Self {
            vector_to_dest: vector,
            orientation_vector: vector,
            description: description.into(),
            meta_data: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: i32) -> Self {
        self.meta_data.insert(key.into(), value);
        self
    }
}

/// Input table of one action name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActionInputsDefinition {
    /// Mappings by action id. Ids start at 1; 0 means "no mapping selected".
    pub input_mappings: BTreeMap<u32, InputMapping>,
    /// Vectors are expressed in the acting object's facing frame.
    pub relative: bool,
    /// Only behaviours may trigger the action; hidden from players.
    pub internal: bool,
    /// The destination is an arbitrary grid cell rather than a vector.
    pub map_to_grid: bool,
}

impl ActionInputsDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four-direction table: 1 left, 2 up, 3 right, 4 down.
    pub fn default_directions() -> BTreeMap<u32, InputMapping> {
        BTreeMap::from([
            (1, InputMapping::directional(Offset::new(-1, 0), "Left")),
            (2, InputMapping::directional(Offset::new(0, -1), "Up")),
            (3, InputMapping::directional(Offset::new(1, 0), "Right")),
            (4, InputMapping::directional(Offset::new(0, 1), "Down")),
        ])
    }

    #[must_use]
    pub fn mapping(mut self, action_id: u32, mapping: InputMapping) -> Self {
        self.input_mappings.insert(action_id, mapping);
        self
    }

    #[must_use]
    pub fn relative(mut self, relative: bool) -> Self {
        self.relative = relative;
        self
    }

    #[must_use]
    pub fn internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    #[must_use]
    pub fn map_to_grid(mut self, map_to_grid: bool) -> Self {
        self.map_to_grid = map_to_grid;
        self
    }

    pub(crate) fn with_default_mappings(mut self) -> Self {
        if self.input_mappings.is_empty() && !self.map_to_grid {
            self.input_mappings = Self::default_directions();
        }
        self
    }
}

/// Mapping selected for a synthesised action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedInput {
    pub vector_to_dest: Offset,
    pub orientation_vector: Offset,
    pub meta_data: BTreeMap<String, i32>,
    pub relative: bool,
    pub internal: bool,
    /// Set when `destination` holds a random grid cell instead of a vector.
    pub mapped_to_grid: bool,
    pub destination: Position,
}

/// Selects the input mapping for `action`.
///
/// Order: `map_to_grid` picks a uniformly random in-bounds cell; `randomize`
/// picks a uniformly random mapping; a non-zero `action_id` picks that mapping;
/// otherwise `fallback` (usually the triggering action's vectors) is used.
pub fn resolve_input_mapping(
    grid: &mut Grid,
    action: &str,
    action_id: u32,
    randomize: bool,
    fallback: InputMapping,
) -> Result<ResolvedInput, ActionError> {
    let generator = Arc::clone(grid.generator());
    let inputs = generator
        .action_inputs(action)
        .ok_or_else(|| ActionError::MissingInputsDefinition {
            action: action.to_owned(),
        })?;

    let mut resolved = ResolvedInput {
        relative: inputs.relative,
        internal: inputs.internal,
        ..ResolvedInput::default()
    };

    if inputs.map_to_grid {
        let max_x = grid.width() as i32 - 1;
        let max_y = grid.height() as i32 - 1;
        let x = grid.rng_mut().range_inclusive(0, max_x);
        let y = grid.rng_mut().range_inclusive(0, max_y);
        resolved.mapped_to_grid = true;
        resolved.destination = Position::new(x, y);
        return Ok(resolved);
    }

    let mapping = if randomize && !inputs.input_mappings.is_empty() {
        let index = grid.rng_mut().index(inputs.input_mappings.len());
        inputs.input_mappings.values().nth(index).cloned()
    } else if action_id > 0 {
        Some(
            inputs
                .input_mappings
                .get(&action_id)
                .cloned()
                .ok_or_else(|| ActionError::MissingInputMapping {
                    action: action.to_owned(),
                    action_id,
                })?,
        )
    } else {
        None
    };

    let mapping = mapping.unwrap_or(fallback);
    resolved.vector_to_dest = mapping.vector_to_dest;
    resolved.orientation_vector = mapping.orientation_vector;
    resolved.meta_data = mapping.meta_data;
    Ok(resolved)
}
