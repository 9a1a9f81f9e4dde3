//! Declarative object definitions.
//!
//! These are the inputs of [`super::ObjectGenerator`]. A rule-file loader (or
//! test code) builds them; the generator validates and compiles them into
//! shared [`super::ObjectType`] values.

use crate::behaviour::CommandSpec;

/// Object-local variable with its initial value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableDefinition {
    pub name: String,
    pub initial: i32,
}

/// Grid-level variable. Per-player globals hold one cell per player id.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalVariableDefinition {
    pub name: String,
    pub initial: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub per_player: bool,
}

impl GlobalVariableDefinition {
    pub fn shared(name: impl Into<String>, initial: i32) -> Self {
        Self {
            name: name.into(),
            initial,
            per_player: false,
        }
    }

    pub fn per_player(name: impl Into<String>, initial: i32) -> Self {
        Self {
            name: name.into(),
            initial,
            per_player: true,
        }
    }
}

/// Which end of an action a behaviour reacts on.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BehaviourSide {
    /// Runs on the object performing the action.
    Source,
    /// Runs on the object the action targets.
    Destination,
}

/// Commands run when `action` involves this object and one of `partners`.
///
/// An empty command list registers the pair with a single `nop`, which makes
/// the action legal without any effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviourDefinition {
    pub side: BehaviourSide,
    pub action: String,
    pub partners: Vec<String>,
    pub commands: Vec<CommandSpec>,
}

/// Comparison gating `action` when this object is the source and the
/// destination is one of `partners`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreconditionDefinition {
    pub action: String,
    pub partners: Vec<String>,
    pub condition: CommandSpec,
}

/// Action an object performs on itself as soon as it is placed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitialActionDefinition {
    pub action: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub action_id: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub delay: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub randomize: bool,
}

impl InitialActionDefinition {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            action_id: 0,
            delay: 0,
            randomize: false,
        }
    }

    #[must_use]
    pub fn action_id(mut self, action_id: u32) -> Self {
        self.action_id = action_id;
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: u32) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn randomize(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }
}

/// Complete definition of one object type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectDefinition {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub glyph: Option<char>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub z_index: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub variables: Vec<VariableDefinition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub behaviours: Vec<BehaviourDefinition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub preconditions: Vec<PreconditionDefinition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial_actions: Vec<InitialActionDefinition>,
}

impl ObjectDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            glyph: None,
            z_index: 0,
            variables: Vec::new(),
            behaviours: Vec::new(),
            preconditions: Vec::new(),
            initial_actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    #[must_use]
    pub fn glyph(mut self, glyph: char) -> Self {
        self.glyph = Some(glyph);
        self
    }

    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, initial: i32) -> Self {
        self.variables.push(VariableDefinition {
            name: name.into(),
            initial,
        });
        self
    }

    #[must_use]
    pub fn on_source<P, S>(
        self,
        action: impl Into<String>,
        partners: P,
        commands: Vec<CommandSpec>,
    ) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.behaviour(BehaviourSide::Source, action, partners, commands)
    }

    #[must_use]
    pub fn on_destination<P, S>(
        self,
        action: impl Into<String>,
        partners: P,
        commands: Vec<CommandSpec>,
    ) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.behaviour(BehaviourSide::Destination, action, partners, commands)
    }

    #[must_use]
    pub fn behaviour<P, S>(
        mut self,
        side: BehaviourSide,
        action: impl Into<String>,
        partners: P,
        commands: Vec<CommandSpec>,
    ) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.behaviours.push(BehaviourDefinition {
            side,
            action: action.into(),
            partners: partners.into_iter().map(Into::into).collect(),
            commands,
        });
        self
    }

    #[must_use]
    pub fn precondition<P, S>(
        mut self,
        action: impl Into<String>,
        partners: P,
        condition: CommandSpec,
    ) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preconditions.push(PreconditionDefinition {
            action: action.into(),
            partners: partners.into_iter().map(Into::into).collect(),
            condition,
        });
        self
    }

    #[must_use]
    pub fn initial_action(mut self, initial: InitialActionDefinition) -> Self {
        self.initial_actions.push(initial);
        self
    }
}
