//! Action resolution and behaviour execution.
//!
//! The [`RuleEngine`] is the only path through which actions mutate a
//! [`Grid`]. For each due action it checks ownership and legality, runs the
//! source object's behaviour chain, then the destination object's chain.
//! Behaviours may synthesise further actions (`cascade`, `exec`, initial
//! actions of spawned objects); those recurse through the same pipeline with
//! a depth counter bounded by [`crate::config::EngineConfig::max_behaviour_depth`].

mod error;
mod interpret;
mod placement;
mod resolve;

pub use error::EngineError;
pub use placement::PlacedObject;
pub use resolve::{destination_partner, execute_action, is_valid_action, on_action_dst, on_action_src};

use tracing::debug;

use crate::action::Action;
use crate::behaviour::{Rewards, accumulate_rewards};
use crate::object::Object;
use crate::state::{Grid, PlayerId, Position};

/// Rule engine over one grid.
pub struct RuleEngine<'a> {
    grid: &'a mut Grid,
}

impl<'a> RuleEngine<'a> {
    pub fn new(grid: &'a mut Grid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &Grid {
        self.grid
    }

    /// Performs `actions` for `player_id` in order. Actions with a delay are
    /// queued instead and run from [`Self::process_delayed_actions`].
    ///
    /// Player 0 is the environment and may act through any object.
    pub fn perform_actions(&mut self, player_id: PlayerId, actions: &[Action]) -> Result<Rewards, EngineError> {
        perform_at_depth(self.grid, player_id, actions, 0)
    }

    /// Runs every queued action due at or before the current tick, in due
    /// order. Actions scheduled while draining run in the same call if they
    /// are already due.
    pub fn process_delayed_actions(&mut self) -> Result<Rewards, EngineError> {
        let mut rewards = Rewards::new();
        while let Some(scheduled) = self.grid.pop_due_delayed() {
            debug!(
                target: "gridrule::engine",
                action = scheduled.action.name(),
                due = scheduled.due.0,
                "running delayed action"
            );
            let produced = execute_action(self.grid, scheduled.player_id, &scheduled.action, 0)?;
            accumulate_rewards(&mut rewards, &produced);
        }
        Ok(rewards)
    }

    /// Places `object` and runs its initial actions.
    pub fn place_object(
        &mut self,
        position: Position,
        object: Object,
        originating: Option<&Action>,
    ) -> Result<PlacedObject, EngineError> {
        placement::place_at_depth(self.grid, position, object, originating, 0)
    }

    /// Creates an instance of `object_type` for `player_id` and places it.
    pub fn spawn(
        &mut self,
        position: Position,
        object_type: &str,
        player_id: PlayerId,
    ) -> Result<PlacedObject, EngineError> {
        let object = self.grid.generator().new_instance(object_type, player_id)?;
        self.place_object(position, object, None)
    }
}

pub(crate) fn perform_at_depth(
    grid: &mut Grid,
    player_id: PlayerId,
    actions: &[Action],
    depth: usize,
) -> Result<Rewards, EngineError> {
    let limit = grid.config().max_behaviour_depth;
    if depth > limit {
        return Err(EngineError::RecursionLimit { limit });
    }

    let mut rewards = Rewards::new();
    for action in actions {
        if action.delay() > 0 {
            grid.schedule_delayed(player_id, action.clone());
            continue;
        }
        let produced = execute_action(grid, player_id, action, depth)?;
        accumulate_rewards(&mut rewards, &produced);
    }
    Ok(rewards)
}
