use std::collections::BTreeMap;

use gridrule_core::{PlayerId, Rewards, TerminationState, Tick};

/// Outcome of one game-process step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepResult {
    /// Tick after the step advanced the clock.
    pub tick: Tick,
    /// Rewards produced by delayed and external actions, per player.
    pub rewards: Rewards,
    /// Final state per player once a termination condition held. Empty while
    /// the episode is running.
    pub states: BTreeMap<PlayerId, TerminationState>,
    /// A termination condition held or the configured step limit was reached.
    pub done: bool,
}

impl StepResult {
    pub fn reward_for(&self, player: PlayerId) -> i32 {
        self.rewards.get(&player).copied().unwrap_or(0)
    }

    pub fn state_for(&self, player: PlayerId) -> Option<TerminationState> {
        self.states.get(&player).copied()
    }
}
