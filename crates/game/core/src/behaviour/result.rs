use std::collections::BTreeMap;

use crate::state::PlayerId;

/// Reward totals keyed by player.
pub type Rewards = BTreeMap<PlayerId, i32>;

/// Adds every entry of `other` into `total`.
pub fn accumulate_rewards(total: &mut Rewards, other: &Rewards) {
    for (player, amount) in other {
        let entry = total.entry(*player).or_insert(0);
        *entry = entry.wrapping_add(*amount);
    }
}

/// Outcome of running one behaviour or a chain of them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BehaviourResult {
    /// Stops the remaining behaviours of the chain. Mutations already applied
    /// stay applied.
    pub abort_action: bool,
    pub rewards: Rewards,
}

impl BehaviourResult {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn abort() -> Self {
        Self {
            abort_action: true,
            rewards: Rewards::new(),
        }
    }

    pub fn from_abort(abort_action: bool) -> Self {
        Self {
            abort_action,
            rewards: Rewards::new(),
        }
    }

    pub fn with_rewards(rewards: Rewards) -> Self {
        Self {
            abort_action: false,
            rewards,
        }
    }

    /// Folds a later result in: rewards add up, abort sticks.
    pub fn merge(&mut self, other: BehaviourResult) {
        accumulate_rewards(&mut self.rewards, &other.rewards);
        self.abort_action |= other.abort_action;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewards_add_per_player() {
        let mut total = Rewards::from([(1, 2)]);
        accumulate_rewards(&mut total, &Rewards::from([(1, 3), (2, -1)]));
        assert_eq!(total, Rewards::from([(1, 5), (2, -1)]));
    }

    #[test]
    fn merge_keeps_abort() {
        let mut result = BehaviourResult::with_rewards(Rewards::from([(1, 1)]));
        result.merge(BehaviourResult::abort());
        assert!(result.abort_action);
        assert_eq!(result.rewards.get(&1), Some(&1));
    }
}
