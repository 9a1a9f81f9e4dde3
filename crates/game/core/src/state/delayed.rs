use std::collections::BTreeMap;

use super::{PlayerId, Tick};
use crate::action::Action;

/// An action waiting in the queue until its due tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledAction {
    pub due: Tick,
    pub player_id: PlayerId,
    pub action: Action,
}

/// Min-priority queue of delayed actions.
///
/// Entries are ordered by `(due tick, insertion sequence)`, so actions due on
/// the same tick leave the queue in the order they were scheduled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DelayedActionQueue {
    entries: BTreeMap<(Tick, u64), ScheduledAction>,
    next_sequence: u64,
}

impl DelayedActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Tick, player_id: PlayerId, action: Action) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.insert(
            (due, sequence),
            ScheduledAction {
                due,
                player_id,
                action,
            },
        );
    }

    /// Removes the earliest entry if it is due at or before `now`.
    pub fn pop_due(&mut self, now: Tick) -> Option<ScheduledAction> {
        let (&(due, _), _) = self.entries.first_key_value()?;
        if due > now {
            return None;
        }
        self.entries.pop_first().map(|(_, scheduled)| scheduled)
    }

    /// Entries in dequeue order.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledAction> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_sequence = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Position;

    fn action(name: &str) -> Action {
        Action::builder(name, 1).between_locations(Position::ORIGIN, Position::new(1, 0))
    }

    #[test]
    fn drains_by_tick_then_insertion() {
        let mut queue = DelayedActionQueue::new();
        queue.schedule(Tick(5), 1, action("late"));
        queue.schedule(Tick(3), 1, action("first"));
        queue.schedule(Tick(3), 1, action("second"));

        assert!(queue.pop_due(Tick(2)).is_none());
        let names: Vec<String> = std::iter::from_fn(|| queue.pop_due(Tick(5)))
            .map(|s| s.action.name().to_owned())
            .collect();
        assert_eq!(names, ["first", "second", "late"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn not_due_entries_stay() {
        let mut queue = DelayedActionQueue::new();
        queue.schedule(Tick(13), 1, action("later"));
        assert!(queue.pop_due(Tick(12)).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_due(Tick(13)).map(|s| s.due), Some(Tick(13)));
    }
}
