use gridrule_core::{ObjectId, PlayerId, Rewards};

/// A registered player. Ids start at 1; id 0 is the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
    score: i32,
    avatar: Option<ObjectId>,
}

impl Player {
    pub(crate) fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            avatar: None,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rewards collected since the last reset.
    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn avatar(&self) -> Option<ObjectId> {
        self.avatar
    }

    pub(crate) fn credit(&mut self, rewards: &Rewards) {
        if let Some(amount) = rewards.get(&self.id) {
            self.score = self.score.wrapping_add(*amount);
        }
    }

    pub(crate) fn reset(&mut self, avatar: Option<ObjectId>) {
        self.score = 0;
        self.avatar = avatar;
    }
}
