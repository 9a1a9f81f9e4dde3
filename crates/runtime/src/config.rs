use serde::{Deserialize, Serialize};

use gridrule_core::EngineConfig;

/// Game-process configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    /// Steps after which [`crate::StepResult::done`] is raised. `None` runs
    /// until the caller stops.
    pub max_steps: Option<u64>,
}

impl RuntimeConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            engine: EngineConfig::with_seed(seed),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }
}
