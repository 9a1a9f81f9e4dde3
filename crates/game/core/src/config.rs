/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Maximum nesting of cascaded and `exec`-spawned actions within one
    /// externally submitted action. Exceeding it is a fatal engine error.
    pub max_behaviour_depth: usize,

    /// Node expansion bound used by `exec` searches that omit `MaxDepth`.
    pub default_search_depth: u32,

    /// Seed of the grid's random number generator.
    pub seed: u64,
}

impl EngineConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_BEHAVIOUR_DEPTH: usize = 64;
    pub const DEFAULT_SEARCH_DEPTH: u32 = 100;
    pub const DEFAULT_SEED: u64 = 0;

    pub fn new() -> Self {
        Self {
            max_behaviour_depth: Self::DEFAULT_MAX_BEHAVIOUR_DEPTH,
            default_search_depth: Self::DEFAULT_SEARCH_DEPTH,
            seed: Self::DEFAULT_SEED,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn max_behaviour_depth(mut self, depth: usize) -> Self {
        self.max_behaviour_depth = depth;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
