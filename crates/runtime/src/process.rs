//! Game-process orchestration over one grid.
//!
//! The process owns the grid, the registered players and the level layout.
//! Each step drains due delayed actions, applies the submitted actions, then
//! advances the tick.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, error, info};

use gridrule_core::action::ActionError;
use gridrule_core::behaviour::accumulate_rewards;
use gridrule_core::engine::is_valid_action;
use gridrule_core::{
    Action, EngineError, Grid, ObjectGenerator, ObjectId, PlayerId, Position, Rewards, RuleEngine,
    evaluate_termination,
};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::player::Player;
use crate::scenario::Scenario;
use crate::step::StepResult;

pub struct GameProcess {
    config: RuntimeConfig,
    generator: Arc<ObjectGenerator>,
    scenario: Scenario,
    grid: Grid,
    players: Vec<Player>,
    initialized: bool,
    steps: u64,
}

impl GameProcess {
    pub fn new(generator: Arc<ObjectGenerator>, scenario: Scenario, config: RuntimeConfig) -> Self {
        let grid = Grid::new(
            Arc::clone(&generator),
            scenario.width,
            scenario.height,
            config.engine.clone(),
        );
        Self {
            config,
            generator,
            scenario,
            grid,
            players: Vec::new(),
            initialized: false,
            steps: 0,
        }
    }

    /// Registers a player and returns its id. Ids are assigned from 1 in
    /// registration order.
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<PlayerId> {
        let limit = self.generator.player_count();
        if self.players.len() as u32 >= limit {
            return Err(RuntimeError::TooManyPlayers { limit });
        }
        let id = self.players.len() as PlayerId + 1;
        let player = Player::new(id, name);
        debug!(target: "gridrule::runtime", player = id, name = player.name(), "added player");
        self.players.push(player);
        Ok(id)
    }

    /// Loads the level for the first time. Fails if called twice or if the
    /// registered players do not match the generator's player count.
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Err(RuntimeError::AlreadyInitialized);
        }
        let expected = self.generator.player_count();
        let registered = self.players.len() as u32;
        if registered != expected {
            return Err(RuntimeError::PlayerCountMismatch {
                expected,
                registered,
            });
        }

        self.load_level()?;
        self.initialized = true;
        info!(
            target: "gridrule::runtime",
            players = registered,
            objects = self.grid.object_count(),
            "game process initialized"
        );
        Ok(())
    }

    /// Restores globals, reloads the level and clears player scores.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.load_level()
    }

    fn load_level(&mut self) -> Result<()> {
        self.scenario.validate(self.generator.player_count())?;
        self.grid.reset_map(self.scenario.width, self.scenario.height);
        self.grid.reset_global_variables();
        self.steps = 0;

        let mut engine = RuleEngine::new(&mut self.grid);
        for placement in &self.scenario.placements {
            match engine.spawn(placement.position, &placement.object, placement.player_id) {
                Ok(_) => {}
                Err(EngineError::Placement(source)) => {
                    return Err(RuntimeError::Placement {
                        object: placement.object.clone(),
                        source,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }

        let avatars = self.find_avatars();
        for player in &mut self.players {
            player.reset(avatars.get(&player.id()).copied());
        }
        Ok(())
    }

    fn find_avatars(&self) -> BTreeMap<PlayerId, ObjectId> {
        let mut avatars = BTreeMap::new();
        for object in self.grid.objects().filter(|object| object.is_avatar()) {
            avatars.entry(object.player_id()).or_insert(object.id());
        }
        avatars
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(RuntimeError::NotInitialized)
        }
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Runs one tick with `actions` submitted by `player_id`. Termination
    /// conditions are checked after the tick advances.
    pub fn step(&mut self, player_id: PlayerId, actions: &[Action]) -> Result<StepResult> {
        self.ensure_initialized()?;
        if player_id != 0 && self.player(player_id).is_none() {
            return Err(RuntimeError::UnknownPlayer { player: player_id });
        }
        self.run_tick(|engine, rewards| {
            let produced = engine.perform_actions(player_id, actions)?;
            accumulate_rewards(rewards, &produced);
            Ok(())
        })
    }

    /// Runs one tick with actions from several players, applied in order.
    pub fn step_all(&mut self, actions: &[(PlayerId, Action)]) -> Result<StepResult> {
        self.ensure_initialized()?;
        if let Some(&(player, _)) = actions
            .iter()
            .find(|(player, _)| *player != 0 && self.player(*player).is_none())
        {
            return Err(RuntimeError::UnknownPlayer { player });
        }
        self.run_tick(|engine, rewards| {
            for (player_id, action) in actions {
                let produced = engine.perform_actions(*player_id, std::slice::from_ref(action))?;
                accumulate_rewards(rewards, &produced);
            }
            Ok(())
        })
    }

    fn run_tick(
        &mut self,
        apply: impl FnOnce(&mut RuleEngine<'_>, &mut Rewards) -> std::result::Result<(), EngineError>,
    ) -> Result<StepResult> {
        let mut rewards = Rewards::new();
        let outcome = {
            let mut engine = RuleEngine::new(&mut self.grid);
            engine.process_delayed_actions().and_then(|delayed| {
                accumulate_rewards(&mut rewards, &delayed);
                apply(&mut engine, &mut rewards)
            })
        };
        if let Err(err) = outcome {
            error!(target: "gridrule::runtime", %err, tick = self.grid.tick().0, "step failed");
            return Err(err.into());
        }

        let tick = self.grid.advance_tick();
        self.steps += 1;
        for player in &mut self.players {
            player.credit(&rewards);
        }

        let states = evaluate_termination(&self.grid).unwrap_or_default();
        if !states.is_empty() {
            info!(target: "gridrule::runtime", tick = tick.0, ?states, "episode terminated");
        }
        let done =
            !states.is_empty() || self.config.max_steps.is_some_and(|limit| self.steps >= limit);
        Ok(StepResult {
            tick,
            rewards,
            states,
            done,
        })
    }

    /// Builds the action `player_id`'s avatar takes for input `action_id` of
    /// `action_name`.
    pub fn avatar_action(&self, player_id: PlayerId, action_name: &str, action_id: u32) -> Result<Action> {
        let avatar = self
            .player(player_id)
            .ok_or(RuntimeError::UnknownPlayer { player: player_id })?
            .avatar()
            .filter(|avatar| self.grid.contains_object(*avatar))
            .ok_or(RuntimeError::NoAvatar { player: player_id })?;
        let inputs = self.generator.action_inputs(action_name).ok_or_else(|| {
            EngineError::from(ActionError::MissingInputsDefinition {
                action: action_name.to_owned(),
            })
        })?;
        let mapping = inputs.input_mappings.get(&action_id).ok_or_else(|| {
            EngineError::from(ActionError::MissingInputMapping {
                action: action_name.to_owned(),
                action_id,
            })
        })?;
        Ok(Action::builder(action_name, player_id)
            .meta(mapping.meta_data.clone())
            .from_object_by_vector(
                &self.grid,
                avatar,
                mapping.vector_to_dest,
                mapping.orientation_vector,
                inputs.relative,
            ))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Player-visible action names per location of the objects `player_id`
    /// owns. Internal actions are left out.
    pub fn available_action_names(&self, player_id: PlayerId) -> BTreeMap<Position, BTreeSet<String>> {
        let inputs = self.generator.action_input_definitions();
        let mut available = BTreeMap::new();
        for object in self.grid.objects().filter(|object| object.player_id() == player_id) {
            let names: BTreeSet<String> = object
                .object_type()
                .available_actions()
                .filter(|name| !inputs.get(*name).is_some_and(|inputs| inputs.internal))
                .map(str::to_owned)
                .collect();
            if !names.is_empty() {
                available.insert(object.position(), names);
            }
        }
        available
    }

    /// Input ids of `action_name` that are currently legal for the top object
    /// at `location`.
    pub fn available_action_ids(&self, location: Position, action_name: &str) -> Result<Vec<u32>> {
        let Some(source) = self.grid.object_at(location) else {
            return Ok(Vec::new());
        };
        let Some(inputs) = self.generator.action_inputs(action_name) else {
            return Ok(Vec::new());
        };

        let mut ids = Vec::new();
        for (action_id, mapping) in &inputs.input_mappings {
            let candidate = Action::builder(action_name, 0).from_object_by_vector(
                &self.grid,
                source,
                mapping.vector_to_dest,
                mapping.orientation_vector,
                inputs.relative,
            );
            if is_valid_action(&self.grid, source, &candidate)? {
                ids.push(*action_id);
            }
        }
        Ok(ids)
    }

    /// Locations changed since `observer` last asked, then forgets them.
    pub fn observe_dirty(&mut self, observer: PlayerId) -> BTreeSet<Position> {
        self.grid.purge_dirty_locations(observer)
    }

    // ========================================================================
    // Cloning
    // ========================================================================

    /// Independent copy with the same objects, globals, tick, RNG state and
    /// delayed actions. Object ids are preserved.
    pub fn try_clone(&self) -> Result<GameProcess> {
        self.ensure_initialized()?;
        let (grid, _) = self.grid.clone_state();
        Ok(GameProcess {
            config: self.config.clone(),
            generator: Arc::clone(&self.generator),
            scenario: self.scenario.clone(),
            grid,
            players: self.players.clone(),
            initialized: true,
            steps: self.steps,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn generator(&self) -> &Arc<ObjectGenerator> {
        &self.generator
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id() == player_id)
    }

    pub fn avatar(&self, player_id: PlayerId) -> Option<ObjectId> {
        self.player(player_id).and_then(Player::avatar)
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}
