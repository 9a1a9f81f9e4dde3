use std::collections::BTreeSet;
use std::sync::Arc;

use gridrule_core::{
    Action, ActionInputsDefinition, CommandSpec, InputMapping, ObjectDefinition, ObjectGenerator,
    Offset, Position, Rewards, TerminationKind, TerminationState, Tick,
};
use gridrule_runtime::{GameProcess, RuntimeConfig, RuntimeError, Scenario};

const LEFT: u32 = 1;
const UP: u32 = 2;
const RIGHT: u32 = 3;

const LEVEL: &str = "
    W W W W W
    W A1 g . W
    W W W W W
";

fn generator() -> Arc<ObjectGenerator> {
    let generator = ObjectGenerator::builder(1)
        .avatar("agent")
        .object(
            ObjectDefinition::new("agent")
                .glyph('A')
                .z_index(1)
                .on_source("move", ["_empty"], vec![CommandSpec::new("mov").arg("_dest")])
                .on_source(
                    "move",
                    ["gem"],
                    vec![CommandSpec::new("reward").arg(1), CommandSpec::new("mov").arg("_dest")],
                )
                .on_source("rest", ["agent"], vec![CommandSpec::new("nop")]),
        )
        .object(ObjectDefinition::new("wall").glyph('W').z_index(1))
        .object(
            ObjectDefinition::new("gem")
                .glyph('g')
                .on_destination("move", ["agent"], vec![CommandSpec::new("remove")]),
        )
        .action_inputs("move", ActionInputsDefinition::new())
        .action_inputs(
            "rest",
            ActionInputsDefinition::new()
                .internal(true)
                .mapping(1, InputMapping::default()),
        )
        .termination(
            TerminationKind::Win,
            CommandSpec::new("eq").arg("gem:count").arg(0),
        )
        .build()
        .unwrap();
    Arc::new(generator)
}

fn started(config: RuntimeConfig) -> GameProcess {
    let generator = generator();
    let scenario = Scenario::parse(LEVEL, &generator).unwrap();
    let mut process = GameProcess::new(generator, scenario, config);
    process.add_player("alice").unwrap();
    process.init().unwrap();
    process
}

fn avatar_position(process: &GameProcess) -> Position {
    let avatar = process.avatar(1).unwrap();
    process.grid().object(avatar).unwrap().position()
}

#[test]
fn lifecycle_preconditions_are_enforced() {
    let generator = generator();
    let scenario = Scenario::parse(LEVEL, &generator).unwrap();
    let mut process = GameProcess::new(generator, scenario, RuntimeConfig::default());

    assert_eq!(process.step(0, &[]).unwrap_err(), RuntimeError::NotInitialized);
    assert!(matches!(process.try_clone(), Err(RuntimeError::NotInitialized)));
    assert_eq!(
        process.init().unwrap_err(),
        RuntimeError::PlayerCountMismatch {
            expected: 1,
            registered: 0
        }
    );

    process.add_player("alice").unwrap();
    assert_eq!(
        process.add_player("bob").unwrap_err(),
        RuntimeError::TooManyPlayers { limit: 1 }
    );

    process.init().unwrap();
    assert_eq!(process.init().unwrap_err(), RuntimeError::AlreadyInitialized);
}

#[test]
fn collecting_the_gem_scores_one() {
    let mut process = started(RuntimeConfig::default());
    assert_eq!(avatar_position(&process), Position::new(1, 1));

    let action = process.avatar_action(1, "move", RIGHT).unwrap();
    let result = process.step(1, &[action]).unwrap();

    assert_eq!(result.rewards, Rewards::from([(1, 1)]));
    assert_eq!(result.tick, Tick(1));
    assert_eq!(result.state_for(1), Some(TerminationState::Win));
    assert!(result.done);
    assert_eq!(process.player(1).unwrap().score(), 1);
    assert_eq!(avatar_position(&process), Position::new(2, 1));
    assert!(process.grid().objects().all(|object| object.name() != "gem"));
}

#[test]
fn walls_reject_moves() {
    let mut process = started(RuntimeConfig::default());

    for action_id in [LEFT, UP] {
        let action = process.avatar_action(1, "move", action_id).unwrap();
        let result = process.step(1, &[action]).unwrap();
        assert_eq!(result.reward_for(1), 0);
        assert!(result.states.is_empty());
        assert!(!result.done);
        assert_eq!(avatar_position(&process), Position::new(1, 1));
    }
}

#[test]
fn delayed_move_lands_on_its_tick() {
    let mut process = started(RuntimeConfig::default());
    for _ in 0..10 {
        process.step(1, &[]).unwrap();
    }
    assert_eq!(process.grid().tick(), Tick(10));

    let avatar = process.avatar(1).unwrap();
    let action = Action::builder("move", 1).delay(3).from_object_by_vector(
        process.grid(),
        avatar,
        Offset::new(1, 0),
        Offset::new(1, 0),
        false,
    );
    process.step(1, &[action]).unwrap();
    process.step(1, &[]).unwrap();
    process.step(1, &[]).unwrap();
    assert_eq!(process.grid().tick(), Tick(13));
    assert_eq!(avatar_position(&process), Position::new(1, 1));

    let result = process.step(1, &[]).unwrap();
    assert_eq!(result.reward_for(1), 1);
    assert_eq!(avatar_position(&process), Position::new(2, 1));
    assert!(process.grid().delayed_actions().is_empty());
}

#[test]
fn clones_are_independent() {
    let mut process = started(RuntimeConfig::with_seed(11));
    let clone = process.try_clone().unwrap();
    assert_eq!(clone.grid().state_digest(), process.grid().state_digest());
    assert_eq!(clone.avatar(1), process.avatar(1));

    let action = process.avatar_action(1, "move", RIGHT).unwrap();
    process.step(1, &[action]).unwrap();

    assert_ne!(clone.grid().state_digest(), process.grid().state_digest());
    assert_eq!(clone.grid().tick(), Tick(0));
    assert_eq!(clone.player(1).unwrap().score(), 0);
    assert!(clone.grid().objects().any(|object| object.name() == "gem"));
}

#[test]
fn same_seed_and_inputs_give_same_digest() {
    let run = || {
        let mut process = started(RuntimeConfig::with_seed(3));
        for action_id in [RIGHT, RIGHT, LEFT, UP, RIGHT] {
            let action = process.avatar_action(1, "move", action_id).unwrap();
            process.step(1, &[action]).unwrap();
        }
        hex::encode(process.grid().state_digest())
    };
    assert_eq!(run(), run());
}

#[test]
fn reset_restores_the_level() {
    let mut process = started(RuntimeConfig::default());
    let action = process.avatar_action(1, "move", RIGHT).unwrap();
    process.step(1, &[action]).unwrap();

    process.reset().unwrap();

    assert_eq!(process.grid().tick(), Tick(0));
    assert_eq!(process.steps(), 0);
    assert_eq!(process.player(1).unwrap().score(), 0);
    assert_eq!(avatar_position(&process), Position::new(1, 1));
    assert!(process.grid().objects().any(|object| object.name() == "gem"));
}

#[test]
fn availability_queries_hide_internal_and_illegal_actions() {
    let process = started(RuntimeConfig::default());

    let names = process.available_action_names(1);
    assert_eq!(names.len(), 1);
    assert_eq!(
        names.get(&Position::new(1, 1)),
        Some(&BTreeSet::from(["move".to_owned()]))
    );

    assert_eq!(
        process.available_action_ids(Position::new(1, 1), "move").unwrap(),
        [RIGHT]
    );
    assert!(process
        .available_action_ids(Position::new(3, 1), "move")
        .unwrap()
        .is_empty());
}

#[test]
fn step_limit_marks_done() {
    let mut process = started(RuntimeConfig::default().max_steps(2));
    assert!(!process.step(1, &[]).unwrap().done);
    assert!(process.step(1, &[]).unwrap().done);
}

#[test]
fn moves_mark_both_cells_dirty() {
    let mut process = started(RuntimeConfig::default());
    process.observe_dirty(1);

    let action = process.avatar_action(1, "move", RIGHT).unwrap();
    process.step(1, &[action]).unwrap();

    let dirty = process.observe_dirty(1);
    assert!(dirty.contains(&Position::new(1, 1)));
    assert!(dirty.contains(&Position::new(2, 1)));
    assert!(process.observe_dirty(1).is_empty());
}

#[test]
fn placements_for_missing_players_fail_init() {
    let generator = generator();
    let scenario = Scenario::parse("W A2 g W", &generator).unwrap();
    let mut process = GameProcess::new(generator, scenario, RuntimeConfig::default());
    process.add_player("alice").unwrap();

    assert_eq!(
        process.init().unwrap_err(),
        RuntimeError::PlacementPlayer {
            object: "agent".to_owned(),
            player: 2,
            player_count: 1
        }
    );
    assert!(!process.is_initialized());
}
