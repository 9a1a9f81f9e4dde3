use std::sync::Arc;

use gridrule_core::{
    Action, ActionError, ActionInputsDefinition, ArgValue, CommandSpec, DefinitionError, Direction,
    EngineConfig, EngineError, GlobalVariableDefinition, Grid, InitialActionDefinition,
    InputMapping, ObjectDefinition, ObjectGenerator, ObjectId, Offset, Position, Rewards,
    RuleEngine, Tick,
};

fn cmd(name: &str) -> CommandSpec {
    CommandSpec::new(name)
}

/// Agent, walls, gems and pushable boxes on a 5x5 grid.
fn sokoban_generator(player_count: u32) -> Arc<ObjectGenerator> {
    let generator = ObjectGenerator::builder(player_count)
        .avatar("agent")
        .object(
            ObjectDefinition::new("agent")
                .z_index(1)
                .on_source("move", ["_empty"], vec![cmd("mov").arg("_dest")])
                .on_source("move", ["gem"], vec![cmd("reward").arg(1), cmd("mov").arg("_dest")])
                .on_source("move", ["box"], vec![cmd("cascade").arg("_dest"), cmd("mov").arg("_dest")])
                .on_source("move", ["_boundary"], vec![cmd("reward").arg(-1)]),
        )
        .object(ObjectDefinition::new("wall").z_index(1))
        .object(
            ObjectDefinition::new("gem").on_destination("move", ["agent"], vec![cmd("remove")]),
        )
        .object(
            ObjectDefinition::new("box")
                .z_index(1)
                .on_source("move", ["_empty"], vec![cmd("mov").arg("_dest")]),
        )
        .action_inputs("move", ActionInputsDefinition::new())
        .build()
        .unwrap();
    Arc::new(generator)
}

fn place(grid: &mut Grid, name: &str, player: u32, x: i32, y: i32) -> ObjectId {
    let object = grid.generator().new_instance(name, player).unwrap();
    grid.add_object(Position::new(x, y), object).unwrap()
}

fn step(grid: &Grid, agent: ObjectId, vector: Offset) -> Action {
    Action::builder("move", 1).from_object_by_vector(grid, agent, vector, vector, false)
}

#[test]
fn move_into_empty_cell() {
    let mut grid = Grid::new(sokoban_generator(1), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 1, 1);

    let action = step(&grid, agent, Offset::new(1, 0));
    let rewards = RuleEngine::new(&mut grid).perform_actions(1, &[action]).unwrap();

    assert!(rewards.is_empty());
    assert_eq!(grid.object(agent).unwrap().position(), Position::new(2, 1));
    assert_eq!(grid.object_at(Position::new(1, 1)), None);
}

#[test]
fn wall_blocks_without_side_effects() {
    let mut grid = Grid::new(sokoban_generator(1), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 1, 1);
    place(&mut grid, "wall", 0, 2, 1);
    let before = grid.state_digest();

    let action = step(&grid, agent, Offset::new(1, 0));
    let rewards = RuleEngine::new(&mut grid).perform_actions(1, &[action]).unwrap();

    assert!(rewards.is_empty());
    assert_eq!(grid.state_digest(), before);
}

#[test]
fn collecting_a_gem_rewards_and_removes_it() {
    let mut grid = Grid::new(sokoban_generator(1), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 1, 1);
    let gem = place(&mut grid, "gem", 0, 2, 1);

    let action = step(&grid, agent, Offset::new(1, 0));
    let rewards = RuleEngine::new(&mut grid).perform_actions(1, &[action]).unwrap();

    assert_eq!(rewards, Rewards::from([(1, 1)]));
    assert!(grid.object(gem).is_none());
    assert_eq!(grid.object(agent).unwrap().position(), Position::new(2, 1));
    assert_eq!(grid.objects_at(Position::new(2, 1)).count(), 1);
}

#[test]
fn stepping_off_the_grid_hits_the_boundary() {
    let mut grid = Grid::new(sokoban_generator(1), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 0, 0);

    let action = step(&grid, agent, Offset::new(-1, 0));
    let rewards = RuleEngine::new(&mut grid).perform_actions(1, &[action]).unwrap();

    assert_eq!(rewards, Rewards::from([(1, -1)]));
    assert_eq!(grid.object(agent).unwrap().position(), Position::ORIGIN);
}

#[test]
fn players_only_control_their_own_objects() {
    let mut grid = Grid::new(sokoban_generator(2), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 1, 1);

    let foreign = Action::builder("move", 2).from_object_by_vector(
        &grid,
        agent,
        Offset::new(1, 0),
        Offset::new(1, 0),
        false,
    );
    RuleEngine::new(&mut grid).perform_actions(2, &[foreign.clone()]).unwrap();
    assert_eq!(grid.object(agent).unwrap().position(), Position::new(1, 1));

    // the environment may act through anything
    RuleEngine::new(&mut grid).perform_actions(0, &[foreign]).unwrap();
    assert_eq!(grid.object(agent).unwrap().position(), Position::new(2, 1));
}

#[test]
fn cascade_pushes_a_box() {
    let mut grid = Grid::new(sokoban_generator(1), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 1, 1);
    let pushed = place(&mut grid, "box", 0, 2, 1);

    let action = step(&grid, agent, Offset::new(1, 0));
    RuleEngine::new(&mut grid).perform_actions(1, &[action]).unwrap();

    assert_eq!(grid.object(pushed).unwrap().position(), Position::new(3, 1));
    assert_eq!(grid.object(agent).unwrap().position(), Position::new(2, 1));
}

#[test]
fn box_against_wall_blocks_the_push() {
    let mut grid = Grid::new(sokoban_generator(1), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 1, 1);
    let pushed = place(&mut grid, "box", 0, 2, 1);
    place(&mut grid, "wall", 0, 3, 1);

    let action = step(&grid, agent, Offset::new(1, 0));
    RuleEngine::new(&mut grid).perform_actions(1, &[action]).unwrap();

    assert_eq!(grid.object(pushed).unwrap().position(), Position::new(2, 1));
    assert_eq!(grid.object(agent).unwrap().position(), Position::new(1, 1));
}

#[test]
fn preconditions_gate_actions() {
    let generator = ObjectGenerator::builder(1)
        .object(
            ObjectDefinition::new("runner")
                .variable("stamina", 1)
                .on_source(
                    "move",
                    ["_empty"],
                    vec![cmd("decr").arg("stamina"), cmd("mov").arg("_dest")],
                )
                .precondition("move", ["_empty"], cmd("gt").arg("stamina").arg(0)),
        )
        .build()
        .unwrap();
    let mut grid = Grid::new(Arc::new(generator), 5, 5, EngineConfig::default());
    let runner = place(&mut grid, "runner", 1, 0, 0);

    for _ in 0..3 {
        let action = step(&grid, runner, Offset::new(1, 0));
        RuleEngine::new(&mut grid).perform_actions(1, &[action]).unwrap();
    }

    let runner = grid.object(runner).unwrap();
    assert_eq!(runner.position(), Position::new(1, 0));
    assert_eq!(runner.variable("stamina"), Some(0));
}

#[test]
fn conditional_blocks_run_when_true() {
    let generator = ObjectGenerator::builder(1)
        .object(ObjectDefinition::new("agent").variable("health", 2).on_source(
            "hurt",
            ["_empty"],
            vec![
                cmd("decr").arg("health"),
                cmd("lte").arg("health").arg(0).then(vec![cmd("remove")]),
            ],
        ))
        .build()
        .unwrap();
    let mut grid = Grid::new(Arc::new(generator), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 2, 2);
    grid.purge_dirty_locations(0);

    let hurt = Action::builder("hurt", 1).from_object_to_location(agent, Position::new(2, 3));
    RuleEngine::new(&mut grid).perform_actions(1, &[hurt.clone()]).unwrap();
    assert_eq!(grid.object(agent).and_then(|a| a.variable("health")), Some(1));
    assert!(grid.dirty_locations(0).unwrap().contains(&Position::new(2, 2)));

    RuleEngine::new(&mut grid).perform_actions(1, &[hurt]).unwrap();
    assert!(grid.object(agent).is_none());
}

#[test]
fn delayed_actions_run_on_their_tick() {
    let mut grid = Grid::new(sokoban_generator(1), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 1, 1);

    let action = Action::builder("move", 1).delay(3).from_object_by_vector(
        &grid,
        agent,
        Offset::new(0, 1),
        Offset::new(0, 1),
        false,
    );
    RuleEngine::new(&mut grid).perform_actions(1, &[action]).unwrap();
    assert_eq!(grid.delayed_actions().len(), 1);

    for _ in 0..2 {
        grid.advance_tick();
        RuleEngine::new(&mut grid).process_delayed_actions().unwrap();
        assert_eq!(grid.object(agent).unwrap().position(), Position::new(1, 1));
    }

    grid.advance_tick();
    RuleEngine::new(&mut grid).process_delayed_actions().unwrap();
    assert_eq!(grid.tick(), Tick(3));
    assert_eq!(grid.object(agent).unwrap().position(), Position::new(1, 2));
    assert!(grid.delayed_actions().is_empty());
}

#[test]
fn spawned_objects_run_initial_actions() {
    let generator = ObjectGenerator::builder(1)
        .object(ObjectDefinition::new("farmer").z_index(1).on_source(
            "plant",
            ["_empty"],
            vec![cmd("spawn").arg("seed")],
        ))
        .object(
            ObjectDefinition::new("seed")
                .on_source("grow", ["seed"], vec![cmd("change_to").arg("tree")])
                .initial_action(InitialActionDefinition::new("grow").action_id(1).delay(2)),
        )
        .object(ObjectDefinition::new("tree"))
        .action_inputs(
            "grow",
            ActionInputsDefinition::new()
                .internal(true)
                .mapping(1, InputMapping::default()),
        )
        .build()
        .unwrap();
    let mut grid = Grid::new(Arc::new(generator), 5, 5, EngineConfig::default());
    let farmer = place(&mut grid, "farmer", 1, 0, 0);

    let plant = Action::builder("plant", 1).from_object_to_location(farmer, Position::new(1, 0));
    RuleEngine::new(&mut grid).perform_actions(1, &[plant]).unwrap();

    let names = |grid: &Grid| -> Vec<String> {
        grid.objects_at(Position::new(1, 0))
            .map(|object| object.name().to_owned())
            .collect()
    };
    assert_eq!(names(&grid), ["seed"]);
    assert_eq!(grid.delayed_actions().len(), 1);

    grid.advance_tick();
    grid.advance_tick();
    RuleEngine::new(&mut grid).process_delayed_actions().unwrap();
    assert_eq!(names(&grid), ["tree"]);
}

#[test]
fn exec_search_steps_towards_nearest_target() {
    let generator = ObjectGenerator::builder(1)
        .object(
            ObjectDefinition::new("hunter")
                .z_index(1)
                .on_source(
                    "hunt",
                    ["_empty"],
                    vec![cmd("exec").named("Action", "chase").named(
                        "Search",
                        ArgValue::map([
                            ("TargetObjectName", ArgValue::from("gem")),
                            ("ImpassableObjects", ArgValue::from(vec!["wall"])),
                        ]),
                    )],
                )
                .on_source("chase", ["_empty"], vec![cmd("mov").arg("_dest")]),
        )
        .object(ObjectDefinition::new("gem"))
        .object(ObjectDefinition::new("wall").z_index(1))
        .action_inputs("chase", ActionInputsDefinition::new().internal(true))
        .build()
        .unwrap();
    let mut grid = Grid::new(Arc::new(generator), 5, 5, EngineConfig::default());
    let hunter = place(&mut grid, "hunter", 1, 0, 0);
    place(&mut grid, "gem", 0, 0, 3);
    place(&mut grid, "wall", 0, 0, 1);

    let hunt = Action::builder("hunt", 1).from_object_to_location(hunter, Position::new(1, 0));
    RuleEngine::new(&mut grid).perform_actions(1, &[hunt]).unwrap();

    // straight down is walled off, so the first step goes right
    assert_eq!(grid.object(hunter).unwrap().position(), Position::new(1, 0));
}

#[test]
fn runaway_recursion_is_a_fatal_error() {
    let generator = ObjectGenerator::builder(1)
        .object(ObjectDefinition::new("echo").on_source(
            "ping",
            ["echo"],
            vec![cmd("exec").named("Action", "ping").named("ActionId", 1)],
        ))
        .action_inputs(
            "ping",
            ActionInputsDefinition::new().mapping(1, InputMapping::default()),
        )
        .build()
        .unwrap();
    let config = EngineConfig::default().max_behaviour_depth(8);
    let mut grid = Grid::new(Arc::new(generator), 3, 3, config);
    let echo = place(&mut grid, "echo", 1, 1, 1);

    let ping = Action::builder("ping", 1).from_object_by_vector(
        &grid,
        echo,
        Offset::ZERO,
        Offset::ZERO,
        false,
    );
    let result = RuleEngine::new(&mut grid).perform_actions(1, &[ping]);
    assert_eq!(result, Err(EngineError::RecursionLimit { limit: 8 }));
}

#[test]
fn cascaded_rewards_join_the_pushing_chain() {
    let generator = ObjectGenerator::builder(1)
        .object(
            ObjectDefinition::new("agent").z_index(1).on_source(
                "move",
                ["box"],
                vec![
                    cmd("reward").arg(1),
                    cmd("cascade").arg("_dest"),
                    cmd("mov").arg("_dest"),
                ],
            ),
        )
        .object(ObjectDefinition::new("box").z_index(1).on_source(
            "move",
            ["_empty"],
            vec![cmd("reward").arg(2), cmd("mov").arg("_dest")],
        ))
        .build()
        .unwrap();
    let mut grid = Grid::new(Arc::new(generator), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 1, 1);
    let pushed = place(&mut grid, "box", 0, 2, 1);

    let action = step(&grid, agent, Offset::new(1, 0));
    let rewards = RuleEngine::new(&mut grid).perform_actions(1, &[action]).unwrap();

    assert_eq!(rewards, Rewards::from([(1, 3)]));
    assert_eq!(grid.object(pushed).unwrap().position(), Position::new(3, 1));
    assert_eq!(grid.object(agent).unwrap().position(), Position::new(2, 1));
}

fn turret_grid() -> (Grid, ObjectId) {
    let generator = ObjectGenerator::builder(1)
        .object(
            ObjectDefinition::new("turret")
                .on_source("turn", ["_empty"], vec![cmd("rot").arg("_dir")])
                .on_source("paint", ["_empty"], vec![cmd("set_tile").arg(2)]),
        )
        .build()
        .unwrap();
    let mut grid = Grid::new(Arc::new(generator), 5, 5, EngineConfig::default());
    let turret = place(&mut grid, "turret", 1, 2, 2);
    (grid, turret)
}

#[test]
fn rot_faces_the_action_orientation() {
    let (mut grid, turret) = turret_grid();
    let turn = |grid: &Grid, orientation| {
        Action::builder("turn", 1).from_object_by_vector(
            grid,
            turret,
            Offset::new(1, 0),
            orientation,
            false,
        )
    };

    let up = turn(&grid, Offset::new(0, -1));
    RuleEngine::new(&mut grid).perform_actions(1, &[up]).unwrap();
    assert_eq!(grid.object(turret).unwrap().orientation(), Direction::Up);

    // a zero orientation clears the facing instead of keeping the old one
    grid.purge_dirty_locations(0);
    let unoriented = turn(&grid, Offset::ZERO);
    RuleEngine::new(&mut grid).perform_actions(1, &[unoriented]).unwrap();
    assert_eq!(grid.object(turret).unwrap().orientation(), Direction::None);
    assert!(grid.dirty_locations(0).unwrap().contains(&Position::new(2, 2)));
}

#[test]
fn set_tile_changes_the_render_tile() {
    let (mut grid, turret) = turret_grid();
    grid.purge_dirty_locations(0);

    let paint = Action::builder("paint", 1).from_object_to_location(turret, Position::new(2, 3));
    RuleEngine::new(&mut grid).perform_actions(1, &[paint]).unwrap();

    let turret = grid.object(turret).unwrap();
    assert_eq!(turret.render_tile(), 2);
    assert_eq!(turret.render_tile_name(), "turret2");
    assert!(grid.dirty_locations(0).unwrap().contains(&Position::new(2, 2)));
}

#[test]
fn change_to_keeps_the_cell_and_player_unless_the_layer_is_taken() {
    let generator = ObjectGenerator::builder(2)
        .object(ObjectDefinition::new("egg").on_source(
            "hatch",
            ["_empty"],
            vec![cmd("change_to").arg("chick")],
        ))
        .object(ObjectDefinition::new("chick").z_index(1))
        .object(ObjectDefinition::new("rock").z_index(1))
        .build()
        .unwrap();
    let mut grid = Grid::new(Arc::new(generator), 5, 5, EngineConfig::default());
    let free = place(&mut grid, "egg", 2, 1, 1);
    let covered = place(&mut grid, "egg", 2, 3, 3);
    let rock = place(&mut grid, "rock", 0, 3, 3);

    let hatch = |egg, to| Action::builder("hatch", 2).from_object_to_location(egg, to);
    RuleEngine::new(&mut grid)
        .perform_actions(2, &[hatch(free, Position::new(1, 2)), hatch(covered, Position::new(3, 4))])
        .unwrap();

    assert!(grid.object(free).is_none());
    let chick = grid.objects_at(Position::new(1, 1)).next().unwrap();
    assert_eq!(chick.name(), "chick");
    assert_eq!(chick.player_id(), 2);

    assert_eq!(grid.object(covered).unwrap().name(), "egg");
    assert_eq!(grid.object_at(Position::new(3, 3)), Some(rock));
}

fn chest_generator(executor: &str) -> Arc<ObjectGenerator> {
    let generator = ObjectGenerator::builder(1)
        .object(
            ObjectDefinition::new("agent")
                .z_index(1)
                .on_source("open", ["chest"], vec![cmd("nop")]),
        )
        .object(
            ObjectDefinition::new("chest")
                .on_destination(
                    "open",
                    ["agent"],
                    vec![cmd("exec").named("Action", "loot").named("Executor", executor)],
                )
                .on_source("loot", ["_empty"], vec![cmd("reward").arg(5)]),
        )
        .action_inputs("loot", ActionInputsDefinition::new().internal(true))
        .build()
        .unwrap();
    Arc::new(generator)
}

#[test]
fn exec_credits_the_executor_player() {
    let open = |executor| {
        let mut grid = Grid::new(chest_generator(executor), 5, 5, EngineConfig::default());
        let agent = place(&mut grid, "agent", 1, 1, 0);
        place(&mut grid, "chest", 0, 2, 0);
        let action = Action::builder("open", 1).from_object_by_vector(
            &grid,
            agent,
            Offset::new(1, 0),
            Offset::new(1, 0),
            false,
        );
        RuleEngine::new(&mut grid).perform_actions(1, &[action]).unwrap()
    };

    // the neutral chest only pays out when the opening player executes
    assert_eq!(open("action"), Rewards::from([(1, 5)]));
    assert!(open("object").is_empty());
}

#[test]
fn metadata_is_read_when_the_behaviour_runs() {
    let generator = ObjectGenerator::builder(1)
        .object(ObjectDefinition::new("agent").on_source(
            "cash_in",
            ["_empty"],
            vec![cmd("reward").arg("meta.bonus")],
        ))
        .build()
        .unwrap();
    let mut grid = Grid::new(Arc::new(generator), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 0, 0);
    let cash_in = || Action::builder("cash_in", 1);

    let with_bonus = cash_in()
        .meta_value("bonus", 4)
        .from_object_to_location(agent, Position::new(1, 0));
    let rewards = RuleEngine::new(&mut grid).perform_actions(1, &[with_bonus]).unwrap();
    assert_eq!(rewards, Rewards::from([(1, 4)]));

    let without = cash_in().from_object_to_location(agent, Position::new(1, 0));
    assert_eq!(
        RuleEngine::new(&mut grid).perform_actions(1, &[without]),
        Err(EngineError::Action(ActionError::UnresolvedMetadata {
            key: "bonus".to_owned()
        }))
    );
}

#[test]
fn location_actions_pick_the_top_object() {
    let mut grid = Grid::new(sokoban_generator(1), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 1, 1);

    let action = Action::builder("move", 1).between_locations(Position::new(1, 1), Position::new(1, 2));
    RuleEngine::new(&mut grid).perform_actions(1, &[action]).unwrap();

    assert_eq!(grid.object(agent).unwrap().position(), Position::new(1, 2));
}

#[test]
fn object_to_object_follows_the_destination() {
    let mut grid = Grid::new(sokoban_generator(1), 5, 5, EngineConfig::default());
    let agent = place(&mut grid, "agent", 1, 0, 0);
    let near = place(&mut grid, "gem", 0, 3, 3);
    let stale = place(&mut grid, "gem", 0, 4, 0);
    grid.remove_object(stale);

    // a destination that left the grid has no location to move to
    let towards_stale = Action::builder("move", 1).between_objects(agent, stale);
    let rewards = RuleEngine::new(&mut grid).perform_actions(1, &[towards_stale]).unwrap();
    assert!(rewards.is_empty());
    assert_eq!(grid.object(agent).unwrap().position(), Position::ORIGIN);

    let towards_gem = Action::builder("move", 1).between_objects(agent, near);
    let rewards = RuleEngine::new(&mut grid).perform_actions(1, &[towards_gem]).unwrap();
    assert_eq!(rewards, Rewards::from([(1, 1)]));
    assert!(grid.object(near).is_none());
    assert_eq!(grid.object(agent).unwrap().position(), Position::new(3, 3));
}

#[test]
fn per_player_globals_are_written_per_player() {
    let generator = ObjectGenerator::builder(2)
        .global(GlobalVariableDefinition::per_player("coins", 0))
        .global(GlobalVariableDefinition::shared("dug", 0))
        .object(ObjectDefinition::new("miner").on_source(
            "dig",
            ["_empty"],
            vec![cmd("incr").arg("coins"), cmd("add").arg("dug").arg(10)],
        ))
        .build()
        .unwrap();
    let mut grid = Grid::new(Arc::new(generator), 5, 5, EngineConfig::default());
    let first = place(&mut grid, "miner", 1, 0, 0);
    let second = place(&mut grid, "miner", 2, 4, 4);

    let dig = |player, miner, to| Action::builder("dig", player).from_object_to_location(miner, to);
    RuleEngine::new(&mut grid)
        .perform_actions(1, &[dig(1, first, Position::new(1, 0))])
        .unwrap();
    for _ in 0..2 {
        RuleEngine::new(&mut grid)
            .perform_actions(2, &[dig(2, second, Position::new(3, 4))])
            .unwrap();
    }

    assert_eq!(grid.globals().value("coins", 1), Some(1));
    assert_eq!(grid.globals().value("coins", 2), Some(2));
    assert_eq!(grid.globals().value("dug", 0), Some(30));
}

#[test]
fn writing_a_reserved_variable_fails_to_build() {
    let result = ObjectGenerator::builder(1)
        .object(ObjectDefinition::new("agent").on_source(
            "warp",
            ["_empty"],
            vec![cmd("set").arg("_x").arg(1)],
        ))
        .build();
    assert!(matches!(
        result,
        Err(DefinitionError::ReadOnlyVariable { ref variable, .. }) if variable == "_x"
    ));
}

mod determinism {
    use proptest::prelude::*;

    use super::*;

    fn run(ids: &[u32]) -> (Grid, ObjectId, Rewards) {
        let mut grid = Grid::new(sokoban_generator(1), 5, 5, EngineConfig::with_seed(7));
        let agent = place(&mut grid, "agent", 1, 2, 2);
        place(&mut grid, "wall", 0, 3, 2);
        place(&mut grid, "gem", 0, 1, 2);
        place(&mut grid, "box", 0, 2, 1);

        let directions = ActionInputsDefinition::default_directions();
        let mut total = Rewards::new();
        for id in ids {
            let vector = directions[id].vector_to_dest;
            let action = step(&grid, agent, vector);
            let rewards = RuleEngine::new(&mut grid).perform_actions(1, &[action]).unwrap();
            for (player, amount) in rewards {
                *total.entry(player).or_insert(0) += amount;
            }
            grid.advance_tick();
        }
        (grid, agent, total)
    }

    proptest! {
        #[test]
        fn replays_are_identical(ids in prop::collection::vec(1u32..=4, 0..40)) {
            let (first, _, first_rewards) = run(&ids);
            let (second, _, second_rewards) = run(&ids);
            prop_assert_eq!(first.state_digest(), second.state_digest());
            prop_assert_eq!(first_rewards, second_rewards);
        }

        #[test]
        fn agent_stays_on_grid_and_off_walls(ids in prop::collection::vec(1u32..=4, 0..40)) {
            let (grid, agent, _) = run(&ids);
            let position = grid.object(agent).unwrap().position();
            prop_assert!(grid.contains(position));
            prop_assert_eq!(grid.object_at(position), Some(agent));
            prop_assert!(grid.objects_at(position).all(|object| object.name() != "wall"));
        }
    }
}
