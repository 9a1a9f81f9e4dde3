//! Built-in gem collector game.
//!
//! One agent collects gems while spiders wander the maze at random. Walking
//! into a spider costs points. The episode is won once every gem is gone.

use std::sync::Arc;

use anyhow::{Context, Result};

use gridrule_core::{
    ActionInputsDefinition, CommandSpec, InitialActionDefinition, ObjectDefinition, ObjectGenerator,
    TerminationKind,
};

pub const LEVEL: &str = "
    W W W W W W W W W
    W A1 . . g . . . W
    W . W W . W W . W
    W g . s . . . g W
    W . W W . W W . W
    W . . . g . s . W
    W W W W W W W W W
";

const WANDER_DELAY: i64 = 2;

pub fn generator() -> Result<Arc<ObjectGenerator>> {
    let keep_wandering = || {
        CommandSpec::new("exec")
            .named("Action", "wander")
            .named("Delay", WANDER_DELAY)
            .named("Randomize", true)
    };

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
                .on_source("move", ["spider"], vec![CommandSpec::new("reward").arg(-5)]),
        )
        .object(ObjectDefinition::new("wall").glyph('W').z_index(1))
        .object(
            ObjectDefinition::new("gem")
                .glyph('g')
                .on_destination("move", ["agent"], vec![CommandSpec::new("remove")]),
        )
        .object(
            ObjectDefinition::new("spider")
                .glyph('s')
                .z_index(1)
                .on_source(
                    "wander",
                    ["_empty", "gem"],
                    vec![CommandSpec::new("mov").arg("_dest"), keep_wandering()],
                )
                .on_source(
                    "wander",
                    ["wall", "agent", "spider", "_boundary"],
                    vec![keep_wandering()],
                )
                .initial_action(
                    InitialActionDefinition::new("wander")
                        .delay(1)
                        .randomize(true),
                ),
        )
        .action_inputs("move", ActionInputsDefinition::new())
        .action_inputs("wander", ActionInputsDefinition::new().internal(true))
        .termination(
            TerminationKind::Win,
            CommandSpec::new("eq").arg("gem:count").arg(0),
        )
        .build()
        .context("demo object definitions are invalid")?;
    Ok(Arc::new(generator))
}
