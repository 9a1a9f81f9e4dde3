//! Level layouts: grid size plus the objects placed on reset.
//!
//! A scenario is either built in code or parsed from a glyph map where each
//! cell is an object glyph optionally followed by its player id (`A1`), and
//! `.` marks an empty cell. Whitespace between cells is ignored, so `W.A1W`
//! and `W . A1 W` describe the same row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gridrule_core::{ObjectGenerator, PlayerId, Position};

use crate::error::{Result, RuntimeError};

const EMPTY_CELL: char = '.';

/// One object to place when the level is (re)loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPlacement {
    pub position: Position,
    pub object: String,
    #[serde(default)]
    pub player_id: PlayerId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub width: u32,
    pub height: u32,
    /// Placed in order; later placements on an occupied layer fail.
    pub placements: Vec<ObjectPlacement>,
}

impl Scenario {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            placements: Vec::new(),
        }
    }

    #[must_use]
    pub fn place(mut self, object: impl Into<String>, player_id: PlayerId, position: Position) -> Self {
        self.placements.push(ObjectPlacement {
            position,
            object: object.into(),
            player_id,
        });
        self
    }

    /// Parses a glyph map using the glyphs declared on `generator`'s object
    /// types. Rows must all have the same number of cells.
    pub fn parse(level: &str, generator: &ObjectGenerator) -> Result<Self> {
        let mut glyphs = BTreeMap::new();
        for object_type in generator.object_types() {
            if let Some(glyph) = object_type.glyph() {
                glyphs
                    .entry(glyph)
                    .or_insert_with(|| object_type.name().to_owned());
            }
        }

        let mut scenario = Scenario::new(0, 0);
        let mut width = None;
        let rows = level.lines().map(str::trim).filter(|row| !row.is_empty());
        for (y, row) in rows.enumerate() {
            let line = y + 1;
            let cells = parse_row(row);
            match width {
                None => width = Some(cells.len()),
                Some(expected) if expected != cells.len() => {
                    return Err(RuntimeError::RaggedLevel {
                        line,
                        expected,
                        found: cells.len(),
                    });
                }
                Some(_) => {}
            }

            for (x, (glyph, player_id)) in cells.into_iter().enumerate() {
                if glyph == EMPTY_CELL {
                    continue;
                }
                let object = glyphs
                    .get(&glyph)
                    .ok_or(RuntimeError::UnknownGlyph { glyph, line })?;
                scenario.placements.push(ObjectPlacement {
                    position: Position::new(x as i32, y as i32),
                    object: object.clone(),
                    player_id,
                });
            }
            scenario.height = line as u32;
        }
        scenario.width = width.unwrap_or(0) as u32;
        Ok(scenario)
    }

    pub(crate) fn validate(&self, player_count: u32) -> Result<()> {
        for placement in &self.placements {
            if placement.player_id > player_count {
                return Err(RuntimeError::PlacementPlayer {
                    object: placement.object.clone(),
                    player: placement.player_id,
                    player_count,
                });
            }
            let Position { x, y } = placement.position;
            if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
                return Err(RuntimeError::OutsideLevel {
                    position: placement.position,
                    width: self.width,
                    height: self.height,
                });
            }
        }
        Ok(())
    }
}

/// Splits a row into `(glyph, player id)` cells.
fn parse_row(row: &str) -> Vec<(char, PlayerId)> {
    let mut cells: Vec<(char, PlayerId)> = Vec::new();
    for ch in row.chars() {
        if ch.is_whitespace() {
            continue;
        }
        match (ch.to_digit(10), cells.last_mut()) {
            (Some(digit), Some((glyph, player_id))) if *glyph != EMPTY_CELL => {
                *player_id = player_id.saturating_mul(10).saturating_add(digit);
            }
            _ => cells.push((ch, 0)),
        }
    }
    cells
}
