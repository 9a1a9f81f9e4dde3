use super::PlayerId;
use crate::object::GlobalVariableDefinition;

/// Index of a global variable in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
struct GlobalCell {
    name: String,
    per_player: bool,
    initial: i32,
    /// One value for shared globals, `player_count + 1` values (indexed by
    /// player id) for per-player globals.
    values: Vec<i32>,
}

/// Global variable store owned by the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobalVariables {
    cells: Vec<GlobalCell>,
}

impl GlobalVariables {
    pub fn from_definitions(definitions: &[GlobalVariableDefinition], player_count: u32) -> Self {
        let cells = definitions
            .iter()
            .map(|definition| {
                let width = if definition.per_player {
                    player_count as usize + 1
                } else {
                    1
                };
                GlobalCell {
                    name: definition.name.clone(),
                    per_player: definition.per_player,
                    initial: definition.initial,
                    values: vec![definition.initial; width],
                }
            })
            .collect();
        Self { cells }
    }

    /// Restores every cell to its declared initial value.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            let initial = cell.initial;
            cell.values.fill(initial);
        }
    }

    pub fn id_of(&self, name: &str) -> Option<GlobalId> {
        self.cells
            .iter()
            .position(|cell| cell.name == name)
            .map(|index| GlobalId(index as u32))
    }

    /// Reads a global. Per-player globals select the cell by `player`.
    pub fn get(&self, id: GlobalId, player: PlayerId) -> Option<i32> {
        let cell = self.cells.get(id.0 as usize)?;
        let index = if cell.per_player { player as usize } else { 0 };
        cell.values.get(index).copied()
    }

    pub fn get_mut(&mut self, id: GlobalId, player: PlayerId) -> Option<&mut i32> {
        let cell = self.cells.get_mut(id.0 as usize)?;
        let index = if cell.per_player { player as usize } else { 0 };
        cell.values.get_mut(index)
    }

    pub fn value(&self, name: &str, player: PlayerId) -> Option<i32> {
        self.id_of(name).and_then(|id| self.get(id, player))
    }

    /// `(name, per_player, values)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool, &[i32])> + '_ {
        self.cells
            .iter()
            .map(|cell| (cell.name.as_str(), cell.per_player, cell.values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn globals() -> GlobalVariables {
        GlobalVariables::from_definitions(
            &[
                GlobalVariableDefinition::shared("spawned", 0),
                GlobalVariableDefinition::per_player("score", 5),
            ],
            2,
        )
    }

    #[test]
    fn per_player_cells_are_independent() {
        let mut vars = globals();
        let score = vars.id_of("score").unwrap();
        *vars.get_mut(score, 1).unwrap() += 3;
        assert_eq!(vars.get(score, 1), Some(8));
        assert_eq!(vars.get(score, 2), Some(5));
        assert_eq!(vars.get(score, 3), None);
    }

    #[test]
    fn shared_cells_ignore_player() {
        let mut vars = globals();
        let spawned = vars.id_of("spawned").unwrap();
        *vars.get_mut(spawned, 2).unwrap() = 4;
        assert_eq!(vars.value("spawned", 0), Some(4));
        assert_eq!(vars.value("spawned", 1), Some(4));
    }

    #[test]
    fn reset_restores_initial_values() {
        let mut vars = globals();
        *vars.get_mut(GlobalId(1), 2).unwrap() = -1;
        vars.reset();
        assert_eq!(vars.value("score", 2), Some(5));
    }
}
