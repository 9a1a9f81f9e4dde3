//! A* over the moves an action's input mappings allow.
//!
//! A search state is a position plus a facing direction, so relative input
//! tables (turn-then-move) are searched correctly.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use super::{PathFinder, PathResult};
use crate::action::ActionInputsDefinition;
use crate::state::{Direction, Grid, Offset, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SearchNode {
    position: Position,
    facing: Direction,
}

/// Entry of the open set. Ties on cost are broken by insertion order so the
/// search is deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
struct OpenEntry {
    f_cost: u32,
    sequence: u64,
    node: SearchNode,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Path finder over one grid snapshot, treating cells that hold any of
/// `impassable` as blocked.
pub struct AStarPathFinder<'a> {
    grid: &'a Grid,
    impassable: &'a BTreeSet<String>,
    inputs: &'a ActionInputsDefinition,
}

impl<'a> AStarPathFinder<'a> {
    pub fn new(
        grid: &'a Grid,
        impassable: &'a BTreeSet<String>,
        inputs: &'a ActionInputsDefinition,
    ) -> Self {
        Self {
            grid,
            impassable,
            inputs,
        }
    }

    fn is_passable(&self, position: Position) -> bool {
        self.grid.contains(position)
            && self
                .grid
                .objects_at(position)
                .all(|object| !self.impassable.contains(object.name()))
    }

    /// Node reached by taking mapping `(vector, orientation)` from `node`.
    fn step(&self, node: SearchNode, vector: Offset, orientation: Offset) -> SearchNode {
        let (vector, orientation) = if self.inputs.relative {
            (node.facing.rotate(vector), node.facing.rotate(orientation))
        } else {
            (vector, orientation)
        };
        let facing = if orientation.is_zero() {
            node.facing
        } else {
            Direction::from_vector(orientation)
        };
        SearchNode {
            position: node.position + vector,
            facing,
        }
    }
}

impl PathFinder for AStarPathFinder<'_> {
    fn search(&self, start: Position, goal: Position, facing: Offset, max_depth: u32) -> PathResult {
        if start == goal {
            return PathResult {
                action_id: 0,
                path: vec![start],
            };
        }

        let start = SearchNode {
            position: start,
            facing: Direction::from_vector(facing),
        };
        let mut open_set = BinaryHeap::new();
        let mut came_from: BTreeMap<SearchNode, (SearchNode, u32)> = BTreeMap::new();
        let mut g_scores: BTreeMap<SearchNode, u32> = BTreeMap::new();
        let mut sequence = 0u64;
        let mut expanded = 0u32;

        g_scores.insert(start, 0);
        open_set.push(OpenEntry {
            f_cost: start.position.manhattan_distance(goal),
            sequence,
            node: start,
        });

        while let Some(current) = open_set.pop() {
            if current.node.position == goal {
                return reconstruct_path(&came_from, current.node);
            }
            if expanded >= max_depth {
                break;
            }
            expanded += 1;

            let current_g = g_scores.get(&current.node).copied().unwrap_or(u32::MAX);
            for (action_id, mapping) in &self.inputs.input_mappings {
                let next = self.step(current.node, mapping.vector_to_dest, mapping.orientation_vector);
                if next == current.node || !self.is_passable(next.position) {
                    continue;
                }

                let tentative_g = current_g.saturating_add(1);
                let next_g = g_scores.get(&next).copied().unwrap_or(u32::MAX);
                if tentative_g < next_g {
                    came_from.insert(next, (current.node, *action_id));
                    g_scores.insert(next, tentative_g);
                    sequence += 1;
                    open_set.push(OpenEntry {
                        f_cost: tentative_g.saturating_add(next.position.manhattan_distance(goal)),
                        sequence,
                        node: next,
                    });
                }
            }
        }

        PathResult::default()
    }
}

/// Walks `came_from` back to the start; the last hop walked is the first
/// action to take.
fn reconstruct_path(
    came_from: &BTreeMap<SearchNode, (SearchNode, u32)>,
    mut current: SearchNode,
) -> PathResult {
    let mut path = vec![current.position];
    let mut action_id = 0;
    while let Some(&(previous, via)) = came_from.get(&current) {
        path.push(previous.position);
        action_id = via;
        current = previous;
    }
    path.reverse();
    path.dedup();
    PathResult { action_id, path }
}
