//! Generational Matrix
//!
//! Rows are generations, each row an ordered list of lineage cells, each
//! cell an ordered list of persons. Even rows hold unions (at most two
//! partners), odd rows hold the children of the union directly above them
//! in the same column.

use serde::{Deserialize, Serialize};

use crate::components::PersonId;

/// Maximum number of partners in an even-generation cell.
pub const UNION_CAPACITY: usize = 2;

/// (generation, lineage, slot) coordinate of one appearance of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub generation: usize,
    pub lineage: usize,
    pub slot: usize,
}

impl Coord {
    pub fn in_union_row(&self) -> bool {
        is_union_row(self.generation)
    }

    pub fn same_cell(&self, other: &Coord) -> bool {
        self.generation == other.generation && self.lineage == other.lineage
    }
}

pub fn is_union_row(generation: usize) -> bool {
    generation % 2 == 0
}

pub type LineageCell = Vec<PersonId>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationalMatrix {
    rows: Vec<Vec<LineageCell>>,
}

impl GenerationalMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<LineageCell>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<LineageCell>] {
        &self.rows
    }

    pub fn generation_count(&self) -> usize {
        self.rows.len()
    }

    /// Cells of a generation; empty past the current bounds.
    pub fn row(&self, generation: usize) -> &[LineageCell] {
        self.rows.get(generation).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Persons at a coordinate; empty past the current bounds.
    pub fn cell(&self, generation: usize, lineage: usize) -> &[PersonId] {
        self.row(generation)
            .get(lineage)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Grow rows and cells so that `(generation, lineage)` exists.
    pub fn ensure(&mut self, generation: usize, lineage: usize) {
        while self.rows.len() <= generation {
            self.rows.push(Vec::new());
        }
        let row = &mut self.rows[generation];
        while row.len() <= lineage {
            row.push(Vec::new());
        }
    }

    /// Append `id` at `(generation, lineage)`, extending the matrix on demand.
    /// A person already in that cell is not duplicated.
    pub fn push(&mut self, generation: usize, lineage: usize, id: PersonId) -> Coord {
        self.ensure(generation, lineage);
        let cell = &mut self.rows[generation][lineage];
        let slot = match cell.iter().position(|p| *p == id) {
            Some(slot) => slot,
            None => {
                cell.push(id);
                cell.len() - 1
            }
        };
        Coord {
            generation,
            lineage,
            slot,
        }
    }

    /// Whether a union cell can take `id` without exceeding two partners.
    pub fn has_room(&self, generation: usize, lineage: usize, id: PersonId) -> bool {
        let cell = self.cell(generation, lineage);
        !is_union_row(generation) || cell.contains(&id) || cell.len() < UNION_CAPACITY
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, &LineageCell)> {
        self.rows.iter().enumerate().flat_map(|(generation, row)| {
            row.iter()
                .enumerate()
                .map(move |(lineage, cell)| (generation, lineage, cell))
        })
    }

    pub fn coords_of(&self, id: PersonId) -> Vec<Coord> {
        self.iter_cells()
            .filter_map(|(generation, lineage, cell)| {
                cell.iter().position(|p| *p == id).map(|slot| Coord {
                    generation,
                    lineage,
                    slot,
                })
            })
            .collect()
    }

    /// Every placed person once, in first-appearance (row-major) order.
    pub fn person_ids(&self) -> Vec<PersonId> {
        let mut seen = std::collections::HashSet::new();
        self.iter_cells()
            .flat_map(|(_, _, cell)| cell.iter().copied())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Union cells holding at least two partners, as (generation, lineage).
    pub fn unions(&self) -> Vec<(usize, usize)> {
        self.iter_cells()
            .filter(|(generation, _, cell)| {
                is_union_row(*generation) && cell.len() >= UNION_CAPACITY
            })
            .map(|(generation, lineage, _)| (generation, lineage))
            .collect()
    }

    /// First union-capacity violation, if any.
    pub fn overfull_union(&self) -> Option<(usize, usize)> {
        self.iter_cells()
            .find(|(generation, _, cell)| is_union_row(*generation) && cell.len() > UNION_CAPACITY)
            .map(|(generation, lineage, _)| (generation, lineage))
    }
}
