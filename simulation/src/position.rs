//! Position Index - where a person sits in the generational matrix
//!
//! Read-only views over a matrix: every coordinate of a person, and the
//! cell-derived relations (siblings, partners, parents) the kinship and
//! compatibility rules are built from.

use std::collections::BTreeSet;

use crate::components::PersonId;
use crate::matrix::{is_union_row, Coord, GenerationalMatrix};

#[derive(Clone, Copy)]
pub struct PositionIndex<'a> {
    matrix: &'a GenerationalMatrix,
}

impl<'a> PositionIndex<'a> {
    pub fn new(matrix: &'a GenerationalMatrix) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &'a GenerationalMatrix {
        self.matrix
    }

    /// All (generation, lineage, slot) coordinates of `id`.
    pub fn locate(&self, id: PersonId) -> Vec<Coord> {
        self.matrix.coords_of(id)
    }

    /// Columns where `id` appears within one generation.
    pub fn columns_in_row(&self, id: PersonId, generation: usize) -> BTreeSet<usize> {
        self.matrix
            .row(generation)
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.contains(&id))
            .map(|(lineage, _)| lineage)
            .collect()
    }

    /// Columns of the union cells `id` belongs to, keyed by generation.
    pub fn union_cells(&self, id: PersonId) -> Vec<(usize, usize)> {
        self.locate(id)
            .into_iter()
            .filter(Coord::in_union_row)
            .map(|c| (c.generation, c.lineage))
            .collect()
    }

    /// Cell-mates in odd (children) rows, excluding `id`.
    pub fn siblings_of(&self, id: PersonId) -> BTreeSet<PersonId> {
        self.cell_mates(id, false)
    }

    /// Cell-mates in even (union) rows, excluding `id`.
    pub fn partners_of(&self, id: PersonId) -> BTreeSet<PersonId> {
        self.cell_mates(id, true)
    }

    /// Members of the union one generation above each children-row position
    /// of `id`, in the same lineage column.
    pub fn parents_of_child(&self, id: PersonId) -> BTreeSet<PersonId> {
        self.locate(id)
            .into_iter()
            .filter(|c| !c.in_union_row())
            .flat_map(|c| self.matrix.cell(c.generation - 1, c.lineage).iter().copied())
            .filter(|p| *p != id)
            .collect()
    }

    /// Members of the children cell below each union of `id`.
    pub fn children_of(&self, id: PersonId) -> BTreeSet<PersonId> {
        self.union_cells(id)
            .into_iter()
            .flat_map(|(generation, lineage)| {
                self.matrix.cell(generation + 1, lineage).iter().copied()
            })
            .filter(|c| *c != id)
            .collect()
    }

    fn cell_mates(&self, id: PersonId, union_rows: bool) -> BTreeSet<PersonId> {
        self.locate(id)
            .into_iter()
            .filter(|c| is_union_row(c.generation) == union_rows)
            .flat_map(|c| self.matrix.cell(c.generation, c.lineage).iter().copied())
            .filter(|p| *p != id)
            .collect()
    }
}
