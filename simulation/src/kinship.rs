//! Kinship Engine
//!
//! Classifies the relation between two persons from their matrix positions.
//! The rules form an ordered cascade evaluated over the cross product of both
//! persons' coordinates: the first rule matching any pair wins and later
//! rules are never consulted. Every rule checks both directions, so swapping
//! the arguments yields the same symmetric kind or the inverse kind.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::components::PersonId;
use crate::error::FamilyError;
use crate::family::Family;
use crate::matrix::{is_union_row, Coord, GenerationalMatrix};
use crate::position::PositionIndex;

/// Rows between a union and its grandchildren in the standard four-row
/// layout (founders at 0, grandchildren at 3). Deliberately not a general
/// ancestor test.
pub const GRANDPARENT_OFFSET: usize = 3;

/// Relation of the first argument to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    SamePerson,
    Partners,
    Siblings,
    ParentOf,
    ChildOf,
    GrandparentOf,
    GrandchildOf,
    ParentInLawOf,
    ChildInLawOf,
    AuntUncleOf,
    NieceNephewOf,
    SiblingsInLaw,
    Cousins,
    Unrelated,
}

impl Relation {
    /// The relation seen from the other side.
    pub fn inverse(self) -> Self {
        match self {
            Relation::ParentOf => Relation::ChildOf,
            Relation::ChildOf => Relation::ParentOf,
            Relation::GrandparentOf => Relation::GrandchildOf,
            Relation::GrandchildOf => Relation::GrandparentOf,
            Relation::ParentInLawOf => Relation::ChildInLawOf,
            Relation::ChildInLawOf => Relation::ParentInLawOf,
            Relation::AuntUncleOf => Relation::NieceNephewOf,
            Relation::NieceNephewOf => Relation::AuntUncleOf,
            other => other,
        }
    }

    pub fn is_symmetric(self) -> bool {
        self.inverse() == self
    }

    pub fn describe(self, a: &str, b: &str) -> String {
        match self {
            Relation::SamePerson => format!("{a} and {b} are the same person"),
            Relation::Partners => format!("{a} and {b} are partners"),
            Relation::Siblings => format!("{a} and {b} are siblings"),
            Relation::ParentOf => format!("{a} is a parent of {b}"),
            Relation::ChildOf => format!("{a} is a child of {b}"),
            Relation::GrandparentOf => format!("{a} is a grandparent of {b}"),
            Relation::GrandchildOf => format!("{a} is a grandchild of {b}"),
            Relation::ParentInLawOf => format!("{a} is a parent-in-law of {b}"),
            Relation::ChildInLawOf => format!("{a} is a child-in-law of {b}"),
            Relation::AuntUncleOf => format!("{a} is an aunt/uncle of {b}"),
            Relation::NieceNephewOf => format!("{a} is a niece/nephew of {b}"),
            Relation::SiblingsInLaw => format!("{a} and {b} are siblings-in-law"),
            Relation::Cousins => format!("{a} and {b} are cousins"),
            Relation::Unrelated => {
                format!("no direct relation could be determined between {a} and {b}")
            }
        }
    }
}

/// Inputs shared by every rule.
struct Pair<'a> {
    index: PositionIndex<'a>,
    a: PersonId,
    b: PersonId,
    pos_a: Vec<Coord>,
    pos_b: Vec<Coord>,
}

impl Pair<'_> {
    fn coord_pairs(&self) -> impl Iterator<Item = (&Coord, &Coord)> {
        self.pos_a
            .iter()
            .flat_map(move |pa| self.pos_b.iter().map(move |pb| (pa, pb)))
    }
}

type Rule = fn(&Pair<'_>) -> Option<Relation>;

/// Evaluation order is precedence.
const CASCADE: &[(&str, Rule)] = &[
    ("same-cell", same_cell),
    ("parent-child", parent_child),
    ("grandparent", grandparent),
    ("in-law", parent_in_law),
    ("aunt-uncle", aunt_uncle),
    ("sibling-in-law", sibling_in_law),
    ("cousins", cousins),
];

/// Classify `a` relative to `b`. Fails only when either has no position.
pub fn relation(
    matrix: &GenerationalMatrix,
    a: PersonId,
    b: PersonId,
) -> Result<Relation, FamilyError> {
    let index = PositionIndex::new(matrix);
    let pos_a = index.locate(a);
    if pos_a.is_empty() {
        return Err(FamilyError::PersonNotFound(a.to_string()));
    }
    let pos_b = index.locate(b);
    if pos_b.is_empty() {
        return Err(FamilyError::PersonNotFound(b.to_string()));
    }
    if a == b {
        return Ok(Relation::SamePerson);
    }

    let pair = Pair {
        index,
        a,
        b,
        pos_a,
        pos_b,
    };
    for (name, rule) in CASCADE {
        if let Some(found) = rule(&pair) {
            trace!(rule = *name, %a, %b, ?found, "kinship rule matched");
            return Ok(found);
        }
    }
    Ok(Relation::Unrelated)
}

/// Resolve both boundary keys in `family`, then classify.
pub fn relation_by_key(family: &Family, a: &str, b: &str) -> Result<Relation, FamilyError> {
    let a = family.require(a)?;
    let b = family.require(b)?;
    relation(family.matrix(), a, b)
}

// ============================================================================
// Rules
// ============================================================================

fn same_cell(pair: &Pair<'_>) -> Option<Relation> {
    pair.coord_pairs()
        .find(|(pa, pb)| pa.same_cell(pb) && pa.slot != pb.slot)
        .map(|(pa, _)| {
            if pa.in_union_row() {
                Relation::Partners
            } else {
                Relation::Siblings
            }
        })
}

fn parents_row_of(upper: usize, lower: usize) -> bool {
    is_union_row(upper) && lower == upper + 1
}

fn parent_child(pair: &Pair<'_>) -> Option<Relation> {
    for (pa, pb) in pair.coord_pairs() {
        if pa.lineage != pb.lineage {
            continue;
        }
        if parents_row_of(pa.generation, pb.generation) {
            return Some(Relation::ParentOf);
        }
        if parents_row_of(pb.generation, pa.generation) {
            return Some(Relation::ChildOf);
        }
    }
    None
}

fn grandparent(pair: &Pair<'_>) -> Option<Relation> {
    for (pa, pb) in pair.coord_pairs() {
        if pa.lineage != pb.lineage {
            continue;
        }
        if is_union_row(pa.generation) && pb.generation == pa.generation + GRANDPARENT_OFFSET {
            return Some(Relation::GrandparentOf);
        }
        if is_union_row(pb.generation) && pa.generation == pb.generation + GRANDPARENT_OFFSET {
            return Some(Relation::GrandchildOf);
        }
    }
    None
}

/// `elder` sits in the union two rows above one of `junior`'s unions, or is
/// a recorded parent of one of `junior`'s partners.
fn is_parent_in_law(index: &PositionIndex<'_>, elder: PersonId, junior: PersonId) -> bool {
    let by_column = index
        .union_cells(junior)
        .into_iter()
        .filter(|(generation, _)| *generation >= 2)
        .any(|(generation, lineage)| index.matrix().cell(generation - 2, lineage).contains(&elder));
    by_column
        || index
            .partners_of(junior)
            .into_iter()
            .any(|partner| index.parents_of_child(partner).contains(&elder))
}

fn parent_in_law(pair: &Pair<'_>) -> Option<Relation> {
    if is_parent_in_law(&pair.index, pair.a, pair.b) {
        Some(Relation::ParentInLawOf)
    } else if is_parent_in_law(&pair.index, pair.b, pair.a) {
        Some(Relation::ChildInLawOf)
    } else {
        None
    }
}

/// `elder` is a sibling of one of `junior`'s parents, or a partner of such a
/// sibling.
fn is_aunt_uncle(index: &PositionIndex<'_>, elder: PersonId, junior: PersonId) -> bool {
    let parents = index.parents_of_child(junior);
    if parents.is_empty() {
        return false;
    }
    let parent_siblings: BTreeSet<PersonId> = parents
        .into_iter()
        .flat_map(|parent| index.siblings_of(parent))
        .collect();
    parent_siblings.contains(&elder)
        || parent_siblings
            .iter()
            .any(|sibling| index.partners_of(*sibling).contains(&elder))
}

fn aunt_uncle(pair: &Pair<'_>) -> Option<Relation> {
    if is_aunt_uncle(&pair.index, pair.a, pair.b) {
        Some(Relation::AuntUncleOf)
    } else if is_aunt_uncle(&pair.index, pair.b, pair.a) {
        Some(Relation::NieceNephewOf)
    } else {
        None
    }
}

/// One-directional sibling-in-law closure from `x` towards `y`.
fn in_law_closure(index: &PositionIndex<'_>, x: PersonId, y: PersonId) -> bool {
    let siblings = index.siblings_of(x);
    let partners = index.partners_of(x);

    // my sibling's partner; my partner's sibling
    if siblings.iter().any(|h| index.partners_of(*h).contains(&y))
        || partners.iter().any(|e| index.siblings_of(*e).contains(&y))
    {
        return true;
    }

    // sibling or partner of my sibling's partner
    for h in &siblings {
        for cu in index.partners_of(*h) {
            if index.siblings_of(cu).contains(&y) || index.partners_of(cu).contains(&y) {
                return true;
            }
        }
    }

    // my sibling partnered with a sibling of theirs
    let their_siblings = index.siblings_of(y);
    for h in &siblings {
        let h_partners = index.partners_of(*h);
        for cu in &their_siblings {
            if h_partners.contains(cu) || index.partners_of(*cu).contains(h) {
                return true;
            }
        }
    }

    // in-law of my in-law
    partners.union(&siblings).any(|cu1| {
        index.partners_of(*cu1).contains(&y) || index.siblings_of(*cu1).contains(&y)
    })
}

fn sibling_in_law(pair: &Pair<'_>) -> Option<Relation> {
    (in_law_closure(&pair.index, pair.a, pair.b) || in_law_closure(&pair.index, pair.b, pair.a))
        .then_some(Relation::SiblingsInLaw)
}

/// Any shared children row qualifies, not only the deepest one: cousins stay
/// cousins after the simulator adds a younger generation below them.
fn cousins(pair: &Pair<'_>) -> Option<Relation> {
    let share_children_row = pair
        .coord_pairs()
        .any(|(pa, pb)| !pa.in_union_row() && pa.generation == pb.generation);
    if !share_children_row {
        return None;
    }
    let parents_a = pair.index.parents_of_child(pair.a);
    let parents_b = pair.index.parents_of_child(pair.b);
    parents_b
        .iter()
        .any(|pb| {
            let siblings = pair.index.siblings_of(*pb);
            parents_a.iter().any(|pa| siblings.contains(pa))
        })
        .then_some(Relation::Cousins)
}

// ============================================================================
// Lineage helpers
// ============================================================================

/// Everyone in `family` whose relation to `id` classifies as cousins.
pub fn cousins_of(family: &Family, id: PersonId) -> Vec<PersonId> {
    family
        .people()
        .into_iter()
        .filter(|other| *other != id)
        .filter(|other| matches!(relation(family.matrix(), id, *other), Ok(Relation::Cousins)))
        .collect()
}

/// Parents, their parents, and so on, nearest first.
pub fn ancestors_of(matrix: &GenerationalMatrix, id: PersonId) -> Vec<PersonId> {
    let index = PositionIndex::new(matrix);
    let mut seen = BTreeSet::from([id]);
    let mut queue = VecDeque::from([id]);
    let mut out = Vec::new();
    while let Some(current) = queue.pop_front() {
        for parent in index.parents_of_child(current) {
            if seen.insert(parent) {
                out.push(parent);
                queue.push_back(parent);
            }
        }
    }
    out
}

/// Living children, grandchildren, ... of `id`, nearest first.
pub fn living_descendants_of(family: &Family, id: PersonId) -> Vec<PersonId> {
    let index = PositionIndex::new(family.matrix());
    let mut seen = BTreeSet::from([id]);
    let mut queue = VecDeque::from([id]);
    let mut out = Vec::new();
    while let Some(current) = queue.pop_front() {
        for child in index.children_of(current) {
            if seen.insert(child) {
                if family.is_alive(child) {
                    out.push(child);
                }
                queue.push_back(child);
            }
        }
    }
    out
}
