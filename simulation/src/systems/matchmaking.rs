//! Matchmaking System
//!
//! Pairs eligible living adults into unions and places each new union in
//! the generational matrix.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::compatibility::{self, ADULT_AGE};
use crate::components::{CivilStatus, Partner, PersonId, Sex, SingleSince};
use crate::error::FamilyError;
use crate::events::{ChangeKind, ChangeRecord};
use crate::family::Family;
use crate::matrix::{is_union_row, Coord};
use crate::position::PositionIndex;

/// Union row for a new couple: the row below each party's deepest children
/// row, or the deepest union row they already sit in.
fn union_generation(index: &PositionIndex<'_>, a: PersonId, b: PersonId) -> usize {
    index
        .locate(a)
        .into_iter()
        .chain(index.locate(b))
        .map(|c| {
            if is_union_row(c.generation) {
                c.generation
            } else {
                c.generation + 1
            }
        })
        .max()
        .unwrap_or(0)
}

/// Column for the couple in row `generation`, by preference: an existing
/// union cell of either party, then either party's birth column, then a new
/// column at the end of the row.
fn union_column(index: &PositionIndex<'_>, a: PersonId, b: PersonId, generation: usize) -> usize {
    let matrix = index.matrix();
    let fits = |lineage: usize| {
        matrix
            .cell(generation, lineage)
            .iter()
            .all(|p| *p == a || *p == b)
    };
    let own_union = |id| {
        index
            .columns_in_row(id, generation)
            .into_iter()
            .find(|lineage| fits(*lineage))
    };
    let birth_column = |id| {
        generation
            .checked_sub(1)
            .and_then(|row| index.columns_in_row(id, row).into_iter().find(|l| fits(*l)))
    };
    own_union(a)
        .or_else(|| own_union(b))
        .or_else(|| birth_column(a))
        .or_else(|| birth_column(b))
        .unwrap_or_else(|| matrix.row(generation).len())
}

/// Place `a` and `b` together in a union cell and mark both married.
/// Eligibility is the caller's concern.
pub fn place_union(family: &mut Family, a: PersonId, b: PersonId) -> Result<Coord, FamilyError> {
    for id in [a, b] {
        if !family.contains(id) {
            return Err(FamilyError::PersonNotFound(id.to_string()));
        }
    }
    let (generation, lineage) = {
        let index = PositionIndex::new(family.matrix());
        let generation = union_generation(&index, a, b);
        (generation, union_column(&index, a, b, generation))
    };

    let coord = family.matrix_mut().push(generation, lineage, a);
    family.matrix_mut().push(generation, lineage, b);

    for (id, partner) in [(a, b), (b, a)] {
        family.insert(id, CivilStatus::Married);
        family.insert(id, Partner(partner));
        family.remove::<SingleSince>(id);
    }
    debug!(family = %family.name(), %a, %b, generation, lineage, "union placed");
    Ok(coord)
}

/// Process matchmaking - pair eligible singles, at most `max_unions`.
pub fn matchmaking_system<R: Rng + ?Sized>(
    family: &mut Family,
    today: NaiveDate,
    max_unions: usize,
    rng: &mut R,
) -> Vec<ChangeRecord> {
    if max_unions == 0 {
        return Vec::new();
    }

    let mut men = Vec::new();
    let mut women = Vec::new();
    for id in family.living() {
        if family.is_partnered(id) || family.effective_age(id, today).unwrap_or(0) < ADULT_AGE {
            continue;
        }
        match family.sex(id) {
            Some(Sex::Male) => men.push(id),
            Some(Sex::Female) => women.push(id),
            None => {}
        }
    }
    men.shuffle(rng);
    women.shuffle(rng);

    let mut records = Vec::new();
    for man in men {
        if records.len() >= max_unions {
            break;
        }
        let found = women.iter().enumerate().find_map(|(pos, woman)| {
            let report = compatibility::evaluate(family, man, *woman, today);
            report.eligible.then_some((pos, report.score))
        });
        let Some((pos, score)) = found else {
            continue;
        };
        let woman = women.remove(pos);

        match place_union(family, man, woman) {
            Ok(coord) => records.push(ChangeRecord {
                family: family.name().to_string(),
                person_id: man,
                civil_id: family.civil_id(man),
                name: family.full_name(man),
                kind: ChangeKind::Union {
                    partner_name: family.full_name(woman),
                    score,
                    generation: coord.generation,
                    lineage: coord.lineage,
                },
            }),
            Err(err) => {
                warn!(family = %family.name(), %man, %woman, %err, "skipping union");
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PersonRecord;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_union_prefers_birth_column() {
        let mut family = Family::new("Mora");
        family.register(&PersonRecord::new("Luis", "Mora", "M", "1990-01-01"), 1, 1, today()).unwrap();
        family.register(&PersonRecord::new("Ana", "Vargas", "F", "1992-01-01"), 1, 0, today()).unwrap();
        let luis = family.resolve("Luis Mora").unwrap();
        let ana = family.resolve("Ana Vargas").unwrap();

        let coord = place_union(&mut family, luis, ana).unwrap();
        assert_eq!((coord.generation, coord.lineage), (2, 1));
        assert_eq!(family.matrix().cell(2, 1), &[luis, ana]);
        assert_eq!(family.civil_status(ana), CivilStatus::Married);
        assert_eq!(family.get::<Partner>(ana).map(|p| p.0), Some(luis));
    }

    #[test]
    fn test_union_opens_new_column_when_taken() {
        let mut family = Family::new("Mora");
        for (name, lineage) in [("A", 0), ("B", 0), ("C", 0), ("D", 0)] {
            family
                .register(&PersonRecord::new(name, "", "M", "1990-01-01"), 1, lineage, today())
                .unwrap();
        }
        let ids: Vec<_> = ["A", "B", "C", "D"].iter().map(|n| family.resolve(n).unwrap()).collect();
        place_union(&mut family, ids[0], ids[1]).unwrap();
        let coord = place_union(&mut family, ids[2], ids[3]).unwrap();
        assert_eq!((coord.generation, coord.lineage), (2, 1));
    }

    #[test]
    fn test_matchmaking_forms_eligible_union() {
        let mut family = Family::new("Mora");
        family
            .register(
                &PersonRecord::new("Luis", "Mora", "M", "1990-01-01").with_interests(&["cine", "música"]),
                1,
                0,
                today(),
            )
            .unwrap();
        family
            .register(
                &PersonRecord::new("Ana", "Vargas", "F", "1992-01-01").with_interests(&["cine", "musica"]),
                1,
                1,
                today(),
            )
            .unwrap();
        family
            .register(&PersonRecord::new("Eva", "Rojas", "F", "2012-01-01"), 1, 2, today())
            .unwrap();

        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        let records = matchmaking_system(&mut family, today(), 1, &mut rng);
        assert_eq!(records.len(), 1);
        match &records[0].kind {
            ChangeKind::Union { partner_name, score, generation, .. } => {
                assert_eq!(partner_name, "Ana Vargas");
                assert_eq!(*score, 100);
                assert_eq!(*generation, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        let eva = family.resolve("Eva Rojas").unwrap();
        assert!(!family.is_partnered(eva));
    }
}
