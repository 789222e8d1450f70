//! Collateral Effects System
//!
//! Runs after mortality each tick: orphaned minors get guardians, widowed
//! people lose re-partnering chance, long-term singles lose standing.

use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use crate::compatibility::ADULT_AGE;
use crate::components::{CivilStatus, Guardians, ParentLoss, PersonId, SingleSince, Standing};
use crate::family::Family;
use crate::kinship::{self, Relation};

/// Drop in re-partnering probability per pass while widowed
pub const WIDOWED_REPARTNER_DROP: i32 = 30;

/// Years single before standing starts to erode
pub const LONG_SINGLE_YEARS: i32 = 10;
pub const LONG_SINGLE_EMOTIONAL_DROP: i32 = 20;
pub const LONG_SINGLE_EXPECTANCY_DROP: i32 = 5;

/// Guardian preference, nearest kin first. Any other adult comes last.
const GUARDIAN_TIERS: &[Relation] = &[
    Relation::Siblings,
    Relation::AuntUncleOf,
    Relation::GrandparentOf,
    Relation::SiblingsInLaw,
];

/// Result of one collateral pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollateralResult {
    pub guardians_assigned: u32,
    pub widowed_adjusted: u32,
    pub long_single_penalized: u32,
}

/// Run all collateral effects in order.
pub fn collateral_system(family: &mut Family, today: NaiveDate) -> CollateralResult {
    let result = CollateralResult {
        guardians_assigned: guardian_system(family, today),
        widowed_adjusted: widowed_system(family),
        long_single_penalized: long_single_system(family, today),
    };
    if result != CollateralResult::default() {
        info!(family = %family.name(), ?result, "collateral effects applied");
    }
    result
}

fn is_adult(family: &Family, id: PersonId, today: NaiveDate) -> bool {
    family
        .effective_age(id, today)
        .is_some_and(|age| age >= ADULT_AGE)
}

/// Guardians for `minor`: every adult of each kinship tier in tier order,
/// followed by the remaining living adults. No one appears twice.
pub fn choose_guardians(family: &Family, minor: PersonId, today: NaiveDate) -> Vec<PersonId> {
    let adults: Vec<(PersonId, Relation)> = family
        .living()
        .into_iter()
        .filter(|id| *id != minor && is_adult(family, *id, today))
        .filter_map(|id| {
            kinship::relation(family.matrix(), id, minor)
                .ok()
                .map(|relation| (id, relation))
        })
        .collect();

    let mut guardians: Vec<PersonId> = Vec::with_capacity(adults.len());
    let tiered = GUARDIAN_TIERS.iter().flat_map(|tier| {
        adults
            .iter()
            .filter(move |(_, relation)| relation == tier)
            .map(|(id, _)| *id)
    });
    for id in tiered.chain(adults.iter().map(|(id, _)| *id)) {
        if !guardians.contains(&id) {
            guardians.push(id);
        }
    }
    guardians
}

/// Reassign guardians for living orphaned minors. Returns how many got one.
fn guardian_system(family: &mut Family, today: NaiveDate) -> u32 {
    let orphans: Vec<PersonId> = family
        .living()
        .into_iter()
        .filter(|id| !is_adult(family, *id, today))
        .filter(|id| family.get::<ParentLoss>(*id).is_some_and(|loss| loss.orphaned()))
        .collect();

    let mut assigned = 0;
    for minor in orphans {
        let guardians = choose_guardians(family, minor, today);
        if guardians.is_empty() {
            warn!(family = %family.name(), person = %minor, "orphan has no adult relative");
            family.remove::<Guardians>(minor);
            continue;
        }
        family.insert(minor, Guardians(guardians));
        assigned += 1;
    }
    assigned
}

fn widowed_system(family: &mut Family) -> u32 {
    let widowed: Vec<PersonId> = family
        .living()
        .into_iter()
        .filter(|id| family.civil_status(*id) == CivilStatus::Widowed)
        .collect();
    for id in &widowed {
        let mut standing = family.standing(*id);
        standing.repartner_probability = (standing.repartner_probability - WIDOWED_REPARTNER_DROP).max(0);
        family.insert(*id, standing);
    }
    widowed.len() as u32
}

fn long_single_system(family: &mut Family, today: NaiveDate) -> u32 {
    let lonely: Vec<PersonId> = family
        .living()
        .into_iter()
        .filter(|id| family.civil_status(*id) == CivilStatus::Single)
        .filter(|id| {
            family
                .get::<SingleSince>(*id)
                .is_some_and(|since| today.year() - since.year >= LONG_SINGLE_YEARS)
        })
        .collect();
    for id in &lonely {
        let standing = family.standing(*id);
        family.insert(
            *id,
            Standing {
                emotional_health: standing.emotional_health - LONG_SINGLE_EMOTIONAL_DROP,
                life_expectancy: standing.life_expectancy - LONG_SINGLE_EXPECTANCY_DROP,
                ..standing
            },
        );
    }
    lonely.len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BASELINE_EMOTIONAL_HEALTH, BASELINE_REPARTNER_PROBABILITY};
    use crate::record::PersonRecord;
    use crate::systems::death::record_death;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    /// Grandparents at (0,0); parents P (child of row 0) and aunt T in (1,0);
    /// P partners Q at (2,0); minor M and adult sibling S at (3,0).
    fn orphan_family(with_sibling: bool) -> Family {
        let mut family = Family::new("Mora");
        let rows: &[(&str, &str, &str, usize)] = &[
            ("Abuelo", "M", "1940-01-01", 0),
            ("Abuela", "F", "1942-01-01", 0),
            ("Padre", "M", "1970-01-01", 1),
            ("Tia", "F", "1972-01-01", 1),
            ("Padre", "M", "1970-01-01", 2),
            ("Madre", "F", "1971-01-01", 2),
            ("Menor", "F", "2012-01-01", 3),
        ];
        for (name, sex, birth, generation) in rows {
            family
                .register(&PersonRecord::new(name, "Mora", sex, birth), *generation, 0, today())
                .unwrap();
        }
        if with_sibling {
            family
                .register(&PersonRecord::new("Hermano", "Mora", "M", "2000-01-01"), 3, 0, today())
                .unwrap();
        }
        family
    }

    #[test]
    fn test_orphan_guardians_follow_tier_order() {
        let mut family = orphan_family(true);
        family
            .register(&PersonRecord::new("Hermano", "Mora", "M", "2000-01-01"), 4, 0, today())
            .unwrap();
        family
            .register(&PersonRecord::new("Cunada", "Rojas", "F", "2001-01-01"), 4, 0, today())
            .unwrap();
        family
            .register(&PersonRecord::new("Vecino", "Solis", "M", "1960-01-01"), 1, 1, today())
            .unwrap();
        let padre = family.resolve("Padre Mora").unwrap();
        let madre = family.resolve("Madre Mora").unwrap();
        record_death(&mut family, padre, today());
        record_death(&mut family, madre, today());

        let result = collateral_system(&mut family, today());
        assert_eq!(result.guardians_assigned, 1);
        let menor = family.resolve("Menor Mora").unwrap();
        let expected: Vec<PersonId> = [
            "Hermano Mora",
            "Tia Mora",
            "Abuelo Mora",
            "Abuela Mora",
            "Cunada Rojas",
            "Vecino Solis",
        ]
        .iter()
        .map(|name| family.resolve(name).unwrap())
        .collect();
        assert_eq!(family.get::<Guardians>(menor).unwrap().0, expected);
    }

    #[test]
    fn test_orphan_without_sibling_starts_with_aunt() {
        let mut family = orphan_family(false);
        let padre = family.resolve("Padre Mora").unwrap();
        let madre = family.resolve("Madre Mora").unwrap();
        record_death(&mut family, padre, today());
        record_death(&mut family, madre, today());

        collateral_system(&mut family, today());
        let menor = family.resolve("Menor Mora").unwrap();
        let tia = family.resolve("Tia Mora").unwrap();
        let abuelo = family.resolve("Abuelo Mora").unwrap();
        let abuela = family.resolve("Abuela Mora").unwrap();
        assert_eq!(family.get::<Guardians>(menor).unwrap().0, vec![tia, abuelo, abuela]);
    }

    #[test]
    fn test_repeated_passes_do_not_duplicate_guardians() {
        let mut family = orphan_family(true);
        let padre = family.resolve("Padre Mora").unwrap();
        let madre = family.resolve("Madre Mora").unwrap();
        record_death(&mut family, padre, today());
        record_death(&mut family, madre, today());

        collateral_system(&mut family, today());
        let menor = family.resolve("Menor Mora").unwrap();
        let first = family.get::<Guardians>(menor).unwrap().0.clone();
        collateral_system(&mut family, today());
        let second = family.get::<Guardians>(menor).unwrap().0.clone();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_widowed_and_long_single_penalties() {
        let mut family = Family::new("Mora");
        family
            .register(&PersonRecord::new("Viuda", "Mora", "F", "1950-01-01").with_status("Viuda"), 0, 0, today())
            .unwrap();
        let mut single = PersonRecord::new("Solo", "Mora", "M", "1980-01-01");
        single.single_since = Some(2010);
        family.register(&single, 1, 0, today()).unwrap();

        let result = collateral_system(&mut family, today());
        assert_eq!(result.widowed_adjusted, 1);
        assert_eq!(result.long_single_penalized, 1);
        let viuda = family.resolve("Viuda Mora").unwrap();
        let solo = family.resolve("Solo Mora").unwrap();
        assert_eq!(
            family.standing(viuda).repartner_probability,
            BASELINE_REPARTNER_PROBABILITY - WIDOWED_REPARTNER_DROP
        );
        assert_eq!(
            family.standing(solo).emotional_health,
            BASELINE_EMOTIONAL_HEALTH - LONG_SINGLE_EMOTIONAL_DROP
        );

        for _ in 0..5 {
            collateral_system(&mut family, today());
        }
        assert_eq!(family.standing(viuda).repartner_probability, 0);
    }
}
