//! Birth System
//!
//! Draws offspring for every union with two living partners and a mother of
//! childbearing age. Newborns are placed one generation below the union in
//! the same column.

use chrono::NaiveDate;
use hecs::EntityBuilder;
use rand::Rng;
use tracing::debug;

use crate::components::{
    Age, Alive, BirthDate, CivilStatus, Parents, Person, PersonId, Profile, Sex,
};
use crate::config::SimulationConfig;
use crate::events::{ChangeKind, ChangeRecord};
use crate::family::Family;
use crate::names;

/// Mother's age range for births
pub const MIN_MOTHER_AGE: u32 = 18;
pub const MAX_MOTHER_AGE: u32 = 45;

/// Attempts per union per tick, relative to the birth cap.
const ATTEMPTS_PER_BIRTH: u32 = 3;

/// (mother, father) of a union cell, when it can have children.
fn fertile_couple(family: &Family, cell: &[PersonId], today: NaiveDate) -> Option<(PersonId, PersonId)> {
    if cell.len() < 2 || !cell.iter().all(|id| family.is_alive(*id)) {
        return None;
    }
    let mother = cell
        .iter()
        .copied()
        .find(|id| family.sex(*id) == Some(Sex::Female))?;
    let father = cell.iter().copied().find(|id| *id != mother)?;
    let age = family.effective_age(mother, today)?;
    (MIN_MOTHER_AGE..=MAX_MOTHER_AGE)
        .contains(&age)
        .then_some((mother, father))
}

/// Process births for all unions. Returns one record per newborn.
pub fn birth_system<R: Rng + ?Sized>(
    family: &mut Family,
    today: NaiveDate,
    config: &SimulationConfig,
    rng: &mut R,
) -> Vec<ChangeRecord> {
    let couples: Vec<_> = family
        .matrix()
        .unions()
        .into_iter()
        .filter_map(|(generation, lineage)| {
            fertile_couple(family, family.matrix().cell(generation, lineage), today)
                .map(|couple| (generation, lineage, couple))
        })
        .collect();

    let attempts = (config.max_births_per_union * ATTEMPTS_PER_BIRTH).max(1);
    let mut records = Vec::new();
    for (generation, lineage, (mother, father)) in couples {
        let mut born = 0;
        for _ in 0..attempts {
            if born >= config.max_births_per_union {
                break;
            }
            if rng.gen::<f64>() < config.birth_probability {
                records.push(spawn_child(family, mother, father, generation + 1, lineage, today, rng));
                born += 1;
            }
        }
    }
    records
}

/// Create a newborn of `mother` and `father` at `(generation, lineage)`.
pub fn spawn_child<R: Rng + ?Sized>(
    family: &mut Family,
    mother: PersonId,
    father: PersonId,
    generation: usize,
    lineage: usize,
    today: NaiveDate,
    rng: &mut R,
) -> ChangeRecord {
    let sex = if rng.gen_bool(0.5) { Sex::Male } else { Sex::Female };
    let first_name = names::random_first_name(sex, rng).to_string();
    let surnames = names::child_surnames(&family.surnames(father), &family.surnames(mother));

    // Inherit residence from the father, else the mother
    let residence = [father, mother]
        .into_iter()
        .map(|id| family.residence(id))
        .find(|r| !r.trim().is_empty())
        .unwrap_or_else(|| names::DEFAULT_PROVINCE.to_string());
    let civil_id = family.issue_civil_id(&residence, today);

    let id = family.allocate_id();
    let mut builder = EntityBuilder::new();
    builder
        .add(Person {
            id,
            first_name,
            surnames,
            civil_id: civil_id.clone(),
        })
        .add(sex)
        .add(BirthDate(today))
        .add(Age::new(0))
        .add(Alive)
        .add(CivilStatus::Single)
        .add(Profile {
            residence,
            interests: Vec::new(),
        });
    family.spawn(id, builder);
    family.matrix_mut().push(generation, lineage, id);
    family.link_parents(
        id,
        Parents {
            mother: Some(mother),
            father: Some(father),
        },
    );

    let name = family.full_name(id);
    debug!(family = %family.name(), child = %name, generation, lineage, "born");
    ChangeRecord {
        family: family.name().to_string(),
        person_id: id,
        civil_id,
        name,
        kind: ChangeKind::Birth {
            date: today,
            parents: vec![family.full_name(mother), family.full_name(father)],
            generation,
            lineage,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Children;
    use crate::record::PersonRecord;
    use crate::systems::matchmaking::place_union;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn couple(mother_birth: &str) -> (Family, PersonId, PersonId) {
        let mut family = Family::new("Mora");
        family
            .register(
                &PersonRecord::new("Luis", "Mora Solís", "M", "1990-01-01").with_residence("Cartago"),
                1,
                0,
                today(),
            )
            .unwrap();
        family
            .register(&PersonRecord::new("Ana", "Vargas Rojas", "F", mother_birth), 1, 1, today())
            .unwrap();
        let luis = family.resolve("Luis Mora Solís").unwrap();
        let ana = family.resolve("Ana Vargas Rojas").unwrap();
        place_union(&mut family, luis, ana).unwrap();
        (family, ana, luis)
    }

    #[test]
    fn test_certain_births_capped() {
        let (mut family, ana, luis) = couple("1994-01-01");
        let config = SimulationConfig {
            birth_probability: 1.0,
            ..SimulationConfig::default()
        };
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(9);
        let records = birth_system(&mut family, today(), &config, &mut rng);
        assert_eq!(records.len(), 2);

        let child = records[0].person_id;
        assert_eq!(family.matrix().coords_of(child)[0].generation, 3);
        assert_eq!(family.matrix().coords_of(child)[0].lineage, 0);
        assert_eq!(family.surnames(child), "Mora Vargas");
        assert_eq!(family.residence(child), "Cartago");
        assert!(records[0].civil_id.starts_with("32024"));
        assert_eq!(family.effective_age(child, today()), Some(0));
        assert_eq!(family.get::<Children>(ana).unwrap().0.len(), 2);
        assert_eq!(family.get::<Parents>(child).unwrap().father, Some(luis));
    }

    #[test]
    fn test_mother_out_of_range() {
        let (mut family, _, _) = couple("1970-01-01");
        let config = SimulationConfig {
            birth_probability: 1.0,
            ..SimulationConfig::default()
        };
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(9);
        assert!(birth_system(&mut family, today(), &config, &mut rng).is_empty());
    }
}
