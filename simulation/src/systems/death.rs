//! Death System
//!
//! Draws mortality for each living person and propagates the consequences:
//! surviving partners become widowed, children record the parent loss.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rand::Rng;
use tracing::{debug, warn};

use crate::components::{Alive, CivilStatus, Deceased, ParentLoss, Parents, Partner, PersonId};
use crate::events::{ChangeKind, ChangeRecord};
use crate::family::Family;
use crate::position::PositionIndex;

/// Annual mortality by age bracket: (upper bound exclusive, probability).
const MORTALITY_RATES: &[(u32, f64)] = &[
    (1, 0.001),   // Infant
    (40, 0.003),  // Young adult
    (60, 0.005),  // Middle age
    (75, 0.015),  // Senior
    (85, 0.04),   // Elderly
    (100, 0.08),  // Very old
];

/// Get annual mortality probability for a given age
pub fn mortality_rate(years: u32) -> f64 {
    MORTALITY_RATES
        .iter()
        .find(|(limit, _)| years < *limit)
        .map(|(_, rate)| *rate)
        .unwrap_or(1.0)
}

/// Process mortality for every living person in matrix order.
pub fn death_system<R: Rng + ?Sized>(
    family: &mut Family,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<ChangeRecord> {
    let mut deaths = Vec::new();
    for id in family.living() {
        let Some(age) = family.effective_age(id, today) else {
            warn!(family = %family.name(), person = %id, "no age, skipping mortality");
            continue;
        };
        if rng.gen::<f64>() < mortality_rate(age) {
            deaths.push(id);
        }
    }

    deaths
        .into_iter()
        .map(|id| record_death(family, id, today))
        .collect()
}

/// Mark `id` deceased on `today` and apply the immediate family effects.
pub fn record_death(family: &mut Family, id: PersonId, today: NaiveDate) -> ChangeRecord {
    family.remove::<Alive>(id);
    family.insert(id, Deceased { date: today });

    let mut partners: BTreeSet<PersonId> = PositionIndex::new(family.matrix()).partners_of(id);
    if let Some(Partner(linked)) = family.remove::<Partner>(id) {
        partners.insert(linked);
    }
    for partner in partners {
        if family.is_alive(partner) && family.is_partnered(partner) {
            family.insert(partner, CivilStatus::Widowed);
            family.remove::<Partner>(partner);
            debug!(family = %family.name(), person = %partner, "widowed");
        }
    }

    let orphaned: Vec<_> = family
        .world
        .query::<&Parents>()
        .iter()
        .filter(|(_, parents)| parents.mother == Some(id) || parents.father == Some(id))
        .map(|(entity, parents)| (entity, parents.mother == Some(id), parents.father == Some(id)))
        .collect();
    for (entity, lost_mother, lost_father) in orphaned {
        let mut loss = family
            .world
            .get::<&ParentLoss>(entity)
            .map(|l| *l)
            .unwrap_or_default();
        loss.mother_deceased |= lost_mother;
        loss.father_deceased |= lost_father;
        let _ = family.world.insert_one(entity, loss);
    }

    debug!(family = %family.name(), person = %id, "died");
    ChangeRecord {
        family: family.name().to_string(),
        person_id: id,
        civil_id: family.civil_id(id),
        name: family.full_name(id),
        kind: ChangeKind::Death { date: today },
    }
}
