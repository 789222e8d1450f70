//! Aging System - advance every living person by the tick's years

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::compatibility::ADULT_AGE;
use crate::components::{add_years, Age, Alive, BirthDate, CivilStatus, Person, SingleSince};
use crate::events::{ChangeKind, ChangeRecord};
use crate::family::Family;

/// Increment ages by `years`. People without a stored age get one derived
/// from their birthdate as of `before` (the pre-advance date); from then on
/// the stored value is authoritative.
pub fn aging_system(family: &mut Family, before: NaiveDate, years: u32) -> Vec<ChangeRecord> {
    let today = add_years(before, years as i32);
    let family_name = family.name().to_string();

    // Derive missing ages first; hecs cannot insert mid-query.
    let mut missing = Vec::new();
    let mut undated = Vec::new();
    for (entity, (person, birth)) in family
        .world
        .query::<(&Person, Option<&BirthDate>)>()
        .with::<&Alive>()
        .without::<&Age>()
        .iter()
    {
        match birth {
            Some(birth) => missing.push((entity, Age::new(birth.age_years(before).max(0) as u32))),
            None => undated.push(person.full_name()),
        }
    }
    for name in undated {
        warn!(family = %family_name, person = %name, "no birthdate or age, skipping aging");
    }
    for (entity, age) in missing {
        let _ = family.world.insert_one(entity, age);
    }

    let mut records = Vec::new();
    for (_, (person, age)) in family
        .world
        .query_mut::<(&Person, &mut Age)>()
        .with::<&Alive>()
    {
        age.years += years;
        records.push(ChangeRecord {
            family: family_name.clone(),
            person_id: person.id,
            civil_id: person.civil_id.clone(),
            name: person.full_name(),
            kind: ChangeKind::Birthday { new_age: age.years },
        });
    }

    // Adults who are single start being tracked once they come of age.
    let newly_tracked: Vec<_> = family
        .world
        .query::<(&CivilStatus, &Age)>()
        .with::<&Alive>()
        .without::<&SingleSince>()
        .iter()
        .filter(|(_, (status, age))| **status == CivilStatus::Single && age.years >= ADULT_AGE)
        .map(|(entity, _)| entity)
        .collect();
    for entity in newly_tracked {
        let _ = family
            .world
            .insert_one(entity, SingleSince { year: today.year() });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PersonRecord;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stored_age_is_authoritative() {
        let mut family = Family::new("Mora");
        let mut record = PersonRecord::new("Ana", "Mora", "F", "1990-01-01");
        record.age = Some(50);
        family.register(&record, 1, 0, ymd(2024, 1, 1)).unwrap();
        let ana = family.resolve("Ana Mora").unwrap();

        let records = aging_system(&mut family, ymd(2024, 1, 1), 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, ChangeKind::Birthday { new_age: 51 });
        assert_eq!(family.effective_age(ana, ymd(2025, 1, 1)), Some(51));
    }

    #[test]
    fn test_derived_age_then_increment() {
        let mut family = Family::new("Mora");
        family
            .register(&PersonRecord::new("Leo", "Mora", "M", "2007-06-01"), 1, 0, ymd(2024, 1, 1))
            .unwrap();
        let leo = family.resolve("Leo Mora").unwrap();

        aging_system(&mut family, ymd(2024, 1, 1), 2);
        assert_eq!(family.get::<Age>(leo).map(|a| a.years), Some(18));
        assert_eq!(family.get::<SingleSince>(leo).map(|s| s.year), Some(2026));
    }

    #[test]
    fn test_deceased_do_not_age() {
        let mut family = Family::new("Mora");
        let mut record = PersonRecord::new("Old", "Mora", "M", "1900-01-01");
        record.death_date = Some("1980-01-01".into());
        family.register(&record, 0, 0, ymd(2024, 1, 1)).unwrap();
        assert!(aging_system(&mut family, ymd(2024, 1, 1), 1).is_empty());
    }
}
