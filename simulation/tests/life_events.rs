//! End-to-end life-event scenarios over the store, simulator and queries.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use simulation::seed::{seed_reference_family, REFERENCE_FAMILY};
use simulation::systems;
use simulation::{
    queries, ChangeKind, CivilStatus, FamilyStore, PersonRecord, PositionIndex, SimulationConfig,
    Simulator,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn couple_store() -> FamilyStore {
    let mut store = FamilyStore::new();
    store.create_family("Chaves").unwrap();
    store
        .append(
            "Chaves",
            &PersonRecord::new("Andrés", "Chaves León", "M", "1994-03-01")
                .with_interests(&["cine", "música", "viajes"])
                .with_residence("Heredia"),
            1,
            0,
            today(),
        )
        .unwrap();
    store
        .append(
            "Chaves",
            &PersonRecord::new("Paula", "Soto Ramírez", "F", "1996-08-15")
                .with_interests(&["Cine", "Musica", "viajes"]),
            1,
            1,
            today(),
        )
        .unwrap();
    store
        .append(
            "Chaves",
            &PersonRecord::new("Camila", "Ureña Mora", "F", "1995-02-02")
                .with_interests(&["cine", "música", "viajes"]),
            1,
            2,
            today(),
        )
        .unwrap();
    store
}

#[test]
fn test_union_marks_married_and_blocks_second_union() {
    let mut store = couple_store();
    let outcome = queries::union(&mut store, "Chaves", "Andrés Chaves León", "Paula Soto Ramírez", today());
    assert!(outcome.report.ok, "{:?}", outcome.report.reasons);
    assert!(outcome.placed.is_some());

    let family = store.family("Chaves").unwrap();
    let andres = family.resolve("andres chaves leon").unwrap();
    let paula = family.resolve("paula soto ramirez").unwrap();
    assert_eq!(family.civil_status(andres), CivilStatus::Married);
    assert_eq!(family.civil_status(paula), CivilStatus::Married);

    let second = queries::union(&mut store, "Chaves", "Andrés Chaves León", "Camila Ureña Mora", today());
    assert!(!second.report.ok);
    assert!(second.placed.is_none());
}

#[test]
fn test_births_land_below_the_union() {
    let mut store = couple_store();
    let placed = queries::union(&mut store, "Chaves", "Andrés Chaves León", "Paula Soto Ramírez", today())
        .placed
        .unwrap();

    let config = SimulationConfig {
        birth_probability: 1.0,
        ..SimulationConfig::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let records = systems::birth_system(store.family_mut("Chaves").unwrap(), today(), &config, &mut rng);
    assert_eq!(records.len(), 2);

    let family = store.family("Chaves").unwrap();
    let index = PositionIndex::new(family.matrix());
    let partners: BTreeSet<_> = family.matrix().cell(placed.generation, placed.lineage).iter().copied().collect();
    for record in &records {
        if let ChangeKind::Birth { generation, lineage, .. } = record.kind {
            assert_eq!((generation, lineage), (placed.generation + 1, placed.lineage));
            assert_eq!(index.parents_of_child(record.person_id), partners);
            assert!(record.civil_id.starts_with("42024"));
        }
    }
}

#[test]
fn test_same_seed_same_change_log() {
    let run = || {
        let config = SimulationConfig {
            seed: Some(2024),
            start_date: Some(today()),
            ..SimulationConfig::default()
        };
        let mut sim = Simulator::new(config);
        let mut store = FamilyStore::new();
        seed_reference_family(&mut store, today()).unwrap();
        let mut log = Vec::new();
        for _ in 0..25 {
            log.extend(sim.tick(&mut store).records);
        }
        serde_json::to_string(&log).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_population_accounting() {
    let config = SimulationConfig {
        seed: Some(8),
        start_date: Some(today()),
        ..SimulationConfig::default()
    };
    let mut sim = Simulator::new(config);
    let mut store = FamilyStore::new();
    seed_reference_family(&mut store, today()).unwrap();

    let mut population = store.family(REFERENCE_FAMILY).unwrap().population();
    for _ in 0..10 {
        let report = sim.tick(&mut store);
        population = population + report.births - report.deaths;
        assert_eq!(report.population, population);
    }
}
