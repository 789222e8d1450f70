use anyhow::Result;
use serde::Serialize;

use crate::state::{print_json, AppState};

#[derive(Serialize)]
struct FamilyData {
    name: String,
    generations: usize,
    population: usize,
    deceased: usize,
    selected: bool,
}

pub fn list(state: &AppState) -> Result<()> {
    let selected = state.binding.bound();
    let store = state.read_store()?;
    for family in store.families() {
        let population = family.population();
        print_json(&FamilyData {
            name: family.name().to_string(),
            generations: family.matrix().generation_count(),
            population,
            deceased: family.people().len().saturating_sub(population),
            selected: selected == Some(family.name()),
        })?;
    }
    Ok(())
}
