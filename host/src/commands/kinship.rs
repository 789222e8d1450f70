use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use simulation::kinship;
use simulation::queries::{self, RelationAnswer};
use simulation::Relation;

use crate::state::{print_json, print_pretty, AppState};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LineageKind {
    Cousins,
    Ancestors,
    Descendants,
}

#[derive(Serialize)]
struct LineageAnswer<'a> {
    person: &'a str,
    kind: &'static str,
    names: Vec<String>,
}

pub fn relation(state: &AppState, a: &str, b: &str) -> Result<()> {
    let family = state.family()?;
    let store = state.read_store()?;
    print_pretty(&queries::relation(&store, &family, a, b))
}

/// One JSON line per related pair, in matrix order.
pub fn demo(state: &AppState) -> Result<()> {
    let store = state.read_store()?;
    let family = state.binding.family(&store)?;
    let people = family.people();
    let mut printed = 0usize;
    for (i, &a) in people.iter().enumerate() {
        for &b in &people[i + 1..] {
            let relation = kinship::relation(family.matrix(), a, b)?;
            if matches!(relation, Relation::Unrelated | Relation::SamePerson) {
                continue;
            }
            let (a_name, b_name) = (family.full_name(a), family.full_name(b));
            print_json(&RelationAnswer {
                family: family.name().to_string(),
                text: relation.describe(&a_name, &b_name),
                a: a_name,
                b: b_name,
                relation: Some(relation),
            })?;
            printed += 1;
        }
    }
    tracing::info!(family = family.name(), pairs = printed, "relation table printed");
    Ok(())
}

pub fn lineage(state: &AppState, kind: LineageKind, person: &str) -> Result<()> {
    let store = state.read_store()?;
    let (label, names) = match kind {
        LineageKind::Cousins => ("cousins", state.binding.cousins_of(&store, person)?),
        LineageKind::Ancestors => ("ancestors", state.binding.ancestors_of(&store, person)?),
        LineageKind::Descendants => (
            "living_descendants",
            state.binding.living_descendants_of(&store, person)?,
        ),
    };
    print_pretty(&LineageAnswer {
        person,
        kind: label,
        names,
    })
}
