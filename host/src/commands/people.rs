use anyhow::Result;

use simulation::queries;

use crate::state::{print_json, print_pretty, AppState};

/// Search across every family; prints one match per line.
pub fn search(state: &AppState, query: &str) -> Result<()> {
    let store = state.read_store()?;
    let matches = queries::search(&store, query);
    if matches.is_empty() {
        tracing::info!(query, "no matches");
    }
    for found in &matches {
        print_json(found)?;
    }
    Ok(())
}

pub fn person(state: &AppState, key: &str) -> Result<()> {
    let family = state.family()?;
    let today = state.simulator()?.today();
    let store = state.read_store()?;
    print_pretty(&queries::person(&store, &family, key, today)?)
}

pub fn ages(state: &AppState) -> Result<()> {
    let family = state.family()?;
    let today = state.simulator()?.today();
    let store = state.read_store()?;
    print_pretty(&queries::age_summary(&store, &family, today)?)
}
