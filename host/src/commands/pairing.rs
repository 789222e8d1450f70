use anyhow::Result;

use simulation::{queries, FamilyError};

use crate::state::{print_pretty, AppState};

pub fn validate(state: &AppState, a: &str, b: &str) -> Result<()> {
    let family = state.family()?;
    let today = state.simulator()?.today();
    let store = state.read_store()?;
    print_pretty(&queries::validate(&store, &family, a, b, today))
}

/// Forms the union in memory. The outcome is printed either way; a rejected
/// union also fails the command.
pub fn union(state: &AppState, a: &str, b: &str) -> Result<()> {
    let family = state.family()?;
    let today = state.simulator()?.today();
    let mut store = state.write_store()?;
    let outcome = queries::union(&mut store, &family, a, b, today);
    print_pretty(&outcome)?;
    if outcome.placed.is_none() {
        return Err(FamilyError::IneligibleUnion(outcome.report.reasons).into());
    }
    Ok(())
}
