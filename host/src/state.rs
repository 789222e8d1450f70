use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::info;

use simulation::calendar_runner::CalendarRunner;
use simulation::queries::FamilyBinding;
use simulation::seed;
use simulation::{FamilyStore, Roster, SharedStore, SimulationConfig, Simulator};

/// Application state shared by every command
pub struct AppState {
    pub store: SharedStore,
    pub simulator: Arc<Mutex<Simulator>>,
    pub calendar_runner: Mutex<Option<CalendarRunner>>,
    pub binding: FamilyBinding,
}

impl AppState {
    /// Build the store from `roster` when given, otherwise from the reference
    /// family, and bind `family` as the active selection.
    pub fn new(config: SimulationConfig, roster: Option<&Path>, family: &str) -> Result<Self> {
        let simulator = Simulator::new(config);
        let today = simulator.today();

        let mut store = FamilyStore::new();
        match roster {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading roster {}", path.display()))?;
                let roster: Roster = serde_json::from_str(&raw)
                    .with_context(|| format!("parsing roster {}", path.display()))?;
                let placed = store.import_roster(&roster, today);
                info!(path = %path.display(), placed, "roster imported");
            }
            None => seed::seed_reference_family(&mut store, today)?,
        }

        let mut binding = FamilyBinding::new();
        binding.bind(family);

        Ok(Self {
            store: store.shared(),
            simulator: Arc::new(Mutex::new(simulator)),
            calendar_runner: Mutex::new(None),
            binding,
        })
    }

    pub fn family(&self) -> Result<String> {
        self.binding
            .bound()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("no family selected"))
    }

    pub fn read_store(&self) -> Result<RwLockReadGuard<'_, FamilyStore>> {
        self.store.read().map_err(|_| anyhow!("family store lock poisoned"))
    }

    pub fn write_store(&self) -> Result<RwLockWriteGuard<'_, FamilyStore>> {
        self.store.write().map_err(|_| anyhow!("family store lock poisoned"))
    }

    pub fn simulator(&self) -> Result<MutexGuard<'_, Simulator>> {
        self.simulator.lock().map_err(|_| anyhow!("simulator lock poisoned"))
    }
}

// -- Serializable types printed by commands --

#[derive(Serialize, Clone)]
pub struct TickSummary {
    pub tick: u64,
    pub date: String,
    pub births: usize,
    pub deaths: usize,
    pub unions: usize,
    pub population: usize,
}

impl From<&simulation::TickReport> for TickSummary {
    fn from(report: &simulation::TickReport) -> Self {
        Self {
            tick: report.tick,
            date: report.date.to_string(),
            births: report.births,
            deaths: report.deaths,
            unions: report.unions,
            population: report.population,
        }
    }
}

/// Print one value as a JSON line on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Print one value as indented JSON on stdout.
pub fn print_pretty<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
