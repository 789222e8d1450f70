//! Life-Event Simulator - main orchestrator
//!
//! One tick advances the virtual clock and runs, per family in store order:
//! aging, mortality (plus collateral effects), pairing, births. The tick's
//! change records are then handed to the observer, if any.

use std::panic::{self, AssertUnwindSafe};

use chrono::{Local, NaiveDate};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::components::SimClock;
use crate::config::SimulationConfig;
use crate::events::ChangeRecord;
use crate::store::FamilyStore;
use crate::systems;

pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Receives every tick's change records. Errors and panics are logged and
/// discarded; they never affect the tick.
pub type Observer = Box<dyn FnMut(&[ChangeRecord]) -> Result<(), ObserverError> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickPhase {
    Idle,
    Aging,
    Mortality,
    Pairing,
    Birth,
    Notify,
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub date: NaiveDate,
    pub records: Vec<ChangeRecord>,
    pub births: usize,
    pub deaths: usize,
    pub unions: usize,
    pub population: usize,
}

pub struct Simulator {
    config: SimulationConfig,
    clock: SimClock,
    rng: ChaCha8Rng,
    tick: u64,
    phase: TickPhase,
    observer: Option<Observer>,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        let today = config
            .start_date
            .unwrap_or_else(|| Local::now().date_naive());
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            clock: SimClock::new(today),
            rng,
            tick: 0,
            phase: TickPhase::Idle,
            observer: None,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current virtual date
    pub fn today(&self) -> NaiveDate {
        self.clock.today
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn phase(&self) -> TickPhase {
        self.phase
    }

    pub fn set_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&[ChangeRecord]) -> Result<(), ObserverError> + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Run one simulation tick (advances `years_per_tick` years)
    pub fn tick(&mut self, store: &mut FamilyStore) -> TickReport {
        let before = self.clock.today;
        let years = self.config.years_per_tick;
        self.clock.advance_years(years);
        let today = self.clock.today;
        self.tick += 1;

        let mut records = Vec::new();
        for family in store.families_mut() {
            self.phase = TickPhase::Aging;
            records.extend(systems::aging_system(family, before, years));

            self.phase = TickPhase::Mortality;
            records.extend(systems::death_system(family, today, &mut self.rng));
            systems::collateral_system(family, today);

            self.phase = TickPhase::Pairing;
            records.extend(systems::matchmaking_system(
                family,
                today,
                self.config.max_unions_per_family_per_tick,
                &mut self.rng,
            ));

            self.phase = TickPhase::Birth;
            records.extend(systems::birth_system(family, today, &self.config, &mut self.rng));
            debug!(family = %family.name(), population = family.population(), "family ticked");
        }

        self.phase = TickPhase::Notify;
        self.notify(&records);
        self.phase = TickPhase::Idle;

        let count = |label: &str| records.iter().filter(|r| r.label() == label).count();
        let report = TickReport {
            tick: self.tick,
            date: today,
            births: count("birth"),
            deaths: count("death"),
            unions: count("union"),
            population: store.families().map(|f| f.population()).sum(),
            records,
        };
        info!(
            tick = report.tick,
            date = %report.date,
            births = report.births,
            deaths = report.deaths,
            unions = report.unions,
            population = report.population,
            "tick complete"
        );
        report
    }

    fn notify(&mut self, records: &[ChangeRecord]) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| observer(records))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(%err, "observer failed, records discarded"),
            Err(_) => warn!("observer panicked, records discarded"),
        }
    }
}
