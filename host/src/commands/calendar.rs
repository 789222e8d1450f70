use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use simulation::calendar_runner::CalendarRunner;

use crate::state::{print_json, AppState, TickSummary};

/// Tick `ticks` times on the calling thread. Change records stream to
/// stdout through the simulator's observer, one JSON object per line.
pub fn simulate(state: &AppState, ticks: u32) -> Result<()> {
    let mut sim = state.simulator()?;
    sim.set_observer(|records| {
        let mut out = io::stdout().lock();
        for record in records {
            writeln!(out, "{}", serde_json::to_string(record)?)?;
        }
        Ok(())
    });

    for _ in 0..ticks {
        let mut store = state.write_store()?;
        let report = sim.tick(&mut store);
        info!(
            tick = report.tick,
            date = %report.date,
            births = report.births,
            deaths = report.deaths,
            unions = report.unions,
            population = report.population,
            "tick"
        );
    }

    sim.clear_observer();
    Ok(())
}

/// Let the calendar runner tick on the wall clock for `seconds`, printing a
/// summary line per tick.
pub fn run(state: &AppState, seconds: u64) -> Result<()> {
    let interval = state.simulator()?.config().tick_interval();
    let mut slot = state
        .calendar_runner
        .lock()
        .map_err(|_| anyhow!("calendar runner lock poisoned"))?;

    let mut runner = CalendarRunner::new();
    let reports = runner
        .start(Arc::clone(&state.store), Arc::clone(&state.simulator), interval)
        .ok_or_else(|| anyhow!("calendar runner already running"))?;
    *slot = Some(runner);

    let deadline = Instant::now() + Duration::from_secs(seconds);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match reports.recv_timeout(remaining) {
            Ok(report) => print_json(&TickSummary::from(&report))?,
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => break,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                warn!("calendar runner stopped early");
                break;
            }
        }
    }

    if let Some(mut runner) = slot.take() {
        runner.stop();
        runner.join();
    }
    info!(seconds, "calendar run finished");
    Ok(())
}
