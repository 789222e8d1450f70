//! Calendar Runner - Background thread that ticks the simulation at regular intervals

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::simulator::{Simulator, TickReport};
use crate::store::SharedStore;

/// Calendar runner that manages a background thread for automatic ticking
pub struct CalendarRunner {
    is_running: Arc<AtomicBool>,
    stop_tx: Option<Sender<()>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl CalendarRunner {
    pub fn new() -> Self {
        Self {
            is_running: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
            thread_handle: None,
        }
    }

    /// Start ticking every `interval`. Each tick holds the store's write lock
    /// for its whole duration, so readers never see a half-applied tick.
    /// Tick reports arrive on the returned channel; `None` if already running.
    pub fn start(
        &mut self,
        store: SharedStore,
        simulator: Arc<Mutex<Simulator>>,
        interval: Duration,
    ) -> Option<Receiver<TickReport>> {
        if self.is_running.load(Ordering::SeqCst) {
            warn!("calendar runner already running");
            return None;
        }
        // A previous run that was stopped but never joined.
        self.join();

        info!(interval_ms = interval.as_millis() as u64, "starting calendar runner");
        self.is_running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.is_running);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (report_tx, report_rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let report = {
                    let Ok(mut store) = store.write() else {
                        error!("family store lock poisoned, stopping runner");
                        break;
                    };
                    let Ok(mut simulator) = simulator.lock() else {
                        error!("simulator lock poisoned, stopping runner");
                        break;
                    };
                    simulator.tick(&mut store)
                };

                if report_tx.send(report).is_err() {
                    debug!("tick report receiver dropped");
                }
            }
            running.store(false, Ordering::SeqCst);
            info!("calendar runner thread stopped");
        });

        self.stop_tx = Some(stop_tx);
        self.thread_handle = Some(handle);
        Some(report_rx)
    }

    /// Stop arming new ticks. Returns immediately; an in-flight tick finishes.
    pub fn stop(&mut self) {
        if self.stop_tx.is_none() {
            return;
        }
        info!("stopping calendar runner");
        self.is_running.store(false, Ordering::SeqCst);
        self.stop_tx = None;
    }

    /// Wait for the background thread to exit.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                error!("calendar runner thread panicked");
            }
        }
    }

    /// Check if the calendar is currently running
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }
}

impl Default for CalendarRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CalendarRunner {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::seed;
    use crate::store::FamilyStore;
    use chrono::NaiveDate;

    fn fixture() -> (SharedStore, Arc<Mutex<Simulator>>) {
        let config = SimulationConfig {
            seed: Some(11),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..SimulationConfig::default()
        };
        let simulator = Simulator::new(config);
        let mut store = FamilyStore::new();
        seed::seed_reference_family(&mut store, simulator.today()).unwrap();
        (store.shared(), Arc::new(Mutex::new(simulator)))
    }

    #[test]
    fn test_calendar_runner() {
        let (store, simulator) = fixture();
        let mut runner = CalendarRunner::new();
        let reports = runner
            .start(Arc::clone(&store), Arc::clone(&simulator), Duration::from_millis(100))
            .unwrap();
        assert!(runner.is_running());
        assert!(runner
            .start(Arc::clone(&store), Arc::clone(&simulator), Duration::from_millis(100))
            .is_none());

        // Let it run for ~500ms (should get ~5 ticks)
        thread::sleep(Duration::from_millis(550));
        runner.stop();
        runner.join();
        assert!(!runner.is_running());

        let count = reports.try_iter().count();
        assert!((4..=6).contains(&count), "Expected ~5 ticks, got {}", count);
        assert_eq!(simulator.lock().unwrap().tick_count() as usize, count);
    }

    #[test]
    fn test_stop_before_first_tick() {
        let (store, simulator) = fixture();
        let mut runner = CalendarRunner::new();
        let reports = runner
            .start(store, Arc::clone(&simulator), Duration::from_secs(60))
            .unwrap();
        runner.stop();
        runner.join();
        assert_eq!(reports.try_iter().count(), 0);
        assert_eq!(simulator.lock().unwrap().tick_count(), 0);
    }
}
