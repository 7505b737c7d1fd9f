//! Per-check interval scheduler.
//!
//! Each runnable check gets its own task and ticker. A tick spawns one run;
//! runs of the same check may overlap, but only the command execution is
//! concurrent. Applying the result and the incident pass hold the check's
//! lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinSet;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use vigil_protocols::{Check, CheckDefinition};

use crate::runner::CheckRunner;

/// Time allowed for in-flight runs to finish once shutdown is signalled.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// What to do when a tick fires while the previous run is still going.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Start another run regardless.
    #[default]
    Allow,
    /// Drop the tick.
    Skip,
}

/// Runs checks on their intervals until shutdown.
pub struct Scheduler {
    runner: Arc<CheckRunner>,
    overlap: OverlapPolicy,
    run_on_start: bool,
    grace: Duration,
}

impl Scheduler {
    pub fn new(runner: Arc<CheckRunner>) -> Self {
        Self {
            runner,
            overlap: OverlapPolicy::default(),
            run_on_start: true,
            grace: SHUTDOWN_GRACE,
        }
    }

    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    /// Run each check immediately instead of after its first interval.
    pub fn with_run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Drop checks that cannot be scheduled, logging why.
    pub fn runnable(&self, checks: Vec<Check>) -> Vec<Check> {
        checks
            .into_iter()
            .filter(|check| {
                if check.definition.interval == 0 {
                    error!("Check '{}' has a zero interval, not scheduling it", check.name());
                    return false;
                }
                match self.runner.resolve(&check.definition.command) {
                    Ok(spec) if spec.exists() => true,
                    Ok(spec) => {
                        error!(
                            "Command {:?} for check '{}' not found, not scheduling it",
                            spec.program,
                            check.name()
                        );
                        false
                    }
                    Err(e) => {
                        error!("Check '{}' is not runnable: {}", check.name(), e);
                        false
                    }
                }
            })
            .collect()
    }

    /// Schedule every runnable check and wait for shutdown.
    pub async fn run(self: Arc<Self>, checks: Vec<Check>, shutdown: watch::Receiver<bool>) {
        let checks = self.runnable(checks);
        info!("Scheduler started with {} checks", checks.len());

        let mut units = JoinSet::new();
        for check in checks {
            let scheduler = self.clone();
            let shutdown = shutdown.clone();
            units.spawn(async move { scheduler.drive(check, shutdown).await });
        }

        while let Some(result) = units.join_next().await {
            if let Err(e) = result {
                error!("Check task failed: {}", e);
            }
        }
        info!("Scheduler stopped");
    }

    async fn drive(&self, check: Check, mut shutdown: watch::Receiver<bool>) {
        let definition = check.definition.clone();
        let period = Duration::from_secs(definition.interval);
        let slot = Arc::new(Mutex::new(check));
        let in_flight = Arc::new(AtomicBool::new(false));

        let start = if self.run_on_start {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let mut ticker = time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!("Scheduling check '{}' every {:?}", definition.name, period);

        let mut runs = JoinSet::new();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    while let Some(finished) = runs.try_join_next() {
                        if let Err(e) = finished {
                            error!("Run of check '{}' failed: {}", definition.name, e);
                        }
                    }

                    let guard = match self.overlap {
                        OverlapPolicy::Allow => None,
                        OverlapPolicy::Skip => {
                            if in_flight.swap(true, Ordering::AcqRel) {
                                warn!("Check '{}' is still running, skipping tick", definition.name);
                                continue;
                            }
                            Some(InFlight(in_flight.clone()))
                        }
                    };

                    runs.spawn(run_once(
                        self.runner.clone(),
                        definition.clone(),
                        slot.clone(),
                        guard,
                    ));
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Stopping check '{}'", definition.name);
        let drained = time::timeout(self.grace, async {
            while runs.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!("Abandoning in-flight runs of check '{}'", definition.name);
            runs.shutdown().await;
        }
    }
}

/// Clears the in-flight flag when a run ends, however it ends.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn run_once(
    runner: Arc<CheckRunner>,
    definition: CheckDefinition,
    slot: Arc<Mutex<Check>>,
    _guard: Option<InFlight>,
) {
    let execution = match runner.execute(&definition).await {
        Ok(execution) => execution,
        Err(e) => {
            error!("Error running check '{}': {}", definition.name, e);
            return;
        }
    };

    let mut check = slot.lock().await;
    let transition = runner.complete(&mut check, execution).await;
    debug!(check = %definition.name, ?transition, "Run complete");
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
