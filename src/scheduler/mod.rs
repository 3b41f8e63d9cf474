//! Scheduler module: concurrent check cycles over the registered host set.

mod stats;

pub use stats::*;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinSet;

use crate::db::{Observation, Store};
use crate::probe::probe_host;
use crate::registry::HostRegistry;

/// Cycle error types.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("check cycle already in progress")]
    InProgress,
}

/// Runs check cycles: one concurrent probe task per registered host.
///
/// Cycles never overlap. A cycle requested while another is in flight is
/// rejected, which bounds outbound connections and keeps per-host
/// observation timestamps monotonic.
pub struct Scheduler {
    registry: Arc<HostRegistry>,
    store: Arc<Store>,
    probe_timeout: Duration,
    cycle_lock: Mutex<()>,
    stop: Mutex<Option<broadcast::Sender<()>>>,
}

impl Scheduler {
    pub fn new(registry: Arc<HostRegistry>, store: Arc<Store>, probe_timeout: Duration) -> Self {
        Self {
            registry,
            store,
            probe_timeout,
            cycle_lock: Mutex::new(()),
            stop: Mutex::new(None),
        }
    }

    /// Run one check cycle over the host set as registered at cycle start.
    ///
    /// Every snapshot host produces exactly one observation: probe failures
    /// become unreachable observations, and a failed store write is logged
    /// without affecting the other hosts. Hosts added after the snapshot are
    /// picked up next cycle; hosts removed mid-cycle are still probed once.
    pub async fn run_cycle(&self) -> Result<HashMap<i64, Observation>, CycleError> {
        let _guard = self.cycle_lock.try_lock().map_err(|_| CycleError::InProgress)?;

        let hosts = self.registry.list();
        tracing::info!("Starting check cycle over {} hosts", hosts.len());

        let mut tasks = JoinSet::new();
        for host in hosts {
            let timeout = self.probe_timeout;
            tasks.spawn(async move { probe_host(&host, timeout).await });
        }

        let mut results = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            let observation = match joined {
                Ok(obs) => obs,
                Err(e) => {
                    tracing::error!("Probe task failed to join: {}", e);
                    continue;
                }
            };

            if let Err(e) = self.store.append_observation(&observation) {
                tracing::error!(
                    "Failed to persist observation for host {}: {}",
                    observation.host_id,
                    e
                );
            }
            results.insert(observation.host_id, observation);
        }

        Ok(results)
    }

    /// Start the periodic background check loop.
    pub fn start(self: &Arc<Self>, period: Duration) {
        let scheduler = self.clone();

        tokio::spawn(async move {
            let (tx, _) = broadcast::channel(1);
            {
                let mut stop_guard = scheduler.stop.lock().await;
                *stop_guard = Some(tx.clone());
            }

            let mut rx = tx.subscribe();
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = rx.recv() => break,
                    _ = interval.tick() => {
                        match scheduler.run_cycle().await {
                            Ok(results) => {
                                tracing::info!("Check cycle complete: {} hosts probed", results.len());
                            }
                            Err(CycleError::InProgress) => {
                                tracing::warn!("Skipping scheduled check: previous cycle still running");
                            }
                        }
                    }
                }
            }
        });
    }

    /// Signal the background loop to stop.
    ///
    /// In-flight probes are not cancelled; they run out their own timeouts.
    pub async fn stop(&self) {
        let stop = self.stop.lock().await;
        if let Some(tx) = stop.as_ref() {
            let _ = tx.send(());
        }
    }
}
