use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::domain_settings::DomainSettings;
use crate::use_cases::domain_settings::DomainSettingsUseCases;

const POLL_INTERVAL_SECS: u64 = 10;

struct DomainWatchHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Per-tenant polling handles. The presentation layer mounts a watch while
/// its settings view is open and unmounts it on navigation away; a watch
/// also stops itself once the domain is fully active or removed.
#[derive(Default)]
pub struct DomainWatchers {
    inner: Mutex<HashMap<Uuid, DomainWatchHandle>>,
}

impl DomainWatchers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling for a tenant. A previous watch for the same tenant is
    /// stopped and replaced. `on_update` receives each tick's resulting
    /// settings so the caller can refresh its view.
    pub fn start(
        &self,
        tenant_id: Uuid,
        use_cases: Arc<DomainSettingsUseCases>,
        on_update: impl Fn(&DomainSettings) + Send + Sync + 'static,
    ) {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run_watch_loop(tenant_id, use_cases, on_update, stop_rx));

        let mut inner = self.inner.lock().unwrap();
        if let Some(previous) = inner.insert(tenant_id, DomainWatchHandle { stop_tx, task }) {
            let _ = previous.stop_tx.send(true);
        }
    }

    /// Signal a tenant's watch to stop at the next tick boundary. An
    /// in-flight status check completes and applies its idempotent result.
    /// Returns the task handle so callers can await a graceful finish.
    pub fn stop(&self, tenant_id: Uuid) -> Option<JoinHandle<()>> {
        let handle = self.inner.lock().unwrap().remove(&tenant_id)?;
        // The receiver is gone when the loop already ended on its own.
        let _ = handle.stop_tx.send(true);
        Some(handle.task)
    }
}

async fn run_watch_loop(
    tenant_id: Uuid,
    use_cases: Arc<DomainSettingsUseCases>,
    on_update: impl Fn(&DomainSettings) + Send + Sync + 'static,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(Duration::from_secs(POLL_INTERVAL_SECS));

    info!(
        %tenant_id,
        "Domain watch started (polling every {}s)",
        POLL_INTERVAL_SECS
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop_rx.changed() => {
                break;
            }
        }

        // The check runs outside the select so an external stop never
        // cancels an in-flight reconciliation.
        match use_cases.check(tenant_id).await {
            Ok(settings) => {
                let done = settings.custom_domain.is_none() || settings.is_fully_active();
                on_update(&settings);
                if done {
                    info!(%tenant_id, "Domain watch finished");
                    break;
                }
            }
            Err(e) => {
                // A missed check is recovered by the next fixed-interval
                // tick; nothing is surfaced to the tenant.
                warn!(%tenant_id, error = %e, "Domain status check failed; retrying on next tick");
            }
        }

        if *stop_rx.borrow() {
            break;
        }
    }
}
