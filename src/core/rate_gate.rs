//! Per-provider minimum spacing between upstream calls.

use super::provider::{ProviderId, ProviderSpec};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

struct Slot {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

/// One global slot per rate-limited provider.
///
/// Acquirers of the same provider queue on the slot's lock (tokio's mutex is
/// FIFO) and the holder sleeps *while holding it*, so consecutive release
/// points are always at least `interval` apart no matter how many callers
/// pile up. Providers without a declared interval have no slot and pass
/// straight through.
pub struct RateGate {
    slots: HashMap<ProviderId, Slot>,
}

impl RateGate {
    pub fn new<'a>(specs: impl IntoIterator<Item = &'a ProviderSpec>) -> Self {
        let slots = specs
            .into_iter()
            .filter_map(|spec| {
                let interval = spec.min_interval.filter(|d| !d.is_zero())?;
                Some((
                    spec.id,
                    Slot {
                        interval,
                        last_call: Mutex::new(None),
                    },
                ))
            })
            .collect();
        Self { slots }
    }

    pub fn is_gated(&self, provider: ProviderId) -> bool {
        self.slots.contains_key(&provider)
    }

    /// Waits until `provider` may be called again and records the call.
    ///
    /// Returns how long the caller was held back (zero for ungated providers).
    pub async fn acquire(&self, provider: ProviderId) -> Duration {
        let Some(slot) = self.slots.get(&provider) else {
            return Duration::ZERO;
        };

        let arrived = Instant::now();
        let mut last_call = slot.last_call.lock().await;
        if let Some(last) = *last_call {
            let ready_at = last + slot.interval;
            if ready_at > Instant::now() {
                debug!(%provider, wait = ?(ready_at - Instant::now()), "Rate gate waiting");
                sleep_until(ready_at).await;
            }
        }
        let now = Instant::now();
        *last_call = Some(now);
        now - arrived
    }
}
