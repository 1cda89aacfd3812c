//! Asynchronous pin fetching and the owned pin snapshot.
//!
//! This module refreshes the pin list in background threads, keeping the
//! map responsive during network round-trips. Every refresh carries a
//! request token; a completed fetch is applied only when its token is still
//! the newest, so a rapid re-trigger supersedes an in-flight response
//! instead of racing with it.

use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;

use log::warn;

use crate::listing::{OwnerId, Pin, PinId};
use crate::traits::PinSource;

/// Result of polling a refresh operation.
#[derive(Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A fetch completed and its snapshot was applied
    Applied { count: usize },
    /// A fetch failed; the pin list was cleared and the map keeps rendering
    Failed,
    /// No result available (still fetching or nothing in flight)
    None,
}

/// Holds the raw pin collection for the current owner and coordinates
/// background refreshes.
///
/// Responsibilities:
/// - Owning the current pin snapshot and its generation counter
/// - Spawning background fetch/delete threads
/// - Dropping stale responses by request-token comparison
pub struct PinStore {
    /// Current pin snapshot
    pins: Vec<Pin>,
    /// Bumped every time a new snapshot is applied
    generation: u64,
    /// Bumped every time a refresh is requested
    request_token: u64,
    /// Channel for the in-flight request, if any
    receiver: Option<Receiver<(u64, Result<Vec<Pin>, String>)>>,
}

impl PinStore {
    /// Creates a new store with no pins and nothing in flight.
    pub fn new() -> Self {
        Self {
            pins: Vec::new(),
            generation: 0,
            request_token: 0,
            receiver: None,
        }
    }

    // ===== Queries =====

    /// Returns the current pin snapshot.
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// Returns the snapshot generation, bumped on every applied refresh.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if a fetch is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.receiver.is_some()
    }

    /// Returns true if a pin with the given id is in the snapshot.
    pub fn contains(&self, id: PinId) -> bool {
        self.pins.iter().any(|p| p.id == id)
    }

    // ===== Refresh Workflow =====

    /// Starts fetching the owner's pins in a background thread.
    ///
    /// Supersedes any in-flight request: the old channel is replaced and the
    /// old request's token invalidated, so its response can never be applied.
    /// Call [`PinStore::poll`] regularly (e.g. once per frame) for results.
    pub fn refresh(&mut self, source: Arc<dyn PinSource>, owner: OwnerId) {
        let (sender, receiver) = channel();
        self.receiver = Some(receiver);
        self.request_token += 1;
        let token = self.request_token;

        thread::spawn(move || {
            let result = source.fetch_all(owner).map_err(|e| e.to_string());
            let _ = sender.send((token, result));
        });
    }

    /// Deletes a pin in a background thread, then fetches the fresh list.
    ///
    /// Fire-and-forget-refresh: the deletion result is only logged; the
    /// follow-up fetch is what the store actually applies.
    pub fn delete_then_refresh(&mut self, source: Arc<dyn PinSource>, id: PinId, owner: OwnerId) {
        let (sender, receiver) = channel();
        self.receiver = Some(receiver);
        self.request_token += 1;
        let token = self.request_token;

        thread::spawn(move || {
            if let Err(e) = source.delete_by_id(id) {
                warn!("failed to delete pin {}: {}", id, e);
            }
            let result = source.fetch_all(owner).map_err(|e| e.to_string());
            let _ = sender.send((token, result));
        });
    }

    /// Checks whether a background refresh has completed and applies it.
    ///
    /// A response is applied only if its token matches the newest request;
    /// superseded responses are dropped. A failed fetch clears the pin list
    /// (the map degrades to empty rather than erroring) and logs a warning.
    pub fn poll(&mut self) -> RefreshOutcome {
        let Some(receiver) = &self.receiver else {
            return RefreshOutcome::None;
        };
        let Ok((token, result)) = receiver.try_recv() else {
            return RefreshOutcome::None;
        };
        self.receiver = None;

        if token != self.request_token {
            return RefreshOutcome::None;
        }

        match result {
            Ok(pins) => {
                let count = pins.len();
                self.pins = pins;
                self.generation += 1;
                RefreshOutcome::Applied { count }
            }
            Err(e) => {
                warn!("pin fetch failed, falling back to empty list: {}", e);
                self.pins.clear();
                self.generation += 1;
                RefreshOutcome::Failed
            }
        }
    }
}

impl Default for PinStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::DealStatus;
    use std::sync::Mutex;
    use std::time::Duration;

    struct StubSource {
        pins: Mutex<Vec<Pin>>,
        delay: Duration,
        fail: bool,
    }

    impl StubSource {
        fn with_pins(pins: Vec<Pin>) -> Self {
            Self {
                pins: Mutex::new(pins),
                delay: Duration::ZERO,
                fail: false,
            }
        }
    }

    impl PinSource for StubSource {
        fn fetch_all(&self, _owner: OwnerId) -> anyhow::Result<Vec<Pin>> {
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            if self.fail {
                anyhow::bail!("backend unavailable");
            }
            Ok(self.pins.lock().unwrap().clone())
        }

        fn delete_by_id(&self, id: PinId) -> anyhow::Result<()> {
            self.pins.lock().unwrap().retain(|p| p.id != id);
            Ok(())
        }
    }

    fn pin(id: u64) -> Pin {
        Pin {
            id,
            lat: 37.5,
            lng: 127.0,
            status: DealStatus::PreDeal,
            is_sale: true,
            is_jeonse: false,
            is_rent: false,
            sale_price: Some(100_000_000),
            jeonse_deposit: None,
            rent_deposit: None,
            rent_monthly: None,
            keywords: Vec::new(),
            building_name: String::new(),
            title: None,
        }
    }

    fn poll_until_done(store: &mut PinStore) -> RefreshOutcome {
        for _ in 0..200 {
            match store.poll() {
                RefreshOutcome::None if store.is_refreshing() => {
                    thread::sleep(Duration::from_millis(5))
                }
                outcome => return outcome,
            }
        }
        RefreshOutcome::None
    }

    #[test]
    fn test_refresh_applies_snapshot() {
        let mut store = PinStore::new();
        let source = Arc::new(StubSource::with_pins(vec![pin(1), pin(2)]));
        store.refresh(source, 1);
        assert_eq!(poll_until_done(&mut store), RefreshOutcome::Applied { count: 2 });
        assert_eq!(store.pins().len(), 2);
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn test_failed_fetch_degrades_to_empty() {
        let mut store = PinStore::new();
        store.refresh(Arc::new(StubSource::with_pins(vec![pin(1)])), 1);
        poll_until_done(&mut store);
        assert_eq!(store.pins().len(), 1);

        let failing = StubSource {
            pins: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            fail: true,
        };
        store.refresh(Arc::new(failing), 1);
        assert_eq!(poll_until_done(&mut store), RefreshOutcome::Failed);
        assert!(store.pins().is_empty());
    }

    #[test]
    fn test_rapid_retrigger_supersedes_slow_fetch() {
        let mut store = PinStore::new();
        let slow = StubSource {
            pins: Mutex::new(vec![pin(1)]),
            delay: Duration::from_millis(100),
            fail: false,
        };
        store.refresh(Arc::new(slow), 1);
        // Immediately supersede with a fast fetch of a different snapshot.
        store.refresh(Arc::new(StubSource::with_pins(vec![pin(2), pin(3)])), 1);

        assert_eq!(poll_until_done(&mut store), RefreshOutcome::Applied { count: 2 });
        assert!(store.contains(2));
        assert!(!store.contains(1), "superseded response must not apply");

        // The slow response eventually lands nowhere: generation is stable.
        thread::sleep(Duration::from_millis(150));
        assert_eq!(store.poll(), RefreshOutcome::None);
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn test_delete_then_refresh_drops_pin() {
        let mut store = PinStore::new();
        let source = Arc::new(StubSource::with_pins(vec![pin(1), pin(2)]));
        store.refresh(Arc::clone(&source) as Arc<dyn PinSource>, 1);
        poll_until_done(&mut store);

        store.delete_then_refresh(source, 1, 1);
        assert_eq!(poll_until_done(&mut store), RefreshOutcome::Applied { count: 1 });
        assert!(!store.contains(1));
        assert!(store.contains(2));
    }
}
