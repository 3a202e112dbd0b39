use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::input::InputEvent;

static INPUT_BUS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_bus_lock_poison_once(operation: &'static str) {
    if INPUT_BUS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "input bus lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Default)]
struct BusState {
    next_subscription_id: u64,
    subscribers: Vec<SubscriberQueue>,
}

#[derive(Debug)]
struct SubscriberQueue {
    id: u64,
    events: VecDeque<InputEvent>,
}

/// Host-wide input fan-out. Every subscriber receives every published event,
/// in publish order.
#[derive(Clone, Debug, Default)]
pub struct InputBus {
    state: Arc<Mutex<BusState>>,
}

impl InputBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, event: InputEvent) {
        let mut state = lock_state(&self.state, "publish");
        for subscriber in &mut state.subscribers {
            subscriber.events.push_back(event.clone());
        }
    }

    pub fn subscribe(&self) -> InputSubscription {
        let mut state = lock_state(&self.state, "subscribe");
        let id = state.next_subscription_id;
        state.next_subscription_id = state.next_subscription_id.saturating_add(1);
        state.subscribers.push(SubscriberQueue {
            id,
            events: VecDeque::new(),
        });
        debug!(
            subscription = id,
            subscriber_count = state.subscribers.len(),
            "input_subscribed"
        );
        InputSubscription {
            id,
            state: Arc::clone(&self.state),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock_state(&self.state, "subscriber_count").subscribers.len()
    }
}

/// Scoped registration on an [`InputBus`]. Dropping it unregisters the
/// subscriber and discards its undelivered events.
#[derive(Debug)]
pub struct InputSubscription {
    id: u64,
    state: Arc<Mutex<BusState>>,
}

impl InputSubscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Takes every event queued since the last drain, oldest first.
    pub fn drain(&self) -> Vec<InputEvent> {
        let mut state = lock_state(&self.state, "drain");
        state
            .subscribers
            .iter_mut()
            .find(|subscriber| subscriber.id == self.id)
            .map(|subscriber| subscriber.events.drain(..).collect())
            .unwrap_or_default()
    }
}

impl Drop for InputSubscription {
    fn drop(&mut self) {
        let mut state = lock_state(&self.state, "unsubscribe");
        state.subscribers.retain(|subscriber| subscriber.id != self.id);
        debug!(
            subscription = self.id,
            subscriber_count = state.subscribers.len(),
            "input_unsubscribed"
        );
    }
}

fn lock_state<'a>(
    state: &'a Mutex<BusState>,
    operation: &'static str,
) -> MutexGuard<'a, BusState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn_bus_lock_poison_once(operation);
            poisoned.into_inner()
        }
    }
}
