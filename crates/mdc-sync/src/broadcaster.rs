//! The per-tab sync broadcaster.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use mdc_store::{StorageChange, Store, TabId};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::event::{Envelope, SyncEvent, SyncMessage, SyncPayload, FALLBACK_EVENTS};
use crate::transport::Transport;

/// Zero-argument listener.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

struct Listener {
    id: u64,
    active: Arc<AtomicBool>,
    callback: Callback,
}

/// Listeners per event, in registration order.
#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<SyncEvent, Vec<Listener>>>,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, HashMap<SyncEvent, Vec<Listener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add(&self, event: SyncEvent, callback: Callback) -> (u64, Arc<AtomicBool>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        self.lock().entry(event).or_default().push(Listener {
            id,
            active: active.clone(),
            callback,
        });
        (id, active)
    }

    fn remove(&self, event: SyncEvent, id: u64) {
        let mut listeners = self.lock();
        if let Some(list) = listeners.get_mut(&event) {
            list.retain(|l| l.id != id);
            if list.is_empty() {
                listeners.remove(&event);
            }
        }
    }

    fn count(&self, event: SyncEvent) -> usize {
        self.lock().get(&event).map_or(0, Vec::len)
    }

    /// Invoke every live listener of `event`. Callbacks run outside the
    /// lock so they may subscribe or unsubscribe themselves.
    fn trigger(&self, event: SyncEvent) -> usize {
        let snapshot: Vec<(Arc<AtomicBool>, Callback)> = self
            .lock()
            .get(&event)
            .map(|list| {
                list.iter()
                    .map(|l| (l.active.clone(), l.callback.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let mut invoked = 0;
        for (active, callback) in snapshot {
            if active.load(Ordering::Acquire) {
                callback();
                invoked += 1;
            }
        }
        invoked
    }
}

/// Registration handle returned by [`Broadcaster::subscribe`].
///
/// Dropping it unsubscribes; no invocation starts after that.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    event: SyncEvent,
    id: u64,
    active: Arc<AtomicBool>,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn event(&self) -> SyncEvent {
        self.event
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.event, self.id);
        }
    }
}

/// Delivers "something changed" notifications to every open tab and keeps
/// this tab's store mirror converging.
///
/// Create one per tab at startup with [`Broadcaster::start`], share it via
/// `Arc`, and [`close`](Broadcaster::close) it on shutdown.
pub struct Broadcaster {
    tab: TabId,
    config: SyncConfig,
    transport: Arc<dyn Transport>,
    store: Store,
    registry: Arc<Registry>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Broadcaster {
    /// Join the transport and start relaying.
    ///
    /// The tab identity is the store's origin. Must be called inside a
    /// Tokio runtime. A transport that cannot be subscribed to is a hard
    /// error; the storage-change fallback is registered regardless of
    /// which transport is in use.
    pub fn start(
        transport: Arc<dyn Transport>,
        store: Store,
        config: SyncConfig,
    ) -> SyncResult<Arc<Self>> {
        let remote = transport.subscribe()?;
        let changes = store.storage().changes();
        let tab = store.origin().clone();
        let registry = Arc::new(Registry::default());

        let remote_task = tokio::spawn(relay_remote(
            remote,
            tab.clone(),
            store.clone(),
            registry.clone(),
        ));
        let storage_task = tokio::spawn(relay_storage(
            changes,
            tab.clone(),
            config.key_prefix.clone(),
            registry.clone(),
        ));

        info!(
            tab = %tab,
            channel = %transport.channel_name(),
            "Broadcaster started"
        );

        Ok(Arc::new(Self {
            tab,
            config,
            transport,
            store,
            registry,
            tasks: Mutex::new(vec![remote_task, storage_task]),
        }))
    }

    pub fn tab(&self) -> &TabId {
        &self.tab
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// This tab's view of the shared store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Announce `event` to every other tab and run this tab's own
    /// listeners right away.
    ///
    /// Transport failures are logged, never returned.
    pub fn notify(&self, event: SyncEvent, payload: Option<SyncPayload>) {
        debug!(
            tab = %self.tab,
            event = %event,
            key = payload.as_ref().map(|p| p.key.as_str()),
            "notify"
        );

        let envelope = Envelope {
            origin: self.tab.clone(),
            message: SyncMessage::new(event, payload),
        };
        if let Err(e) = self.transport.post(envelope) {
            warn!(event = %event, error = %e, "Failed to post sync message");
        }

        self.registry.trigger(event);
    }

    /// Run `callback` on every `event` this tab observes.
    pub fn subscribe<F>(&self, event: SyncEvent, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe_callback(event, Arc::new(callback))
    }

    pub fn subscribe_callback(&self, event: SyncEvent, callback: Callback) -> Subscription {
        let (id, active) = self.registry.add(event, callback);
        debug!(tab = %self.tab, event = %event, listener = id, "subscribe");
        Subscription {
            event,
            id,
            active,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Number of listeners currently registered for `event`.
    pub fn listener_count(&self, event: SyncEvent) -> usize {
        self.registry.count(event)
    }

    /// Stop relaying remote messages and storage changes. Local
    /// `notify`/`subscribe` keep working.
    pub fn close(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if !tasks.is_empty() {
            info!(tab = %self.tab, "Broadcaster closed");
        }
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for Broadcaster {
    fn drop(&mut self) {
        self.close();
    }
}

async fn relay_remote(
    mut rx: broadcast::Receiver<Envelope>,
    tab: TabId,
    store: Store,
    registry: Arc<Registry>,
) {
    loop {
        match rx.recv().await {
            Ok(envelope) => {
                if envelope.origin == tab {
                    continue;
                }
                let SyncMessage {
                    event_name, data, ..
                } = envelope.message;
                debug!(
                    tab = %tab,
                    from = %envelope.origin,
                    event = %event_name,
                    "Received sync message"
                );
                // Mirror first so listeners re-reading the store see the new value
                if let Some(payload) = data {
                    mirror(&store, payload).await;
                }
                registry.trigger(event_name);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(tab = %tab, skipped, "Sync receiver lagged, refreshing everything");
                for event in SyncEvent::ALL {
                    registry.trigger(event);
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
    debug!(tab = %tab, "Remote relay stopped");
}

async fn mirror(store: &Store, payload: SyncPayload) {
    match store.get_value(&payload.key).await {
        Ok(Some(current)) if current == payload.value => return,
        Ok(_) => {}
        Err(e) => debug!(key = %payload.key, error = %e, "Mirror read failed, overwriting"),
    }
    if let Err(e) = store.set(&payload.key, &payload.value).await {
        warn!(key = %payload.key, error = %e, "Failed to mirror sync payload");
    }
}

async fn relay_storage(
    mut rx: broadcast::Receiver<StorageChange>,
    tab: TabId,
    prefix: String,
    registry: Arc<Registry>,
) {
    loop {
        match rx.recv().await {
            Ok(change) => {
                if change.origin == tab || !change.key.starts_with(&prefix) {
                    continue;
                }
                debug!(tab = %tab, key = %change.key, "Storage changed elsewhere");
                for event in FALLBACK_EVENTS {
                    registry.trigger(event);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                debug!(tab = %tab, skipped, "Storage change receiver lagged");
                for event in FALLBACK_EVENTS {
                    registry.trigger(event);
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
    debug!(tab = %tab, "Storage relay stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelHub;
    use mdc_store::{MemoryStorage, Storage};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn tab(hub: &Arc<ChannelHub>, storage: &Arc<MemoryStorage>, name: &str) -> Arc<Broadcaster> {
        let store = Store::new(storage.clone(), TabId::from(name));
        Broadcaster::start(hub.clone(), store, SyncConfig::default()).unwrap()
    }

    /// Let background relays drain.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_self_notification_without_transport_round_trip() {
        let hub = ChannelHub::new("t");
        let storage = Arc::new(MemoryStorage::new());
        let a = tab(&hub, &storage, "a");
        let (count, cb) = counter();
        let _sub = a.subscribe(SyncEvent::CrewsUpdated, cb);

        a.notify(
            SyncEvent::CrewsUpdated,
            Some(SyncPayload::new("mdc_crews", json!([]))),
        );
        // Synchronous: no yield needed
        assert_eq!(count.load(Ordering::SeqCst), 1);

        settle().await;
        // Own envelope is skipped by the relay
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_tab_receives_notification() {
        let hub = ChannelHub::new("t");
        let storage = Arc::new(MemoryStorage::new());
        let a = tab(&hub, &storage, "a");
        let b = tab(&hub, &storage, "b");
        let (count, cb) = counter();
        let _sub = b.subscribe(SyncEvent::CallsUpdated, cb);

        a.notify(SyncEvent::CallsUpdated, None);
        settle().await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lagged_tab_refreshes_every_event() {
        let hub = ChannelHub::with_capacity("t", 1);
        let storage = Arc::new(MemoryStorage::new());
        let a = tab(&hub, &storage, "a");
        let b = tab(&hub, &storage, "b");
        let (users, users_cb) = counter();
        let (calls, calls_cb) = counter();
        let _users = b.subscribe(SyncEvent::UsersUpdated, users_cb);
        let _calls = b.subscribe(SyncEvent::CallsUpdated, calls_cb);

        // Relays have not run yet, so b falls two envelopes behind
        for _ in 0..3 {
            a.notify(SyncEvent::CallsUpdated, None);
        }
        settle().await;

        // One refresh-all for the lag, then the surviving envelope
        assert_eq!(users.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrelated_event_does_not_fire() {
        let hub = ChannelHub::new("t");
        let storage = Arc::new(MemoryStorage::new());
        let a = tab(&hub, &storage, "a");
        let (count, cb) = counter();
        let _sub = a.subscribe(SyncEvent::UsersUpdated, cb);

        a.notify(SyncEvent::CallsUpdated, None);
        settle().await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_payload_is_mirrored_before_listeners_run() {
        let hub = ChannelHub::new("t");
        // Separate media: each tab keeps its own mirror
        let storage_a = Arc::new(MemoryStorage::new());
        let storage_b = Arc::new(MemoryStorage::new());
        let a = tab(&hub, &storage_a, "a");
        let b = tab(&hub, &storage_b, "b");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = seen.clone();
        let reader = storage_b.clone();
        let _sub = b.subscribe(SyncEvent::Signal100Changed, move || {
            let value = futures::executor::block_on(reader.get("mdc_signal100")).unwrap();
            seen_cb.lock().unwrap().push(value);
        });

        a.notify(
            SyncEvent::Signal100Changed,
            Some(SyncPayload::new("mdc_signal100", json!({ "active": true }))),
        );
        settle().await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_deref(), Some(r#"{"active":true}"#));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribed_listener_never_fires_again() {
        let hub = ChannelHub::new("t");
        let storage = Arc::new(MemoryStorage::new());
        let a = tab(&hub, &storage, "a");
        let b = tab(&hub, &storage, "b");
        let (count, cb) = counter();
        let sub = b.subscribe(SyncEvent::CrewsUpdated, cb);

        a.notify(SyncEvent::CrewsUpdated, None);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sub.unsubscribe();
        assert_eq!(b.listener_count(SyncEvent::CrewsUpdated), 0);
        for _ in 0..3 {
            a.notify(SyncEvent::CrewsUpdated, None);
            b.notify(SyncEvent::CrewsUpdated, None);
        }
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_listeners_unsubscribe_first() {
        let hub = ChannelHub::new("t");
        let storage = Arc::new(MemoryStorage::new());
        let a = tab(&hub, &storage, "a");
        let (first, cb1) = counter();
        let (second, cb2) = counter();
        let sub1 = a.subscribe(SyncEvent::CrewsUpdated, cb1);
        let _sub2 = a.subscribe(SyncEvent::CrewsUpdated, cb2);

        sub1.unsubscribe();
        a.notify(SyncEvent::CrewsUpdated, None);

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listeners_fire_in_registration_order() {
        let hub = ChannelHub::new("t");
        let storage = Arc::new(MemoryStorage::new());
        let a = tab(&hub, &storage, "a");
        let order = Arc::new(Mutex::new(Vec::new()));
        let subs: Vec<Subscription> = (0..3)
            .map(|i| {
                let order = order.clone();
                a.subscribe(SyncEvent::UsersUpdated, move || order.lock().unwrap().push(i))
            })
            .collect();

        a.notify(SyncEvent::UsersUpdated, None);

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        drop(subs);
    }

    #[tokio::test(start_paused = true)]
    async fn test_storage_fallback_triggers_superset() {
        let hub = ChannelHub::new("t");
        let storage = Arc::new(MemoryStorage::new());
        let b = tab(&hub, &storage, "b");

        let (crews, cb_crews) = counter();
        let (online, cb_online) = counter();
        let (tests, cb_tests) = counter();
        let _s1 = b.subscribe(SyncEvent::CrewsUpdated, cb_crews);
        let _s2 = b.subscribe(SyncEvent::OnlineUsersChanged, cb_online);
        let _s3 = b.subscribe(SyncEvent::TestsUpdated, cb_tests);

        // A writer that never notifies, e.g. a tab that missed the broadcast
        storage
            .set(&TabId::from("other"), "mdc_activity_log", "[]".into())
            .await
            .unwrap();
        settle().await;

        assert_eq!(crews.load(Ordering::SeqCst), 1);
        assert_eq!(online.load(Ordering::SeqCst), 1);
        assert_eq!(tests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_storage_fallback_ignores_own_and_foreign_keys() {
        let hub = ChannelHub::new("t");
        let storage = Arc::new(MemoryStorage::new());
        let b = tab(&hub, &storage, "b");
        let (count, cb) = counter();
        let _sub = b.subscribe(SyncEvent::CrewsUpdated, cb);

        b.store().set("mdc_crews", &json!([])).await.unwrap();
        storage
            .set(&TabId::from("other"), "unrelated", "1".into())
            .await
            .unwrap();
        settle().await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unavailable_transport_fails_start() {
        let hub = ChannelHub::new("t");
        hub.close();
        let store = Store::new(Arc::new(MemoryStorage::new()), TabId::from("a"));

        assert!(Broadcaster::start(hub, store, SyncConfig::default()).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_broadcaster_stops_relaying() {
        let hub = ChannelHub::new("t");
        let storage = Arc::new(MemoryStorage::new());
        let a = tab(&hub, &storage, "a");
        let b = tab(&hub, &storage, "b");
        let (count, cb) = counter();
        let _sub = b.subscribe(SyncEvent::CallsUpdated, cb);

        b.close();
        settle().await;
        a.notify(SyncEvent::CallsUpdated, None);
        settle().await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
