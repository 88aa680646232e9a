//! Subscribe-and-poll hook.
//!
//! A [`SyncHook`] runs one callback on mount, on every matching event and
//! on a fixed interval. The interval is a correctness backstop: a tab that
//! missed a broadcast still converges within one period.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::broadcaster::{Broadcaster, Callback, Subscription};
use crate::event::SyncEvent;

/// Shared cell that always calls the most recently installed callback.
///
/// Subscriptions and the poll timer hold clones of the cell, not of the
/// callback, so swapping the callback never requires resubscribing.
#[derive(Clone)]
pub struct LatestCallback(Arc<RwLock<Callback>>);

impl LatestCallback {
    pub fn new(callback: Callback) -> Self {
        Self(Arc::new(RwLock::new(callback)))
    }

    pub fn replace(&self, callback: Callback) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = callback;
    }

    pub fn call(&self) {
        // Clone out so the callback may replace itself
        let callback = self.0.read().unwrap_or_else(PoisonError::into_inner).clone();
        callback();
    }
}

/// Mount a hook: invoke `callback` now, then on every event in `events`
/// and every `interval`.
///
/// `None` uses the broadcaster's configured poll interval; a zero interval
/// disables polling. Must be called inside a Tokio runtime.
pub fn use_sync<F>(
    broadcaster: &Arc<Broadcaster>,
    events: &[SyncEvent],
    callback: F,
    interval: Option<Duration>,
) -> SyncHook
where
    F: Fn() + Send + Sync + 'static,
{
    let interval = interval.unwrap_or(broadcaster.config().poll_interval);
    let mut hook = SyncHook {
        broadcaster: broadcaster.clone(),
        callback: LatestCallback::new(Arc::new(callback)),
        events: events.to_vec(),
        interval,
        subscriptions: Vec::new(),
        poller: None,
    };
    hook.callback.call();
    hook.attach();
    hook
}

/// A mounted subscribe-and-poll consumer. Dropping it unmounts.
pub struct SyncHook {
    broadcaster: Arc<Broadcaster>,
    callback: LatestCallback,
    events: Vec<SyncEvent>,
    interval: Duration,
    subscriptions: Vec<Subscription>,
    poller: Option<JoinHandle<()>>,
}

impl SyncHook {
    pub fn events(&self) -> &[SyncEvent] {
        &self.events
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Swap the callback. Subscriptions and the timer stay as they are.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callback.replace(Arc::new(callback));
    }

    /// Apply a new event list or interval.
    ///
    /// When either differs, every listener and the timer are torn down once
    /// and rebuilt; otherwise nothing happens. Returns whether it rebuilt.
    pub fn reconfigure(&mut self, events: &[SyncEvent], interval: Option<Duration>) -> bool {
        let interval = interval.unwrap_or(self.broadcaster.config().poll_interval);
        if self.events == events && self.interval == interval {
            return false;
        }
        debug!(
            tab = %self.broadcaster.tab(),
            events = ?events,
            interval_ms = interval.as_millis() as u64,
            "SyncHook reconfigure"
        );
        self.detach();
        self.events = events.to_vec();
        self.interval = interval;
        self.attach();
        true
    }

    pub fn unmount(self) {}

    fn attach(&mut self) {
        self.subscriptions = self
            .events
            .iter()
            .map(|event| {
                let cb = self.callback.clone();
                self.broadcaster.subscribe(*event, move || cb.call())
            })
            .collect();

        if self.interval.is_zero() {
            return;
        }
        let cb = self.callback.clone();
        let period = self.interval;
        let first_tick = Instant::now() + period;
        self.poller = Some(tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                cb.call();
            }
        }));
    }

    fn detach(&mut self) {
        self.subscriptions.clear();
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

impl Drop for SyncHook {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::transport::ChannelHub;
    use mdc_store::{MemoryStorage, Store, TabId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    struct Origin {
        hub: Arc<ChannelHub>,
        storage: Arc<MemoryStorage>,
    }

    impl Origin {
        fn new() -> Self {
            Self {
                hub: ChannelHub::new("test"),
                storage: Arc::new(MemoryStorage::new()),
            }
        }

        fn tab(&self, name: &str) -> Arc<Broadcaster> {
            let store = Store::new(self.storage.clone(), TabId::from(name));
            Broadcaster::start(self.hub.clone(), store, SyncConfig::default()).unwrap()
        }
    }

    fn count(c: &Arc<AtomicUsize>) -> usize {
        c.load(Ordering::SeqCst)
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_runs_on_mount() {
        let origin = Origin::new();
        let tab = origin.tab("a");
        let (calls, cb) = counter();

        let _hook = use_sync(&tab, &[SyncEvent::CrewsUpdated], cb, Some(Duration::from_secs(1)));

        // No time has elapsed
        assert_eq!(count(&calls), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_notify_and_poll_scenario() {
        let origin = Origin::new();
        let tab = origin.tab("a");
        let (calls, cb) = counter();

        let _hook = use_sync(
            &tab,
            &[SyncEvent::CrewsUpdated],
            cb,
            Some(Duration::from_millis(1000)),
        );
        tab.notify(SyncEvent::CrewsUpdated, None);
        assert_eq!(count(&calls), 2);

        sleep(Duration::from_millis(999)).await;
        assert_eq!(count(&calls), 2);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(count(&calls), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_repeats_unconditionally() {
        let origin = Origin::new();
        let tab = origin.tab("a");
        let (calls, cb) = counter();

        let _hook = use_sync(&tab, &[], cb, Some(Duration::from_millis(500)));
        sleep(Duration::from_millis(2_100)).await;

        // mount + ticks at 500, 1000, 1500, 2000
        assert_eq!(count(&calls), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_interval_comes_from_config() {
        let origin = Origin::new();
        let tab = origin.tab("a");
        let (calls, cb) = counter();

        let hook = use_sync(&tab, &[SyncEvent::UsersUpdated], cb, None);
        assert_eq!(hook.interval(), SyncConfig::default().poll_interval);

        sleep(SyncConfig::default().poll_interval + Duration::from_millis(1)).await;
        assert_eq!(count(&calls), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_disables_polling() {
        let origin = Origin::new();
        let tab = origin.tab("a");
        let (calls, cb) = counter();

        let _hook = use_sync(&tab, &[SyncEvent::UsersUpdated], cb, Some(Duration::ZERO));
        sleep(Duration::from_secs(60)).await;

        assert_eq!(count(&calls), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_event_converges_within_one_interval() {
        let origin = Origin::new();
        let a = origin.tab("a");
        let b = origin.tab("b");
        let (calls, cb) = counter();
        let interval = Duration::from_millis(1000);

        let _hook = use_sync(&b, &[SyncEvent::CallsUpdated], cb, Some(interval));
        let mounted = count(&calls);

        a.notify(SyncEvent::CallsUpdated, None);
        sleep(interval).await;

        assert!(count(&calls) > mounted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missed_message_healed_by_poll() {
        let origin = Origin::new();
        let b = origin.tab("b");
        let (calls, cb) = counter();

        let _hook = use_sync(&b, &[SyncEvent::CallsUpdated], cb, Some(Duration::from_millis(1000)));

        // Another tab on a different channel: b never hears about it
        let stranger = Broadcaster::start(
            ChannelHub::new("elsewhere"),
            Store::new(Arc::new(MemoryStorage::new()), TabId::from("x")),
            SyncConfig::default(),
        )
        .unwrap();
        stranger.notify(SyncEvent::CallsUpdated, None);
        sleep(Duration::from_millis(10)).await;
        assert_eq!(count(&calls), 1);

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(count(&calls), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_callback_is_used_without_resubscribing() {
        let origin = Origin::new();
        let tab = origin.tab("a");
        let (old_calls, old_cb) = counter();
        let (new_calls, new_cb) = counter();

        let hook = use_sync(&tab, &[SyncEvent::TestsUpdated], old_cb, Some(Duration::from_millis(100)));
        hook.set_callback(new_cb);
        assert_eq!(tab.listener_count(SyncEvent::TestsUpdated), 1);

        tab.notify(SyncEvent::TestsUpdated, None);
        sleep(Duration::from_millis(101)).await;

        assert_eq!(count(&old_calls), 1);
        assert_eq!(count(&new_calls), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_tears_down_once() {
        let origin = Origin::new();
        let tab = origin.tab("a");
        let (calls, cb) = counter();

        let mut hook = use_sync(
            &tab,
            &[SyncEvent::CrewsUpdated, SyncEvent::CallsUpdated],
            cb,
            Some(Duration::from_millis(200)),
        );
        assert_eq!(tab.listener_count(SyncEvent::CrewsUpdated), 1);
        assert_eq!(tab.listener_count(SyncEvent::CallsUpdated), 1);

        // Same parameters: nothing rebuilt
        assert!(!hook.reconfigure(
            &[SyncEvent::CrewsUpdated, SyncEvent::CallsUpdated],
            Some(Duration::from_millis(200)),
        ));

        assert!(hook.reconfigure(&[SyncEvent::Signal100Changed], Some(Duration::from_millis(300))));
        assert_eq!(tab.listener_count(SyncEvent::CrewsUpdated), 0);
        assert_eq!(tab.listener_count(SyncEvent::CallsUpdated), 0);
        assert_eq!(tab.listener_count(SyncEvent::Signal100Changed), 1);

        tab.notify(SyncEvent::CrewsUpdated, None);
        assert_eq!(count(&calls), 1);

        // Only the new 300ms timer is running
        sleep(Duration::from_millis(950)).await;
        assert_eq!(count(&calls), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_stops_everything() {
        let origin = Origin::new();
        let tab = origin.tab("a");
        let (calls, cb) = counter();

        let hook = use_sync(&tab, &[SyncEvent::CrewsUpdated], cb, Some(Duration::from_millis(100)));
        hook.unmount();
        assert_eq!(tab.listener_count(SyncEvent::CrewsUpdated), 0);

        tab.notify(SyncEvent::CrewsUpdated, None);
        sleep(Duration::from_secs(1)).await;

        assert_eq!(count(&calls), 1);
    }
}
