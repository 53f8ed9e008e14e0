use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const LOG_TARGET: &str = "inspection::connectivity";

/// Connectivity transition reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
}

/// Invoked on every offline to online transition.
#[async_trait]
pub trait OnlineCallback: Send + Sync {
    async fn on_online(&self);
}

/// Tracks the platform connectivity flag and fires the registered callback on the
/// offline to online edge only. Without a platform signal the device is assumed online.
pub struct ConnectivityMonitor {
    state: watch::Sender<bool>,
    callback: Mutex<Option<Arc<dyn OnlineCallback>>>,
}

impl ConnectivityMonitor {
    pub fn new(initial: Option<bool>) -> Self {
        let online = initial.unwrap_or(true);
        let (state, _) = watch::channel(online);
        tracing::debug!(target: LOG_TARGET, online, "connectivity monitor initialized");
        Self {
            state,
            callback: Mutex::new(None),
        }
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    pub fn is_offline(&self) -> bool {
        !self.is_online()
    }

    /// Current state plus every later change; `true` means online.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    pub fn set_callback(&self, callback: Arc<dyn OnlineCallback>) {
        *self.lock_callback() = Some(callback);
    }

    pub fn clear_callback(&self) {
        *self.lock_callback() = None;
    }

    /// Applies one platform reading. Returns the spawned callback task when this reading is an
    /// offline to online edge.
    pub fn report(&self, online: bool) -> Option<JoinHandle<()>> {
        let was_online = self.state.send_replace(online);
        if was_online == online {
            return None;
        }

        if !online {
            tracing::info!(target: LOG_TARGET, "went offline");
            return None;
        }

        tracing::info!(target: LOG_TARGET, "back online");
        let callback = self.lock_callback().clone()?;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => Some(handle.spawn(async move { callback.on_online().await })),
            Err(_) => {
                tracing::warn!(target: LOG_TARGET, "no async runtime; online callback skipped");
                None
            }
        }
    }

    pub fn apply(&self, event: ConnectivityEvent) -> Option<JoinHandle<()>> {
        self.report(event == ConnectivityEvent::Online)
    }

    /// Feeds platform events into the monitor until the sender side is dropped.
    pub fn spawn_listener(
        self: &Arc<Self>,
        mut events: mpsc::Receiver<ConnectivityEvent>,
    ) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                monitor.apply(event);
            }
            tracing::debug!(target: LOG_TARGET, "connectivity event stream closed");
        })
    }

    fn lock_callback(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn OnlineCallback>>> {
        match self.callback.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingCallback {
        calls: AtomicU32,
    }

    #[async_trait]
    impl OnlineCallback for CountingCallback {
        async fn on_online(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn missing_signal_means_online() {
        assert!(ConnectivityMonitor::new(None).is_online());
        assert!(ConnectivityMonitor::new(Some(false)).is_offline());
    }

    #[tokio::test]
    async fn callback_fires_only_on_the_online_edge() {
        let monitor = ConnectivityMonitor::new(Some(false));
        let callback = Arc::new(CountingCallback::default());
        monitor.set_callback(callback.clone());

        assert!(monitor.report(false).is_none());
        let handle = monitor.report(true).expect("edge spawns callback");
        handle.await.expect("callback task");
        assert!(monitor.report(true).is_none());

        assert_eq!(callback.calls.load(Ordering::SeqCst), 1);
        assert!(monitor.is_online());
    }

    #[tokio::test]
    async fn listener_applies_platform_events_in_order() {
        let monitor = Arc::new(ConnectivityMonitor::new(Some(true)));
        let callback = Arc::new(CountingCallback::default());
        monitor.set_callback(callback.clone());
        let mut states = monitor.subscribe();

        let (tx, rx) = mpsc::channel(8);
        let listener = monitor.spawn_listener(rx);
        for event in [
            ConnectivityEvent::Offline,
            ConnectivityEvent::Online,
            ConnectivityEvent::Offline,
        ] {
            tx.send(event).await.expect("send");
        }
        drop(tx);
        listener.await.expect("listener");

        assert!(!*states.borrow_and_update());
        assert!(monitor.is_offline());
        for _ in 0..50 {
            if callback.calls.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(callback.calls.load(Ordering::SeqCst), 1);
    }
}
