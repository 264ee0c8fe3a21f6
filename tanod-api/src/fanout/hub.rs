//! Fan-out hub task

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{ConnectionId, Subscriber};
use crate::metrics;
use tanod_core::{RegistryEvent, TrackingMessage, TRACKING_CHANNEL};
use tanod_db::RegistryService;

enum HubCommand {
    Subscribe {
        id: ConnectionId,
        subscriber: Arc<dyn Subscriber>,
        ack: oneshot::Sender<bool>,
    },
    Resubscribe {
        id: ConnectionId,
        ack: oneshot::Sender<bool>,
    },
    Unsubscribe {
        id: ConnectionId,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
}

/// Owns the subscriber registry of the tracking channel
pub struct FanoutHub {
    registry: Arc<RegistryService>,
    events: broadcast::Receiver<RegistryEvent>,
    commands: mpsc::UnboundedReceiver<HubCommand>,
    subscribers: HashMap<ConnectionId, Arc<dyn Subscriber>>,
}

impl FanoutHub {
    /// Start the hub in a background task.
    ///
    /// The hub listens to registry events from this point on.
    pub fn spawn(registry: Arc<RegistryService>) -> FanoutHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Self {
            events: registry.subscribe_events(),
            registry,
            commands: rx,
            subscribers: HashMap::new(),
        };
        let task = tokio::spawn(hub.run());

        FanoutHandle {
            commands: tx,
            task: Arc::new(task),
        }
    }

    async fn run(mut self) {
        info!(channel = TRACKING_CHANNEL, "Fan-out hub started");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    // Every handle dropped
                    None => break,
                },
                event = self.events.recv() => match event {
                    Ok(event) => self.dispatch(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Fan-out hub lagged, re-sending snapshots");
                        self.resnapshot_all().await;
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        info!(channel = TRACKING_CHANNEL, "Fan-out hub stopped");
    }

    async fn handle_command(&mut self, command: HubCommand) {
        match command {
            HubCommand::Subscribe { id, subscriber, ack } => {
                let joined = self.send_snapshot(&id, subscriber.as_ref()).await;
                if joined {
                    if self.subscribers.insert(id, subscriber).is_some() {
                        debug!(connection_id = %id, "Subscription replaced");
                    } else {
                        info!(connection_id = %id, "Viewer subscribed");
                    }
                }
                metrics::set_viewers_connected(self.subscribers.len());
                let _ = ack.send(joined);
            }
            HubCommand::Resubscribe { id, ack } => {
                let joined = match self.subscribers.get(&id).cloned() {
                    Some(subscriber) => {
                        let ok = self.send_snapshot(&id, subscriber.as_ref()).await;
                        if !ok {
                            self.drop_subscriber(&id);
                        }
                        ok
                    }
                    None => false,
                };
                let _ = ack.send(joined);
            }
            HubCommand::Unsubscribe { id } => {
                if self.subscribers.remove(&id).is_some() {
                    info!(connection_id = %id, "Viewer unsubscribed");
                    metrics::set_viewers_connected(self.subscribers.len());
                }
            }
            HubCommand::Count { reply } => {
                let _ = reply.send(self.subscribers.len());
            }
        }
    }

    /// Deliver `initializeLocations` built from the current registry state
    async fn send_snapshot(&self, id: &ConnectionId, subscriber: &dyn Subscriber) -> bool {
        let locations = match self.registry.list_active().await {
            Ok(locations) => locations,
            Err(e) => {
                warn!(connection_id = %id, error = %e, "Snapshot failed");
                return false;
            }
        };
        let count = locations.len();

        match subscriber
            .deliver(Arc::new(TrackingMessage::InitializeLocations { locations }))
            .await
        {
            Ok(()) => {
                debug!(connection_id = %id, count, "Snapshot delivered");
                true
            }
            Err(e) => {
                warn!(connection_id = %id, error = %e, "Snapshot delivery failed");
                false
            }
        }
    }

    async fn dispatch(&mut self, event: RegistryEvent) {
        metrics::record_registry_event(event.kind());
        let message = Arc::new(event.into_message());
        trace!(message = ?message, "Dispatching tracking message");

        let mut failed = Vec::new();
        for (id, subscriber) in &self.subscribers {
            if let Err(e) = subscriber.deliver(message.clone()).await {
                warn!(connection_id = %id, error = %e, "Dropping viewer");
                failed.push(*id);
            }
        }
        for id in failed {
            self.drop_subscriber(&id);
        }
    }

    async fn resnapshot_all(&mut self) {
        let subscribers: Vec<_> = self
            .subscribers
            .iter()
            .map(|(id, s)| (*id, s.clone()))
            .collect();

        for (id, subscriber) in subscribers {
            if !self.send_snapshot(&id, subscriber.as_ref()).await {
                self.drop_subscriber(&id);
            }
        }
    }

    fn drop_subscriber(&mut self, id: &ConnectionId) {
        if self.subscribers.remove(id).is_some() {
            metrics::record_viewer_drop();
            metrics::set_viewers_connected(self.subscribers.len());
        }
    }
}

/// Cloneable handle to the hub task
#[derive(Clone)]
pub struct FanoutHandle {
    commands: mpsc::UnboundedSender<HubCommand>,
    task: Arc<JoinHandle<()>>,
}

impl FanoutHandle {
    /// Join the tracking channel.
    ///
    /// The subscriber receives `initializeLocations` before any live update.
    /// Subscribing again with the same id replaces the previous entry and
    /// sends a fresh snapshot. Returns false if the snapshot could not be
    /// delivered, in which case the subscriber was not registered.
    pub async fn subscribe(&self, id: ConnectionId, subscriber: Arc<dyn Subscriber>) -> bool {
        let (ack, rx) = oneshot::channel();
        if self
            .commands
            .send(HubCommand::Subscribe { id, subscriber, ack })
            .is_err()
        {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Send a fresh snapshot to an existing subscriber
    pub async fn resubscribe(&self, id: ConnectionId) -> bool {
        let (ack, rx) = oneshot::channel();
        if self.commands.send(HubCommand::Resubscribe { id, ack }).is_err() {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Leave the tracking channel. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: ConnectionId) {
        let _ = self.commands.send(HubCommand::Unsubscribe { id });
    }

    pub async fn subscriber_count(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(HubCommand::Count { reply }).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanout::DeliveryError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tanod_core::OfficerProfile;
    use tanod_db::TrackingStores;

    /// Records every message it receives
    #[derive(Default)]
    struct RecordingSubscriber {
        received: Mutex<Vec<TrackingMessage>>,
        failing: AtomicBool,
    }

    impl RecordingSubscriber {
        fn messages(&self) -> Vec<TrackingMessage> {
            self.received.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Subscriber for RecordingSubscriber {
        async fn deliver(&self, message: Arc<TrackingMessage>) -> Result<(), DeliveryError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(DeliveryError::Closed);
            }
            self.received.lock().unwrap().push((*message).clone());
            Ok(())
        }
    }

    async fn setup() -> (Arc<RegistryService>, FanoutHandle) {
        let stores = TrackingStores::in_memory();
        for id in ["A", "B"] {
            stores
                .officers
                .upsert_profile(OfficerProfile::new(id, format!("Officer {id}")))
                .await;
        }
        let registry = Arc::new(RegistryService::from_stores(&stores));
        let hub = FanoutHub::spawn(registry.clone());
        (registry, hub)
    }

    /// Wait until the subscriber has seen `count` messages
    async fn wait_for(subscriber: &RecordingSubscriber, count: usize) {
        for _ in 0..100 {
            if subscriber.messages().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} messages, got {:?}", subscriber.messages());
    }

    fn officer(id: &str) -> tanod_core::OfficerId {
        tanod_core::OfficerId::new(id)
    }

    #[tokio::test]
    async fn test_snapshot_matches_list_active() {
        let (registry, hub) = setup().await;
        registry.report_location(&officer("A"), 14.70, 121.05).await.unwrap();
        registry.report_location(&officer("B"), 14.71, 121.06).await.unwrap();

        let viewer = Arc::new(RecordingSubscriber::default());
        assert!(hub.subscribe(ConnectionId::new(), viewer.clone()).await);

        let expected = registry.list_active().await.unwrap();
        match &viewer.messages()[0] {
            TrackingMessage::InitializeLocations { locations } => assert_eq!(locations, &expected),
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_updates_follow_snapshot() {
        let (registry, hub) = setup().await;
        let viewer = Arc::new(RecordingSubscriber::default());
        hub.subscribe(ConnectionId::new(), viewer.clone()).await;

        registry.report_location(&officer("A"), 14.70, 121.05).await.unwrap();
        registry.deactivate(&officer("A")).await.unwrap();
        wait_for(&viewer, 3).await;

        let messages = viewer.messages();
        assert_eq!(messages[0].type_name(), "initializeLocations");
        match (&messages[1], &messages[2]) {
            (
                TrackingMessage::LocationUpdate { location: first },
                TrackingMessage::LocationUpdate { location: second },
            ) => {
                assert!(first.is_active());
                assert!(!second.is_active());
                assert!(second.location.revision > first.location.revision);
            }
            other => panic!("unexpected messages: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resubscribe_same_id_does_not_duplicate() {
        let (registry, hub) = setup().await;
        let id = ConnectionId::new();
        let viewer = Arc::new(RecordingSubscriber::default());

        hub.subscribe(id, viewer.clone()).await;
        hub.subscribe(id, viewer.clone()).await;
        assert_eq!(hub.subscriber_count().await, 1);

        registry.report_location(&officer("A"), 14.70, 121.05).await.unwrap();
        wait_for(&viewer, 3).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Two snapshots, one update
        let updates = viewer
            .messages()
            .iter()
            .filter(|m| m.type_name() == "locationUpdate")
            .count();
        assert_eq!(updates, 1);

        assert!(hub.resubscribe(id).await);
        assert_eq!(viewer.messages().len(), 4);
        assert!(!hub.resubscribe(ConnectionId::new()).await);
    }

    #[tokio::test]
    async fn test_failing_viewer_is_isolated_and_removed() {
        let (registry, hub) = setup().await;
        let healthy = Arc::new(RecordingSubscriber::default());
        let broken = Arc::new(RecordingSubscriber::default());

        hub.subscribe(ConnectionId::new(), healthy.clone()).await;
        hub.subscribe(ConnectionId::new(), broken.clone()).await;
        assert_eq!(hub.subscriber_count().await, 2);

        broken.failing.store(true, Ordering::SeqCst);
        registry.report_location(&officer("A"), 14.70, 121.05).await.unwrap();
        registry.report_location(&officer("B"), 14.71, 121.06).await.unwrap();
        wait_for(&healthy, 3).await;

        assert_eq!(hub.subscriber_count().await, 1);
        assert_eq!(broken.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let (registry, hub) = setup().await;
        let id = ConnectionId::new();
        let viewer = Arc::new(RecordingSubscriber::default());

        hub.subscribe(id, viewer.clone()).await;
        hub.unsubscribe(id);
        hub.unsubscribe(id);
        assert_eq!(hub.subscriber_count().await, 0);

        registry.report_location(&officer("A"), 14.70, 121.05).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(viewer.messages().len(), 1);
        assert!(hub.is_running());
    }

    #[tokio::test]
    async fn test_subscriber_failing_snapshot_is_not_registered() {
        let (_registry, hub) = setup().await;
        let viewer = Arc::new(RecordingSubscriber::default());
        viewer.failing.store(true, Ordering::SeqCst);

        assert!(!hub.subscribe(ConnectionId::new(), viewer).await);
        assert_eq!(hub.subscriber_count().await, 0);
    }
}
