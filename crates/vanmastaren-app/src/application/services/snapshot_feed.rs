use futures::stream::{self, Stream};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use super::HabitRefresher;
use crate::application::dtos::HabitDto;

/// Live view of the full habit list.
///
/// Each call to [`HabitSnapshotFeed::publish_latest`] runs a refresh pass and
/// replaces the current snapshot. Subscribers see the value current at
/// subscription time first, then every later one. A slow subscriber skips
/// intermediate snapshots and only observes the newest.
pub struct HabitSnapshotFeed {
    refresher: Arc<HabitRefresher>,
    sender: watch::Sender<Arc<Vec<HabitDto>>>,
}

impl HabitSnapshotFeed {
    pub fn new(refresher: Arc<HabitRefresher>) -> Self {
        let (sender, _) = watch::channel(Arc::new(Vec::new()));
        Self { refresher, sender }
    }

    /// Reload every habit and push the result to subscribers.
    pub async fn publish_latest(&self) -> Arc<Vec<HabitDto>> {
        let outcome = self.refresher.refresh_all().await;
        let snapshot: Arc<Vec<HabitDto>> =
            Arc::new(outcome.habits.iter().map(HabitDto::from).collect());

        debug!(
            habits = snapshot.len(),
            subscribers = self.sender.receiver_count(),
            "Publishing habit snapshot"
        );

        self.sender.send_replace(snapshot.clone());
        snapshot
    }

    /// Last published snapshot, without touching the store.
    pub fn latest(&self) -> Arc<Vec<HabitDto>> {
        self.sender.borrow().clone()
    }

    /// Stream of snapshots. Ends when the feed is dropped.
    pub fn subscribe(&self) -> impl Stream<Item = Vec<HabitDto>> + Send + 'static {
        let mut receiver = self.sender.subscribe();
        receiver.mark_changed();

        stream::unfold(receiver, |mut receiver| async move {
            receiver.changed().await.ok()?;
            let snapshot: Vec<HabitDto> = receiver.borrow_and_update().iter().cloned().collect();
            Some((snapshot, receiver))
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
