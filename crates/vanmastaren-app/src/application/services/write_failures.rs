use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::error;

use vanmastaren_domain::shared::HabitId;

/// A background write that did not reach the store. The in-memory value that
/// was presented is still the corrected one; re-running the refresh retries.
#[derive(Debug, Clone, Serialize)]
pub struct WriteFailure {
    pub habit_id: HabitId,
    pub operation: &'static str,
    pub message: String,
    pub retryable: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct WriteFailureNotifier {
    sender: broadcast::Sender<WriteFailure>,
}

impl WriteFailureNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WriteFailure> {
        self.sender.subscribe()
    }

    /// Log the failure and tell subscribers about it. Having no subscriber is
    /// not an error.
    pub fn notify(&self, failure: WriteFailure) {
        error!(
            habit_id = %failure.habit_id,
            operation = failure.operation,
            retryable = failure.retryable,
            error = %failure.message,
            "Habit write failed"
        );
        let _ = self.sender.send(failure);
    }
}

impl Default for WriteFailureNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}
