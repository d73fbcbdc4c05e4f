//! In-memory doubles shared by the application tests.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::clock::FixedClock;
use vanmastaren_domain::events::{DomainEvent, EventBus};
use vanmastaren_domain::habit::{Habit, HabitRepository};
use vanmastaren_domain::shared::{DomainError, HabitId};

pub(crate) struct MockHabitRepository {
    habits: tokio::sync::RwLock<HashMap<HabitId, Habit>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
    fail_list: AtomicBool,
    unreadable: Mutex<HashSet<HabitId>>,
    read_delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockHabitRepository {
    pub(crate) fn new() -> Self {
        Self {
            habits: tokio::sync::RwLock::new(HashMap::new()),
            saves: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            unreadable: Mutex::new(HashSet::new()),
            read_delay: Mutex::new(Duration::ZERO),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Store without counting as a save.
    pub(crate) async fn insert(&self, habit: Habit) {
        self.habits.write().await.insert(habit.id().clone(), habit);
    }

    pub(crate) async fn stored(&self, id: &HabitId) -> Option<Habit> {
        self.habits.read().await.get(id).cloned()
    }

    pub(crate) fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn make_unreadable(&self, id: &HabitId) {
        self.unreadable.lock().unwrap().insert(id.clone());
    }

    pub(crate) fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = delay;
    }

    pub(crate) fn max_concurrent_reads(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HabitRepository for MockHabitRepository {
    async fn find_all(&self) -> Result<Vec<Habit>, DomainError> {
        let mut habits: Vec<Habit> = self.habits.read().await.values().cloned().collect();
        habits.sort_by(|a, b| (a.created_at(), a.id()).cmp(&(b.created_at(), b.id())));
        Ok(habits)
    }

    async fn list_ids(&self) -> Result<Vec<HabitId>, DomainError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(DomainError::Repository("listing unavailable".to_string()));
        }
        Ok(self
            .find_all()
            .await?
            .iter()
            .map(|h| h.id().clone())
            .collect())
    }

    async fn find_by_id(&self, id: &HabitId) -> Result<Option<Habit>, DomainError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.read_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.unreadable.lock().unwrap().contains(id) {
            return Err(DomainError::Repository(format!("cannot read {}", id)));
        }
        Ok(self.stored(id).await)
    }

    async fn save(&self, habit: &Habit) -> Result<(), DomainError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::Repository("store offline".to_string()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.insert(habit.clone()).await;
        Ok(())
    }

    async fn delete(&self, id: &HabitId) -> Result<(), DomainError> {
        match self.habits.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(DomainError::HabitNotFound(id.to_string())),
        }
    }
}

/// Records the type name of every published event.
pub(crate) struct RecordingEventBus {
    published: Mutex<Vec<&'static str>>,
}

impl RecordingEventBus {
    pub(crate) fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn count_of<E: DomainEvent>(&self) -> usize {
        let name = std::any::type_name::<E>();
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|published| **published == name)
            .count()
    }

    pub(crate) fn total(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl EventBus for RecordingEventBus {
    async fn publish(&self, event: Box<dyn DomainEvent>) -> Result<(), DomainError> {
        self.published.lock().unwrap().push(event.event_type_name());
        Ok(())
    }
}

/// `hour:minute` on the given day in UTC+1.
pub(crate) fn local_time(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

pub(crate) fn fixed_clock(now: DateTime<FixedOffset>) -> Arc<FixedClock> {
    Arc::new(FixedClock::new(now))
}
