//! Shared fixtures for dispatch tests.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::dispatch::adapters::memory::{InMemoryDirectory, InMemoryTaskStore};
use crate::dispatch::domain::{
    ChannelId, ClientId, ClientSummary, DealId, DealSummary, PolicyId, PolicySummary, Scope, Task,
    TaskId,
};
use crate::dispatch::ports::TaskRepository;
use crate::dispatch::services::DispatchQueue;

/// Client with deals and policies in the seeded directory.
pub const CLIENT_A: ClientId = ClientId::new(1);
/// Second client, used for scope isolation checks.
pub const CLIENT_B: ClientId = ClientId::new(2);
/// Deal of client A.
pub const DEAL_A: DealId = DealId::new(10);
/// Deal of client B.
pub const DEAL_B: DealId = DealId::new(20);
/// Policy issued under deal A.
pub const POLICY_UNDER_DEAL_A: PolicyId = PolicyId::new(100);
/// Policy held by client A directly, outside any deal.
pub const POLICY_DIRECT_A: PolicyId = PolicyId::new(101);

/// Deterministic clock advancing one second per reading.
#[derive(Debug)]
pub struct SteppingClock {
    base: DateTime<Utc>,
    ticks: AtomicI64,
}

impl SteppingClock {
    pub fn new() -> Self {
        let base = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid base timestamp");
        Self {
            base,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.base + Duration::seconds(tick)
    }
}

pub fn channel(name: &str) -> ChannelId {
    ChannelId::new(name)
}

pub fn due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid due date")
}

pub fn task(id: i64, scope: Scope) -> Task {
    Task::new(TaskId::new(id), format!("Продлить полис №{id}"), due_date(), scope)
}

/// Directory with two clients, two deals and two policies of client A:
/// one under deal A, one held directly.
pub fn seeded_directory() -> eyre::Result<InMemoryDirectory> {
    let directory = InMemoryDirectory::new();
    directory.upsert_client(ClientSummary::new(CLIENT_A, "Иванов И. И."))?;
    directory.upsert_client(ClientSummary::new(CLIENT_B, "Петрова А. С."))?;
    directory.upsert_deal(DealSummary::new(DEAL_A, CLIENT_A, "КАСКО 2024"))?;
    directory.upsert_deal(DealSummary::new(DEAL_B, CLIENT_B, "ОСАГО 2024"))?;
    directory.upsert_policy(
        PolicySummary::new(POLICY_UNDER_DEAL_A, CLIENT_A, "SB-0100").with_deal(DEAL_A),
    )?;
    directory.upsert_policy(PolicySummary::new(POLICY_DIRECT_A, CLIENT_A, "SB-0101"))?;
    Ok(directory)
}

/// Everything a queue test needs, wired over the in-memory adapters.
pub struct QueueWorld {
    pub store: Arc<InMemoryTaskStore>,
    pub directory: Arc<InMemoryDirectory>,
    pub clock: Arc<SteppingClock>,
    pub queue: DispatchQueue<InMemoryTaskStore, InMemoryDirectory, SteppingClock>,
}

pub fn queue_world() -> eyre::Result<QueueWorld> {
    let store = Arc::new(InMemoryTaskStore::new());
    let directory = Arc::new(seeded_directory()?);
    let clock = Arc::new(SteppingClock::new());
    let queue = DispatchQueue::new(
        Arc::clone(&store),
        Arc::clone(&directory),
        Arc::clone(&clock),
    );
    Ok(QueueWorld {
        store,
        directory,
        clock,
        queue,
    })
}

/// Stores a task and places it into the queue.
pub async fn seed_queued(world: &QueueWorld, id: i64, scope: Scope) -> eyre::Result<Task> {
    let mut seeded = task(id, scope);
    world.store.store(&seeded).await?;
    seeded.enqueue(world.clock.as_ref())?;
    world.store.update(&seeded).await?;
    Ok(seeded)
}

/// Stores a task without queueing it.
pub async fn seed_idle(world: &QueueWorld, id: i64, scope: Scope) -> eyre::Result<Task> {
    let seeded = task(id, scope);
    world.store.store(&seeded).await?;
    Ok(seeded)
}
