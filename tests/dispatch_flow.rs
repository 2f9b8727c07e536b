//! End-to-end dispatch flow over the public API: enqueue, claim, remind,
//! requeue and complete with a journal write on the parent deal.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use courtier::dispatch::adapters::memory::{InMemoryDirectory, InMemoryTaskStore};
use courtier::dispatch::domain::{
    ChannelId, ClientId, ClientSummary, DealId, DealSummary, DispatchPhase, MessageRef, Scope,
    Task, TaskId,
};
use courtier::dispatch::ports::{
    GatewayResult, MessageControls, NotificationGateway, TaskRepository,
};
use courtier::dispatch::services::{
    CompletionReceipt, DispatchQueue, JournalWrite, NotifyAction, TaskNotifier, TransitionOutcome,
};
use courtier::journal::adapters::InMemoryJournalField;
use courtier::journal::domain::Journal;
use courtier::journal::ports::{JournalFieldRepository, JournalOwner};
use courtier::journal::services::JournalService;

const CLIENT: ClientId = ClientId::new(1);
const DEAL: DealId = DealId::new(10);
const TASK: TaskId = TaskId::new(1);

/// Deterministic clock advancing one second per reading.
#[derive(Debug)]
struct SteppingClock {
    base: DateTime<Utc>,
    ticks: AtomicI64,
}

impl SteppingClock {
    fn new() -> Self {
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

/// Gateway fake that records every outbound message.
#[derive(Debug, Clone, Default)]
struct RecordingGateway {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    admin: Arc<Mutex<Vec<String>>>,
    counter: Arc<AtomicI64>,
}

impl RecordingGateway {
    fn sent_to(&self, channel: &str) -> Vec<String> {
        self.sent
            .lock()
            .expect("gateway log lock")
            .iter()
            .filter(|(target, _)| target == channel)
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn admin_notices(&self) -> Vec<String> {
        self.admin.lock().expect("gateway log lock").clone()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        _controls: Option<MessageControls>,
    ) -> GatewayResult<MessageRef> {
        self.sent
            .lock()
            .expect("gateway log lock")
            .push((channel.as_str().to_owned(), text.to_owned()));
        let serial = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(MessageRef::new(format!("msg-{serial}")))
    }

    async fn notify_executor(&self, channel: &ChannelId, text: &str) -> GatewayResult<()> {
        self.sent
            .lock()
            .expect("gateway log lock")
            .push((channel.as_str().to_owned(), text.to_owned()));
        Ok(())
    }

    async fn notify_admin(&self, text: &str) -> GatewayResult<()> {
        self.admin
            .lock()
            .expect("gateway log lock")
            .push(text.to_owned());
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn task_travels_the_whole_dispatch_lifecycle() -> eyre::Result<()> {
    let store = Arc::new(InMemoryTaskStore::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let clock = Arc::new(SteppingClock::new());
    let fields = Arc::new(InMemoryJournalField::new());
    let gateway = Arc::new(RecordingGateway::default());

    directory.upsert_client(ClientSummary::new(CLIENT, "Иванов И. И."))?;
    directory.upsert_deal(DealSummary::new(DEAL, CLIENT, "КАСКО 2024"))?;
    fields.attach(JournalOwner::Deal { id: DEAL })?;

    let queue = DispatchQueue::new(Arc::clone(&store), Arc::clone(&directory), Arc::clone(&clock));
    let notifier = TaskNotifier::new(
        Arc::clone(&store),
        queue.clone(),
        Arc::clone(&gateway),
        JournalService::new(Arc::clone(&fields), Arc::clone(&clock)),
        Arc::clone(&clock),
    );

    let due = NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid due date");
    store
        .store(&Task::new(TASK, "Продлить полис", due, Scope::Deal { id: DEAL }))
        .await?;

    // Enqueue: idle -> queued, with a queue timestamp.
    assert_eq!(queue.enqueue(TASK).await?, TransitionOutcome::Applied);
    let queued_at_before = store
        .find_by_id(TASK)
        .await?
        .and_then(|task| task.dispatch().queued_at())
        .ok_or_else(|| eyre::eyre!("queued task carries a timestamp"))?;

    // Claim for chat-9 and link the outbound message, as the bot layer
    // does after delivering the card.
    let operator = ChannelId::new("chat-9");
    let dispatched = queue
        .pop_next(&operator)
        .await?
        .ok_or_else(|| eyre::eyre!("the queued task is claimable"))?;
    assert_eq!(dispatched.task.id(), TASK);
    assert_eq!(dispatched.deal.as_ref().map(|deal| deal.id), Some(DEAL));
    assert_eq!(
        queue
            .link_message(TASK, operator.clone(), MessageRef::new("msg-initial"))
            .await?,
        TransitionOutcome::Applied
    );

    // A reminder re-sends the card to the attached channel and leaves the
    // state machine where it was.
    let reminder = notifier.notify(TASK).await?;
    assert_eq!(reminder.action, NotifyAction::Resent);
    let resent = gateway.sent_to("chat-9");
    assert_eq!(resent.len(), 1);
    assert!(resent[0].contains("Продлить полис"));
    let after_reminder = store
        .find_by_id(TASK)
        .await?
        .ok_or_else(|| eyre::eyre!("task survives the reminder"))?;
    assert_eq!(after_reminder.phase(), DispatchPhase::Sent);

    // Return to queue: back of the line, with a fresh timestamp.
    assert_eq!(
        queue.return_to_queue(TASK).await?,
        TransitionOutcome::Applied
    );
    let requeued_at = store
        .find_by_id(TASK)
        .await?
        .and_then(|task| task.dispatch().queued_at())
        .ok_or_else(|| eyre::eyre!("requeued task carries a timestamp"))?;
    assert!(requeued_at > queued_at_before);

    // Completion forces idle, journals on the deal and informs the admin.
    let receipt = notifier.mark_done(TASK, Some("исправлено")).await?;
    let CompletionReceipt::Completed { journal, .. } = receipt else {
        eyre::bail!("completing a live task yields a receipt");
    };
    assert!(matches!(
        journal,
        JournalWrite::Appended {
            owner: JournalOwner::Deal { id: DEAL },
            ..
        }
    ));

    let finished = store
        .find_by_id(TASK)
        .await?
        .ok_or_else(|| eyre::eyre!("task survives completion"))?;
    assert!(finished.is_done());
    assert_eq!(finished.phase(), DispatchPhase::Idle);
    assert!(finished.dispatch().channel().is_none());
    assert!(finished.dispatch().message().is_none());

    let text = fields
        .read(JournalOwner::Deal { id: DEAL })
        .await?
        .ok_or_else(|| eyre::eyre!("deal journal is attached"))?;
    let parsed = Journal::parse(&text);
    let head = parsed
        .active()
        .first()
        .ok_or_else(|| eyre::eyre!("completion entry journalled"))?;
    assert!(head.header().contains("Задача №1"));
    assert!(head.body().contains("исправлено"));
    assert_eq!(gateway.admin_notices().len(), 1);
    Ok(())
}
