//! Journal service tests over the in-memory field adapter.

use rstest::rstest;
use std::sync::Arc;

use super::helpers::FixedClock;
use crate::dispatch::domain::{DealId, PolicyId};
use crate::journal::adapters::InMemoryJournalField;
use crate::journal::domain::ARCHIVE_MARKER;
use crate::journal::ports::{JournalFieldRepository, JournalOwner};
use crate::journal::services::{AppendOutcome, EntryMoveOutcome, JournalService};

const DEAL: JournalOwner = JournalOwner::Deal {
    id: DealId::new(10),
};
const POLICY: JournalOwner = JournalOwner::Policy {
    id: PolicyId::new(100),
};

struct ServiceWorld {
    fields: Arc<InMemoryJournalField>,
    service: JournalService<InMemoryJournalField, FixedClock>,
}

fn service_world() -> eyre::Result<ServiceWorld> {
    let fields = Arc::new(InMemoryJournalField::new());
    fields.attach(DEAL)?;
    let service = JournalService::new(Arc::clone(&fields), Arc::new(FixedClock::new()));
    Ok(ServiceWorld { fields, service })
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn append_writes_the_recomposed_field_back() -> eyre::Result<()> {
    let world = service_world()?;

    let outcome = world.service.append(DEAL, "первый взнос получен").await?;

    let AppendOutcome::Appended { entry_id } = outcome else {
        eyre::bail!("append against an attached owner succeeds");
    };
    assert_eq!(entry_id.len(), 8);
    let text = world
        .fields
        .read(DEAL)
        .await?
        .ok_or_else(|| eyre::eyre!("deal journal is attached"))?;
    assert!(text.starts_with(FixedClock::HEADER));
    assert!(text.contains("первый взнос получен"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn append_against_a_missing_owner_is_a_noop() -> eyre::Result<()> {
    let world = service_world()?;

    let outcome = world.service.append(POLICY, "не должно записаться").await?;

    assert_eq!(outcome, AppendOutcome::OwnerNotFound);
    assert!(world.fields.read(POLICY).await?.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn archive_and_restore_move_entries_through_the_field() -> eyre::Result<()> {
    let world = service_world()?;
    let AppendOutcome::Appended { entry_id } =
        world.service.append(DEAL, "урегулирование завершено").await?
    else {
        eyre::bail!("append against an attached owner succeeds");
    };

    assert_eq!(
        world.service.archive_entry(DEAL, &entry_id).await?,
        EntryMoveOutcome::Moved
    );
    let archived_text = world
        .fields
        .read(DEAL)
        .await?
        .ok_or_else(|| eyre::eyre!("deal journal is attached"))?;
    assert!(archived_text.contains(ARCHIVE_MARKER));

    assert_eq!(
        world.service.restore_entry(DEAL, &entry_id).await?,
        EntryMoveOutcome::Moved
    );
    let restored_text = world
        .fields
        .read(DEAL)
        .await?
        .ok_or_else(|| eyre::eyre!("deal journal is attached"))?;
    assert!(!restored_text.contains(ARCHIVE_MARKER));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_an_unknown_entry_reports_entry_not_found() -> eyre::Result<()> {
    let world = service_world()?;
    world.service.append(DEAL, "запись").await?;

    assert_eq!(
        world.service.archive_entry(DEAL, "ffffffff").await?,
        EntryMoveOutcome::EntryNotFound
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_entries_of_a_missing_owner_reports_owner_not_found() -> eyre::Result<()> {
    let world = service_world()?;

    assert_eq!(
        world.service.archive_entry(POLICY, "ffffffff").await?,
        EntryMoveOutcome::OwnerNotFound
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn entries_view_covers_both_sections() -> eyre::Result<()> {
    let world = service_world()?;
    let AppendOutcome::Appended { entry_id } =
        world.service.append(DEAL, "старая запись").await?
    else {
        eyre::bail!("append against an attached owner succeeds");
    };
    world.service.archive_entry(DEAL, &entry_id).await?;
    world.service.append(DEAL, "свежая запись").await?;

    let rendered = world
        .service
        .entries(DEAL)
        .await?
        .ok_or_else(|| eyre::eyre!("deal journal is attached"))?;

    assert_eq!(rendered.len(), 3);
    assert!(rendered[0].raw().contains("свежая запись"));
    assert_eq!(rendered[1].header(), ARCHIVE_MARKER);
    assert!(rendered[2].raw().contains("старая запись"));

    assert!(world.service.entries(POLICY).await?.is_none());
    Ok(())
}
