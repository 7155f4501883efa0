// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end flows through the `Mnemo` facade.

use std::sync::Arc;
use std::time::Duration;

use mnemo::{
    CASCADE_BACKUP_LABEL, ConnectionType, Memory, MemoryFilter, MemoryPatch, MemoryStatus, Mnemo,
    MnemoConfig, MnemoError, NewMemory, NewTask, SemanticProvider, TaskFilter, TaskLevel,
    TaskStatus,
};
use mnemo_test_utils::MockSemanticProvider;
use tempfile::TempDir;

async fn open() -> (TempDir, Mnemo) {
    let dir = TempDir::new().unwrap();
    let mnemo = Mnemo::open(MnemoConfig::with_root(dir.path().join("data")))
        .await
        .unwrap();
    (dir, mnemo)
}

fn payment_note() -> NewMemory {
    NewMemory {
        project: Some("shop".into()),
        tags: vec!["payments".into(), "checkout".into()],
        ..NewMemory::new("Card validation uses the Luhn check before calling Stripe")
    }
}

fn checkout_master() -> NewTask {
    NewTask {
        tags: vec!["checkout".into(), "payments".into()],
        ..NewTask::new("Checkout revamp", TaskLevel::Master).in_project("shop")
    }
}

#[tokio::test]
async fn creates_are_linked_in_the_background() {
    let (_dir, mnemo) = open().await;
    let memory = mnemo.create_memory(payment_note()).await.unwrap();
    let task = mnemo.create_task(checkout_master()).await.unwrap();
    assert!(task.memory_connections.is_empty());

    mnemo.flush_links().await;

    let connections = mnemo.connections_for_task(&task.id).await.unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].memory.id, memory.id);
    assert_ne!(connections[0].connection.connection_type, ConnectionType::Explicit);
    assert!(connections[0].connection.strength >= 0.40 - 1e-9);

    let backlinks = mnemo.connections_for_memory(&memory.id).await.unwrap();
    assert_eq!(backlinks.len(), 1);
    assert_eq!(backlinks[0].task.id, task.id);
}

#[tokio::test]
async fn linking_can_be_disabled_on_create() {
    let dir = TempDir::new().unwrap();
    let mut config = MnemoConfig::with_root(dir.path());
    config.linking.link_on_create = false;
    let mnemo = Mnemo::open(config).await.unwrap();

    mnemo.create_memory(payment_note()).await.unwrap();
    let task = mnemo.create_task(checkout_master()).await.unwrap();
    assert_eq!(mnemo.flush_links().await, 0);
    assert!(mnemo.connections_for_task(&task.id).await.unwrap().is_empty());

    let summary = mnemo.relink_all().await.unwrap();
    assert_eq!(summary.tasks.entities, 1);
    assert_eq!(mnemo.connections_for_task(&task.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn semantic_provider_failures_do_not_block_linking() {
    let dir = TempDir::new().unwrap();
    let provider = Arc::new(MockSemanticProvider::failing());
    let shared: Arc<dyn SemanticProvider> = provider.clone();
    let mnemo = Mnemo::open_with_provider(MnemoConfig::with_root(dir.path()), Some(shared))
        .await
        .unwrap();

    mnemo.create_memory(payment_note()).await.unwrap();
    let task = mnemo.create_task(checkout_master()).await.unwrap();
    mnemo.flush_links().await;

    assert!(provider.calls() > 0);
    assert_eq!(mnemo.connections_for_task(&task.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_a_memory_prunes_task_connections() {
    let (_dir, mnemo) = open().await;
    let memory = mnemo.create_memory(payment_note()).await.unwrap();
    let task = mnemo.create_task(checkout_master()).await.unwrap();
    mnemo.flush_links().await;

    mnemo.delete_memory(&memory.id).await.unwrap();
    let task = mnemo.get_task(&task.id).await.unwrap();
    assert!(task.memory_connections.is_empty());
    assert!(mnemo.get_memory(&memory.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn dangling_connections_are_pruned_on_read() {
    let (_dir, mnemo) = open().await;
    let memory = mnemo.create_memory(NewMemory::new("scratch")).await.unwrap();
    let task = mnemo
        .create_task(NewTask::new("Unrelated", TaskLevel::Master))
        .await
        .unwrap();
    mnemo.flush_links().await;
    mnemo.link_explicit(&task.id, &memory.id).await.unwrap();

    // Remove the file behind the facade's back.
    mnemo.store().delete::<Memory>(&memory.id).await.unwrap();

    assert!(mnemo.connections_for_task(&task.id).await.unwrap().is_empty());
    let task = mnemo.get_task(&task.id).await.unwrap();
    assert!(task.memory_connections.is_empty());
}

#[tokio::test]
async fn explicit_links_require_an_existing_memory() {
    let (_dir, mnemo) = open().await;
    let task = mnemo
        .create_task(NewTask::new("Solo", TaskLevel::Master))
        .await
        .unwrap();
    let err = mnemo.link_explicit(&task.id, "missing").await.unwrap_err();
    assert!(matches!(err, MnemoError::NotFound { .. }));

    let memory = mnemo.create_memory(NewMemory::new("kept")).await.unwrap();
    let linked = mnemo.link_explicit(&task.id, &memory.id).await.unwrap();
    assert!(linked.has_explicit_link(&memory.id));
    assert!(mnemo.unlink(&task.id, &memory.id).await.unwrap());
    assert!(!mnemo.unlink(&task.id, &memory.id).await.unwrap());
}

#[tokio::test]
async fn caller_chosen_memory_ids_never_share_a_file() {
    let (_dir, mnemo) = open().await;
    let with_id = |id: &str| NewMemory {
        id: Some(id.to_string()),
        ..NewMemory::new(format!("note {id}"))
    };

    let err = mnemo.create_memory(with_id("a/b")).await.unwrap_err();
    assert!(matches!(err, MnemoError::Validation(_)));

    let first = mnemo.create_memory(with_id("a-b")).await.unwrap();
    let err = mnemo.create_memory(with_id("a-b")).await.unwrap_err();
    assert!(matches!(err, MnemoError::Validation(_)));

    mnemo.flush_links().await;
    assert_eq!(mnemo.get_memory("a-b").await.unwrap().content, first.content);
    assert!(mnemo.get_memory("a/b").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn get_memory_touches_last_accessed() {
    let (_dir, mnemo) = open().await;
    let created = mnemo.create_memory(NewMemory::new("touch me")).await.unwrap();
    mnemo.flush_links().await;
    tokio::time::sleep(Duration::from_millis(5)).await;

    let read = mnemo.get_memory(&created.id).await.unwrap();
    assert!(read.accessed_at > created.accessed_at);
    assert_eq!(read.updated_at, created.updated_at);
}

#[tokio::test]
async fn memory_category_is_inferred_when_missing() {
    let (_dir, mnemo) = open().await;
    let memory = mnemo
        .create_memory(NewMemory::new(
            "Fix the compile error in the rust function, then refactor the code and debug the api",
        ))
        .await
        .unwrap();
    assert_eq!(memory.category, mnemo::Category::Code);
}

#[tokio::test]
async fn updating_a_memory_moves_it_between_projects() {
    let (_dir, mnemo) = open().await;
    let memory = mnemo.create_memory(payment_note()).await.unwrap();
    mnemo.flush_links().await;

    let updated = mnemo
        .update_memory(
            &memory.id,
            MemoryPatch {
                project: Some("Billing Team".into()),
                content: Some("Luhn checks moved to the billing service".into()),
                ..MemoryPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.project, "Billing-Team");

    let in_shop = mnemo
        .list_memories(&MemoryFilter {
            project: Some("shop".into()),
            ..MemoryFilter::default()
        })
        .await
        .unwrap();
    assert!(in_shop.is_empty());
    let reread = mnemo.get_memory(&memory.id).await.unwrap();
    assert_eq!(reread.project, "Billing-Team");
    assert!(reread.content.starts_with("Luhn"));
    mnemo.flush_links().await;

    let err = mnemo
        .update_memory(
            &memory.id,
            MemoryPatch {
                content: Some("   ".into()),
                ..MemoryPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MnemoError::Validation(_)));
}

#[tokio::test]
async fn archived_memories_leave_search_and_links() {
    let (_dir, mnemo) = open().await;
    let memory = mnemo.create_memory(payment_note()).await.unwrap();
    let task = mnemo.create_task(checkout_master()).await.unwrap();
    mnemo.flush_links().await;
    assert_eq!(mnemo.search_memories("luhn", None).await.unwrap().len(), 1);

    mnemo
        .update_memory(
            &memory.id,
            MemoryPatch {
                status: Some(MemoryStatus::Archived),
                ..MemoryPatch::default()
            },
        )
        .await
        .unwrap();
    mnemo.flush_links().await;

    assert!(mnemo.search_memories("luhn", None).await.unwrap().is_empty());
    assert!(mnemo.connections_for_task(&task.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_expands_typos_and_skips_non_matches() {
    let (_dir, mnemo) = open().await;
    mnemo
        .create_task(NewTask::new("Handle disconnected clients", TaskLevel::Master))
        .await
        .unwrap();
    mnemo
        .create_task(NewTask::new("Write release notes", TaskLevel::Master))
        .await
        .unwrap();

    let hits = mnemo.search_tasks("disconneted", None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].item.title, "Handle disconnected clients");
}

#[tokio::test]
async fn status_tree_and_cascade_delete() {
    let (_dir, mnemo) = open().await;
    let master = mnemo
        .create_task(NewTask::new("Launch", TaskLevel::Master).in_project("shop"))
        .await
        .unwrap();
    let epic = mnemo
        .create_task(NewTask::new("Checkout", TaskLevel::Epic).under(&master.id))
        .await
        .unwrap();
    let task = mnemo
        .create_task(NewTask::new("Payment form", TaskLevel::Task).under(&epic.id))
        .await
        .unwrap();
    let subtask = mnemo
        .create_task(NewTask::new("Validate card", TaskLevel::Subtask).under(&task.id))
        .await
        .unwrap();
    mnemo.flush_links().await;

    for status in [TaskStatus::InProgress, TaskStatus::Done] {
        mnemo
            .update_task(
                &subtask.id,
                mnemo::TaskPatch {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
    assert_eq!(mnemo.task_status(&master.id).await.unwrap(), TaskStatus::Done);
    let tree = mnemo.task_tree(Some("shop")).await.unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].children[0].children[0].children[0].task.id, subtask.id);

    let err = mnemo.delete_task(&epic.id, false).await.unwrap_err();
    assert!(matches!(err, MnemoError::InvalidHierarchy(_)));

    let deleted = mnemo.delete_task(&master.id, true).await.unwrap();
    assert_eq!(deleted.len(), 4);
    assert!(mnemo.list_tasks(&TaskFilter::default()).await.unwrap().is_empty());

    let backups = mnemo.list_backups().await.unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].manifest.operation, CASCADE_BACKUP_LABEL);
    assert_eq!(backups[0].manifest.contents.task_count, 4);
}

#[tokio::test]
async fn backup_restore_round_trip() {
    let (_dir, mnemo) = open().await;
    let master = mnemo.create_task(checkout_master()).await.unwrap();
    mnemo
        .create_task(NewTask::new("Cart", TaskLevel::Epic).under(&master.id))
        .await
        .unwrap();
    mnemo.create_memory(payment_note()).await.unwrap();
    mnemo.flush_links().await;

    let handle = mnemo.backup("manual").await.unwrap();
    assert_eq!(handle.manifest.contents.task_count, 2);
    assert_eq!(handle.manifest.contents.memory_count, 1);

    mnemo.delete_task(&master.id, true).await.unwrap();
    assert!(mnemo.list_tasks(&TaskFilter::default()).await.unwrap().is_empty());

    let opened = mnemo.open_backup(handle.path.clone()).await.unwrap();
    let report = mnemo.restore(&opened).await.unwrap();
    assert_eq!(report.restored.tasks, 2);
    assert_eq!(mnemo.list_tasks(&TaskFilter::default()).await.unwrap().len(), 2);

    let health = mnemo.health_check().await.unwrap();
    assert_eq!(health.status, mnemo::HealthStatus::Healthy);
    assert_eq!(health.tasks, 2);
}
