// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use mnemo_durability::{Durability, HealthStatus};
use mnemo_tasks::{DeleteOptions, TaskFilter};
use mnemo_test_utils::TestHarness;

fn durability(harness: &TestHarness) -> Durability {
    Durability::from_config(harness.store.clone(), &harness.config)
}

#[tokio::test]
async fn backup_delete_restore_recovers_every_task() {
    let harness = TestHarness::new().await.unwrap();
    let [master, ..] = harness.seed_chain("shop").await.unwrap();
    harness.seed_chain("blog").await.unwrap();
    let durability = durability(&harness);

    let handle = durability.backup("manual").await.unwrap();
    assert_eq!(handle.manifest.contents.task_count, 8);
    assert_eq!(handle.manifest.operation, "manual");
    assert!(handle.path.join("manifest.json").is_file());
    assert!(
        handle
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("_manual")
    );

    harness
        .tasks
        .delete_task(&master.id, DeleteOptions { cascade: true })
        .await
        .unwrap();
    assert_eq!(
        harness.tasks.list_tasks(&TaskFilter::default()).await.unwrap().len(),
        4
    );

    let report = durability.restore(&handle).await.unwrap();
    assert_eq!(report.restored.tasks, 8);
    assert_eq!(report.pre_restore.manifest.contents.task_count, 4);
    assert_eq!(
        harness.tasks.list_tasks(&TaskFilter::default()).await.unwrap().len(),
        8
    );
    assert_eq!(harness.tasks.get_task(&master.id).await.unwrap().id, master.id);

    let backups = durability.list_backups().await.unwrap();
    assert_eq!(backups.len(), 2);
    assert_eq!(backups[1].manifest.operation, "pre-restore");
}

#[tokio::test]
async fn prune_keeps_newest() {
    let harness = TestHarness::new().await.unwrap();
    let durability = durability(&harness);
    let mut handles = Vec::new();
    for label in ["first", "second", "third"] {
        handles.push(durability.backup(label).await.unwrap());
    }

    let removed = durability.prune_backups(1).await.unwrap();
    assert_eq!(removed.len(), 2);
    let left = durability.list_backups().await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].path, handles[2].path);
}

#[tokio::test]
async fn health_check_and_orphan_cleanup() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_chain("shop").await.unwrap();
    let durability = durability(&harness);

    let report = durability.health_check().await.unwrap();
    assert_eq!(report.status, HealthStatus::Healthy);
    assert_eq!(report.tasks, 4);

    let project = harness.root().join("tasks").join("shop");
    tokio::fs::write(project.join("notes.txt"), "stray").await.unwrap();
    tokio::fs::write(project.join(".x.md.0000.tmp"), "half").await.unwrap();
    tokio::fs::write(project.join("broken-00000000.md"), "no header")
        .await
        .unwrap();

    let report = durability.health_check().await.unwrap();
    assert_eq!(report.status, HealthStatus::Error);
    assert_eq!(report.orphans, 2);
    assert_eq!(report.corrupt, 1);
    assert!(project.join("notes.txt").exists(), "health check must not mutate");

    assert_eq!(durability.cleanup_orphans().await.unwrap(), 2);
    assert!(!project.join("notes.txt").exists());
    assert!(project.join("broken-00000000.md").exists());
    assert_eq!(durability.cleanup_orphans().await.unwrap(), 0);
    assert_eq!(durability.list_backups().await.unwrap().len(), 1);
}
