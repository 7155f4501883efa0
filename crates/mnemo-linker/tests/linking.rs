// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use chrono::Utc;
use mnemo_core::{Category, ConnectionType, Memory, NewMemory, NewTask, TaskLevel};
use mnemo_linker::{Linker, RelevanceEngine};
use mnemo_query::QueryExpander;
use mnemo_test_utils::{MockSemanticProvider, TestHarness};
use tracing_test::traced_test;

fn engine(harness: &TestHarness, provider: MockSemanticProvider) -> RelevanceEngine {
    RelevanceEngine::new(Arc::new(QueryExpander::default()), &harness.config.linking)
        .with_provider(Arc::new(provider))
}

fn memory(content: &str, project: &str, tags: &[&str], category: Category) -> Memory {
    let mut input = NewMemory::new(content);
    input.project = Some(project.to_string());
    input.tags = tags.iter().map(|t| t.to_string()).collect();
    input.category = Some(category);
    Memory::new(input, Utc::now()).unwrap()
}

#[tokio::test]
async fn project_and_tags_alone_reach_forty_percent() {
    let harness = TestHarness::new().await.unwrap();
    let engine = engine(&harness, MockSemanticProvider::fixed(0.0));

    let mut input = NewTask::new("Quarterly garden", TaskLevel::Master).in_project("home");
    input.tags = vec!["alpha".into(), "beta".into()];
    let task = harness.tasks.create_task(input).await.unwrap();
    let memory = memory("Unrelated words entirely", "home", &["alpha", "beta"], Category::Personal);

    let score = engine.score(&task, &memory).await;
    assert!(score.total >= 0.40 - 1e-9, "total {}", score.total);
    assert_eq!(score.breakdown.semantic, 0.0);
    assert!(!score.degraded);
    assert_eq!(engine.classify(&score, false), ConnectionType::TagBased);
}

#[tokio::test]
async fn strong_text_match_is_semantic() {
    let harness = TestHarness::new().await.unwrap();
    let engine = engine(&harness, MockSemanticProvider::fixed(0.9));

    let task = harness
        .tasks
        .create_task(NewTask::new("Fix parse_header crash", TaskLevel::Master).in_project("a"))
        .await
        .unwrap();
    let memory = memory(
        "parse_header crash happens on CRLF input; fix by trimming",
        "b",
        &[],
        Category::General,
    );

    let score = engine.score(&task, &memory).await;
    assert!(score.breakdown.keywords > 0.0);
    assert!(score.breakdown.technical > 0.0);
    assert_eq!(engine.classify(&score, false), ConnectionType::Semantic);
    assert_eq!(engine.classify(&score, true), ConnectionType::Explicit);
}

#[tokio::test]
#[traced_test]
async fn provider_failure_degrades_to_lexical_overlap() {
    let harness = TestHarness::new().await.unwrap();
    let engine = engine(&harness, MockSemanticProvider::failing());

    let task = harness
        .tasks
        .create_task(NewTask::new("database migration", TaskLevel::Master))
        .await
        .unwrap();
    let memory = memory("database migration notes", "default", &[], Category::Code);

    let score = engine.score(&task, &memory).await;
    assert!(score.degraded);
    assert!(score.breakdown.semantic > 0.0);
    assert!(logs_contain("falling back to lexical overlap"));
    assert!(logs_contain("mock-semantic"));
}

#[tokio::test]
async fn relink_twice_is_idempotent_and_keeps_explicit_links() {
    let harness = TestHarness::new().await.unwrap();
    let engine = Arc::new(engine(&harness, MockSemanticProvider::fixed(0.5)));
    let linker = Linker::new(
        engine,
        harness.store.clone(),
        Arc::clone(&harness.tasks),
        &harness.config.linking,
    );

    let [master, epic, _, _] = harness.seed_chain("shop").await.unwrap();
    for content in ["Checkout flow redesign", "Payment form validation", "Card numbers"] {
        let m = memory(content, "shop", &[], Category::Work);
        harness.store.write(&m).await.unwrap();
    }
    let outsider = memory("Garden notes", "home", &[], Category::Personal);
    harness.store.write(&outsider).await.unwrap();
    harness
        .tasks
        .link_memory_explicit(&master.id, &outsider.id)
        .await
        .unwrap();

    let first = linker.relink_all_tasks().await.unwrap();
    let after_first = harness.tasks.get_task(&epic.id).await.unwrap();
    let second = linker.relink_all_tasks().await.unwrap();
    let after_second = harness.tasks.get_task(&epic.id).await.unwrap();

    assert_eq!(first.entities, 4);
    assert_eq!(first.connections, second.connections);
    assert_eq!(second.updated, 0);
    assert_eq!(after_first.memory_connections, after_second.memory_connections);
    assert!(!after_first.memory_connections.is_empty());

    let master = harness.tasks.get_task(&master.id).await.unwrap();
    assert!(master.has_explicit_link(&outsider.id));
    assert_eq!(
        master
            .memory_connections
            .iter()
            .filter(|c| c.memory_id == outsider.id)
            .count(),
        1
    );
}

#[tokio::test]
async fn link_memory_connects_tasks_and_related_memories() {
    let harness = TestHarness::new().await.unwrap();
    let engine = Arc::new(engine(&harness, MockSemanticProvider::fixed(0.6)));
    let linker = Linker::new(
        engine,
        harness.store.clone(),
        Arc::clone(&harness.tasks),
        &harness.config.linking,
    );

    let task = harness
        .tasks
        .create_task(NewTask::new("Tune cache eviction", TaskLevel::Master).in_project("core"))
        .await
        .unwrap();
    let older = memory("Cache eviction uses LRU", "core", &["cache"], Category::Code);
    harness.store.write(&older).await.unwrap();
    let newer = memory("Cache eviction benchmark", "core", &["cache"], Category::Code);
    harness.store.write(&newer).await.unwrap();

    let linked = linker.link_memory(&newer.id).await.unwrap();
    assert_eq!(linked.related_memory_ids, vec![older.id.clone()]);

    let task = harness.tasks.get_task(&task.id).await.unwrap();
    assert!(task.memory_connections.iter().any(|c| c.memory_id == newer.id));
}

#[tokio::test]
async fn threshold_filters_weak_pairs() {
    let harness = TestHarness::builder().with_threshold(5.0).build().await.unwrap();
    let engine = Arc::new(engine(&harness, MockSemanticProvider::fixed(1.0)));
    let linker = Linker::new(
        engine,
        harness.store.clone(),
        Arc::clone(&harness.tasks),
        &harness.config.linking,
    );
    let task = harness
        .tasks
        .create_task(NewTask::new("Anything", TaskLevel::Master))
        .await
        .unwrap();
    harness
        .store
        .write(&memory("Anything at all", "default", &[], Category::General))
        .await
        .unwrap();

    let task = linker.link_task(&task.id).await.unwrap();
    assert!(task.memory_connections.is_empty());
}
