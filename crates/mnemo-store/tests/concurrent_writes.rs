// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrent writers of the same entity id.

use chrono::Utc;
use mnemo_core::{Memory, NewMemory};
use mnemo_store::{EntityStore, walk_files};

/// Same-id writes race without locking: the last rename wins and the file is
/// always one complete version.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_id_writes_are_last_writer_wins_and_never_torn() {
    let dir = tempfile::tempdir().unwrap();
    let store = EntityStore::new(dir.path());
    store.init().await.unwrap();

    let mut input = NewMemory::new("version 0");
    input.id = Some("shared-id".into());
    let base = Memory::new(input, Utc::now()).unwrap();
    store.write(&base).await.unwrap();

    let versions: Vec<String> = (1..=16)
        .map(|i| format!("version {i}\n{}", "payload ".repeat(512)))
        .collect();

    let mut handles = Vec::new();
    for content in versions.clone() {
        let store = store.clone();
        let mut memory = base.clone();
        memory.content = content;
        handles.push(tokio::spawn(async move { store.write(&memory).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let read: Memory = store.read("shared-id").await.unwrap();
    assert!(
        versions.contains(&read.content),
        "file content must be one complete version"
    );

    let files = walk_files(dir.path(), 4).await.unwrap();
    assert_eq!(files.len(), 1, "no temp files may remain: {files:?}");
}

/// The last sequential write is the one that is read back.
#[tokio::test]
async fn sequential_overwrite_keeps_last_version() {
    let dir = tempfile::tempdir().unwrap();
    let store = EntityStore::new(dir.path());
    let mut memory = Memory::new(NewMemory::new("first"), Utc::now()).unwrap();
    store.write(&memory).await.unwrap();
    memory.content = "second".into();
    store.write(&memory).await.unwrap();

    let read: Memory = store.read(&memory.id).await.unwrap();
    assert_eq!(read.content, "second");
}
