// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The file-backed entity store.
//!
//! Every entity lives in exactly one file; there is no in-memory cache.
//! Writes go to a sibling temp file that is renamed over the target, so a
//! reader never observes a torn file and concurrent writers of the same id
//! resolve to whichever rename lands last.

use std::path::{Path, PathBuf};

use futures::stream::{self, BoxStream, StreamExt};
use mnemo_core::{EntityKind, MnemoError, Task, sanitize_project};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::codec::Entity;
use crate::layout::{
    ENTITY_EXT, ROOT_SEQ_FILE, id_suffix, is_temp_file, kind_dir, project_dir, temp_path_for,
};
use crate::walk::{subdirectories, walk_files};

/// Depth of entity files below a kind directory (`<project>/<file>`).
pub(crate) const ENTITY_DEPTH: usize = 2;

/// Result of listing one entity family.
#[derive(Debug)]
pub struct Listing<E> {
    pub items: Vec<E>,
    /// Files that failed to decode and were skipped.
    pub corrupt: usize,
}

/// File-backed store for memories and tasks beneath one storage root.
#[derive(Debug, Clone)]
pub struct EntityStore {
    root: PathBuf,
}

impl EntityStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the `tasks/` and `memories/` trees if missing.
    pub async fn init(&self) -> Result<(), MnemoError> {
        for kind in [EntityKind::Task, EntityKind::Memory] {
            let dir = kind_dir(&self.root, kind);
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| MnemoError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Absolute path of the file backing `entity`.
    pub fn entity_path<E: Entity>(&self, entity: &E) -> PathBuf {
        project_dir(&self.root, E::KIND, entity.project()).join(entity.file_name())
    }

    /// Persists `entity`, replacing any previous version at the same location.
    pub async fn write<E: Entity>(&self, entity: &E) -> Result<PathBuf, MnemoError> {
        let path = self.entity_path(entity);
        write_atomic(&path, &entity.encode()?).await?;
        debug!(kind = %E::KIND, id = entity.id(), path = %path.display(), "entity written");
        Ok(path)
    }

    /// Persists `entity` and removes the file of `previous` if it lived elsewhere.
    ///
    /// Used when a task's path or a memory's project changes. The new file is
    /// written before the old one is removed.
    pub async fn replace<E: Entity>(&self, previous: &E, entity: &E) -> Result<PathBuf, MnemoError> {
        let old_path = self.entity_path(previous);
        let new_path = self.write(entity).await?;
        if old_path != new_path {
            remove_if_exists(&old_path).await?;
            debug!(
                kind = %E::KIND,
                id = entity.id(),
                from = %old_path.display(),
                to = %new_path.display(),
                "entity moved"
            );
        }
        Ok(new_path)
    }

    /// Reads the entity with `id`, or [`MnemoError::NotFound`].
    pub async fn read<E: Entity>(&self, id: &str) -> Result<E, MnemoError> {
        match self.locate::<E>(id).await? {
            Some((_, entity)) => Ok(entity),
            None => Err(MnemoError::not_found(E::KIND, id)),
        }
    }

    /// Path and decoded entity for `id`, if present.
    pub async fn locate<E: Entity>(&self, id: &str) -> Result<Option<(PathBuf, E)>, MnemoError> {
        for candidate in self.candidates::<E>(id).await? {
            match read_entity::<E>(&candidate).await {
                Ok(entity) if entity.id() == id => return Ok(Some((candidate, entity))),
                Ok(_) => continue,
                Err(MnemoError::Corrupt { path, reason }) => {
                    warn!(path = %path.display(), %reason, "skipping corrupt entity file");
                }
                Err(e) if is_vanished(&e) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Files that may hold `id`, found by name without decoding.
    async fn candidates<E: Entity>(&self, id: &str) -> Result<Vec<PathBuf>, MnemoError> {
        let projects = subdirectories(&kind_dir(&self.root, E::KIND)).await?;
        let mut out = Vec::new();
        match E::KIND {
            EntityKind::Memory => {
                let name = crate::layout::memory_file_name(id);
                for project in projects {
                    let path = project.join(&name);
                    if tokio::fs::try_exists(&path)
                        .await
                        .map_err(|e| MnemoError::io(&path, e))?
                    {
                        out.push(path);
                    }
                }
            }
            EntityKind::Task => {
                let suffix = format!("-{}.{ENTITY_EXT}", id_suffix(id));
                for project in projects {
                    for file in walk_files(&project, 1).await? {
                        let matches = file
                            .path
                            .file_name()
                            .is_some_and(|n| n.to_string_lossy().ends_with(&suffix));
                        if matches {
                            out.push(file.path);
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    /// Lazily decoded entities of one family, optionally limited to a project.
    ///
    /// The directory walk happens up front; each file is read and decoded only
    /// when the stream is polled. Corrupt files surface as
    /// [`MnemoError::Corrupt`] items.
    pub async fn stream<E: Entity>(
        &self,
        project: Option<&str>,
    ) -> Result<BoxStream<'static, Result<E, MnemoError>>, MnemoError> {
        let files = self.entity_files::<E>(project).await?;
        Ok(stream::iter(files)
            .then(|path| async move { read_entity::<E>(&path).await })
            .boxed())
    }

    /// Every decodable entity accepted by `filter`, in path order.
    pub async fn list<E, F>(&self, project: Option<&str>, mut filter: F) -> Result<Listing<E>, MnemoError>
    where
        E: Entity,
        F: FnMut(&E) -> bool,
    {
        let mut entities = self.stream::<E>(project).await?;
        let mut items = Vec::new();
        let mut corrupt = 0;
        while let Some(next) = entities.next().await {
            match next {
                Ok(entity) => {
                    if filter(&entity) {
                        items.push(entity);
                    }
                }
                Err(MnemoError::Corrupt { path, reason }) => {
                    corrupt += 1;
                    warn!(path = %path.display(), %reason, "skipping corrupt entity file");
                }
                Err(e) if is_vanished(&e) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(Listing { items, corrupt })
    }

    /// Entity files (by name) of one family.
    async fn entity_files<E: Entity>(&self, project: Option<&str>) -> Result<Vec<PathBuf>, MnemoError> {
        let (root, depth) = match project {
            Some(p) => (project_dir(&self.root, E::KIND, p), 1),
            None => (kind_dir(&self.root, E::KIND), ENTITY_DEPTH),
        };
        Ok(walk_files(&root, depth)
            .await?
            .into_iter()
            .filter(|f| f.depth == depth && is_entity_file_name(&f.path))
            .map(|f| f.path)
            .collect())
    }

    /// Removes the file backing `id`, or [`MnemoError::NotFound`].
    pub async fn delete<E: Entity>(&self, id: &str) -> Result<E, MnemoError> {
        let Some((path, entity)) = self.locate::<E>(id).await? else {
            return Err(MnemoError::not_found(E::KIND, id));
        };
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| MnemoError::io(&path, e))?;
        debug!(kind = %E::KIND, id, path = %path.display(), "entity deleted");
        Ok(entity)
    }

    /// Highest master `path_order` ever assigned in `project`.
    pub async fn read_root_seq(&self, project: &str) -> Result<u32, MnemoError> {
        let path = self.root_seq_path(project);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => text.trim().parse().map_err(|_| MnemoError::Corrupt {
                path: path.clone(),
                reason: format!("`{}` is not a sequence number", text.trim()),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(MnemoError::io(&path, e)),
        }
    }

    pub async fn write_root_seq(&self, project: &str, value: u32) -> Result<(), MnemoError> {
        write_atomic(&self.root_seq_path(project), &format!("{value}\n")).await
    }

    fn root_seq_path(&self, project: &str) -> PathBuf {
        project_dir(&self.root, EntityKind::Task, project).join(ROOT_SEQ_FILE)
    }

    /// Tasks whose `parent_id` is `parent` (or masters when `None`) in `project`.
    pub async fn siblings(&self, project: &str, parent: Option<&str>) -> Result<Vec<Task>, MnemoError> {
        let project = sanitize_project(project);
        Ok(self
            .list::<Task, _>(Some(&project), |t| t.parent_id.as_deref() == parent)
            .await?
            .items)
    }
}

/// Reads and decodes one entity file.
pub async fn read_entity<E: Entity>(path: &Path) -> Result<E, MnemoError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MnemoError::io(path, e))?;
    E::decode(&text, path)
}

/// Writes `contents` to a sibling temp file, syncs it, then renames it over `path`.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<(), MnemoError> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| MnemoError::io(dir, e))?;
    }
    let tmp = temp_path_for(path);
    let result = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;
    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(MnemoError::io(path, e));
    }
    Ok(())
}

async fn remove_if_exists(path: &Path) -> Result<(), MnemoError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MnemoError::io(path, e)),
    }
}

/// `*.md` and not an in-flight temp file.
pub(crate) fn is_entity_file_name(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    !name.starts_with('.')
        && !is_temp_file(&name)
        && path.extension().is_some_and(|ext| ext == ENTITY_EXT)
}

/// A file deleted between the walk and the read.
fn is_vanished(err: &MnemoError) -> bool {
    matches!(err, MnemoError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
}
