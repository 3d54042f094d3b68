//! Reconciliation between compiled-in defaults and the remote store.
//!
//! One generic algorithm covers every record type: fetch the remote
//! representation, seed the store from defaults when it is absent,
//! merge remote rows over defaults when it is present, and commit edits
//! back idempotently. [`ProjectCatalog`] extends the same rules to the
//! repeatable project list, where seeding matches defaults to existing
//! rows by title.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::project::Project;
use crate::record::{flatten, now_ms, row_id, unflatten, RecordSchema};
use crate::store::{RemoteStore, StoreError};

/// Anything that can persist an edited record.
///
/// [`crate::EditSession::save`] commits through this seam so singleton
/// records and catalog projects share one session implementation.
#[async_trait]
pub trait Committer<T>: Send + Sync {
    /// Persist `record`, adopting any identifier the store assigns.
    ///
    /// # Errors
    ///
    /// Returns the store error when the record could not be persisted.
    async fn commit(&self, record: &mut T) -> Result<(), StoreError>;
}

/// Default-vs-remote reconciliation for a singleton record type.
pub struct ReconciliationEngine<T: RecordSchema> {
    store: Arc<dyn RemoteStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T: RecordSchema> ReconciliationEngine<T> {
    /// Create an engine backed by the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Load the current record.
    ///
    /// An empty collection is seeded from the compiled-in defaults; a
    /// failed seed insert is non-fatal and degrades to returning the
    /// defaults unpersisted. An existing row is unflattened over the
    /// defaults so rows missing newer columns still load.
    ///
    /// # Errors
    ///
    /// Propagates the store error when the collection cannot be read at
    /// all; callers fall back to defaults and surface the message.
    pub async fn load(&self) -> Result<T, StoreError> {
        let rows = self.store.select_all(T::COLLECTION).await?;
        match rows.first() {
            Some(row) => unflatten(row),
            None => Ok(self.seed().await),
        }
    }

    /// First-time population of the collection from defaults.
    async fn seed(&self) -> T {
        let mut record = T::defaults();
        record.touch(now_ms());
        let row = match flatten(&record) {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(collection = T::COLLECTION, error = %e, "could not flatten defaults");
                return record;
            }
        };
        match self.store.insert(T::COLLECTION, row).await {
            Ok(stored) => {
                if let Some(id) = row_id(&stored) {
                    record.assign_id(id);
                }
                tracing::info!(collection = T::COLLECTION, "seeded defaults into empty collection");
            }
            Err(e) => {
                tracing::warn!(
                    collection = T::COLLECTION,
                    error = %e,
                    "seed insert failed; continuing with unpersisted defaults"
                );
            }
        }
        record
    }

    /// Persist an edited record.
    ///
    /// A record without an identifier first re-queries the collection
    /// and adopts the existing row's identifier if one exists, so a
    /// singleton is never duplicated. Committing the same record twice
    /// updates one row and leaves the identifier unchanged.
    ///
    /// # Errors
    ///
    /// Returns the store error; the caller's buffer is left untouched.
    pub async fn commit(&self, record: &mut T) -> Result<(), StoreError> {
        if record.id().is_none() {
            if let Some(row) = self.store.select_all(T::COLLECTION).await?.first() {
                if let Some(id) = row_id(row) {
                    record.assign_id(id);
                }
            }
        }
        record.touch(now_ms());
        let row = flatten(record)?;
        let stored = self.store.upsert(T::COLLECTION, row).await?;
        if let Some(id) = row_id(&stored) {
            record.assign_id(id);
        }
        Ok(())
    }
}

#[async_trait]
impl<T: RecordSchema> Committer<T> for ReconciliationEngine<T> {
    async fn commit(&self, record: &mut T) -> Result<(), StoreError> {
        Self::commit(self, record).await
    }
}

/// Errors from project catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Mutating the catalog requires an editor token.
    #[error("editing requires an editor token")]
    NotAuthorized,
    /// A required field was left empty when adding a project.
    #[error("project {0} is required")]
    MissingField(&'static str),
    /// The underlying store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reconciliation for the repeatable project list.
///
/// Seeding matches each default entry to an existing remote row by exact
/// title equality: matched defaults update their row in place (keeping
/// the remote identifier and creation stamp), unmatched defaults insert,
/// and remote-only rows are never touched.
pub struct ProjectCatalog {
    store: Arc<dyn RemoteStore>,
}

impl ProjectCatalog {
    /// Create a catalog backed by the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Load the project list, seeding defaults first.
    ///
    /// Per-entry seed failures are logged and skipped; the returned list
    /// reflects whatever the store holds afterwards, newest first.
    ///
    /// # Errors
    ///
    /// Propagates the store error when the collection cannot be read.
    pub async fn load(&self) -> Result<Vec<Project>, StoreError> {
        let rows = self.store.select_all(Project::COLLECTION).await?;
        let remote: Vec<Project> = rows
            .iter()
            .map(unflatten::<Project>)
            .collect::<Result<_, _>>()?;

        for default in Project::catalog_defaults() {
            self.seed_entry(default, &remote).await;
        }

        let rows = self.store.select_all(Project::COLLECTION).await?;
        let mut projects: Vec<Project> = rows
            .iter()
            .map(unflatten::<Project>)
            .collect::<Result<_, _>>()?;
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    /// Reconcile one default entry against the remote list.
    async fn seed_entry(&self, default: Project, remote: &[Project]) {
        let mut candidate = default;
        let result = match remote.iter().find(|p| p.title == candidate.title) {
            Some(existing) => {
                let Some(id) = existing.id else {
                    tracing::warn!(title = %candidate.title, "remote project row has no id; skipping");
                    return;
                };
                candidate.assign_id(id);
                candidate.created_at = existing.created_at;
                match flatten(&candidate) {
                    Ok(row) => self.store.upsert(Project::COLLECTION, row).await.map(|_| ()),
                    Err(e) => Err(e),
                }
            }
            None => {
                candidate.touch(now_ms());
                match flatten(&candidate) {
                    Ok(row) => self.store.insert(Project::COLLECTION, row).await.map(|_| ()),
                    Err(e) => Err(e),
                }
            }
        };
        if let Err(e) = result {
            tracing::warn!(title = %candidate.title, error = %e, "project seed failed; skipping entry");
        }
    }

    /// Add a new project entered by the editor.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingField`] when a required field is
    /// empty, or the store error from the insert.
    pub async fn add(&self, mut project: Project) -> Result<Project, CatalogError> {
        if project.title.trim().is_empty() {
            return Err(CatalogError::MissingField("title"));
        }
        if project.description.trim().is_empty() {
            return Err(CatalogError::MissingField("description"));
        }
        if project.link.trim().is_empty() {
            return Err(CatalogError::MissingField("link"));
        }
        if project.image.trim().is_empty() {
            return Err(CatalogError::MissingField("image"));
        }

        project.touch(now_ms());
        let row = flatten(&project)?;
        let stored = self.store.insert(Project::COLLECTION, row).await?;
        if let Some(id) = row_id(&stored) {
            project.assign_id(id);
        }
        Ok(project)
    }

    /// Persist edits to an existing project.
    ///
    /// A project without an identifier is matched to a remote row by
    /// title before upserting, mirroring the seeding tie-break.
    ///
    /// # Errors
    ///
    /// Returns the store error; the record is otherwise untouched.
    pub async fn commit(&self, project: &mut Project) -> Result<(), StoreError> {
        if project.id().is_none() {
            let rows = self.store.select_all(Project::COLLECTION).await?;
            for row in &rows {
                let remote: Project = unflatten(row)?;
                if remote.title == project.title {
                    if let Some(id) = remote.id {
                        project.assign_id(id);
                        project.created_at = remote.created_at;
                    }
                    break;
                }
            }
        }
        project.touch(now_ms());
        let row = flatten(project)?;
        let stored = self.store.upsert(Project::COLLECTION, row).await?;
        if let Some(id) = row_id(&stored) {
            project.assign_id(id);
        }
        Ok(())
    }

    /// Delete a project by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StaleDeleteTarget`] when the project was
    /// never persisted (no identifier); this is surfaced to the editor
    /// rather than silently ignored.
    pub async fn remove(&self, id: Option<crate::RecordId>) -> Result<(), StoreError> {
        let id = id.ok_or(StoreError::StaleDeleteTarget)?;
        self.store.delete(Project::COLLECTION, id).await
    }
}

#[async_trait]
impl Committer<Project> for ProjectCatalog {
    async fn commit(&self, record: &mut Project) -> Result<(), StoreError> {
        Self::commit(self, record).await
    }
}
