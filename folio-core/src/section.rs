//! Content-area facades wiring engines to edit sessions.
//!
//! Each content area independently drives its reconciliation engine to
//! obtain an initial state, then wraps that state in an edit session for
//! the editor. [`Site`] groups the four areas plus the guest message log
//! over one shared store handle.

use std::sync::Arc;

use crate::about::About;
use crate::contact::Contact;
use crate::message::MessageLog;
use crate::profile::Profile;
use crate::project::Project;
use crate::reconcile::{CatalogError, ProjectCatalog, ReconciliationEngine};
use crate::record::{RecordId, RecordSchema};
use crate::session::{EditSession, EditorToken, SessionError};
use crate::store::RemoteStore;

/// One singleton content area: engine, session, and the last load error.
pub struct Section<T: RecordSchema> {
    engine: ReconciliationEngine<T>,
    session: EditSession<T>,
    token: Option<EditorToken>,
    load_error: Option<String>,
}

impl<T: RecordSchema> Section<T> {
    /// Create a section over the given store.
    ///
    /// The session starts from the compiled-in defaults until
    /// [`Section::activate`] runs the initial load.
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, token: Option<EditorToken>) -> Self {
        Self {
            engine: ReconciliationEngine::new(store),
            session: EditSession::new(T::defaults(), token.clone()),
            token,
            load_error: None,
        }
    }

    /// Run the initial load, seeding the store when empty.
    ///
    /// When the store cannot be read the section falls back to the
    /// defaults and records the error message for the UI to surface.
    pub async fn activate(&mut self) {
        match self.engine.load().await {
            Ok(record) => {
                self.session = EditSession::new(record, self.token.clone());
                self.load_error = None;
            }
            Err(e) => {
                tracing::error!(
                    collection = T::COLLECTION,
                    error = %e,
                    "load failed; falling back to defaults"
                );
                self.load_error = Some(e.to_string());
                self.session = EditSession::new(T::defaults(), self.token.clone());
            }
        }
    }

    /// The committed record currently shown.
    #[must_use]
    pub fn record(&self) -> &T {
        self.session.committed()
    }

    /// The edit session for this area.
    #[must_use]
    pub fn session(&self) -> &EditSession<T> {
        &self.session
    }

    /// Mutable access to the edit session.
    pub fn session_mut(&mut self) -> &mut EditSession<T> {
        &mut self.session
    }

    /// The message of the last failed load, if any.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Save the open edit buffer through this area's engine.
    ///
    /// # Errors
    ///
    /// Propagates [`SessionError`] from the session save.
    pub async fn save(&mut self) -> Result<(), SessionError> {
        self.session.save(&self.engine).await
    }
}

/// The repeatable project list area.
pub struct ProjectArea {
    catalog: ProjectCatalog,
    token: Option<EditorToken>,
    projects: Vec<Project>,
    load_error: Option<String>,
}

impl ProjectArea {
    /// Create the area over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, token: Option<EditorToken>) -> Self {
        Self {
            catalog: ProjectCatalog::new(store),
            token,
            projects: Vec::new(),
            load_error: None,
        }
    }

    /// Run the initial load, seeding defaults into the store.
    ///
    /// Falls back to the compiled-in defaults when the store cannot be
    /// read, recording the error message.
    pub async fn activate(&mut self) {
        match self.catalog.load().await {
            Ok(projects) => {
                self.projects = projects;
                self.load_error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "project load failed; falling back to defaults");
                self.load_error = Some(e.to_string());
                self.projects = Project::catalog_defaults();
            }
        }
    }

    /// The current project list, newest first.
    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// The message of the last failed load, if any.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// The underlying catalog, for editing an individual project.
    #[must_use]
    pub fn catalog(&self) -> &ProjectCatalog {
        &self.catalog
    }

    /// Open an edit session over the project at `index`.
    #[must_use]
    pub fn edit_session(&self, index: usize) -> Option<EditSession<Project>> {
        self.projects
            .get(index)
            .map(|p| EditSession::new(p.clone(), self.token.clone()))
    }

    fn authorize(&self) -> Result<(), CatalogError> {
        if self.token.is_none() {
            return Err(CatalogError::NotAuthorized);
        }
        Ok(())
    }

    /// Add an editor-entered project and prepend it to the list.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotAuthorized`] without an editor token,
    /// [`CatalogError::MissingField`] for incomplete input, or the store
    /// error from the insert.
    pub async fn add(&mut self, project: Project) -> Result<(), CatalogError> {
        self.authorize()?;
        let stored = self.catalog.add(project).await?;
        self.projects.insert(0, stored);
        Ok(())
    }

    /// Delete a project by identifier and drop it from the list.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotAuthorized`] without an editor token;
    /// deleting an unpersisted project surfaces
    /// [`crate::StoreError::StaleDeleteTarget`] and the list is left
    /// unchanged.
    pub async fn remove(&mut self, id: Option<RecordId>) -> Result<(), CatalogError> {
        self.authorize()?;
        self.catalog.remove(id).await?;
        self.projects.retain(|p| p.id != id);
        Ok(())
    }
}

/// Every content area of the site over one shared store handle.
pub struct Site {
    /// The profile/hero area.
    pub profile: Section<Profile>,
    /// The about area.
    pub about: Section<About>,
    /// The contact area.
    pub contact: Section<Contact>,
    /// The project list area.
    pub projects: ProjectArea,
    /// The guest message log.
    pub messages: MessageLog,
}

impl Site {
    /// Create all content areas over a shared store.
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, token: Option<EditorToken>) -> Self {
        Self {
            profile: Section::new(Arc::clone(&store), token.clone()),
            about: Section::new(Arc::clone(&store), token.clone()),
            contact: Section::new(Arc::clone(&store), token.clone()),
            projects: ProjectArea::new(Arc::clone(&store), token),
            messages: MessageLog::new(store),
        }
    }

    /// The collections this site expects the remote store to expose.
    #[must_use]
    pub fn collections() -> [&'static str; 5] {
        [
            Profile::COLLECTION,
            About::COLLECTION,
            Contact::COLLECTION,
            Project::COLLECTION,
            MessageLog::COLLECTION,
        ]
    }

    /// Activate every content area in turn.
    pub async fn activate(&mut self) {
        self.profile.activate().await;
        self.about.activate().await;
        self.contact.activate().await;
        self.projects.activate().await;
    }
}
