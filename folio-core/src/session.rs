//! Session-scoped editing over a committed record snapshot.
//!
//! Mutation is gated by an [`EditorToken`] capability handed to the
//! session at construction. Edits accumulate in a buffer distinct from
//! the committed snapshot: cancel discards the buffer, save promotes it
//! only after the remote commit succeeds.

use crate::reconcile::Committer;
use crate::record::RecordSchema;
use crate::store::StoreError;

/// Capability proving the current user may edit content.
///
/// Issued by the authentication boundary once it has verified the
/// editor; a session constructed without one can only view.
#[derive(Debug, Clone)]
pub struct EditorToken(());

impl EditorToken {
    /// Issue a token. Only the authentication boundary should call this.
    #[must_use]
    pub fn issue() -> Self {
        Self(())
    }
}

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Showing the committed snapshot; no buffer exists.
    Viewing,
    /// A buffer is open for edits.
    Editing,
}

/// Errors from session transitions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Editing requires an editor token.
    #[error("editing requires an editor token")]
    NotAuthorized,
    /// The operation needs an open edit buffer.
    #[error("no edit in progress")]
    NotEditing,
    /// A save is already in flight; wait for it to settle.
    #[error("a save is already in progress")]
    SaveInProgress,
    /// The remote commit failed; the buffer is preserved.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An editing session over one content record.
///
/// # Example
///
/// ```
/// use folio_core::{Contact, EditSession, EditorToken, RecordSchema, SessionState};
///
/// let mut session = EditSession::new(Contact::defaults(), Some(EditorToken::issue()));
/// session.begin().unwrap();
/// session.edit(|c| c.title = "Say Hello".to_string()).unwrap();
/// assert_eq!(session.state(), SessionState::Editing);
///
/// // Cancel discards the buffer; the committed snapshot is untouched.
/// session.cancel();
/// assert_eq!(session.committed().title, Contact::defaults().title);
/// ```
#[derive(Debug, Clone)]
pub struct EditSession<T: RecordSchema> {
    committed: T,
    buffer: Option<T>,
    token: Option<EditorToken>,
    pending: bool,
}

impl<T: RecordSchema> EditSession<T> {
    /// Create a session over a committed record.
    #[must_use]
    pub fn new(committed: T, token: Option<EditorToken>) -> Self {
        Self {
            committed,
            buffer: None,
            token,
            pending: false,
        }
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.buffer.is_some() {
            SessionState::Editing
        } else {
            SessionState::Viewing
        }
    }

    /// The last committed snapshot.
    #[must_use]
    pub fn committed(&self) -> &T {
        &self.committed
    }

    /// The in-progress edit buffer, if a session is open.
    #[must_use]
    pub fn buffer(&self) -> Option<&T> {
        self.buffer.as_ref()
    }

    /// Whether a save is currently in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Open an edit buffer copied from the committed snapshot.
    ///
    /// Re-entering while already editing keeps the existing buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthorized`] when the session holds no
    /// editor token.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        if self.token.is_none() {
            return Err(SessionError::NotAuthorized);
        }
        if self.buffer.is_none() {
            self.buffer = Some(self.committed.clone());
        }
        Ok(())
    }

    /// Apply a single mutation to the edit buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotEditing`] when no buffer is open.
    pub fn edit(&mut self, apply: impl FnOnce(&mut T)) -> Result<(), SessionError> {
        let buffer = self.buffer.as_mut().ok_or(SessionError::NotEditing)?;
        apply(buffer);
        Ok(())
    }

    /// Discard the edit buffer without touching the store.
    pub fn cancel(&mut self) {
        self.buffer = None;
        self.pending = false;
    }

    /// Commit the buffer through `committer` and promote it on success.
    ///
    /// While the commit is in flight the session is pending and a second
    /// save is refused. On failure the session stays in `Editing` with
    /// the buffer intact so no in-progress input is lost.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SaveInProgress`] on double submission,
    /// [`SessionError::NotEditing`] without an open buffer, or the store
    /// error from the failed commit.
    pub async fn save(&mut self, committer: &dyn Committer<T>) -> Result<(), SessionError> {
        if self.pending {
            return Err(SessionError::SaveInProgress);
        }
        let Some(buffer) = self.buffer.as_ref() else {
            return Err(SessionError::NotEditing);
        };

        self.pending = true;
        let mut candidate = buffer.clone();
        let result = committer.commit(&mut candidate).await;
        self.pending = false;

        match result {
            Ok(()) => {
                self.committed = candidate;
                self.buffer = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(collection = T::COLLECTION, error = %e, "save failed; keeping edit buffer");
                Err(e.into())
            }
        }
    }
}
