//! Append-only guest message log.
//!
//! Visitor messages are inserted into the `contact_messages` collection
//! and never read back by this subsystem.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::record::now_ms;
use crate::store::{RemoteStore, StoreError};

/// A message submitted through the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestMessage {
    /// Sender name.
    pub name: String,
    /// Sender email address.
    pub email: String,
    /// Optional phone number.
    pub phone: String,
    /// Message body.
    pub message: String,
}

/// Row appended to the message collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GuestMessageRow {
    name: String,
    email: String,
    phone: String,
    message: String,
    created_at: u64,
}

/// Errors from submitting a guest message.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// A required field was left empty.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// The insert failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Write-side handle for the guest message collection.
pub struct MessageLog {
    store: Arc<dyn RemoteStore>,
}

impl MessageLog {
    /// Collection the messages are appended to.
    pub const COLLECTION: &'static str = "contact_messages";

    /// Create a log backed by the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Append a guest message, stamping the creation time.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MissingField`] when name, email, or the
    /// message body is empty; otherwise the store error from the insert.
    pub async fn submit(&self, message: GuestMessage) -> Result<(), MessageError> {
        if message.name.trim().is_empty() {
            return Err(MessageError::MissingField("name"));
        }
        if message.email.trim().is_empty() {
            return Err(MessageError::MissingField("email"));
        }
        if message.message.trim().is_empty() {
            return Err(MessageError::MissingField("message"));
        }

        let row = GuestMessageRow {
            name: message.name,
            email: message.email,
            phone: message.phone,
            message: message.message,
            created_at: now_ms(),
        };
        let row =
            serde_json::to_value(row).map_err(|e| StoreError::RowDecode(e.to_string()))?;
        self.store.insert(Self::COLLECTION, row).await?;
        tracing::debug!("guest message appended");
        Ok(())
    }
}
