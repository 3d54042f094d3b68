//! # Folio Core
//!
//! Core content logic for an editable portfolio site: a small set of
//! content records (profile, about, contact, projects) kept consistent
//! between compiled-in defaults and a remote row store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 folio-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Records          │  Reconciliation         │
//! │  - Profile        │  - load / seed / merge  │
//! │  - About          │  - idempotent commit    │
//! │  - Contact        │  - project catalog      │
//! │  - Project        │                         │
//! ├─────────────────────────────────────────────┤
//! │  Edit sessions    │  Remote store           │
//! │  - editor token   │  - select / insert      │
//! │  - buffer/cancel  │  - upsert / delete      │
//! │  - guarded save   │  - in-memory impl       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Each content area owns a [`ReconciliationEngine`] that decides whether
//! to read from defaults or from the remote store, seeds the store on
//! first load, and commits edits back idempotently. [`EditSession`] keeps
//! in-progress edits apart from the last committed snapshot.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod about;
pub mod contact;
pub mod message;
pub mod profile;
pub mod project;
pub mod reconcile;
pub mod record;
pub mod section;
pub mod session;
pub mod store;

pub use about::{About, ResumeEntry};
pub use contact::{Contact, SocialLinks};
pub use message::{GuestMessage, MessageError, MessageLog};
pub use profile::Profile;
pub use project::Project;
pub use reconcile::{CatalogError, Committer, ProjectCatalog, ReconciliationEngine};
pub use record::{now_ms, RecordId, RecordSchema};
pub use section::{ProjectArea, Section, Site};
pub use session::{EditSession, EditorToken, SessionError, SessionState};
pub use store::{MemoryStore, RemoteStore, StoreError};

/// Folio core version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
