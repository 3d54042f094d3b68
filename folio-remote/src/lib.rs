//! # Folio Remote
//!
//! The HTTP-backed [`folio_core::RemoteStore`] implementation. Works
//! against Supabase, whose wire API is `PostgREST`, or any other
//! endpoint speaking that protocol.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod postgrest;

pub use postgrest::{PostgrestStore, RemoteConfigError};

/// Folio remote adapter version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
