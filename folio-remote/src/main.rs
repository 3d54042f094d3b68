//! # folio-sync
//!
//! Activates every content area against a configured PostgREST endpoint:
//! first-time runs seed the compiled-in defaults, later runs reconcile
//! remote rows over them. Prints what each area resolved to.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_core::{EditorToken, Site};
use folio_remote::PostgrestStore;

/// Command-line and environment configuration.
#[derive(Debug, Parser)]
#[command(name = "folio-sync", version, about = "Reconcile Folio content with its remote store")]
struct Args {
    /// Base URL of the PostgREST endpoint backing the site content.
    #[arg(long, env = "FOLIO_STORE_URL")]
    store_url: String,

    /// API key, sent as `apikey` and as a bearer token.
    #[arg(long, env = "FOLIO_STORE_KEY")]
    api_key: Option<String>,

    /// Activate with editing enabled (issues an editor token).
    #[arg(long)]
    editor: bool,
}

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels. Set `RUST_LOG_FORMAT=json` for
/// JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,folio_sync=debug,folio_core=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let store = PostgrestStore::new(&args.store_url, args.api_key.as_deref())?;
    let token = args.editor.then(EditorToken::issue);

    tracing::info!(
        store = %args.store_url,
        collections = ?Site::collections(),
        "activating content areas"
    );

    let mut site = Site::new(Arc::new(store), token);
    site.activate().await;

    let area_errors = [
        ("profile", site.profile.load_error()),
        ("about", site.about.load_error()),
        ("contact", site.contact.load_error()),
        ("projects", site.projects.load_error()),
    ];
    let mut failed = 0;
    for (area, error) in area_errors {
        if let Some(message) = error {
            failed += 1;
            tracing::warn!(area, %message, "area fell back to compiled-in defaults");
        }
    }

    tracing::info!(
        profile = %site.profile.record().name,
        about = %site.about.record().title,
        contact = %site.contact.record().email,
        projects = site.projects.projects().len(),
        "content activated"
    );

    if failed == area_errors.len() {
        anyhow::bail!("no content area could reach the remote store");
    }
    Ok(())
}
