//! Project record - the repeatable portfolio entry.

use serde::{Deserialize, Serialize};

use crate::record::{RecordId, RecordSchema};

/// One portfolio project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Store-assigned identifier, absent until first persisted.
    pub id: Option<RecordId>,
    /// Project title. Seeding matches defaults to remote rows by this
    /// exact string.
    pub title: String,
    /// Project description.
    pub description: String,
    /// Technology tags.
    pub tags: Vec<String>,
    /// Link to the live project or repository.
    pub link: String,
    /// Thumbnail image: a remote URL or an embedded data URI.
    pub image: String,
    /// Creation timestamp in ms since epoch; assigned on first persist.
    pub created_at: u64,
}

impl Project {
    /// The compiled-in default project list, in display order.
    #[must_use]
    pub fn catalog_defaults() -> Vec<Self> {
        let entry = |title: &str, description: &str, tags: &[&str], link: &str, image: &str| Self {
            id: None,
            title: title.to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            link: link.to_string(),
            image: image.to_string(),
            created_at: 0,
        };
        vec![
            entry(
                "Restaurant Website",
                "A modern restaurant site showcasing menus, chef specials, customer \
                 reviews, and contact information, with a clean responsive design \
                 optimized for mobile and desktop.",
                &["HTML", "CSS", "JS"],
                "https://github.com/jordan-avery/restaurant-website",
                "/assets/projects/restaurant.png",
            ),
            entry(
                "Invoice Generator - .NET",
                "A desktop invoice generator that produces professional invoices \
                 with customer details, itemized billing, automatic calculations, \
                 and PDF export.",
                &["C#", "ASP.NET", "PDF"],
                "https://github.com/jordan-avery/invoice-generator-dotnet",
                "/assets/projects/invoice-dotnet.png",
            ),
            entry(
                "Invoice Generator - Python",
                "A practical invoice generator for entering client details, \
                 itemized services, prices, and tax calculations, emitting \
                 well-formatted invoices.",
                &["Python", "Tkinter", "PDF"],
                "https://github.com/jordan-avery/invoice-generator-python",
                "/assets/projects/invoice-python.png",
            ),
            entry(
                "Invoice Generator Software",
                "A user-friendly invoice tool that takes client information, \
                 itemized charges, quantity, and pricing, and calculates totals \
                 including taxes.",
                &["HTML", "CSS", "JS", "PDF"],
                "https://github.com/jordan-avery/invoice-generator",
                "/assets/projects/invoice-web.png",
            ),
        ]
    }
}

/// Normalize a user-entered link into something a browser can follow.
///
/// Bare hosts get an `https://` prefix; protocol-relative links get
/// `https:`; empty input collapses to `#`.
#[must_use]
pub fn normalize_link(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return "#".to_string();
    }
    if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
        || trimmed.starts_with("mailto:")
        || trimmed.starts_with("tel:")
    {
        return trimmed.to_string();
    }
    if trimmed.starts_with("//") {
        return format!("https:{trimmed}");
    }
    format!("https://{trimmed}")
}

/// Split a comma-separated tag line into trimmed, non-empty tags.
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Flattened `projects` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRow {
    /// Row identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Project title.
    pub title: String,
    /// Project description.
    pub description: String,
    /// Technology tags.
    pub tags: Vec<String>,
    /// Project link.
    pub link: String,
    /// Thumbnail URL or data URI.
    pub image_url: String,
    /// Creation timestamp in ms since epoch.
    pub created_at: u64,
}

impl RecordSchema for Project {
    type Row = ProjectRow;

    const COLLECTION: &'static str = "projects";

    fn defaults() -> Self {
        // The singleton-style default is the first catalog entry; list
        // seeding goes through `catalog_defaults`.
        Self::catalog_defaults().remove(0)
    }

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn touch(&mut self, now_ms: u64) {
        // created_at is set once; later commits keep the original stamp.
        if self.created_at == 0 {
            self.created_at = now_ms;
        }
    }

    fn to_row(&self) -> ProjectRow {
        ProjectRow {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            link: self.link.clone(),
            image_url: self.image.clone(),
            created_at: self.created_at,
        }
    }

    fn from_row(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            tags: row.tags,
            link: row.link,
            image: row.image_url,
            created_at: row.created_at,
        }
    }
}
