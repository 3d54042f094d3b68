//! Profile record - the hero/landing identity block.

use serde::{Deserialize, Serialize};

use crate::record::{RecordId, RecordSchema};

/// The profile content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Store-assigned identifier, absent until first persisted.
    pub id: Option<RecordId>,
    /// Display name.
    pub name: String,
    /// Role line shown under the name.
    pub role: String,
    /// Short introduction paragraph.
    pub description: String,
    /// Avatar image: a remote URL or an embedded data URI.
    pub image: String,
    /// Resume payload: empty until one is uploaded.
    pub resume_url: String,
    /// Last-modified timestamp in ms since epoch.
    pub updated_at: u64,
}

/// Flattened `profiles` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    /// Row identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Display name.
    pub name: String,
    /// Role line.
    pub role: String,
    /// Introduction paragraph.
    pub description: String,
    /// Avatar image URL or data URI.
    pub image_url: String,
    /// Resume payload.
    pub resume_url: String,
    /// Last-modified timestamp in ms since epoch.
    pub updated_at: u64,
}

impl RecordSchema for Profile {
    type Row = ProfileRow;

    const COLLECTION: &'static str = "profiles";

    fn defaults() -> Self {
        Self {
            id: None,
            name: "Jordan Avery".to_string(),
            role: "Full Stack Developer".to_string(),
            description: "I build tailored, accessible, and high-performance digital \
                          experiences for the web. Let's craft something amazing together."
                .to_string(),
            image: "https://github.com/jordan-avery.png".to_string(),
            resume_url: String::new(),
            updated_at: 0,
        }
    }

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn touch(&mut self, now_ms: u64) {
        self.updated_at = now_ms;
    }

    fn to_row(&self) -> ProfileRow {
        ProfileRow {
            id: self.id,
            name: self.name.clone(),
            role: self.role.clone(),
            description: self.description.clone(),
            image_url: self.image.clone(),
            resume_url: self.resume_url.clone(),
            updated_at: self.updated_at,
        }
    }

    fn from_row(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            role: row.role,
            description: row.description,
            image: row.image_url,
            resume_url: row.resume_url,
            updated_at: row.updated_at,
        }
    }
}
