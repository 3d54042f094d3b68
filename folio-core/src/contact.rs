//! Contact record - the get-in-touch block with flattened social links.
//!
//! Socials are nested in application state but stored as two scalar
//! columns in the remote row, which makes this record the reference case
//! for the flatten/unflatten rules.

use serde::{Deserialize, Serialize};

use crate::record::{RecordId, RecordSchema};

/// Social profile links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    /// LinkedIn profile URL.
    pub linkedin: String,
    /// GitHub profile URL.
    pub github: String,
}

/// The contact-section content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Store-assigned identifier, absent until first persisted.
    pub id: Option<RecordId>,
    /// Section title.
    pub title: String,
    /// Lead-in line.
    pub subtitle: String,
    /// Invitation paragraph.
    pub description: String,
    /// Contact email address.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Social profile links.
    pub socials: SocialLinks,
    /// Last-modified timestamp in ms since epoch.
    pub updated_at: u64,
}

/// Flattened `contact_info` row. The socials map becomes two columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRow {
    /// Row identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Section title.
    pub title: String,
    /// Lead-in line.
    pub subtitle: String,
    /// Invitation paragraph.
    pub description: String,
    /// Contact email address.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// LinkedIn profile URL.
    pub linkedin: String,
    /// GitHub profile URL.
    pub github: String,
    /// Last-modified timestamp in ms since epoch.
    pub updated_at: u64,
}

impl RecordSchema for Contact {
    type Row = ContactRow;

    const COLLECTION: &'static str = "contact_info";

    fn defaults() -> Self {
        Self {
            id: None,
            title: "Get In Touch".to_string(),
            subtitle: "Let's talk about everything!".to_string(),
            description: "If you have any questions or want to get in touch, feel \
                          free to reach out!"
                .to_string(),
            email: "hello@meridianweb.studio".to_string(),
            phone: "555-0172".to_string(),
            socials: SocialLinks {
                linkedin: "https://www.linkedin.com/in/jordan-avery/".to_string(),
                github: "https://github.com/jordan-avery".to_string(),
            },
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

    fn to_row(&self) -> ContactRow {
        ContactRow {
            id: self.id,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            description: self.description.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            linkedin: self.socials.linkedin.clone(),
            github: self.socials.github.clone(),
            updated_at: self.updated_at,
        }
    }

    fn from_row(row: ContactRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            subtitle: row.subtitle,
            description: row.description,
            email: row.email,
            phone: row.phone,
            socials: SocialLinks {
                linkedin: row.linkedin,
                github: row.github,
            },
            updated_at: row.updated_at,
        }
    }
}
