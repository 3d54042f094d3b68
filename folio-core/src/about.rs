//! About record - bio paragraphs, skills, and the downloadable resume list.

use serde::{Deserialize, Serialize};

use crate::record::{RecordId, RecordSchema};

/// One labelled resume download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeEntry {
    /// Short label shown on the download button.
    pub label: String,
    /// PDF payload: a data URI or remote URL; empty until uploaded.
    pub url: String,
}

impl ResumeEntry {
    /// A fresh entry awaiting a label and an upload.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            label: "New Resume".to_string(),
            url: String::new(),
        }
    }
}

/// The about-section content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct About {
    /// Store-assigned identifier, absent until first persisted.
    pub id: Option<RecordId>,
    /// Section title.
    pub title: String,
    /// Lead-in line.
    pub subtitle: String,
    /// Bio paragraphs, in display order.
    pub description: Vec<String>,
    /// Skill labels shown in the tech-stack grid.
    pub skills: Vec<String>,
    /// Ordered resume downloads.
    pub resumes: Vec<ResumeEntry>,
    /// Last-modified timestamp in ms since epoch.
    pub updated_at: u64,
}

impl About {
    /// Append a placeholder resume entry.
    pub fn push_resume(&mut self) {
        self.resumes.push(ResumeEntry::placeholder());
    }

    /// Remove the resume entry at `index`; out-of-range indexes are ignored.
    pub fn remove_resume(&mut self, index: usize) {
        if index < self.resumes.len() {
            self.resumes.remove(index);
        }
    }
}

/// Flattened `about` row. Sequences are stored as sequences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AboutRow {
    /// Row identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Section title.
    pub title: String,
    /// Lead-in line.
    pub subtitle: String,
    /// Bio paragraphs.
    pub description: Vec<String>,
    /// Skill labels.
    pub skills: Vec<String>,
    /// Resume downloads.
    pub resumes: Vec<ResumeEntry>,
    /// Last-modified timestamp in ms since epoch.
    pub updated_at: u64,
}

impl RecordSchema for About {
    type Row = AboutRow;

    const COLLECTION: &'static str = "about";

    fn defaults() -> Self {
        Self {
            id: None,
            title: "About Me".to_string(),
            subtitle: "More than just code.".to_string(),
            description: vec![
                "I'm a passionate full stack developer who enjoys turning complex \
                 problems into simple, beautiful, and intuitive digital experiences."
                    .to_string(),
                "With a focus on scalable, high-performance applications, I \
                 specialize in the modern web ecosystem, transforming ideas into \
                 functional reality through clean code and user-centric design."
                    .to_string(),
            ],
            skills: vec![
                "JavaScript".to_string(),
                "React.js".to_string(),
                "Node.js".to_string(),
                "HTML5".to_string(),
                "CSS3".to_string(),
                "Git".to_string(),
                "UI/UX Design".to_string(),
                "Responsive Design".to_string(),
                "API Integration".to_string(),
            ],
            resumes: Vec::new(),
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

    fn to_row(&self) -> AboutRow {
        AboutRow {
            id: self.id,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            description: self.description.clone(),
            skills: self.skills.clone(),
            resumes: self.resumes.clone(),
            updated_at: self.updated_at,
        }
    }

    fn from_row(row: AboutRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            subtitle: row.subtitle,
            description: row.description,
            skills: row.skills,
            resumes: row.resumes,
            updated_at: row.updated_at,
        }
    }
}
