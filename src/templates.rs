use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---- Template ----

/// A stored reusable text snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique within the store. Assigned by the repository, never reused.
    pub id: u64,
    pub title: String,
    pub body: String,
    /// Free-text grouping label. Filtering compares it case-insensitively.
    pub section: String,
    /// One-line summary. Older data files don't carry this field.
    #[serde(default)]
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Summary text for list display, with a placeholder when empty.
    pub fn display_summary(&self) -> &str {
        if self.summary.trim().is_empty() {
            "(no summary)"
        } else {
            &self.summary
        }
    }
}

// ---- Drafts ----

/// User-entered fields for creating or editing a template. Ids and
/// timestamps are assigned by the repository, so drafts never carry them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateDraft {
    pub title: String,
    pub body: String,
    pub section: String,
    #[serde(default)]
    pub summary: String,
}

impl TemplateDraft {
    /// The editor's input checks: title, section, and body are required.
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        if self.section.trim().is_empty() {
            return Err("Section is required".to_string());
        }
        if self.body.trim().is_empty() {
            return Err("Body is required".to_string());
        }
        Ok(())
    }

    /// Trim title, section, and summary the way the editor submits them.
    /// The body is kept verbatim (leading/trailing blank lines may be
    /// intentional in a snippet).
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.section = self.section.trim().to_string();
        self.summary = self.summary.trim().to_string();
        self
    }
}

// ---- Store ----

fn default_next_id() -> u64 {
    1
}

/// The full persisted document: every template plus the id counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateStore {
    #[serde(default)]
    pub templates: Vec<Template>,
    /// Next id to hand out. Monotonic; deletions leave gaps.
    #[serde(default = "default_next_id")]
    pub next_id: u64,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self {
            templates: Vec::new(),
            next_id: 1,
        }
    }
}

impl TemplateStore {
    /// Highest id currently in the store, or 0 when empty.
    pub fn max_id(&self) -> u64 {
        self.templates.iter().map(|t| t.id).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_defaults_for_missing_fields() {
        // A document written before `summary` and `nextId` existed.
        let json = r#"{
            "templates": [
                { "id": 1, "title": "Greeting", "body": "Hello",
                  "section": "General",
                  "createdAt": "2024-01-01T09:00:00Z",
                  "updatedAt": "2024-01-01T09:00:00Z" }
            ]
        }"#;
        let store: TemplateStore = serde_json::from_str(json).unwrap();
        assert_eq!(store.templates.len(), 1);
        assert_eq!(store.templates[0].summary, "");
        assert_eq!(store.next_id, 1);
    }

    #[test]
    fn test_store_field_names_are_camel_case() {
        let store = TemplateStore {
            templates: vec![Template {
                id: 1,
                title: "Greeting".to_string(),
                body: "Hello".to_string(),
                section: "General".to_string(),
                summary: String::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }],
            next_id: 2,
        };
        let json = serde_json::to_string(&store).unwrap();
        assert!(json.contains("\"nextId\":2"));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedAt\""));
        assert!(!json.contains("next_id"));
    }

    #[test]
    fn test_empty_document_parses() {
        let store: TemplateStore = serde_json::from_str("{}").unwrap();
        assert!(store.templates.is_empty());
        assert_eq!(store.next_id, 1);
    }

    #[test]
    fn test_max_id() {
        let mut store = TemplateStore::default();
        assert_eq!(store.max_id(), 0);

        let now = Utc::now();
        for id in [3, 1, 7] {
            store.templates.push(Template {
                id,
                title: format!("t{}", id),
                body: "b".to_string(),
                section: "s".to_string(),
                summary: String::new(),
                created_at: now,
                updated_at: now,
            });
        }
        assert_eq!(store.max_id(), 7);
    }

    #[test]
    fn test_display_summary_placeholder() {
        let now = Utc::now();
        let mut template = Template {
            id: 1,
            title: "Greeting".to_string(),
            body: "Hello".to_string(),
            section: "General".to_string(),
            summary: "   ".to_string(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(template.display_summary(), "(no summary)");

        template.summary = "Casual greeting".to_string();
        assert_eq!(template.display_summary(), "Casual greeting");
    }

    #[test]
    fn test_draft_validation() {
        let draft = TemplateDraft {
            title: "Greeting".to_string(),
            body: "Hello".to_string(),
            section: "General".to_string(),
            summary: String::new(),
        };
        assert!(draft.validate().is_ok());

        let blank_title = TemplateDraft {
            title: "   ".to_string(),
            ..draft.clone()
        };
        assert_eq!(blank_title.validate().unwrap_err(), "Title is required");

        let blank_section = TemplateDraft {
            section: String::new(),
            ..draft.clone()
        };
        assert_eq!(blank_section.validate().unwrap_err(), "Section is required");

        let blank_body = TemplateDraft {
            body: "\n".to_string(),
            ..draft
        };
        assert_eq!(blank_body.validate().unwrap_err(), "Body is required");
    }

    #[test]
    fn test_draft_normalized_keeps_body_verbatim() {
        let draft = TemplateDraft {
            title: "  Greeting  ".to_string(),
            body: "\nHello,\n\n".to_string(),
            section: " General ".to_string(),
            summary: " hi ".to_string(),
        }
        .normalized();

        assert_eq!(draft.title, "Greeting");
        assert_eq!(draft.section, "General");
        assert_eq!(draft.summary, "hi");
        assert_eq!(draft.body, "\nHello,\n\n");
    }
}
