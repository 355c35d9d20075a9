use thiserror::Error;

use crate::repository::{RepositoryError, TemplateRepository};
use crate::templates::{Template, TemplateDraft};

// ---- Clipboard seam ----

/// Text-clipboard writer. The desktop shell supplies the OS-backed
/// implementation; tests use an in-memory one.
pub trait Clipboard {
    /// Returns false when the clipboard could not be written.
    fn set_text(&mut self, text: &str) -> bool;
}

// ---- Errors ----

#[derive(Debug, Error)]
pub enum SessionError {
    /// A draft failed the editor's input checks.
    #[error("{0}")]
    Invalid(String),
    #[error("no template is selected")]
    NoSelection,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// ---- Session ----

/// What the user currently sees: the visible (filtered) list, the selected
/// template, the edit buffer, and a status line describing the last action.
/// All reads and writes go through the owned repository.
pub struct Session {
    repository: TemplateRepository,
    visible: Vec<Template>,
    sections: Vec<String>,
    selected: Option<u64>,
    editable_body: String,
    search_keyword: String,
    section_filter: Option<String>,
    status: String,
}

impl Session {
    pub fn new(repository: TemplateRepository) -> Self {
        let mut session = Self {
            repository,
            visible: Vec::new(),
            sections: Vec::new(),
            selected: None,
            editable_body: String::new(),
            search_keyword: String::new(),
            section_filter: None,
            status: String::new(),
        };
        session.reload();
        session
    }

    pub fn visible(&self) -> &[Template] {
        &self.visible
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Template> {
        self.selected.and_then(|id| self.repository.get(id))
    }

    pub fn editable_body(&self) -> &str {
        &self.editable_body
    }

    /// The user typed in the edit area; keep the buffer, not the store.
    pub fn set_editable_body(&mut self, body: impl Into<String>) {
        self.editable_body = body.into();
    }

    pub fn search_keyword(&self) -> &str {
        &self.search_keyword
    }

    pub fn section_filter(&self) -> Option<&str> {
        self.section_filter.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn repository(&self) -> &TemplateRepository {
        &self.repository
    }

    /// Refresh the visible list and section list from the repository. A
    /// selection whose template no longer exists is dropped.
    pub fn reload(&mut self) {
        self.visible = self.repository.all().to_vec();
        self.sections = self.repository.sections();
        if let Some(id) = self.selected {
            if self.repository.get(id).is_none() {
                self.selected = None;
                self.editable_body.clear();
            }
        }
        self.status = format!("Loaded {} templates", self.visible.len());
    }

    /// Filter the visible list by a title keyword.
    pub fn search(&mut self, keyword: &str) {
        self.search_keyword = keyword.to_string();
        self.visible = self
            .repository
            .search(keyword)
            .into_iter()
            .cloned()
            .collect();
        self.status = format!("Search results: {}", self.visible.len());
    }

    /// Filter the visible list by section. Clearing the filter shows
    /// everything again.
    pub fn filter_by_section(&mut self, section: Option<&str>) {
        match section {
            None => {
                self.section_filter = None;
                self.reload();
            }
            Some(label) => {
                self.section_filter = Some(label.to_string());
                self.visible = self
                    .repository
                    .by_section(label)
                    .into_iter()
                    .cloned()
                    .collect();
                self.status = format!("Section \"{}\": {}", label, self.visible.len());
            }
        }
    }

    /// Select a template and copy its body into the edit buffer. Passing
    /// `None` (or an unknown id) clears the selection and the buffer.
    pub fn select(&mut self, id: Option<u64>) {
        let found = id.and_then(|id| self.repository.get(id)).cloned();
        match found {
            Some(template) => {
                self.selected = Some(template.id);
                self.editable_body = template.body;
            }
            None => {
                self.selected = None;
                self.editable_body.clear();
            }
        }
    }

    /// Copy the edit buffer to the clipboard. Refuses an empty buffer.
    pub fn copy_body(&mut self, clipboard: &mut dyn Clipboard) -> bool {
        if self.editable_body.trim().is_empty() {
            self.status = "Nothing to copy".to_string();
            return false;
        }

        if clipboard.set_text(&self.editable_body) {
            let name = self
                .selected
                .and_then(|id| self.repository.get(id))
                .map(|t| t.title.clone())
                .unwrap_or_else(|| "edited text".to_string());
            self.status = format!("Copied \"{}\" to clipboard", name);
            true
        } else {
            self.status = "Failed to copy to clipboard".to_string();
            false
        }
    }

    /// Register a new template from the editor.
    pub fn submit_new(&mut self, draft: TemplateDraft) -> Result<Template, SessionError> {
        if let Err(problem) = draft.validate() {
            self.status = problem.clone();
            return Err(SessionError::Invalid(problem));
        }

        match self.repository.add(draft.normalized()) {
            Ok(template) => {
                self.reload();
                self.status = format!("Registered \"{}\"", template.title);
                Ok(template)
            }
            Err(e) => {
                self.status = format!("Failed to register: {}", e);
                Err(e.into())
            }
        }
    }

    /// Apply the editor's changes to the selected template.
    pub fn submit_edit(&mut self, draft: TemplateDraft) -> Result<Template, SessionError> {
        let Some(id) = self.selected else {
            self.status = "Select a template first".to_string();
            return Err(SessionError::NoSelection);
        };

        if let Err(problem) = draft.validate() {
            self.status = problem.clone();
            return Err(SessionError::Invalid(problem));
        }

        match self.repository.update(id, draft.normalized()) {
            Ok(template) => {
                self.reload();
                self.editable_body = template.body.clone();
                self.status = format!("Updated \"{}\"", template.title);
                Ok(template)
            }
            Err(e) => {
                self.status = format!("Failed to update: {}", e);
                Err(e.into())
            }
        }
    }

    /// Delete the selected template. Confirmation is the shell's job; by
    /// the time this runs the user already said yes.
    pub fn delete_selected(&mut self) -> Result<(), SessionError> {
        let Some(id) = self.selected else {
            self.status = "Select a template first".to_string();
            return Err(SessionError::NoSelection);
        };

        let title = self
            .repository
            .get(id)
            .map(|t| t.title.clone())
            .unwrap_or_default();

        match self.repository.delete(id) {
            Ok(()) => {
                self.selected = None;
                self.editable_body.clear();
                self.reload();
                self.status = format!("Deleted \"{}\"", title);
                Ok(())
            }
            Err(e) => {
                self.status = format!("Failed to delete: {}", e);
                Err(e.into())
            }
        }
    }

    /// Clear the keyword and section filter and show everything.
    pub fn show_all(&mut self) {
        self.search_keyword.clear();
        self.section_filter = None;
        self.reload();
    }
}
