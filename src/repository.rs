use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::warn;

use crate::templates::{Template, TemplateDraft, TemplateStore};

// ---- Errors ----

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The data file could not be read or written.
    #[error("failed to access template data at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The data file exists but is not a valid template document.
    #[error("failed to parse template data at '{}': {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// An update or delete referenced an id that is not in the store.
    #[error("template with id {0} was not found")]
    NotFound(u64),
}

// ---- Repository ----

/// Owns the in-memory store and the JSON file backing it. Every mutation
/// rewrites the whole document before returning, so memory and disk never
/// diverge after a completed call.
pub struct TemplateRepository {
    path: PathBuf,
    store: TemplateStore,
}

impl TemplateRepository {
    /// Default data file: `<documents>/TemplateManager/templates.json`.
    pub fn default_data_path() -> PathBuf {
        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("TemplateManager").join("templates.json")
    }

    /// An empty repository bound to `path`. Call `load` to read the file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            store: TemplateStore::default(),
        }
    }

    /// Bind to `path` and load it, creating the file when absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let mut repository = Self::new(path);
        repository.load()?;
        Ok(repository)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the data file into memory. A missing file initializes an empty
    /// store and writes it out, so the file exists from first launch. When
    /// the file cannot be read or parsed, the in-memory store is reset to
    /// empty and the error is returned; the file on disk is left alone.
    pub fn load(&mut self) -> Result<(), RepositoryError> {
        if !self.path.exists() {
            self.store = TemplateStore::default();
            return self.save();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(source) => {
                self.store = TemplateStore::default();
                return Err(RepositoryError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_str::<TemplateStore>(&content) {
            Ok(mut store) => {
                // Files written by older versions may lack the counter or
                // carry a stale one; handing out a duplicate id is never ok.
                let floor = store.max_id() + 1;
                if store.next_id < floor {
                    warn!(
                        "repairing stale id counter in '{}': {} -> {}",
                        self.path.display(),
                        store.next_id,
                        floor
                    );
                    store.next_id = floor;
                }
                self.store = store;
                Ok(())
            }
            Err(source) => {
                self.store = TemplateStore::default();
                Err(RepositoryError::Malformed {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }

    /// Serialize the whole store to disk, pretty-printed. The content goes
    /// to a temp file that is renamed over the target, so a failed write
    /// leaves the previous document intact.
    pub fn save(&self) -> Result<(), RepositoryError> {
        let io_err = |source| RepositoryError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.store).map_err(|source| {
            RepositoryError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(io_err)?;

        // Windows cannot rename over an existing file.
        #[cfg(windows)]
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(io_err)?;
        }

        fs::rename(&temp_path, &self.path).map_err(io_err)
    }

    // ---- Queries ----

    /// Every template, in creation order.
    pub fn all(&self) -> &[Template] {
        &self.store.templates
    }

    pub fn get(&self, id: u64) -> Option<&Template> {
        self.store.templates.iter().find(|t| t.id == id)
    }

    /// Case-insensitive substring match on the title. A blank keyword
    /// returns everything. Body and section text never affect the match.
    pub fn search(&self, keyword: &str) -> Vec<&Template> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self.store.templates.iter().collect();
        }

        let keyword = keyword.to_lowercase();
        self.store
            .templates
            .iter()
            .filter(|t| t.title.to_lowercase().contains(&keyword))
            .collect()
    }

    /// Templates whose section equals `section`, ignoring case. Exact
    /// match, not a substring.
    pub fn by_section(&self, section: &str) -> Vec<&Template> {
        let section = section.to_lowercase();
        self.store
            .templates
            .iter()
            .filter(|t| t.section.to_lowercase() == section)
            .collect()
    }

    /// Distinct section labels in ascending order. Labels that differ only
    /// by case stay separate entries; filtering ignores case, the list of
    /// labels does not.
    pub fn sections(&self) -> Vec<String> {
        let labels: BTreeSet<&str> = self
            .store
            .templates
            .iter()
            .map(|t| t.section.as_str())
            .collect();
        labels.into_iter().map(str::to_string).collect()
    }

    /// Number of templates per section label.
    pub fn section_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for template in &self.store.templates {
            *counts.entry(template.section.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// The id the next `add` will assign.
    pub fn next_id(&self) -> u64 {
        self.store.next_id
    }

    // ---- Mutations ----

    /// Append a new template. The id and both timestamps are assigned
    /// here. Returns the stored record.
    pub fn add(&mut self, draft: TemplateDraft) -> Result<Template, RepositoryError> {
        let now = Utc::now();
        let template = Template {
            id: self.store.next_id,
            title: draft.title,
            body: draft.body,
            section: draft.section,
            summary: draft.summary,
            created_at: now,
            updated_at: now,
        };

        self.store.templates.push(template.clone());
        self.store.next_id += 1;

        if let Err(e) = self.save() {
            // A failed write undoes the insert so memory matches disk.
            self.store.templates.pop();
            self.store.next_id -= 1;
            return Err(e);
        }
        Ok(template)
    }

    /// Overwrite the editable fields of an existing template. Its position
    /// in the list and its creation time are preserved; `updated_at` is
    /// refreshed. The not-found check happens before any change.
    pub fn update(&mut self, id: u64, draft: TemplateDraft) -> Result<Template, RepositoryError> {
        let index = self
            .store
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or(RepositoryError::NotFound(id))?;

        let previous = self.store.templates[index].clone();
        {
            let existing = &mut self.store.templates[index];
            existing.title = draft.title;
            existing.body = draft.body;
            existing.section = draft.section;
            existing.summary = draft.summary;
            existing.updated_at = Utc::now();
        }

        if let Err(e) = self.save() {
            self.store.templates[index] = previous;
            return Err(e);
        }
        Ok(self.store.templates[index].clone())
    }

    /// Remove a template by id. The freed id is never handed out again.
    pub fn delete(&mut self, id: u64) -> Result<(), RepositoryError> {
        let index = self
            .store
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or(RepositoryError::NotFound(id))?;

        let removed = self.store.templates.remove(index);
        if let Err(e) = self.save() {
            self.store.templates.insert(index, removed);
            return Err(e);
        }
        Ok(())
    }
}
