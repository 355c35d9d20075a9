// Core of the template-phrase manager: JSON-backed template storage plus
// the view state the desktop shell binds to. The shell itself (windows,
// dialogs, the OS clipboard) lives outside this crate.

pub mod config;
pub mod repository;
pub mod session;
pub mod templates;

pub use config::{load_settings, save_settings, Settings};
pub use repository::{RepositoryError, TemplateRepository};
pub use session::{Clipboard, Session, SessionError};
pub use templates::{Template, TemplateDraft, TemplateStore};
