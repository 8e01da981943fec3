//! SIFA core: form model, suggestion types, mode toggle and config.

pub mod binder;
pub mod config;
pub mod draft;
pub mod error;
pub mod form;
pub mod mode;
pub mod models;
pub mod panel;
pub mod rows;

pub use config::{AppConfig, FormConfig, SuggestConfig};
pub use draft::{OrderDraft, ProductRef};
pub use error::{ExitCode, Result, SifaError};
pub use form::{FormBuilder, FormSection, FormState, SectionKind};
pub use mode::{FieldMemory, FormMode, ModeToggle};
pub use models::*;
pub use panel::{Badge, ClickTarget, PanelRow, SuggestionPanel};
pub use rows::{Row, RowManager, RowTemplate};
