//! SIFA suggest: HTTP fetcher, debounced scheduler and the suggestion
//! session that ties them to a form.

pub mod error;
pub mod fetcher;
pub mod http;
pub mod scheduler;
pub mod session;

pub use error::{Result, SuggestError};
pub use fetcher::{HttpSuggestionFetcher, SuggestionFetcher};
pub use http::SuggestClient;
pub use scheduler::Debouncer;
pub use session::{SessionEvent, SuggestionSession};
