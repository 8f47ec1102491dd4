//! Prompt template catalog for herald
//!
//! Canned prompts live in a JSON document that is loaded once at startup:
//!
//! ```json
//! {
//!   "templates": [
//!     { "name": "fact_history", "template": "Share one fact about {{ topic }} for {{ date }}." }
//!   ]
//! }
//! ```
//!
//! Templates use Jinja2 syntax rendered by MiniJinja.
//!
//! ```
//! use herald_prompt::{PromptCatalog, PromptTemplate};
//! use serde_json::json;
//!
//! let catalog = PromptCatalog::from_templates(vec![
//!     PromptTemplate::new("greeting", "Hello, {{ name | capitalize }}!"),
//! ]);
//!
//! let text = catalog.render("greeting", &json!({ "name": "aria" })).unwrap();
//! assert_eq!(text, "Hello, Aria!");
//! ```

mod catalog;
mod error;

pub use catalog::{PromptCatalog, PromptTemplate};
pub use error::{PromptError, Result};
