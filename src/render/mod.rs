//! Rendering of spans and pages to markup and JSON.

mod json;
mod page;
mod span;

pub use json::{to_json, JsonFormat};
pub use page::page_markup;
pub use span::{cleanup_text, escape_markup, render_span};
