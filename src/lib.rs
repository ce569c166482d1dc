//! # pdflines
//!
//! Lines and styled spans from PDF pages.
//!
//! A [`PdfProvider`] decodes every selected page once when it opens, groups
//! the text into lines of spans tagged with formats (plain, bold, italic,
//! math), and drops pages whose text looks unusable. Spans render to inline
//! markup, and pages can be rasterized on demand.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdflines::{render, PdfProvider};
//!
//! fn main() -> pdflines::Result<()> {
//!     let provider = PdfProvider::open("document.pdf")?;
//!     println!("{} pages", provider.page_count());
//!
//!     for (page, lines) in provider.page_lines() {
//!         println!("--- page {} ---", page + 1);
//!         println!("{}", render::page_markup(lines));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Font formats**: descriptor flags and font names mapped to format tags
//! - **Quality gate**: empty and garbled pages are filtered out
//! - **Markup**: escaping, hyphen joins and one wrapper per span
//! - **Parallel decoding**: pages are decoded on a Rayon pool
//! - **Page images**: rendered once per page and dpi, then cached

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod quality;
pub mod render;

// Re-export commonly used types
pub use detect::{is_pdf, sniff_bytes, sniff_file, PdfHeader};
pub use error::{Error, Result};
pub use model::{
    BBox, BlockId, BlockType, FormatSet, Line, Node, PageLines, PolygonBox, Renderable, Span,
    TextFormat,
};
pub use parser::{
    classify, DocumentBackend, LopdfDocumentBackend, LopdfTextEngine, PageRange, PdfProvider,
    ProviderConfig, TextEngine,
};
pub use quality::{ContentQualityGate, OcrHeuristics};
pub use render::{render_span, JsonFormat};

use std::collections::BTreeMap;
use std::path::Path;

/// Open a PDF with default options.
///
/// # Example
///
/// ```no_run
/// let provider = pdflines::open("document.pdf").unwrap();
/// if let Some(page) = provider.get_page_lines(0) {
///     println!("{} lines on the first page", page.line_count());
/// }
/// ```
pub fn open<P: AsRef<Path>>(path: P) -> Result<PdfProvider> {
    PdfProvider::open(path)
}

/// Open a PDF with custom options.
///
/// # Example
///
/// ```no_run
/// use pdflines::{open_with_config, PageRange, ProviderConfig};
///
/// let config = ProviderConfig::new()
///     .with_page_range(PageRange::parse("1-3").unwrap())
///     .with_workers(2);
/// let provider = open_with_config("document.pdf", config).unwrap();
/// ```
pub fn open_with_config<P: AsRef<Path>>(path: P, config: ProviderConfig) -> Result<PdfProvider> {
    PdfProvider::open_with_config(path, config)
}

/// Extract the kept pages of a PDF and release the document.
pub fn extract_lines<P: AsRef<Path>>(
    path: P,
    config: ProviderConfig,
) -> Result<BTreeMap<usize, PageLines>> {
    let provider = PdfProvider::open_with_config(path, config)?;
    Ok(provider.page_lines().clone())
}
