//! PDF extraction: decoding engine, line/span building and the provider.

mod backend;
mod builder;
mod font_format;
mod layout;
mod options;
mod provider;
mod raster;

pub use backend::{
    DocumentBackend, FontDescriptor, LopdfDocumentBackend, PageRecord, RawBlock, RawLine, RawSpan,
    TextEngine,
};
pub use builder::build_page_lines;
pub use font_format::{classify, font_flags_to_format, font_name_to_format, FontFlags};
pub use layout::LopdfTextEngine;
pub use options::{ExtractOptions, PageRange, ProviderConfig, DEFAULT_WORKERS};
pub use provider::PdfProvider;
pub use raster::{PageImageCache, PdftoppmRasterizer, Rasterizer, POINTS_PER_INCH};
