//! Error types for pdflines library.

use std::io;
use thiserror::Error;

/// Result type alias for pdflines operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting lines and spans.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files or spawning the rasterizer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and cannot be read.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The decoding engine failed on a page.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Page rasterization failed.
    #[error("Rasterization error: {0}")]
    Rasterize(String),

    /// A rendered page could not be decoded.
    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    /// Error during rendering or serialization.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Provider configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
