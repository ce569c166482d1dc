//! PDF header sniffing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Readers accept a header anywhere in the first kilobyte.
const HEADER_WINDOW: usize = 1024;

/// Header found at the start of a PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// Version from the header, e.g. "1.7"
    pub version: String,
    /// Byte offset of `%PDF-`; non-zero when junk precedes it
    pub offset: usize,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Read the header of a file.
///
/// # Example
/// ```no_run
/// use pdflines::detect::sniff_file;
///
/// let header = sniff_file("document.pdf").unwrap();
/// println!("PDF version: {}", header.version);
/// ```
pub fn sniff_file<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let mut head = Vec::with_capacity(HEADER_WINDOW);
    File::open(path)?
        .take(HEADER_WINDOW as u64)
        .read_to_end(&mut head)?;
    sniff_bytes(&head)
}

/// Find and parse a `%PDF-x.y` header in the first kilobyte of `data`.
pub fn sniff_bytes(data: &[u8]) -> Result<PdfHeader> {
    let window = &data[..data.len().min(HEADER_WINDOW)];
    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let rest = &window[offset + PDF_MAGIC.len()..];
    let version: String = rest
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|&b| b as char)
        .collect();

    match version.as_bytes() {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Ok(PdfHeader { version, offset })
        }
        [] => Err(Error::UnknownFormat),
        _ => Err(Error::UnsupportedVersion(version)),
    }
}

/// Check if a file starts like a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    sniff_file(path).is_ok()
}
