//! Provider options and configuration.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::quality::OcrHeuristics;

/// Default number of decoding workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Options for opening a document and extracting its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Pages handed to the decoding engine
    pub page_range: PageRange,

    /// Worker threads used by the decoding engine
    pub workers: usize,

    /// Flatten form fields and annotations before extraction
    pub flatten_pdf: bool,

    /// Thresholds for the garbled-text check
    pub ocr: OcrHeuristics,
}

impl ProviderConfig {
    /// Create new provider options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON document; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load options from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Set page range.
    pub fn with_page_range(mut self, range: PageRange) -> Self {
        self.page_range = range;
        self
    }

    /// Restrict extraction to specific 0-based pages.
    pub fn with_pages(mut self, pages: Vec<usize>) -> Self {
        self.page_range = PageRange::Pages(pages);
        self
    }

    /// Set the number of decoding workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Enable or disable annotation flattening.
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten_pdf = flatten;
        self
    }

    /// Set garbled-text thresholds.
    pub fn with_ocr(mut self, ocr: OcrHeuristics) -> Self {
        self.ocr = ocr;
        self
    }

    /// Check option values.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        if let PageRange::Range { start, end } = self.page_range {
            if start > end {
                return Err(Error::InvalidPageRange(format!("{}-{}", start, end)));
            }
        }
        Ok(())
    }

    /// The subset of options the decoding engine sees.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            page_range: self.page_range.clone(),
            workers: self.workers,
            flatten_pdf: self.flatten_pdf,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            page_range: PageRange::All,
            workers: DEFAULT_WORKERS,
            flatten_pdf: true,
            ocr: OcrHeuristics::default(),
        }
    }
}

/// Options passed to a [`TextEngine`](super::TextEngine).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub page_range: PageRange,
    pub workers: usize,
    pub flatten_pdf: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ProviderConfig::default().extract_options()
    }
}

/// Which pages to extract. Indices are 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRange {
    /// Every page of the document
    #[default]
    All,
    /// An explicit set of pages
    Pages(Vec<usize>),
    /// An inclusive range of pages
    Range { start: usize, end: usize },
}

impl PageRange {
    /// Parse a 1-based page specification such as `"1-3,7"`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageRange::All);
        }

        let mut pages = BTreeSet::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if let Some((start, end)) = part.split_once('-') {
                let start = parse_page_number(start, s)?;
                let end = parse_page_number(end, s)?;
                if start > end {
                    return Err(Error::InvalidPageRange(s.to_string()));
                }
                pages.extend(start..=end);
            } else {
                pages.insert(parse_page_number(part, s)?);
            }
        }

        if pages.is_empty() {
            return Err(Error::InvalidPageRange(s.to_string()));
        }
        Ok(PageRange::Pages(pages.into_iter().collect()))
    }

    /// Resolve to an ordered, deduplicated list of page indices.
    ///
    /// Fails if any index falls outside the document.
    pub fn resolve(&self, page_count: usize) -> Result<Vec<usize>> {
        let pages: BTreeSet<usize> = match self {
            PageRange::All => return Ok((0..page_count).collect()),
            PageRange::Pages(pages) => pages.iter().copied().collect(),
            PageRange::Range { start, end } => {
                if *end >= page_count {
                    return Err(out_of_range(*end, page_count));
                }
                (*start..=*end).collect()
            }
        };

        if let Some(&last) = pages.iter().next_back() {
            if last >= page_count {
                return Err(out_of_range(last, page_count));
            }
        }
        Ok(pages.into_iter().collect())
    }

    /// Check if a page index is selected.
    pub fn includes(&self, page: usize) -> bool {
        match self {
            PageRange::All => true,
            PageRange::Pages(pages) => pages.contains(&page),
            PageRange::Range { start, end } => (*start..=*end).contains(&page),
        }
    }
}

fn out_of_range(page: usize, page_count: usize) -> Error {
    Error::InvalidPageRange(format!(
        "page {} requested, document has {} pages",
        page, page_count
    ))
}

/// Parse one 1-based page number into a 0-based index.
fn parse_page_number(part: &str, input: &str) -> Result<usize> {
    let number: usize = part
        .trim()
        .parse()
        .map_err(|_| Error::InvalidPageRange(input.to_string()))?;
    number
        .checked_sub(1)
        .ok_or_else(|| Error::InvalidPageRange(input.to_string()))
}
