//! Page extraction provider.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbImage;

use crate::error::{Error, Result};
use crate::model::{BBox, PageLines};
use crate::quality::ContentQualityGate;

use super::backend::{DocumentBackend, LopdfDocumentBackend, TextEngine};
use super::builder::build_page_lines;
use super::layout::LopdfTextEngine;
use super::options::ProviderConfig;
use super::raster::{PageImageCache, POINTS_PER_INCH};

/// Lines and spans of a document, built once when the provider opens.
///
/// Only pages whose text passes the quality gate are kept; the rest are
/// absent from [`page_lines`](Self::page_lines). The document handle stays
/// open for page geometry and rasterization until the provider is dropped.
pub struct PdfProvider {
    filepath: PathBuf,
    config: ProviderConfig,
    doc: Box<dyn DocumentBackend>,
    page_lines: BTreeMap<usize, PageLines>,
    image_cache: PageImageCache,
}

impl PdfProvider {
    /// Open a PDF file with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, ProviderConfig::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let doc = LopdfDocumentBackend::load(path)?;
        Self::with_backends(path, config, Box::new(doc), &LopdfTextEngine::new())
    }

    /// Build a provider from an already opened document and a text engine.
    ///
    /// The engine runs once, synchronously. Any engine error fails the whole
    /// call and releases `doc`.
    pub fn with_backends<P: AsRef<Path>>(
        path: P,
        config: ProviderConfig,
        doc: Box<dyn DocumentBackend>,
        engine: &dyn TextEngine,
    ) -> Result<Self> {
        config.validate()?;
        let filepath = path.as_ref().to_path_buf();

        let records = engine.extract(&filepath, &config.extract_options())?;
        let gate = ContentQualityGate::new(config.ocr.clone());

        let mut page_lines = BTreeMap::new();
        for record in &records {
            let page = build_page_lines(record);
            if gate.accept(&page.spans) {
                log::debug!(
                    "Page {}: {} lines, {} spans",
                    record.page,
                    page.line_count(),
                    page.span_count()
                );
                page_lines.insert(record.page, page);
            } else {
                log::debug!("Page {}: no usable text, skipped", record.page);
            }
        }

        log::info!(
            "Loaded {}: {} of {} pages with text",
            filepath.display(),
            page_lines.len(),
            doc.page_count()
        );

        Ok(Self {
            filepath,
            config,
            doc,
            page_lines,
            image_cache: PageImageCache::new(),
        })
    }

    /// Total pages in the document, regardless of page range or filtering.
    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    /// Bounding box of a 0-based page.
    pub fn get_page_bbox(&self, index: usize) -> Result<BBox> {
        self.doc.page_bbox(index)
    }

    /// Page rendered as RGB at `dpi`, without annotations.
    ///
    /// Images are cached per `(index, dpi)` for the provider's lifetime.
    pub fn get_image(&self, index: usize, dpi: u32) -> Result<Arc<RgbImage>> {
        if dpi == 0 {
            return Err(Error::Rasterize("dpi must be positive".to_string()));
        }
        let count = self.page_count();
        if index >= count {
            return Err(Error::PageOutOfRange(index, count));
        }

        let scale = dpi as f32 / POINTS_PER_INCH;
        self.image_cache
            .get_or_render(index, dpi, || self.doc.render_page(index, scale, false))
    }

    /// Lines and spans of a page, if it was extracted and kept.
    pub fn get_page_lines(&self, index: usize) -> Option<&PageLines> {
        self.page_lines.get(&index)
    }

    /// All kept pages, keyed by page index.
    pub fn page_lines(&self) -> &BTreeMap<usize, PageLines> {
        &self.page_lines
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }
}

impl std::fmt::Debug for PdfProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfProvider")
            .field("filepath", &self.filepath)
            .field("config", &self.config)
            .field("pages", &self.page_lines.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
