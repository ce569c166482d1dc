//! Decoding engine abstraction layer.
//!
//! Provides trait-based interfaces for the two external collaborators of the
//! provider: the text engine that turns a file into per-page block/line/span
//! records, and the native document handle used for page geometry and
//! rasterization. Concrete implementations are backed by lopdf.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};
use serde::{Deserialize, Serialize};

use crate::detect::sniff_file;
use crate::error::{Error, Result};
use crate::model::BBox;

use super::options::ExtractOptions;
use super::raster::{PdftoppmRasterizer, Rasterizer};

/// Font information attached to a raw span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    /// Font name (subset prefix removed)
    pub name: String,
    /// Raw `/FontDescriptor /Flags` bitmask
    pub flags: u32,
    /// Font weight (400 = regular)
    pub weight: f32,
    /// Effective font size in points
    pub size: f32,
}

/// A raw span as produced by the text engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSpan {
    pub bbox: BBox,
    pub text: String,
    pub font: FontDescriptor,
    pub char_start_idx: usize,
    pub char_end_idx: usize,
}

/// A raw line of spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    pub bbox: BBox,
    pub spans: Vec<RawSpan>,
}

/// A raw block of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    pub bbox: BBox,
    pub lines: Vec<RawLine>,
}

/// Text engine output for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page index (0-based)
    pub page: usize,
    /// Page box in points
    pub bbox: BBox,
    pub blocks: Vec<RawBlock>,
}

/// Turns a document file into per-page block/line/span records.
pub trait TextEngine: Send + Sync {
    /// Extract every page selected by `options`, in page order.
    ///
    /// A failure on any page fails the whole call.
    fn extract(&self, path: &Path, options: &ExtractOptions) -> Result<Vec<PageRecord>>;
}

/// An open native document.
///
/// Dropping the value releases the document.
pub trait DocumentBackend: Send + Sync {
    /// Total pages in the document.
    fn page_count(&self) -> usize;

    /// Bounding box of a 0-based page as `[x0, y0, x1, y1]`.
    fn page_bbox(&self, index: usize) -> Result<BBox>;

    /// Render a page at `scale` pixels per point.
    fn render_page(&self, index: usize, scale: f32, draw_annotations: bool) -> Result<DynamicImage>;
}

/// Concrete [`DocumentBackend`] backed by `lopdf::Document`.
pub struct LopdfDocumentBackend {
    doc: LopdfDocument,
    path: PathBuf,
    rasterizer: Box<dyn Rasterizer>,
}

impl LopdfDocumentBackend {
    /// Open a PDF file, rasterizing with `pdftoppm`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_rasterizer(path, Box::new(PdftoppmRasterizer::new()))
    }

    /// Open a PDF file with a custom rasterizer.
    pub fn load_with_rasterizer<P: AsRef<Path>>(
        path: P,
        rasterizer: Box<dyn Rasterizer>,
    ) -> Result<Self> {
        let path = path.as_ref();

        // Verify it's a PDF
        sniff_file(path)?;

        let doc = load_document(path)?;
        log::debug!(
            "Opened {} ({} pages, PDF {})",
            path.display(),
            doc.get_pages().len(),
            doc.version
        );
        Ok(Self {
            doc,
            path: path.to_path_buf(),
            rasterizer,
        })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        page_id(&self.doc, index)
    }
}

impl DocumentBackend for LopdfDocumentBackend {
    fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    fn page_bbox(&self, index: usize) -> Result<BBox> {
        let id = self.page_id(index)?;
        page_box(&self.doc, id)
    }

    fn render_page(
        &self,
        index: usize,
        scale: f32,
        draw_annotations: bool,
    ) -> Result<DynamicImage> {
        let count = self.page_count();
        if index >= count {
            return Err(Error::PageOutOfRange(index, count));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::Rasterize(format!("invalid scale {}", scale)));
        }
        self.rasterizer
            .rasterize(&self.path, index, scale, draw_annotations)
    }
}

impl Drop for LopdfDocumentBackend {
    fn drop(&mut self) {
        log::debug!("Closing {}", self.path.display());
    }
}

/// Load a document; decryption failures surface as [`Error::Encrypted`].
pub(crate) fn load_document(path: &Path) -> Result<LopdfDocument> {
    Ok(LopdfDocument::load(path)?)
}

/// Object id of a 0-based page.
pub(crate) fn page_id(doc: &LopdfDocument, index: usize) -> Result<ObjectId> {
    let pages = doc.get_pages();
    // lopdf numbers pages from 1
    u32::try_from(index + 1)
        .ok()
        .and_then(|number| pages.get(&number).copied())
        .ok_or(Error::PageOutOfRange(index, pages.len()))
}

/// Visible page box: the CropBox clipped to the MediaBox, or the MediaBox.
///
/// Both boxes are inheritable through the page tree. Pages with no usable
/// MediaBox fall back to US Letter.
pub(crate) fn page_box(doc: &LopdfDocument, page: ObjectId) -> Result<BBox> {
    let page_dict = doc.get_dictionary(page)?;
    let media = inherited_rect(doc, page_dict, b"MediaBox").unwrap_or([0.0, 0.0, 612.0, 792.0]);

    Ok(match inherited_rect(doc, page_dict, b"CropBox") {
        Some(crop) => {
            let clipped = [
                crop[0].max(media[0]),
                crop[1].max(media[1]),
                crop[2].min(media[2]),
                crop[3].min(media[3]),
            ];
            if clipped[0] < clipped[2] && clipped[1] < clipped[3] {
                clipped
            } else {
                media
            }
        }
        None => media,
    })
}

/// Look up a rectangle on a page or its ancestors.
fn inherited_rect<'a>(doc: &'a LopdfDocument, page: &'a Dictionary, key: &[u8]) -> Option<BBox> {
    let mut dict = page;
    // page trees are shallow; the bound guards against /Parent cycles
    for _ in 0..32 {
        if let Some(rect) = dict.get(key).ok().and_then(|o| rect_from(doc, o)) {
            return Some(rect);
        }
        dict = dict
            .get(b"Parent")
            .ok()
            .and_then(|p| resolve(doc, p))
            .and_then(|p| p.as_dict().ok())?;
    }
    None
}

/// Normalize a PDF rectangle array to `[x0, y0, x1, y1]` with x0 <= x1, y0 <= y1.
pub(crate) fn rect_from(doc: &LopdfDocument, obj: &Object) -> Option<BBox> {
    let array = resolve(doc, obj)?.as_array().ok()?;
    if array.len() < 4 {
        return None;
    }
    let mut values = [0.0f32; 4];
    for (slot, item) in values.iter_mut().zip(array.iter()) {
        *slot = number(resolve(doc, item)?)?;
    }
    Some([
        values[0].min(values[2]),
        values[1].min(values[3]),
        values[0].max(values[2]),
        values[1].max(values[3]),
    ])
}

/// Follow a reference to its object.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Helper: extract a number from an object.
pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
