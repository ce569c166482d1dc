//! Text engine built on lopdf content streams.
//!
//! Each selected page's content stream is walked with a small text-state
//! machine. Every shown string becomes a glyph run with a position, width and
//! font; runs are then grouped into spans (same font, adjacent), lines (same
//! baseline) and blocks (vertical proximity), in content order.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::BBox;

use super::backend::{
    load_document, number, page_box, page_id, rect_from, resolve, FontDescriptor, PageRecord,
    RawBlock, RawLine, RawSpan, TextEngine,
};
use super::font_format::FontFlags;
use super::options::ExtractOptions;

/// Annotation flag bits that keep an annotation off the page.
const ANNOT_HIDDEN: i64 = 1 << 1;
const ANNOT_NO_VIEW: i64 = 1 << 5;

/// Approximate ascender and descender as a share of the font size.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;

/// Default [`TextEngine`]: walks page content streams with lopdf.
#[derive(Debug, Clone, Default)]
pub struct LopdfTextEngine {
    _private: (),
}

impl LopdfTextEngine {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl TextEngine for LopdfTextEngine {
    fn extract(&self, path: &Path, options: &ExtractOptions) -> Result<Vec<PageRecord>> {
        let doc = load_document(path)?;
        let indices = options.page_range.resolve(doc.get_pages().len())?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers.max(1))
            .build()
            .map_err(|e| Error::TextExtract(format!("worker pool: {}", e)))?;

        log::debug!(
            "Extracting {} pages from {} with {} workers",
            indices.len(),
            path.display(),
            options.workers
        );

        pool.install(|| {
            indices
                .par_iter()
                .map(|&index| extract_page(&doc, index, options.flatten_pdf))
                .collect()
        })
    }
}

/// Extract the block/line/span tree of one page.
fn extract_page(doc: &LopdfDocument, index: usize, flatten: bool) -> Result<PageRecord> {
    let page = page_id(doc, index)?;
    let bbox = page_box(doc, page)?;

    let page_fonts = doc
        .get_page_fonts(page)
        .map_err(|e| Error::TextExtract(format!("page {}: {}", index, e)))?;
    let fonts = FontTable::new(doc, &page_fonts);

    let mut walker = ContentWalker::new(doc, index);
    walker.walk(&page_content(doc, page)?, &fonts, IDENTITY)?;

    if flatten {
        for appearance in annotation_appearances(doc, page) {
            let fonts = FontTable::new(doc, &appearance.fonts);
            walker.walk(&appearance.content, &fonts, appearance.matrix)?;
        }
    }

    let blocks = assemble_blocks(walker.runs, bbox);
    Ok(PageRecord {
        page: index,
        bbox,
        blocks,
    })
}

/// Get page content stream. Pages without /Contents are empty.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;

    let contents = match page_dict.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(Vec::new()),
    };

    match resolve(doc, contents) {
        Some(Object::Stream(s)) => Ok(s
            .decompressed_content()
            .unwrap_or_else(|_| s.content.clone())),
        Some(Object::Array(arr)) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Some(Object::Stream(s)) = resolve(doc, obj) {
                    if let Ok(data) = s.decompressed_content() {
                        content.extend_from_slice(&data);
                        content.push(b' ');
                    }
                }
            }
            Ok(content)
        }
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

// ---------------------------------------------------------------------------
// Fonts
// ---------------------------------------------------------------------------

/// Glyph advance widths in 1/1000 text-space units.
#[derive(Debug, Clone, PartialEq)]
enum GlyphWidths {
    /// One byte per glyph, `/FirstChar` + `/Widths`
    Simple {
        first_char: u32,
        widths: Vec<f32>,
        missing: f32,
    },
    /// Two bytes per glyph, `/DW` for every glyph
    Composite { default: f32 },
}

impl GlyphWidths {
    /// Total advance (in em), glyph count and single-byte space count.
    fn measure(&self, bytes: &[u8]) -> (f32, usize, usize) {
        match self {
            GlyphWidths::Simple {
                first_char,
                widths,
                missing,
            } => {
                let mut total = 0.0;
                for &b in bytes {
                    let width = (b as u32)
                        .checked_sub(*first_char)
                        .and_then(|i| widths.get(i as usize))
                        .copied()
                        .filter(|w| *w > 0.0)
                        .unwrap_or(*missing);
                    total += width;
                }
                let spaces = bytes.iter().filter(|&&b| b == b' ').count();
                (total / 1000.0, bytes.len(), spaces)
            }
            GlyphWidths::Composite { default } => {
                let glyphs = bytes.len() / 2;
                (glyphs as f32 * default / 1000.0, glyphs, 0)
            }
        }
    }
}

/// Resolved font resource.
struct FontInfo<'a> {
    dict: &'a Dictionary,
    name: String,
    flags: u32,
    weight: f32,
    widths: GlyphWidths,
}

impl<'a> FontInfo<'a> {
    fn new(doc: &'a LopdfDocument, dict: &'a Dictionary) -> Self {
        let name = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_name().ok())
            .map(|n| strip_subset_prefix(&String::from_utf8_lossy(n)).to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let composite = name_entry(doc, dict, b"Subtype").as_deref() == Some("Type0");

        // Type0 fonts keep their descriptor on the descendant CIDFont
        let descendant = if composite {
            dict.get(b"DescendantFonts")
                .ok()
                .and_then(|o| resolve(doc, o))
                .and_then(|o| o.as_array().ok())
                .and_then(|a| a.first())
                .and_then(|o| resolve(doc, o))
                .and_then(|o| o.as_dict().ok())
        } else {
            None
        };
        let holder = descendant.unwrap_or(dict);

        let descriptor = holder
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok());

        let flags = descriptor
            .and_then(|d| d.get(b"Flags").ok())
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_i64().ok())
            .and_then(|f| u32::try_from(f).ok())
            .unwrap_or(0);

        let weight = descriptor
            .and_then(|d| d.get(b"FontWeight").ok())
            .and_then(|o| resolve(doc, o))
            .and_then(number)
            .unwrap_or_else(|| {
                let bold = FontFlags::from_raw(flags).contains(FontFlags::FORCE_BOLD)
                    || name.to_lowercase().contains("bold");
                if bold {
                    700.0
                } else {
                    400.0
                }
            });

        let widths = if composite {
            GlyphWidths::Composite {
                default: holder
                    .get(b"DW")
                    .ok()
                    .and_then(|o| resolve(doc, o))
                    .and_then(number)
                    .unwrap_or(1000.0),
            }
        } else {
            let missing = descriptor
                .and_then(|d| d.get(b"MissingWidth").ok())
                .and_then(|o| resolve(doc, o))
                .and_then(number)
                .filter(|w| *w > 0.0)
                .unwrap_or(500.0);
            let first_char = dict
                .get(b"FirstChar")
                .ok()
                .and_then(|o| resolve(doc, o))
                .and_then(|o| o.as_i64().ok())
                .and_then(|c| u32::try_from(c).ok())
                .unwrap_or(0);
            let widths = dict
                .get(b"Widths")
                .ok()
                .and_then(|o| resolve(doc, o))
                .and_then(|o| o.as_array().ok())
                .map(|a| {
                    a.iter()
                        .map(|w| resolve(doc, w).and_then(number).unwrap_or(0.0))
                        .collect()
                })
                .unwrap_or_default();
            GlyphWidths::Simple {
                first_char,
                widths,
                missing,
            }
        };

        Self {
            dict,
            name,
            flags,
            weight,
            widths,
        }
    }

    /// Decode shown bytes with the font's encoding.
    fn decode(&self, doc: &LopdfDocument, bytes: &[u8]) -> String {
        match self.dict.get_font_encoding(doc) {
            Ok(encoding) => LopdfDocument::decode_text(&encoding, bytes)
                .unwrap_or_else(|_| decode_text_simple(bytes)),
            Err(_) => decode_text_simple(bytes),
        }
    }
}

/// Font resources of one content stream, keyed by resource name.
struct FontTable<'a> {
    fonts: HashMap<Vec<u8>, FontInfo<'a>>,
}

impl<'a> FontTable<'a> {
    fn new(doc: &'a LopdfDocument, resources: &BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        let fonts = resources
            .iter()
            .map(|(name, dict)| (name.clone(), FontInfo::new(doc, dict)))
            .collect();
        Self { fonts }
    }

    fn get(&self, name: &[u8]) -> Option<&FontInfo<'a>> {
        self.fonts.get(name)
    }
}

/// Drop a subset tag such as `ABCDEF+` from a font name.
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest))
            if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) && !rest.is_empty() =>
        {
            rest
        }
        _ => name,
    }
}

fn name_entry(doc: &LopdfDocument, dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).into_owned())
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    // Try UTF-8
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// Annotation appearances
// ---------------------------------------------------------------------------

/// A visible annotation's normal appearance, placed on the page.
struct Appearance<'a> {
    content: Vec<u8>,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    matrix: Matrix,
}

/// Normal appearance streams of the page's visible annotations.
fn annotation_appearances(doc: &LopdfDocument, page: ObjectId) -> Vec<Appearance<'_>> {
    let annots = doc
        .get_dictionary(page)
        .ok()
        .and_then(|p| p.get(b"Annots").ok())
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok());

    let Some(annots) = annots else {
        return Vec::new();
    };

    let default_fonts = acroform_fonts(doc);
    annots
        .iter()
        .filter_map(|a| resolve(doc, a).and_then(|o| o.as_dict().ok()))
        .filter_map(|annot| appearance(doc, annot, &default_fonts))
        .collect()
}

fn appearance<'a>(
    doc: &'a LopdfDocument,
    annot: &'a Dictionary,
    default_fonts: &BTreeMap<Vec<u8>, &'a Dictionary>,
) -> Option<Appearance<'a>> {
    let flags = annot
        .get(b"F")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(0);
    if flags & (ANNOT_HIDDEN | ANNOT_NO_VIEW) != 0 {
        return None;
    }
    if name_entry(doc, annot, b"Subtype").as_deref() == Some("Popup") {
        return None;
    }

    let normal = annot
        .get(b"AP")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())?
        .get(b"N")
        .ok()
        .and_then(|o| resolve(doc, o))?;

    // Widgets with on/off states pick the stream named by /AS
    let stream = match normal {
        Object::Stream(s) => s,
        Object::Dictionary(states) => {
            let state = annot.get(b"AS").ok().and_then(|o| o.as_name().ok())?;
            match resolve(doc, states.get(state).ok()?)? {
                Object::Stream(s) => s,
                _ => return None,
            }
        }
        _ => return None,
    };

    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let mut fonts = stream
        .dict
        .get(b"Resources")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .map(|r| font_resources(doc, r))
        .unwrap_or_default();
    for (name, dict) in default_fonts {
        fonts.entry(name.clone()).or_insert(*dict);
    }

    let rect = annot.get(b"Rect").ok().and_then(|o| rect_from(doc, o))?;
    let bbox = stream
        .dict
        .get(b"BBox")
        .ok()
        .and_then(|o| rect_from(doc, o))
        .unwrap_or([0.0, 0.0, rect[2] - rect[0], rect[3] - rect[1]]);
    let form_matrix = stream
        .dict
        .get(b"Matrix")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
        .and_then(|a| matrix_from(doc, a))
        .unwrap_or(IDENTITY);

    // Map the appearance box origin onto the annotation rectangle
    let placement = translate(rect[0] - bbox[0], rect[1] - bbox[1]);
    Some(Appearance {
        content,
        fonts,
        matrix: multiply(form_matrix, placement),
    })
}

/// Font entries of a resource dictionary.
fn font_resources<'a>(
    doc: &'a LopdfDocument,
    resources: &'a Dictionary,
) -> BTreeMap<Vec<u8>, &'a Dictionary> {
    resources
        .get(b"Font")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .map(|fonts| {
            fonts
                .iter()
                .filter_map(|(name, obj)| {
                    resolve(doc, obj)
                        .and_then(|o| o.as_dict().ok())
                        .map(|d| (name.clone(), d))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Default form resources (`/AcroForm /DR /Font`).
fn acroform_fonts(doc: &LopdfDocument) -> BTreeMap<Vec<u8>, &Dictionary> {
    doc.catalog()
        .ok()
        .and_then(|c| c.get(b"AcroForm").ok())
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .and_then(|f| f.get(b"DR").ok())
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .map(|dr| font_resources(doc, dr))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Content stream walk
// ---------------------------------------------------------------------------

/// Affine matrix `[a b c d e f]`, row-vector convention.
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn multiply(m1: Matrix, m2: Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn translate(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

fn transform(m: Matrix, x: f32, y: f32) -> (f32, f32) {
    (x * m[0] + y * m[2] + m[4], x * m[1] + y * m[3] + m[5])
}

fn matrix_from(doc: &LopdfDocument, operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (slot, obj) in m.iter_mut().zip(operands) {
        *slot = resolve(doc, obj).and_then(number)?;
    }
    Some(m)
}

#[derive(Debug, Clone)]
struct TextState {
    font: Vec<u8>,
    size: f32,
    char_spacing: f32,
    word_spacing: f32,
    h_scale: f32,
    leading: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: Vec::new(),
            size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

/// A shown string placed in user space.
#[derive(Debug, Clone, PartialEq)]
struct GlyphRun {
    text: String,
    x0: f32,
    x1: f32,
    baseline: f32,
    font: FontDescriptor,
}

struct ContentWalker<'a> {
    doc: &'a LopdfDocument,
    page: usize,
    runs: Vec<GlyphRun>,
}

impl<'a> ContentWalker<'a> {
    fn new(doc: &'a LopdfDocument, page: usize) -> Self {
        Self {
            doc,
            page,
            runs: Vec::new(),
        }
    }

    fn walk(&mut self, data: &[u8], fonts: &FontTable<'_>, base: Matrix) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let content = Content::decode(data)
            .map_err(|e| Error::TextExtract(format!("page {}: {}", self.page, e)))?;

        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut gs = GraphicsState {
            ctm: base,
            text: TextState::default(),
        };
        let mut tm = IDENTITY;
        let mut tlm = IDENTITY;

        for op in &content.operations {
            let operands = &op.operands;
            let num = |i: usize| operands.get(i).and_then(number);

            match op.operator.as_str() {
                "q" => stack.push(gs.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        gs = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_from(self.doc, operands) {
                        gs.ctm = multiply(m, gs.ctm);
                    }
                }
                "BT" => {
                    tm = IDENTITY;
                    tlm = IDENTITY;
                }
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        gs.text.font = name.clone();
                    }
                    if let Some(size) = num(1) {
                        gs.text.size = size;
                    }
                }
                "Tc" => gs.text.char_spacing = num(0).unwrap_or(0.0),
                "Tw" => gs.text.word_spacing = num(0).unwrap_or(0.0),
                "Tz" => gs.text.h_scale = num(0).unwrap_or(100.0) / 100.0,
                "TL" => gs.text.leading = num(0).unwrap_or(0.0),
                "Ts" => gs.text.rise = num(0).unwrap_or(0.0),
                "Td" | "TD" => {
                    let tx = num(0).unwrap_or(0.0);
                    let ty = num(1).unwrap_or(0.0);
                    if op.operator == "TD" {
                        gs.text.leading = -ty;
                    }
                    tlm = multiply(translate(tx, ty), tlm);
                    tm = tlm;
                }
                "Tm" => {
                    if let Some(m) = matrix_from(self.doc, operands) {
                        tlm = m;
                        tm = m;
                    }
                }
                "T*" => {
                    tlm = multiply(translate(0.0, -gs.text.leading), tlm);
                    tm = tlm;
                }
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes, fonts, &gs, &mut tm);
                    }
                }
                "'" | "\"" => {
                    if op.operator == "\"" {
                        gs.text.word_spacing = num(0).unwrap_or(gs.text.word_spacing);
                        gs.text.char_spacing = num(1).unwrap_or(gs.text.char_spacing);
                    }
                    tlm = multiply(translate(0.0, -gs.text.leading), tlm);
                    tm = tlm;
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = operands.get(text_idx) {
                        self.show(bytes, fonts, &gs, &mut tm);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => self.show(bytes, fonts, &gs, &mut tm),
                                other => {
                                    // Adjustments are in thousandths of an em, subtracted
                                    if let Some(adjust) = number(other) {
                                        let tx = -adjust / 1000.0 * gs.text.size * gs.text.h_scale;
                                        tm = multiply(translate(tx, 0.0), tm);
                                    }
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Record a shown string and advance the text matrix past it.
    fn show(&mut self, bytes: &[u8], fonts: &FontTable<'_>, gs: &GraphicsState, tm: &mut Matrix) {
        let state = &gs.text;
        let font = fonts.get(&state.font);

        let text = match font {
            Some(f) => f.decode(self.doc, bytes),
            None => decode_text_simple(bytes),
        };
        let (advance, glyphs, spaces) = match font {
            Some(f) => f.widths.measure(bytes),
            None => (
                bytes.len() as f32 * 0.5,
                bytes.len(),
                bytes.iter().filter(|&&b| b == b' ').count(),
            ),
        };

        let tx = (advance * state.size
            + glyphs as f32 * state.char_spacing
            + spaces as f32 * state.word_spacing)
            * state.h_scale;

        let render = multiply(*tm, gs.ctm);
        let (x0, y0) = transform(render, 0.0, state.rise);
        let (x1, _) = transform(render, tx, state.rise);
        let scale_y = (render[2] * render[2] + render[3] * render[3]).sqrt();

        if !text.is_empty() {
            let descriptor = match font {
                Some(f) => FontDescriptor {
                    name: f.name.clone(),
                    flags: f.flags,
                    weight: f.weight,
                    size: state.size * scale_y,
                },
                None => FontDescriptor {
                    name: String::from_utf8_lossy(&state.font).into_owned(),
                    flags: 0,
                    weight: 400.0,
                    size: state.size * scale_y,
                },
            };
            self.runs.push(GlyphRun {
                text,
                x0: x0.min(x1),
                x1: x0.max(x1),
                baseline: y0,
                font: descriptor,
            });
        }

        *tm = multiply(translate(tx, 0.0), *tm);
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// A span under construction, in top-left page space.
struct SpanDraft {
    text: String,
    bbox: BBox,
    font: FontDescriptor,
}

struct LineDraft {
    baseline: f32,
    size: f32,
    spans: Vec<SpanDraft>,
}

impl LineDraft {
    fn bbox(&self) -> BBox {
        union_all(self.spans.iter().map(|s| s.bbox))
    }
}

fn union(a: BBox, b: BBox) -> BBox {
    [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])]
}

fn union_all(boxes: impl Iterator<Item = BBox>) -> BBox {
    boxes.reduce(union).unwrap_or([0.0; 4])
}

/// Check whether a run continues the current span's font.
fn same_font(a: &FontDescriptor, b: &FontDescriptor) -> bool {
    a.name == b.name && a.flags == b.flags && (a.size - b.size).abs() < 0.5
}

/// Group glyph runs into blocks of lines of spans, assigning char offsets.
fn assemble_blocks(runs: Vec<GlyphRun>, page: BBox) -> Vec<RawBlock> {
    let lines = group_lines(runs, page);

    let mut blocks: Vec<Vec<LineDraft>> = Vec::new();
    for line in lines {
        let starts_block = match blocks.last().and_then(|b| b.last()) {
            None => true,
            Some(prev) => {
                let prev_box = prev.bbox();
                let cur_box = line.bbox();
                let gap = cur_box[1] - prev_box[3];
                // a wide vertical gap, or text moving back up the page
                gap > prev.size.max(line.size) || cur_box[1] < prev_box[1] - prev.size
            }
        };
        if starts_block {
            blocks.push(vec![line]);
        } else if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }

    // Every span is followed by one separator in the page's char stream
    let mut offset = 0usize;
    blocks
        .into_iter()
        .map(|lines| {
            let raw_lines: Vec<RawLine> = lines
                .into_iter()
                .map(|line| {
                    let bbox = line.bbox();
                    let spans = line
                        .spans
                        .into_iter()
                        .map(|span| {
                            let len = span.text.chars().count();
                            let start = offset;
                            let end = start + len.saturating_sub(1);
                            offset = end + 2;
                            RawSpan {
                                bbox: span.bbox,
                                text: span.text,
                                font: span.font,
                                char_start_idx: start,
                                char_end_idx: end,
                            }
                        })
                        .collect();
                    RawLine { bbox, spans }
                })
                .collect();
            RawBlock {
                bbox: union_all(raw_lines.iter().map(|l| l.bbox)),
                lines: raw_lines,
            }
        })
        .collect()
}

/// Group runs into lines by baseline, merging adjacent same-font runs.
fn group_lines(runs: Vec<GlyphRun>, page: BBox) -> Vec<LineDraft> {
    let [left, _, _, top] = page;
    let mut lines: Vec<LineDraft> = Vec::new();
    let mut last_x0 = f32::MIN;
    let mut last_x1 = f32::MIN;

    for run in runs {
        let size = run.font.size.max(0.1);
        let bbox = [
            run.x0 - left,
            top - (run.baseline + size * ASCENT),
            run.x1 - left,
            top - (run.baseline - size * DESCENT),
        ];

        let new_line = match lines.last() {
            None => true,
            Some(line) => {
                (run.baseline - line.baseline).abs() > 0.5 * size.max(line.size)
                    || run.x0 < last_x0 - size
            }
        };

        if new_line {
            lines.push(LineDraft {
                baseline: run.baseline,
                size,
                spans: vec![SpanDraft {
                    text: run.text,
                    bbox,
                    font: run.font,
                }],
            });
        } else if let Some(line) = lines.last_mut() {
            line.size = line.size.max(size);
            let gap = run.x0 - last_x1;
            match line.spans.last_mut() {
                Some(span) if same_font(&span.font, &run.font) && gap < 0.8 * size => {
                    let needs_space = gap > 0.15 * size
                        && !span.text.ends_with(char::is_whitespace)
                        && !run.text.starts_with(char::is_whitespace);
                    if needs_space {
                        span.text.push(' ');
                    }
                    span.text.push_str(&run.text);
                    span.bbox = union(span.bbox, bbox);
                }
                _ => line.spans.push(SpanDraft {
                    text: run.text,
                    bbox,
                    font: run.font,
                }),
            }
        }

        last_x0 = run.x0;
        last_x1 = run.x1;
    }

    lines
}
