//! Page rasterization and the page image cache.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageFormat, RgbImage};
use once_cell::sync::OnceCell;

use crate::error::{Error, Result};

/// Points per inch; a scale of 1.0 renders at 72 dpi.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Renders a page of a document file to pixels.
pub trait Rasterizer: Send + Sync {
    /// Render the 0-based `page_index` of `path` at `scale` pixels per point.
    fn rasterize(
        &self,
        path: &Path,
        page_index: usize,
        scale: f32,
        draw_annotations: bool,
    ) -> Result<DynamicImage>;
}

/// [`Rasterizer`] backed by poppler's `pdftoppm` binary.
///
/// The page is written as PNG to stdout and decoded in memory.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
}

impl PdftoppmRasterizer {
    /// Use `pdftoppm` from `PATH`.
    pub fn new() -> Self {
        Self::with_binary("pdftoppm")
    }

    /// Use a specific `pdftoppm` executable.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(
        &self,
        path: &Path,
        page_index: usize,
        scale: f32,
        draw_annotations: bool,
    ) -> Command {
        // pdftoppm pages are 1-based
        let page_number = (page_index + 1).to_string();
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-png")
            .arg("-singlefile")
            .arg("-r")
            .arg(format!("{}", scale * POINTS_PER_INCH))
            .arg("-f")
            .arg(&page_number)
            .arg("-l")
            .arg(&page_number);
        if !draw_annotations {
            cmd.arg("-hide-annotations");
        }
        cmd.arg(path);
        cmd
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize(
        &self,
        path: &Path,
        page_index: usize,
        scale: f32,
        draw_annotations: bool,
    ) -> Result<DynamicImage> {
        let output = self
            .command(path, page_index, scale, draw_annotations)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::Rasterize(format!(
                    "{} not found; is poppler-utils installed?",
                    self.binary.display()
                )),
                _ => Error::Io(e),
            })?;

        if !output.status.success() {
            return Err(Error::Rasterize(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(image::load_from_memory_with_format(
            &output.stdout,
            ImageFormat::Png,
        )?)
    }
}

type CacheKey = (usize, u32);

/// Memoized page images keyed by `(page_index, dpi)`.
///
/// Each key owns a populate-once cell, so concurrent callers asking for the
/// same key wait for a single render instead of repeating it. A failed
/// render leaves the cell empty and the next caller retries.
#[derive(Debug, Default)]
pub struct PageImageCache {
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<Arc<RgbImage>>>>>,
}

impl PageImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached image for the key, rendering it on first use.
    pub fn get_or_render<F>(&self, page_index: usize, dpi: u32, render: F) -> Result<Arc<RgbImage>>
    where
        F: FnOnce() -> Result<DynamicImage>,
    {
        let cell = {
            let mut entries = self
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(entries.entry((page_index, dpi)).or_default())
        };

        let image = cell.get_or_try_init(|| {
            log::debug!("Rendering page {} at {} dpi", page_index, dpi);
            render().map(|image| Arc::new(image.to_rgb8()))
        })?;
        Ok(Arc::clone(image))
    }

    /// Check whether an image for the key is already rendered.
    pub fn contains(&self, page_index: usize, dpi: u32) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&(page_index, dpi))
            .is_some_and(|cell| cell.get().is_some())
    }

    /// Number of rendered images held.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
