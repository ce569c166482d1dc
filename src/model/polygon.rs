//! Page geometry.

use serde::{Deserialize, Serialize};

/// Axis-aligned box as `[x0, y0, x1, y1]` in page points.
pub type BBox = [f32; 4];

/// A four-corner polygon in page space (top-left origin).
///
/// Corners run clockwise from the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonBox {
    pub polygon: [[f32; 2]; 4],
}

impl PolygonBox {
    /// Build a polygon from a `[x0, y0, x1, y1]` box.
    pub fn from_bbox(bbox: BBox) -> Self {
        let [x0, y0, x1, y1] = bbox;
        Self {
            polygon: [[x0, y0], [x1, y0], [x1, y1], [x0, y1]],
        }
    }

    /// Smallest box enclosing every corner.
    pub fn bbox(&self) -> BBox {
        let mut bbox = [f32::MAX, f32::MAX, f32::MIN, f32::MIN];
        for [x, y] in self.polygon {
            bbox[0] = bbox[0].min(x);
            bbox[1] = bbox[1].min(y);
            bbox[2] = bbox[2].max(x);
            bbox[3] = bbox[3].max(y);
        }
        bbox
    }

    pub fn width(&self) -> f32 {
        let [x0, _, x1, _] = self.bbox();
        x1 - x0
    }

    pub fn height(&self) -> f32 {
        let [_, y0, _, y1] = self.bbox();
        y1 - y0
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}
