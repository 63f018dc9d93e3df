//! Normalized bounding boxes and the pre-transform sanitizer.
//!
//! Boxes use the YOLO convention: center `(cx, cy)` and size `(w, h)`,
//! all normalized to `[0, 1]` relative to the image dimensions.
//!
//! Transform kernels are intolerant of boxes whose edges drift outside
//! the unit square by a floating-point hair, so every box is passed
//! through [`BBox::sanitize`] before entering a compiled pipeline.

use serde::{Deserialize, Serialize};

/// Smallest width/height a sanitized box may have.
///
/// Prevents zero- or negative-area boxes from reaching the kernels.
pub const MIN_BOX_DIM: f64 = 1e-4;

/// A normalized center/size bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Box center x, normalized to image width.
    pub cx: f64,
    /// Box center y, normalized to image height.
    pub cy: f64,
    /// Box width, normalized to image width.
    pub w: f64,
    /// Box height, normalized to image height.
    pub h: f64,
}

impl BBox {
    /// Construct a box from center and size.
    pub const fn new(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self { cx, cy, w, h }
    }

    /// Normalized area (`w * h`).
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Corner view `(x0, y0, x1, y1)` in normalized coordinates.
    pub fn corners(&self) -> (f64, f64, f64, f64) {
        (
            self.cx - self.w / 2.0,
            self.cy - self.h / 2.0,
            self.cx + self.w / 2.0,
            self.cy + self.h / 2.0,
        )
    }

    /// Build a box from normalized corners. Returns `None` for an empty span.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Option<Self> {
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            cx: (x0 + x1) / 2.0,
            cy: (y0 + y1) / 2.0,
            w: x1 - x0,
            h: y1 - y0,
        })
    }

    /// Repair a box so its edges are guaranteed to stay inside `[0, 1]`.
    ///
    /// Width and height are clamped into `[MIN_BOX_DIM, 1]` first, then
    /// the center is clamped so `cx ± w/2` and `cy ± h/2` cannot leave the
    /// unit square.
    pub fn sanitize(&self) -> Self {
        let w = self.w.clamp(MIN_BOX_DIM, 1.0);
        let h = self.h.clamp(MIN_BOX_DIM, 1.0);
        let cx = self.cx.clamp(w / 2.0, 1.0 - w / 2.0);
        let cy = self.cy.clamp(h / 2.0, 1.0 - h / 2.0);
        Self { cx, cy, w, h }
    }

    /// True iff all four fields are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.cx.is_finite() && self.cy.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

/// A bounding box paired with its integer class id.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledBox {
    /// Object class id.
    pub class_id: u32,
    /// Normalized box geometry.
    pub bbox: BBox,
}

impl LabeledBox {
    /// Construct a labeled box.
    pub const fn new(class_id: u32, bbox: BBox) -> Self {
        Self { class_id, bbox }
    }
}

/// Sanitize a slice of boxes, dropping entries with non-finite fields.
pub fn sanitize_boxes(boxes: &[LabeledBox]) -> Vec<LabeledBox> {
    boxes
        .iter()
        .filter(|b| b.bbox.is_finite())
        .map(|b| LabeledBox::new(b.class_id, b.bbox.sanitize()))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/bbox.rs"]
mod tests;
