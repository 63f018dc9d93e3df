//! Box geometry shared by the geometric kernels.
//!
//! All helpers take and return normalized boxes; pixel-space work happens
//! internally against the supplied image dimensions. Boxes that end up
//! with less than the caller's minimum visible fraction inside the frame
//! are dropped, mirroring the label-matching contract of the compiled
//! pipeline.

use image::{RgbImage, imageops};

use crate::foundation::bbox::{BBox, LabeledBox};

/// Crop window in pixel coordinates.
#[derive(Clone, Copy, Debug)]
pub struct CropWindow {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Window width.
    pub w: u32,
    /// Window height.
    pub h: u32,
}

/// Crop `image` to `win` and remap `boxes` into the window.
///
/// Each box is intersected with the window; boxes retaining less than
/// `min_visibility` of their pixel area are dropped, the rest are
/// renormalized to the window.
pub fn crop_with_boxes(
    image: &RgbImage,
    boxes: &[LabeledBox],
    win: CropWindow,
    min_visibility: f64,
) -> (RgbImage, Vec<LabeledBox>) {
    let cropped = imageops::crop_imm(image, win.x, win.y, win.w, win.h).to_image();
    let (iw, ih) = (f64::from(image.width()), f64::from(image.height()));
    let (wx0, wy0) = (f64::from(win.x), f64::from(win.y));
    let (ww, wh) = (f64::from(win.w), f64::from(win.h));

    let remapped = boxes
        .iter()
        .filter_map(|b| {
            let (x0, y0, x1, y1) = b.bbox.corners();
            let (px0, py0, px1, py1) = (x0 * iw, y0 * ih, x1 * iw, y1 * ih);
            let area = (px1 - px0) * (py1 - py0);
            let cx0 = px0.max(wx0);
            let cy0 = py0.max(wy0);
            let cx1 = px1.min(wx0 + ww);
            let cy1 = py1.min(wy0 + wh);
            if cx1 <= cx0 || cy1 <= cy0 || area <= 0.0 {
                return None;
            }
            let visible = (cx1 - cx0) * (cy1 - cy0) / area;
            if visible < min_visibility {
                return None;
            }
            BBox::from_corners(
                (cx0 - wx0) / ww,
                (cy0 - wy0) / wh,
                (cx1 - wx0) / ww,
                (cy1 - wy0) / wh,
            )
            .map(|bb| LabeledBox::new(b.class_id, bb.sanitize()))
        })
        .collect();

    (cropped, remapped)
}

/// Resize `image` to `(tw, th)`; normalized boxes are unaffected.
pub fn resize(image: &RgbImage, tw: u32, th: u32) -> RgbImage {
    imageops::resize(image, tw, th, imageops::FilterType::Triangle)
}

/// Remap boxes through an arbitrary pixel-space point mapping.
///
/// Each box's four corners are pushed through `map`, the axis-aligned
/// hull is taken, then clipped to the image. Boxes whose hull retains
/// less than `min_visibility` of its area inside the frame are dropped.
pub fn project_boxes(
    boxes: &[LabeledBox],
    width: u32,
    height: u32,
    min_visibility: f64,
    map: impl Fn(f64, f64) -> (f64, f64),
) -> Vec<LabeledBox> {
    let (iw, ih) = (f64::from(width), f64::from(height));
    boxes
        .iter()
        .filter_map(|b| {
            let (x0, y0, x1, y1) = b.bbox.corners();
            let corners = [
                map(x0 * iw, y0 * ih),
                map(x1 * iw, y0 * ih),
                map(x0 * iw, y1 * ih),
                map(x1 * iw, y1 * ih),
            ];
            let hx0 = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
            let hy0 = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
            let hx1 = corners
                .iter()
                .map(|c| c.0)
                .fold(f64::NEG_INFINITY, f64::max);
            let hy1 = corners
                .iter()
                .map(|c| c.1)
                .fold(f64::NEG_INFINITY, f64::max);
            let hull_area = (hx1 - hx0) * (hy1 - hy0);
            let cx0 = hx0.max(0.0);
            let cy0 = hy0.max(0.0);
            let cx1 = hx1.min(iw);
            let cy1 = hy1.min(ih);
            if cx1 <= cx0 || cy1 <= cy0 || hull_area <= 0.0 {
                return None;
            }
            if (cx1 - cx0) * (cy1 - cy0) / hull_area < min_visibility {
                return None;
            }
            BBox::from_corners(cx0 / iw, cy0 / ih, cx1 / iw, cy1 / ih)
                .map(|bb| LabeledBox::new(b.class_id, bb.sanitize()))
        })
        .collect()
}

/// Clockwise rotation (image coordinates, y down) about the image center.
///
/// Matches the point motion of
/// [`imageproc::geometric_transformations::rotate_about_center`].
pub fn rotate_point_about_center(
    x: f64,
    y: f64,
    theta: f64,
    width: u32,
    height: u32,
) -> (f64, f64) {
    let cx = f64::from(width) / 2.0;
    let cy = f64::from(height) / 2.0;
    let (sin, cos) = theta.sin_cos();
    let (dx, dy) = (x - cx, y - cy);
    (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
}
