//! YOLO-format label I/O and dataset listing.
//!
//! Labels are one box per line: `class cx cy w h`, normalized. Reading is
//! lenient (short or malformed lines are skipped); writing always emits
//! six decimal places.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::foundation::bbox::{BBox, LabeledBox};
use crate::foundation::error::{AugError, AugResult};

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// List the source images in `dir`, sorted by file name.
///
/// Files whose name starts with `aug` are previous outputs and are
/// excluded, so re-running over the same directory never compounds.
pub fn source_images(dir: &Path) -> AugResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AugError::dataset(format!("read dir {}: {e}", dir.display())))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| AugError::dataset(format!("read dir {}: {e}", dir.display())))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with("aug") {
            continue;
        }
        let has_image_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if has_image_ext {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read a YOLO label file. A missing file means an unlabeled image and
/// yields an empty list.
pub fn read_label_file(path: &Path) -> AugResult<Vec<LabeledBox>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path)
        .map_err(|e| AugError::dataset(format!("read {}: {e}", path.display())))?;
    let mut boxes = Vec::new();
    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            continue;
        }
        let parsed: Option<Vec<f64>> =
            parts[..5].iter().map(|p| p.parse::<f64>().ok()).collect();
        let Some(values) = parsed else {
            warn!(path = %path.display(), line, "skipping malformed label line");
            continue;
        };
        let class_id = values[0].trunc().max(0.0) as u32;
        boxes.push(LabeledBox::new(
            class_id,
            BBox::new(values[1], values[2], values[3], values[4]),
        ));
    }
    Ok(boxes)
}

/// Write a YOLO label file with six decimal places per coordinate.
pub fn write_label_file(path: &Path, boxes: &[LabeledBox]) -> AugResult<()> {
    let mut out = String::new();
    for b in boxes {
        out.push_str(&format!(
            "{} {:.6} {:.6} {:.6} {:.6}\n",
            b.class_id, b.bbox.cx, b.bbox.cy, b.bbox.w, b.bbox.h
        ));
    }
    fs::write(path, out)
        .map_err(|e| AugError::dataset(format!("write {}: {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/dataset/labels.rs"]
mod tests;
