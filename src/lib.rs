//! Deterministic image augmentation for object detection datasets.
//!
//! augforge turns a JSON pipeline configuration into a compiled chain of
//! probability-gated transforms and runs it over YOLO-format datasets:
//!
//! - [`effects`]: the effect contract, a tag-keyed registry with
//!   pluggable providers, and the built-in effect library.
//! - [`pipeline`]: ordered pipelines, content-fingerprinted compile
//!   caching, and the failure-isolating run boundary.
//! - [`dataset`]: dataset listing, label I/O, and parallel whole-dataset
//!   runs with collision-resistant output naming.
//!
//! All randomness flows from caller-provided seeds, so runs are
//! reproducible.
//!
//! ```no_run
//! use augforge::dataset::{DatasetAugmenter, DatasetDirs, RunOpts};
//! use augforge::effects::create_default_effect;
//! use augforge::pipeline::Pipeline;
//!
//! # fn main() -> augforge::AugResult<()> {
//! let mut pipeline = Pipeline::new();
//! if let Some(flip) = create_default_effect("HorizontalFlipEffect") {
//!     pipeline.add_effect(flip);
//! }
//! let dirs = DatasetDirs {
//!     images: "data/images".into(),
//!     labels: "data/labels".into(),
//!     output_images: "out/images".into(),
//!     output_labels: "out/labels".into(),
//! };
//! let written =
//!     DatasetAugmenter::new(pipeline).augment_dataset(&dirs, &RunOpts::default(), None)?;
//! println!("wrote {written} augmented copies");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod dataset;
pub mod effects;
pub mod foundation;
pub mod pipeline;
pub mod transform;

pub use foundation::bbox::{BBox, LabeledBox, MIN_BOX_DIM, sanitize_boxes};
pub use foundation::error::{AugError, AugResult};
pub use foundation::param::{ParamKind, ParamSpec, ParamValue};
pub use transform::{ApplyCtx, BoxedTransform, Frame, TransformPrimitive};
