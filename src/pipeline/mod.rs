//! Pipeline configuration, compilation, and caching.

pub mod fingerprint;
pub mod pipeline;

pub use fingerprint::{PipelineFingerprint, fingerprint_value};
pub use pipeline::{
    CompiledTransform, DEFAULT_AUGMENTATIONS_PER_IMAGE, DEFAULT_MIN_VISIBILITY, Pipeline,
};
