//! The transform execution contract shared by all effect kernels.

use image::RgbImage;
use rand_chacha::ChaCha8Rng;

use crate::foundation::bbox::LabeledBox;
use crate::foundation::error::AugResult;

/// An image together with its labeled boxes, flowing through a pipeline.
#[derive(Clone, Debug)]
pub struct Frame {
    /// RGB pixel data.
    pub image: RgbImage,
    /// Normalized labeled boxes for the current image.
    pub boxes: Vec<LabeledBox>,
}

impl Frame {
    /// Construct a frame.
    pub fn new(image: RgbImage, boxes: Vec<LabeledBox>) -> Self {
        Self { image, boxes }
    }
}

/// Per-application context handed to each primitive.
pub struct ApplyCtx<'a> {
    /// Deterministic RNG for this task.
    pub rng: &'a mut ChaCha8Rng,
    /// Minimum visible fraction for a box to survive a cropping step.
    pub min_visibility: f64,
}

/// A parameterized transform kernel built by [`crate::effects::Effect::build_transform`].
///
/// Primitives receive ownership of the frame and return the transformed
/// frame; box bookkeeping is the primitive's responsibility. A primitive
/// must never roll its own application probability; the compiled
/// pipeline does that before calling `apply`.
pub trait TransformPrimitive: Send + Sync {
    /// Apply the kernel to `frame`.
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame>;
}

/// Owned, type-erased transform primitive.
pub type BoxedTransform = Box<dyn TransformPrimitive>;
