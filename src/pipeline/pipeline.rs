//! Ordered effect pipelines and their compiled form.
//!
//! A pipeline owns configured effect instances. Compilation turns the
//! enabled subset into a list of probability-gated transform primitives;
//! the result is cached keyed by a content fingerprint of the serialized
//! configuration, so reconfiguring any effect invalidates the cache and
//! an unchanged pipeline compiles once no matter how often it runs.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::effects::effect::{Effect, serialize_effect};
use crate::effects::registry::create_effect;
use crate::foundation::bbox::sanitize_boxes;
use crate::foundation::error::{AugError, AugResult};
use crate::pipeline::fingerprint::{PipelineFingerprint, fingerprint_value};
use crate::transform::{ApplyCtx, BoxedTransform, Frame};

/// Default number of augmented copies produced per source image.
pub const DEFAULT_AUGMENTATIONS_PER_IMAGE: u32 = 5;

/// Default minimum visible fraction for a box to survive a crop or warp.
pub const DEFAULT_MIN_VISIBILITY: f64 = 0.3;

/// One probability-gated step of a compiled pipeline.
struct CompiledStep {
    tag: &'static str,
    probability: f64,
    transform: BoxedTransform,
}

/// The executable form of a pipeline configuration.
///
/// Cheap to share across worker threads; all randomness comes from the
/// caller's RNG so runs are reproducible per seed.
pub struct CompiledTransform {
    steps: Vec<CompiledStep>,
    min_visibility: f64,
}

impl CompiledTransform {
    /// Number of steps that can fire.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when no step is enabled.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply the pipeline to one frame. Each step fires independently
    /// with its configured probability.
    pub fn apply(&self, rng: &mut ChaCha8Rng, frame: Frame) -> AugResult<Frame> {
        let mut ctx = ApplyCtx {
            rng,
            min_visibility: self.min_visibility,
        };
        let mut frame = frame;
        // Repair incoming boxes before any kernel sees them, so crop
        // visibility is measured against the in-frame area only.
        frame.boxes = sanitize_boxes(&frame.boxes);
        for step in &self.steps {
            if ctx.rng.r#gen::<f64>() >= step.probability {
                continue;
            }
            frame = step.transform.apply(&mut ctx, frame).map_err(|e| {
                AugError::transform(format!("effect {} failed: {e}", step.tag))
            })?;
        }
        frame.boxes = sanitize_boxes(&frame.boxes);
        Ok(frame)
    }
}

/// An ordered, configurable augmentation pipeline.
pub struct Pipeline {
    enabled: bool,
    augmentations_per_image: u32,
    min_visibility: f64,
    effects: Vec<Box<dyn Effect>>,
    cache: Mutex<Option<(PipelineFingerprint, Arc<CompiledTransform>)>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Empty enabled pipeline with default settings.
    pub fn new() -> Self {
        Self {
            enabled: true,
            augmentations_per_image: DEFAULT_AUGMENTATIONS_PER_IMAGE,
            min_visibility: DEFAULT_MIN_VISIBILITY,
            effects: Vec::new(),
            cache: Mutex::new(None),
        }
    }

    /// Whether the pipeline runs at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the whole pipeline.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Augmented copies produced per source image.
    pub fn augmentations_per_image(&self) -> u32 {
        self.augmentations_per_image
    }

    /// Set the per-image copy count. Values below 1 are raised to 1.
    pub fn set_augmentations_per_image(&mut self, n: u32) {
        self.augmentations_per_image = n.max(1);
    }

    /// Visibility threshold handed to cropping and warping steps.
    pub fn min_visibility(&self) -> f64 {
        self.min_visibility
    }

    /// Set the visibility threshold, clamped to `[0, 1]`.
    pub fn set_min_visibility(&mut self, v: f64) {
        self.min_visibility = v.clamp(0.0, 1.0);
    }

    /// The configured effects, in application order.
    pub fn effects(&self) -> &[Box<dyn Effect>] {
        &self.effects
    }

    /// Mutable access to one effect by position.
    pub fn effect_mut(&mut self, index: usize) -> Option<&mut Box<dyn Effect>> {
        self.effects.get_mut(index)
    }

    /// Append an effect to the end of the chain.
    pub fn add_effect(&mut self, effect: Box<dyn Effect>) {
        self.effects.push(effect);
    }

    /// Remove and return the effect at `index`.
    pub fn remove_effect(&mut self, index: usize) -> AugResult<Box<dyn Effect>> {
        if index >= self.effects.len() {
            return Err(AugError::validation(format!(
                "effect index {index} out of range (len {})",
                self.effects.len()
            )));
        }
        Ok(self.effects.remove(index))
    }

    /// Move the effect at `from` so it sits at position `to`.
    pub fn move_effect(&mut self, from: usize, to: usize) -> AugResult<()> {
        let len = self.effects.len();
        if from >= len || to >= len {
            return Err(AugError::validation(format!(
                "move {from} -> {to} out of range (len {len})"
            )));
        }
        let effect = self.effects.remove(from);
        self.effects.insert(to, effect);
        Ok(())
    }

    /// Serialize the full configuration to its wire form.
    pub fn serialize(&self) -> Value {
        json!({
            "enabled": self.enabled,
            "augmentations_per_image": self.augmentations_per_image,
            "min_visibility": self.min_visibility,
            "effects": self
                .effects
                .iter()
                .map(|e| serialize_effect(e.as_ref()))
                .collect::<Vec<_>>(),
        })
    }

    /// Rebuild a pipeline from its wire form.
    ///
    /// Unknown effect types are dropped with a warning rather than
    /// failing the whole configuration.
    pub fn from_value(data: &Value) -> AugResult<Self> {
        let obj = data
            .as_object()
            .ok_or_else(|| AugError::serde("pipeline config must be a JSON object"))?;
        let mut pipeline = Self::new();
        pipeline.enabled = obj.get("enabled").and_then(Value::as_bool).unwrap_or(true);
        if let Some(n) = obj.get("augmentations_per_image").and_then(Value::as_u64) {
            pipeline.set_augmentations_per_image(n.min(u64::from(u32::MAX)) as u32);
        }
        if let Some(v) = obj.get("min_visibility").and_then(Value::as_f64) {
            pipeline.set_min_visibility(v);
        }
        if let Some(effects) = obj.get("effects").and_then(Value::as_array) {
            for entry in effects {
                if let Some(effect) = create_effect(entry) {
                    pipeline.effects.push(effect);
                }
            }
        }
        Ok(pipeline)
    }

    /// Load a pipeline configuration from a JSON file.
    pub fn load(path: &Path) -> AugResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| AugError::serde(format!("read {}: {e}", path.display())))?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| AugError::serde(format!("parse {}: {e}", path.display())))?;
        Self::from_value(&value)
    }

    /// Write the configuration to a JSON file.
    pub fn save(&self, path: &Path) -> AugResult<()> {
        let text = serde_json::to_string_pretty(&self.serialize())
            .map_err(|e| AugError::serde(e.to_string()))?;
        fs::write(path, text)
            .map_err(|e| AugError::serde(format!("write {}: {e}", path.display())))
    }

    /// Content fingerprint of the current configuration.
    pub fn fingerprint(&self) -> PipelineFingerprint {
        fingerprint_value(&self.serialize())
    }

    fn build(&self) -> CompiledTransform {
        let steps = self
            .effects
            .iter()
            .filter(|e| e.enabled())
            .map(|e| CompiledStep {
                tag: e.meta().tag,
                probability: e.probability(),
                transform: e.build_transform(),
            })
            .collect();
        CompiledTransform {
            steps,
            min_visibility: self.min_visibility,
        }
    }

    /// Compile the enabled effects into an executable transform.
    ///
    /// With `use_cache` the previous compilation is reused while the
    /// configuration fingerprint is unchanged. Two threads racing past a
    /// stale cache both compile; the results are interchangeable.
    pub fn compile(&self, use_cache: bool) -> Arc<CompiledTransform> {
        let fp = self.fingerprint();
        if use_cache
            && let Ok(guard) = self.cache.lock()
            && let Some((cached_fp, compiled)) = guard.as_ref()
            && *cached_fp == fp
        {
            return Arc::clone(compiled);
        }
        debug!(steps = self.effects.iter().filter(|e| e.enabled()).count(), "compiling pipeline");
        let compiled = Arc::new(self.build());
        if let Ok(mut guard) = self.cache.lock() {
            *guard = Some((fp, Arc::clone(&compiled)));
        }
        compiled
    }

    /// Run the pipeline on one frame.
    ///
    /// A disabled or empty pipeline returns the frame unchanged. A step
    /// failure is logged with the frame's shape and the original frame is
    /// returned untouched, so one bad transform never poisons a batch.
    pub fn run(&self, rng: &mut ChaCha8Rng, frame: Frame) -> Frame {
        if !self.enabled {
            return frame;
        }
        let compiled = self.compile(true);
        if compiled.is_empty() {
            return frame;
        }
        let original = frame.clone();
        match compiled.apply(rng, frame) {
            Ok(out) => out,
            Err(err) => {
                warn!(
                    width = original.image.width(),
                    height = original.image.height(),
                    boxes = original.boxes.len(),
                    %err,
                    "pipeline step failed; keeping original frame"
                );
                original
            }
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("enabled", &self.enabled)
            .field("augmentations_per_image", &self.augmentations_per_image)
            .field("effects", &self.effects.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/pipeline.rs"]
mod tests;
