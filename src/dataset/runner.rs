//! Whole-dataset augmentation with a worker pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::dataset::labels::{read_label_file, source_images, write_label_file};
use crate::foundation::error::{AugError, AugResult};
use crate::pipeline::Pipeline;
use crate::transform::Frame;

/// The four directories a dataset run touches.
#[derive(Clone, Debug)]
pub struct DatasetDirs {
    /// Source images.
    pub images: PathBuf,
    /// Source YOLO labels.
    pub labels: PathBuf,
    /// Destination for augmented images.
    pub output_images: PathBuf,
    /// Destination for augmented labels.
    pub output_labels: PathBuf,
}

/// Tuning knobs for a dataset run.
#[derive(Clone, Debug)]
pub struct RunOpts {
    /// Worker thread count. `None` uses the rayon default; `Some(1)`
    /// runs sequentially on the calling thread.
    pub workers: Option<usize>,
    /// Base seed; each source image derives its own RNG stream from it.
    pub seed: u64,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            workers: None,
            seed: 0,
        }
    }
}

/// Progress callback: `(completed, total, message)`.
pub type ProgressFn<'a> = dyn Fn(u64, u64, &str) + Send + Sync + 'a;

/// Runs a pipeline over a whole dataset directory.
pub struct DatasetAugmenter {
    pipeline: Arc<Pipeline>,
}

impl DatasetAugmenter {
    /// Wrap a configured pipeline.
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// The wrapped pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Augment every source image, writing image/label pairs to the
    /// output directories.
    ///
    /// A failing image is logged and skipped; the rest of the batch
    /// still runs. Returns the number of augmented copies written.
    #[instrument(skip_all, fields(images = %dirs.images.display()))]
    pub fn augment_dataset(
        &self,
        dirs: &DatasetDirs,
        opts: &RunOpts,
        progress: Option<&ProgressFn<'_>>,
    ) -> AugResult<u64> {
        if !self.pipeline.enabled() {
            return Ok(0);
        }
        std::fs::create_dir_all(&dirs.output_images).map_err(|e| {
            AugError::dataset(format!("create {}: {e}", dirs.output_images.display()))
        })?;
        std::fs::create_dir_all(&dirs.output_labels).map_err(|e| {
            AugError::dataset(format!("create {}: {e}", dirs.output_labels.display()))
        })?;

        let files = source_images(&dirs.images)?;
        let total = files.len() as u64 * u64::from(self.pipeline.augmentations_per_image());
        info!(images = files.len(), copies = total, "starting dataset augmentation");

        // Warm the compile cache once so workers share the compilation.
        let _ = self.pipeline.compile(true);

        let done = AtomicU64::new(0);
        let task = |(idx, path): (usize, &PathBuf)| -> u64 {
            match self.augment_one(idx, path, dirs, opts.seed, total, &done, progress) {
                Ok(n) => n,
                Err(err) => {
                    warn!(image = %path.display(), %err, "image failed; skipping");
                    0
                }
            }
        };

        let written: u64 = match opts.workers {
            Some(1) => files.iter().enumerate().map(task).sum(),
            workers => {
                let pool = build_thread_pool(workers)?;
                pool.install(|| files.par_iter().enumerate().map(task).sum())
            }
        };
        info!(written, "dataset augmentation finished");
        Ok(written)
    }

    fn augment_one(
        &self,
        idx: usize,
        path: &Path,
        dirs: &DatasetDirs,
        base_seed: u64,
        total: u64,
        done: &AtomicU64,
        progress: Option<&ProgressFn<'_>>,
    ) -> AugResult<u64> {
        let image = image::open(path)
            .map_err(|e| AugError::dataset(format!("open {}: {e}", path.display())))?
            .to_rgb8();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| AugError::dataset(format!("bad file name {}", path.display())))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let boxes = read_label_file(&dirs.labels.join(format!("{stem}.txt")))?;

        let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(idx as u64));
        let mut written = 0;
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or(stem);
        for copy in 0..self.pipeline.augmentations_per_image() {
            let micros = unix_micros();
            let suffix: u32 = rng.gen_range(1000..=9999);
            let base = format!("aug_{copy}_{micros}_{suffix}_{stem}");

            let frame = self
                .pipeline
                .run(&mut rng, Frame::new(image.clone(), boxes.clone()));

            let img_path = dirs.output_images.join(format!("{base}.{ext}"));
            frame
                .image
                .save(&img_path)
                .map_err(|e| AugError::dataset(format!("save {}: {e}", img_path.display())))?;
            write_label_file(&dirs.output_labels.join(format!("{base}.txt")), &frame.boxes)?;
            written += 1;

            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = progress {
                cb(current, total, &format!("Augmenting {name}"));
            }
        }
        Ok(written)
    }

    /// Run the pipeline once over a single image/label pair, without
    /// writing anything. Used for previews.
    pub fn preview(&self, image_path: &Path, label_path: &Path, seed: u64) -> AugResult<Frame> {
        let image = image::open(image_path)
            .map_err(|e| AugError::dataset(format!("open {}: {e}", image_path.display())))?
            .to_rgb8();
        let boxes = read_label_file(label_path)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(self.pipeline.run(&mut rng, Frame::new(image, boxes)))
    }
}

fn build_thread_pool(threads: Option<usize>) -> AugResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(AugError::validation("'workers' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| AugError::dataset(format!("failed to build rayon thread pool: {e}")))
}

fn unix_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
