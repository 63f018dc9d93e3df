//! Dataset-level augmentation: listing, label I/O, parallel runs.

pub mod labels;
pub mod runner;

pub use labels::{read_label_file, source_images, write_label_file};
pub use runner::{DatasetAugmenter, DatasetDirs, ProgressFn, RunOpts};
