use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use augforge::dataset::{DatasetAugmenter, DatasetDirs, RunOpts};
use augforge::effects::{Effect as _, create_default_effect, effect_tags};
use augforge::pipeline::Pipeline;

#[derive(Parser, Debug)]
#[command(name = "augforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Augment a whole YOLO dataset directory.
    Augment(AugmentArgs),
    /// Run the pipeline once over a single image and write the result.
    Preview(PreviewArgs),
    /// List the registered effect types.
    Effects,
}

#[derive(Parser, Debug)]
struct AugmentArgs {
    /// Pipeline configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Source images directory.
    #[arg(long)]
    images: PathBuf,

    /// Source labels directory (defaults to the images directory).
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Output images directory.
    #[arg(long)]
    out_images: PathBuf,

    /// Output labels directory (defaults to the output images directory).
    #[arg(long)]
    out_labels: Option<PathBuf>,

    /// Worker thread count (1 = sequential).
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Base RNG seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Pipeline configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Input image.
    #[arg(long)]
    image: PathBuf,

    /// Input YOLO label file (defaults to the image path with .txt).
    #[arg(long)]
    label: Option<PathBuf>,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// RNG seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Augment(args) => cmd_augment(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Effects => cmd_effects(),
    }
}

fn cmd_augment(args: AugmentArgs) -> anyhow::Result<()> {
    let pipeline = Pipeline::load(&args.config)
        .with_context(|| format!("load pipeline '{}'", args.config.display()))?;
    let labels = args.labels.unwrap_or_else(|| args.images.clone());
    let output_labels = args.out_labels.unwrap_or_else(|| args.out_images.clone());
    let dirs = DatasetDirs {
        images: args.images,
        labels,
        output_images: args.out_images,
        output_labels,
    };
    let opts = RunOpts {
        workers: Some(args.workers),
        seed: args.seed,
    };
    let written = DatasetAugmenter::new(pipeline).augment_dataset(
        &dirs,
        &opts,
        Some(&|current, total, msg| {
            eprintln!("[{current}/{total}] {msg}");
        }),
    )?;
    eprintln!("wrote {written} augmented copies");
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let pipeline = Pipeline::load(&args.config)
        .with_context(|| format!("load pipeline '{}'", args.config.display()))?;
    let label = args
        .label
        .unwrap_or_else(|| args.image.with_extension("txt"));
    let frame = DatasetAugmenter::new(pipeline).preview(&args.image, &label, args.seed)?;
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .image
        .save(&args.out)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    eprintln!("wrote {} ({} boxes)", args.out.display(), frame.boxes.len());
    Ok(())
}

fn cmd_effects() -> anyhow::Result<()> {
    for tag in effect_tags() {
        if let Some(effect) = create_default_effect(&tag) {
            let meta = effect.meta();
            let safety = if meta.bbox_safe { "bbox-safe" } else { "bbox-unsafe" };
            println!("{tag:32} [{:?}] [{safety}] {}", meta.category, meta.description);
        }
    }
    Ok(())
}
