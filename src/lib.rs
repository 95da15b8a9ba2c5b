//! Freshcrop: the image side of food capture.
//!
//! A photo of groceries goes in; a display-quality copy, a small copy for
//! the vision service, and one square thumbnail per detected item come out.
//! Bad detector output never aborts a capture: a malformed bounding box
//! costs only that item's thumbnail, which falls back to the full image.
//!
//! # Modules
//!
//! - [`geom`]: Dimensions, normalized bounding boxes and crop regions
//! - [`media`]: Dimension probing, compression and thumbnail cropping
//! - [`capture`]: The capture pipeline and the vision-service seam
//! - [`error`]: Error types for freshcrop operations

pub mod capture;
pub mod error;
pub mod geom;
pub mod media;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use capture::{
    generate_image_file_name, storage_object_path, CannedDetector, CapturePipeline,
    CaptureReport, PipelineConfig,
};
use geom::{Dimensions, DetectionBox};
use media::{CompressionOptions, ImageReference, OutputFormat};

pub use error::FreshcropError;

/// The freshcrop CLI application.
#[derive(Parser)]
#[command(name = "freshcrop")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the pixel dimensions of an image.
    Probe(ProbeArgs),
    /// Re-encode an image, downscaling it if it is too wide.
    Compress(CompressArgs),
    /// Cut a square thumbnail around a normalized bounding box.
    Crop(CropArgs),
    /// Run a photo through the full capture pipeline with a saved detection reply.
    Capture(CaptureArgs),
}

#[derive(clap::Args)]
struct ProbeArgs {
    /// Image to inspect.
    input: PathBuf,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

#[derive(clap::Args)]
struct CompressArgs {
    /// Image to compress.
    input: PathBuf,

    /// Where to write the compressed image.
    #[arg(short = 'o', long = "out")]
    out: PathBuf,

    /// Encoder quality in (0, 1].
    #[arg(long, default_value_t = 0.7)]
    quality: f32,

    /// Downscale images wider than this many pixels.
    #[arg(long, default_value_t = 1024)]
    max_width: u32,

    /// Output encoding ('jpeg' or 'png').
    #[arg(long, default_value = "jpeg")]
    format: String,

    /// Output format for the summary ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

#[derive(clap::Args)]
struct CropArgs {
    /// Image to crop.
    input: PathBuf,

    /// Bounding box as 'ymin,xmin,ymax,xmax', each normalized to 0..1000.
    #[arg(long, allow_hyphen_values = true)]
    bbox: String,

    /// Where to write the JPEG thumbnail.
    #[arg(short = 'o', long = "out")]
    out: PathBuf,

    /// Thumbnail edge length in pixels.
    #[arg(long, default_value_t = media::DEFAULT_THUMBNAIL_SIZE)]
    size: u32,
}

#[derive(clap::Args)]
struct CaptureArgs {
    /// Photo to analyze.
    input: PathBuf,

    /// File holding the vision service's raw reply.
    #[arg(long)]
    detections: PathBuf,

    /// Directory that stands in for object storage.
    #[arg(long)]
    out_dir: PathBuf,

    /// Owner of the stored thumbnails.
    #[arg(long, env = "FRESHCROP_USER_ID", default_value = "local")]
    user_id: String,

    /// Pipeline config (YAML). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the freshcrop CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), FreshcropError> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Some(Commands::Probe(args)) => run_probe(args),
        Some(Commands::Compress(args)) => run_compress(args),
        Some(Commands::Crop(args)) => run_crop(args),
        Some(Commands::Capture(args)) => run_capture(args),
        None => {
            println!("freshcrop {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Image normalization and thumbnails for food capture.");
            println!();
            println!("Run 'freshcrop --help' for usage information.");
            Ok(())
        }
    }
}

/// Logs go to stderr so JSON output on stdout stays clean. `RUST_LOG`
/// overrides the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn run_probe(args: ProbeArgs) -> Result<(), FreshcropError> {
    let dims = media::probe(&ImageReference::from_path(&args.input))?;

    #[derive(Serialize)]
    struct ProbeOutput<'a> {
        path: &'a Path,
        #[serde(flatten)]
        dimensions: Dimensions,
    }

    if is_json(&args.output)? {
        print_json(&ProbeOutput {
            path: &args.input,
            dimensions: dims,
        })
    } else {
        println!("{}: {}", args.input.display(), dims);
        Ok(())
    }
}

fn run_compress(args: CompressArgs) -> Result<(), FreshcropError> {
    let json = is_json(&args.output)?;
    let format: OutputFormat = args.format.parse().map_err(FreshcropError::UnsupportedFormat)?;
    let options = CompressionOptions {
        quality: args.quality,
        max_width: args.max_width,
        format,
        return_encoded_payload: false,
    };

    let input = ImageReference::from_path(&args.input);
    let result = media::compress_blocking(&input, &options);
    // A failed compression hands back the original, which is still written out.
    let bytes = result.reference.read_bytes()?;
    fs::write(&args.out, &bytes)?;

    #[derive(Serialize)]
    struct CompressOutput<'a> {
        input: &'a Path,
        output: &'a Path,
        width: Option<u32>,
        height: Option<u32>,
        bytes: usize,
        failure_reason: Option<&'a str>,
    }

    if json {
        return print_json(&CompressOutput {
            input: &args.input,
            output: &args.out,
            width: result.width,
            height: result.height,
            bytes: bytes.len(),
            failure_reason: result.failure_reason.as_deref(),
        });
    }

    match (&result.failure_reason, result.dimensions()) {
        (Some(reason), _) => {
            println!(
                "Compression failed, copied original to {}: {}",
                args.out.display(),
                reason
            );
        }
        (None, Some(dims)) => {
            println!(
                "Compressed {} -> {} ({}, {} bytes)",
                args.input.display(),
                args.out.display(),
                dims,
                bytes.len()
            );
        }
        (None, None) => {
            println!(
                "Compressed {} -> {} ({} bytes)",
                args.input.display(),
                args.out.display(),
                bytes.len()
            );
        }
    }
    Ok(())
}

fn run_crop(args: CropArgs) -> Result<(), FreshcropError> {
    let bbox = parse_bbox_arg(&args.bbox)?;
    let input = ImageReference::from_path(&args.input);
    let thumbnail = media::render_thumbnail(&input, &bbox, args.size, None)?;

    let bytes = thumbnail.reference.read_bytes()?;
    fs::write(&args.out, &bytes)?;

    let region = thumbnail.region;
    println!(
        "Cropped {}px square at ({}, {}) of {} -> {} ({}x{})",
        region.size,
        region.origin_x,
        region.origin_y,
        thumbnail.source,
        args.out.display(),
        args.size,
        args.size
    );
    Ok(())
}

fn run_capture(args: CaptureArgs) -> Result<(), FreshcropError> {
    let json = is_json(&args.output)?;
    let config = match &args.config {
        Some(path) => PipelineConfig::from_yaml_path(path)?,
        None => PipelineConfig::default(),
    };
    let detector =
        CannedDetector::from_path(&args.detections).map_err(|source| {
            FreshcropError::DetectionsRead {
                path: args.detections.clone(),
                source,
            }
        })?;

    let input = ImageReference::from_path(&args.input);
    let pipeline = CapturePipeline::new(detector, config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let capture = runtime.block_on(pipeline.analyze(&input))?;

    let mut report = CaptureReport::new(args.input.display().to_string(), &capture);
    for (summary, item) in report.items.iter_mut().zip(&capture.items) {
        let file_name = generate_image_file_name("food", OutputFormat::Jpeg);
        let object_path = storage_object_path(&args.user_id, &file_name)?;
        store(&args.out_dir, &object_path, &item.thumbnail)?;
        summary.stored_at = Some(object_path);
    }

    if json {
        print_json(&report)
    } else {
        print!("{}", report);
        Ok(())
    }
}

/// Writes a thumbnail under `root`, creating the user directory as needed.
fn store(root: &Path, object_path: &str, thumbnail: &ImageReference) -> Result<(), FreshcropError> {
    let target = root.join(object_path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, thumbnail.read_bytes()?)?;
    Ok(())
}

fn parse_bbox_arg(value: &str) -> Result<DetectionBox, FreshcropError> {
    let values = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|e| FreshcropError::BoundingBoxArg {
            value: value.to_string(),
            message: e.to_string(),
        })?;
    Ok(DetectionBox::try_from_values(&values)?)
}

fn is_json(output: &str) -> Result<bool, FreshcropError> {
    match output {
        "json" => Ok(true),
        "text" => Ok(false),
        other => Err(FreshcropError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            other
        ))),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), FreshcropError> {
    let text = serde_json::to_string_pretty(value).map_err(FreshcropError::JsonOutput)?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_arg_parses_four_numbers() {
        let bbox = parse_bbox_arg("100, 200,400,600").unwrap();
        assert_eq!(bbox.to_yxyx(), [100.0, 200.0, 400.0, 600.0]);
    }

    #[test]
    fn bbox_arg_rejects_non_numbers_and_wrong_length() {
        assert!(matches!(
            parse_bbox_arg("1,2,x,4"),
            Err(FreshcropError::BoundingBoxArg { .. })
        ));
        assert!(matches!(
            parse_bbox_arg("1,2,3"),
            Err(FreshcropError::InvalidBoundingBox(_))
        ));
    }

    #[test]
    fn output_format_is_checked() {
        assert!(is_json("json").unwrap());
        assert!(!is_json("text").unwrap());
        assert!(matches!(
            is_json("yaml"),
            Err(FreshcropError::UnsupportedFormat(_))
        ));
    }
}
