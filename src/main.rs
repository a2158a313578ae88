use clap::Parser;
use image::ImageReader;
use std::path::{Path, PathBuf};

use quadfind::models::Corners;
use quadfind::{DetectionPipeline, rectify};

#[derive(Parser)]
#[command(name = "quadfind")]
#[command(about = "Detect document-like rectangles in images and crop them")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Report every ranked candidate instead of only the best one
    #[arg(long)]
    all: bool,

    /// Crop the best rectangle (or the full frame if none is found) to FILE
    #[arg(long, value_name = "FILE")]
    crop: Option<PathBuf>,

    /// Print results as JSON in the host marshalling format
    #[arg(long)]
    json: bool,

    /// Canny low / high thresholds
    #[arg(long, default_value_t = 50.0)]
    canny_low: f32,
    #[arg(long, default_value_t = 150.0)]
    canny_high: f32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save intermediate stage images to directory
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

fn print_corners(corners: &Corners) {
    println!(
        "  topLeft: ({:.1}, {:.1})  topRight: ({:.1}, {:.1})",
        corners.top_left.x, corners.top_left.y, corners.top_right.x, corners.top_right.y
    );
    println!(
        "  bottomRight: ({:.1}, {:.1})  bottomLeft: ({:.1}, {:.1})",
        corners.bottom_right.x,
        corners.bottom_right.y,
        corners.bottom_left.x,
        corners.bottom_left.y
    );
}

fn save_stages(pipeline: &DetectionPipeline, img: &image::DynamicImage, dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    img.save(dir.join("00_input.png"))?;
    let stages = pipeline.stages(img)?;
    stages.gray.save(dir.join("01_grayscale.png"))?;
    stages.blurred.save(dir.join("02_blur.png"))?;
    stages.edges.save(dir.join("03_edges.png"))?;
    stages.dilated.save(dir.join("04_dilated.png"))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    if args.verbose {
        println!("Loading image: {:?}", args.image_path);
    }

    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

    if args.verbose {
        println!("Image loaded: {}x{}\n", img.width(), img.height());
    }

    let mut pipeline = DetectionPipeline::new().with_verbose(args.verbose);
    pipeline.canny_low = args.canny_low;
    pipeline.canny_high = args.canny_high;

    if let Some(debug_dir) = &args.debug_out {
        save_stages(&pipeline, &img, debug_dir)?;
        if args.verbose {
            println!("Debug: saved stage images to {:?}\n", debug_dir);
        }
    }

    let ranked = pipeline.detect_all(&img)?;

    if args.json {
        let payload = if args.all {
            serde_json::to_string_pretty(&ranked)?
        } else {
            serde_json::to_string_pretty(&ranked.first())?
        };
        println!("{}", payload);
    } else if args.all {
        println!("=== Rectangle Detection Results ===");
        println!("Total candidates: {}", ranked.len());
        for (i, result) in ranked.iter().enumerate() {
            println!("Candidate {} (score {:.3}):", i + 1, result.score);
            print_corners(&result.corners);
        }
    } else {
        match ranked.first() {
            Some(best) => {
                println!("Best rectangle (score {:.3}):", best.score);
                print_corners(&best.corners);
            }
            None => println!("No rectangle detected."),
        }
    }

    if let Some(crop_path) = &args.crop {
        // No detection means the caller-level default applies: treat the
        // whole frame as the rectangle.
        let size = quadfind::ImageSize::new(img.width(), img.height());
        let corners = ranked
            .first()
            .map(|s| s.corners)
            .unwrap_or_else(|| Corners::full_frame(size));
        let cropped = rectify(&img, &corners)?;
        cropped.save(crop_path)?;
        println!("Cropped image saved to {:?}", crop_path);
    }

    Ok(())
}
