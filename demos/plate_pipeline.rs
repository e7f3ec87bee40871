use indicatif::{ProgressBar, ProgressStyle};
use platetrack_rs::{
    config::PipelineConfig,
    object::Object,
    plate::PlateDetection,
    rect::Rect,
    trajectory::{canonicalize, csv_io, interpolate},
    PlatePipeline,
};
use serde::Deserialize;
use std::{env, error::Error, fs, path::PathBuf};

#[derive(Debug, Deserialize)]
struct FrameJson {
    frame: usize,
    #[serde(default)]
    vehicles: Vec<VehicleJson>,
    #[serde(default)]
    plates: Vec<PlateJson>,
}

#[derive(Debug, Deserialize)]
struct VehicleJson {
    bbox: [f32; 4],
    score: f32,
}

#[derive(Debug, Deserialize)]
struct PlateJson {
    bbox: [f32; 4],
    score: f32,
    text: Option<String>,
    text_score: Option<f32>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print_usage();
        return Ok(());
    }

    let input = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/detections.json"));
    let output_dir = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/output"));
    let config = match args.get(3) {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let frames: Vec<FrameJson> = serde_json::from_str(&fs::read_to_string(&input)?)?;
    fs::create_dir_all(&output_dir)?;

    let progress = ProgressBar::new(frames.len() as u64);
    let style = ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
    )?
    .progress_chars("=>-");
    progress.set_style(style);
    progress.set_message("tracking");

    let categories = config.categories.clone();
    let mut pipeline = PlatePipeline::new(config);
    let mut skipped = 0usize;
    for frame in frames {
        let vehicles: Vec<Object> = frame
            .vehicles
            .iter()
            .filter_map(|v| Rect::from_array(&v.bbox).ok().map(|r| Object::detection(r, v.score)))
            .collect();
        let plates: Vec<PlateDetection> = frame
            .plates
            .into_iter()
            .filter_map(|p| {
                Rect::from_array(&p.bbox)
                    .ok()
                    .map(|r| PlateDetection::new(r, p.score, p.text, p.text_score))
            })
            .collect();
        skipped += frame.vehicles.len() - vehicles.len();

        pipeline.process_frame(frame.frame, &vehicles, &plates)?;
        progress.inc(1);
    }
    progress.finish_with_message("reconciling");

    let store = pipeline.finish();
    let raw_csv = output_dir.join("tracks.csv");
    csv_io::write_records_to_path(&store, &raw_csv)?;

    let filled = interpolate(&csv_io::read_records_from_path(&raw_csv)?)?;
    let interpolated_csv = output_dir.join("tracks_interpolated.csv");
    csv_io::write_records_to_path(&filled, &interpolated_csv)?;

    let canonical = canonicalize(&filled, &categories);
    let canonical_csv = output_dir.join("vehicles.csv");
    csv_io::write_canonical_to_path(&canonical, &canonical_csv)?;

    if skipped > 0 {
        println!("Skipped {skipped} degenerate vehicle boxes");
    }
    println!(
        "{} identities, {} with a plate reading",
        store.num_identities(),
        canonical.len()
    );
    println!("Saved {}", raw_csv.display());
    println!("Saved {}", interpolated_csv.display());
    println!("Saved {}", canonical_csv.display());

    Ok(())
}

fn print_usage() {
    println!(
        "Usage: cargo run --example plate_pipeline [detections_json] [output_dir] [config_json]\n\
Defaults:\n\
  detections_json: data/detections.json\n\
  output_dir: data/output\n\
  config_json: built-in defaults\n\
Input is a JSON array of {{\"frame\", \"vehicles\": [{{\"bbox\", \"score\"}}], \"plates\": [{{\"bbox\", \"score\", \"text\", \"text_score\"}}]}}."
    );
}
