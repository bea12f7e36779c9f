use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use road_severity::integration::Location;
use road_severity::{AssessConfig, Assessment, DetectionRecord, RoadVerdict};

/// Road damage post-processing: merge boxes, score severity, threshold classifier output.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a JSON array of detections for one image
    Assess {
        /// JSON file holding detection records (`bbox`, `class`, `conf`)
        #[arg(value_name = "DETECTIONS")]
        detections: PathBuf,

        /// Image width in pixels
        #[arg(long)]
        width: u32,

        /// Image height in pixels
        #[arg(long)]
        height: u32,

        /// Merge overlapping same-class boxes before scoring
        #[arg(long)]
        merge: bool,

        /// IoU threshold for merging (0.0 - 1.0)
        #[arg(long, value_name = "THRESHOLD")]
        iou: Option<f32>,

        #[arg(long, requires = "longitude", allow_negative_numbers = true)]
        latitude: Option<f64>,

        #[arg(long, requires = "latitude", allow_negative_numbers = true)]
        longitude: Option<f64>,
    },

    /// Threshold multi-label classifier scores
    /// (pothole, longitudinal crack, lateral crack, alligator crack)
    Labels {
        #[arg(required = true, num_args = 1.., value_name = "SCORE")]
        scores: Vec<f32>,
    },

    /// Decide road / not a road from the road classifier's confidence
    Road {
        #[arg(value_name = "CONFIDENCE")]
        confidence: f32,

        /// Confidence below which the image is not a road
        #[arg(long, value_name = "THRESHOLD")]
        threshold: Option<f32>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AssessConfig> {
    match path {
        Some(path) => Ok(AssessConfig::from_path(path)?),
        None => Ok(AssessConfig::default()),
    }
}

fn run(args: Args) -> Result<String> {
    let mut config = load_config(args.config.as_ref())?;

    match args.command {
        Command::Assess {
            detections,
            width,
            height,
            merge,
            iou,
            latitude,
            longitude,
        } => {
            let start = Instant::now();
            anyhow::ensure!(
                width > 0 && height > 0,
                road_severity::Error::InvalidImageSize { width, height }
            );
            if merge {
                config.merge.enabled = true;
            }
            if let Some(iou) = iou {
                config.merge.iou_threshold = iou;
            }

            let content = std::fs::read_to_string(&detections)
                .with_context(|| format!("failed to read detections from {}", detections.display()))?;
            let records: Vec<DetectionRecord> =
                serde_json::from_str(&content).map_err(road_severity::Error::from)?;
            info!(count = records.len(), path = %detections.display(), "read detections");

            let detections = records
                .into_iter()
                .map(|r| r.into_detection(width, height, config.palette))
                .collect();
            let location = latitude
                .zip(longitude)
                .map(|(latitude, longitude)| Location {
                    latitude,
                    longitude,
                });

            let assessment =
                Assessment::from_detections(detections, width, height, location, &config)
                    .with_elapsed(start.elapsed());
            info!(level = %assessment.severity.level, "assessed");
            Ok(serde_json::to_string(&assessment)?)
        }
        Command::Labels { scores } => {
            let labels = config.labels.predict_labels(&scores)?;
            Ok(serde_json::to_string(&labels)?)
        }
        Command::Road {
            confidence,
            threshold,
        } => {
            let threshold = threshold.unwrap_or(config.road.threshold);
            let verdict = RoadVerdict::from_confidence(confidence, threshold);
            info!(confidence, threshold, "road verdict");
            Ok(verdict.to_string())
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
            ExitCode::FAILURE
        }
    }
}
