use clap::Parser;
use platebox::io::load_dimensions;
use platebox::lowlevel::OUTPUT_CHANNELS;
use platebox::{
    Detection, Detector, DetectorConfig, ImageDimensions, NetworkInputSize, ResizeParams,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "PlateBox CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
    /// Print only the network input size and exit.
    #[arg(long)]
    size_only: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectorConfigJson {
    prob_threshold: f32,
    iou_threshold: f32,
    max_detections: Option<usize>,
    min_area: f32,
    parallel: bool,
}

impl Default for DetectorConfigJson {
    fn default() -> Self {
        let cfg = DetectorConfig::default();
        Self {
            prob_threshold: cfg.prob_threshold,
            iou_threshold: cfg.iou_threshold,
            max_detections: cfg.max_detections,
            min_area: cfg.min_area,
            parallel: cfg.parallel,
        }
    }
}

impl From<DetectorConfigJson> for DetectorConfig {
    fn from(value: DetectorConfigJson) -> Self {
        Self {
            prob_threshold: value.prob_threshold,
            iou_threshold: value.iou_threshold,
            max_detections: value.max_detections,
            min_area: value.min_area,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ResizeConfigJson {
    short_side: u32,
    max_bound: u32,
    stride: u32,
}

impl Default for ResizeConfigJson {
    fn default() -> Self {
        let params = ResizeParams::default();
        Self {
            short_side: params.short_side,
            max_bound: params.max_bound,
            stride: params.stride,
        }
    }
}

impl From<ResizeConfigJson> for ResizeParams {
    fn from(value: ResizeConfigJson) -> Self {
        Self {
            short_side: value.short_side,
            max_bound: value.max_bound,
            stride: value.stride,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    image_width: Option<u32>,
    image_height: Option<u32>,
    image_path: Option<String>,
    tensor_path: String,
    output_path: Option<String>,
    detector: DetectorConfigJson,
    resize: ResizeConfigJson,
}

#[derive(Debug, Deserialize)]
struct TensorFile {
    shape: [usize; 3],
    data: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct SizeRecord {
    width: u32,
    height: u32,
}

impl From<NetworkInputSize> for SizeRecord {
    fn from(value: NetworkInputSize) -> Self {
        Self {
            width: value.width(),
            height: value.height(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    id: String,
    label: &'static str,
    confidence: f32,
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl From<Detection> for DetectionRecord {
    fn from(value: Detection) -> Self {
        let rect = value.rect();
        Self {
            id: value.id().to_string(),
            label: value.label(),
            confidence: value.confidence(),
            left: rect.left,
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    input_size: SizeRecord,
    detections: Vec<DetectionRecord>,
}

fn source_dimensions(config: &Config) -> Result<ImageDimensions, Box<dyn std::error::Error>> {
    match (config.image_width, config.image_height, &config.image_path) {
        (Some(width), Some(height), _) => Ok(ImageDimensions::new(width, height)?),
        (_, _, Some(path)) => Ok(load_dimensions(path)?),
        _ => Err("set image_width and image_height, or image_path, in the config".into()),
    }
}

fn load_tensor(
    path: &str,
    size: NetworkInputSize,
) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let tensor: TensorFile = serde_json::from_str(&text)?;
    let [rows, cols, channels] = tensor.shape;
    if channels != OUTPUT_CHANNELS {
        return Err(format!("tensor must have {OUTPUT_CHANNELS} channels, got {channels}").into());
    }
    if rows != size.grid_rows() || cols != size.grid_cols() {
        return Err(format!(
            "tensor grid {rows}x{cols} does not match input size {}x{} (expected {}x{})",
            size.width(),
            size.height(),
            size.grid_rows(),
            size.grid_cols()
        )
        .into());
    }
    Ok(tensor.data)
}

fn write_json<T: Serialize>(
    value: &T,
    output_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("platebox=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;

    let dims = source_dimensions(&config)?;
    let output_path = config.output_path.clone();
    let mut detector = Detector::new()
        .with_config(config.detector.into())
        .with_resize_params(config.resize.into());
    let size = detector.target_size(dims)?;
    tracing::info!(
        width = size.width(),
        height = size.height(),
        "network input size"
    );

    if cli.size_only {
        return write_json(&SizeRecord::from(size), output_path.as_deref());
    }
    if config.tensor_path.is_empty() {
        return Err("tensor_path must be set in the config".into());
    }

    let tensor = load_tensor(&config.tensor_path, size)?;
    let detections = detector.detect_tensor(dims, &tensor)?;
    let output = Output {
        input_size: size.into(),
        detections: detections.into_iter().map(DetectionRecord::from).collect(),
    };
    write_json(&output, output_path.as_deref())
}
