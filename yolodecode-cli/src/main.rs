use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use yolodecode::io::save_mask;
use yolodecode::{
    ArgmaxPolicy, DecodeConfig, Decoder, Detection, ImageSize, Mode, OwnedTensor, Output,
    DEFAULT_MASK_THRESHOLD, DEFAULT_MAX_CANDIDATES,
};

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "yolodecode CLI (JSON config driven)")]
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
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModeConfig {
    Classification,
    #[default]
    Detection,
    Pose,
    Segmentation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ArgmaxConfig {
    #[default]
    ZeroFloor,
    Unbounded,
}

impl From<ArgmaxConfig> for ArgmaxPolicy {
    fn from(value: ArgmaxConfig) -> Self {
        match value {
            ArgmaxConfig::ZeroFloor => ArgmaxPolicy::ZeroFloor,
            ArgmaxConfig::Unbounded => ArgmaxPolicy::Unbounded,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct SizeJson {
    width: usize,
    height: usize,
}

impl From<SizeJson> for ImageSize {
    fn from(value: SizeJson) -> Self {
        ImageSize::new(value.width, value.height)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DecodeConfigJson {
    mode: ModeConfig,
    class_count: Option<usize>,
    score_threshold: f32,
    iou_threshold: f32,
    mask_threshold: f32,
    max_candidates: usize,
    argmax: ArgmaxConfig,
    input_size: SizeJson,
    parallel: bool,
}

impl Default for DecodeConfigJson {
    fn default() -> Self {
        let cfg = DecodeConfig::default();
        Self {
            mode: ModeConfig::Detection,
            class_count: None,
            score_threshold: cfg.score_threshold,
            iou_threshold: cfg.iou_threshold,
            mask_threshold: DEFAULT_MASK_THRESHOLD,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            argmax: ArgmaxConfig::ZeroFloor,
            input_size: SizeJson {
                width: cfg.input_size.width,
                height: cfg.input_size.height,
            },
            parallel: cfg.parallel,
        }
    }
}

impl DecodeConfigJson {
    fn into_config(self) -> DecodeConfig {
        let mode = match self.mode {
            ModeConfig::Classification => Mode::Classification,
            ModeConfig::Detection => Mode::Detection,
            ModeConfig::Pose => Mode::Pose,
            ModeConfig::Segmentation => Mode::Segmentation {
                class_count: self.class_count,
            },
        };
        DecodeConfig {
            mode,
            score_threshold: self.score_threshold,
            iou_threshold: self.iou_threshold,
            mask_threshold: self.mask_threshold,
            max_candidates: self.max_candidates,
            policy: self.argmax.into(),
            input_size: self.input_size.into(),
            parallel: self.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    output_tensor_path: String,
    prototype_tensor_path: Option<String>,
    image_size: Option<SizeJson>,
    scale_to_image: bool,
    result_path: Option<String>,
    mask_dir: Option<String>,
    decode: DecodeConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_tensor_path: String::new(),
            prototype_tensor_path: None,
            image_size: None,
            scale_to_image: false,
            result_path: None,
            mask_dir: None,
            decode: DecodeConfigJson::default(),
        }
    }
}

/// On-disk tensor: NHWC shape plus flat row-major data.
#[derive(Debug, Deserialize)]
struct TensorFile {
    shape: [usize; 4],
    data: Vec<f32>,
}

fn load_tensor(path: &str) -> Result<OwnedTensor, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let file: TensorFile = serde_json::from_str(&text)?;
    Ok(OwnedTensor::new(file.data, file.shape)?)
}

#[derive(Debug, Serialize)]
struct ClassRecord {
    class_id: usize,
    score: f32,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    bbox: [f32; 4],
    score: f32,
    class_id: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keypoints: Option<Vec<[f32; 3]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mask_area: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mask_path: Option<String>,
}

impl From<&Detection> for DetectionRecord {
    fn from(value: &Detection) -> Self {
        let b = value.bbox;
        Self {
            bbox: [b.x1, b.y1, b.x2, b.y2],
            score: value.score,
            class_id: value.class_id,
            keypoints: value
                .keypoints
                .as_ref()
                .map(|kps| kps.iter().map(|kp| [kp.x, kp.y, kp.visibility]).collect()),
            mask_area: value.mask.as_ref().map(|m| m.area()),
            mask_path: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Report {
    Classes(Vec<ClassRecord>),
    Detections(Vec<DetectionRecord>),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("yolodecode=debug".parse()?))
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
    if config.output_tensor_path.is_empty() {
        return Err("output_tensor_path must be set in the config".into());
    }

    let decode_cfg = config.decode.into_config();
    let input_size = decode_cfg.input_size;
    let image_size = config.image_size.map(ImageSize::from).unwrap_or(input_size);
    let decoder = Decoder::new(decode_cfg)?;

    let output = load_tensor(&config.output_tensor_path)?;
    let protos = config
        .prototype_tensor_path
        .as_deref()
        .map(load_tensor)
        .transpose()?;

    let result = decoder.run(output.view(), protos.as_ref().map(|p| p.view()), image_size)?;
    let report = match result {
        Output::Classes(classes) => Report::Classes(
            classes
                .into_iter()
                .map(|(class_id, score)| ClassRecord { class_id, score })
                .collect(),
        ),
        Output::Detections(dets) => {
            tracing::info!(count = dets.len(), "decoded detections");
            let mut records = Vec::with_capacity(dets.len());
            for (idx, det) in dets.iter().enumerate() {
                let det = if config.scale_to_image {
                    det.scaled_to(input_size, image_size)
                } else {
                    det.clone()
                };
                let mut record = DetectionRecord::from(&det);
                if let (Some(dir), Some(mask)) = (config.mask_dir.as_deref(), det.mask.as_ref()) {
                    let path = Path::new(dir).join(format!("mask_{idx:03}.png"));
                    save_mask(mask, &path)?;
                    record.mask_path = Some(path.display().to_string());
                }
                records.push(record);
            }
            Report::Detections(records)
        }
    };

    let json = serde_json::to_string_pretty(&report)?;
    match config.result_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
