use clap::{Parser, ValueEnum};
use kquant::color::parse_hex;
use kquant::{Color, Config, KMeansOptions, QuantizeOptions, RecolorOptions, Stability};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "kquant")]
#[command(about = "Reduce image colors with k-means or remap them onto a fixed palette")]
#[command(version)]
pub struct Cli {
    /// Input image files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output image file (only with a single input; default: <name>-quantized.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of colors to derive (default: 3)
    #[arg(short = 'k', long, default_value_t = kquant::config::DEFAULT_K)]
    pub colors: usize,

    /// Convert to grayscale before clustering
    #[arg(short, long)]
    pub grayscale: bool,

    /// Fixed palette as comma-separated hex colors; disables clustering
    #[arg(short, long, value_delimiter = ',', value_parser = parse_palette_entry)]
    pub palette: Option<Vec<Color>>,

    /// Maximum k-means iterations
    #[arg(long, default_value_t = kquant::kmeans::DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// Convergence threshold
    #[arg(long, default_value_t = kquant::kmeans::DEFAULT_EPSILON)]
    pub epsilon: f64,

    /// Convergence test
    #[arg(long, value_enum, default_value = "centroid-shift")]
    pub stability: StabilityArg,

    /// Seed for reproducible clustering
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the resulting palette as hex colors
    #[arg(long)]
    pub print_palette: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StabilityArg {
    /// Stop when no centroid moves more than epsilon
    CentroidShift,
    /// Stop when no cluster variance changes more than epsilon
    VarianceDelta,
}

impl From<StabilityArg> for Stability {
    fn from(arg: StabilityArg) -> Self {
        match arg {
            StabilityArg::CentroidShift => Stability::CentroidShift,
            StabilityArg::VarianceDelta => Stability::VarianceDelta,
        }
    }
}

fn parse_palette_entry(s: &str) -> Result<Color, String> {
    parse_hex(s).ok_or_else(|| format!("invalid hex color: {}", s))
}

impl Cli {
    pub fn config(&self) -> Config {
        match &self.palette {
            Some(palette) => Config::Recolor(RecolorOptions::new(palette.clone())),
            None => Config::Quantize(QuantizeOptions {
                k: self.colors,
                grayscale: self.grayscale,
                kmeans: KMeansOptions {
                    max_iterations: self.max_iterations,
                    epsilon: self.epsilon,
                    stability: self.stability.into(),
                },
            }),
        }
    }

    pub fn output_for(&self, input: &Path) -> PathBuf {
        if let (Some(output), 1) = (&self.output, self.inputs.len()) {
            return output.clone();
        }
        default_output(input)
    }
}

pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}-quantized.png", stem))
}
