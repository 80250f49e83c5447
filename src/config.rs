use crate::color::Color;
use crate::error::{QuantizeError, Result};
use crate::kmeans::KMeansOptions;
use serde::{Deserialize, Serialize};

/// Number of clusters used when the caller does not pick one.
pub const DEFAULT_K: usize = 3;

/// Options for derived-palette quantization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantizeOptions {
    /// Number of palette colors to derive (default: 3)
    pub k: usize,
    /// Convert to luma grayscale before clustering (default: false)
    #[serde(default)]
    pub grayscale: bool,
    #[serde(flatten)]
    pub kmeans: KMeansOptions,
}

impl Default for QuantizeOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            grayscale: false,
            kmeans: KMeansOptions::default(),
        }
    }
}

impl QuantizeOptions {
    pub fn with_colors(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(QuantizeError::InvalidConfig("k must be at least 1".to_string()));
        }
        self.kmeans.validate()
    }
}

/// Options for fixed-palette recoloring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecolorOptions {
    pub palette: Vec<Color>,
}

impl RecolorOptions {
    pub fn new(palette: Vec<Color>) -> Self {
        Self { palette }
    }

    /// Every channel of a [`Color`] is a defined byte, black included, so the
    /// only possible defect left is an empty palette.
    pub fn validate(&self) -> Result<()> {
        if self.palette.is_empty() {
            return Err(QuantizeError::InvalidPalette("palette is empty".to_string()));
        }
        Ok(())
    }
}

/// What to do with a pixel buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Config {
    /// Derive a palette with k-means and map every pixel onto it.
    Quantize(QuantizeOptions),
    /// Map every pixel onto a caller-supplied palette.
    Recolor(RecolorOptions),
}

impl Default for Config {
    fn default() -> Self {
        Config::Quantize(QuantizeOptions::default())
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        match self {
            Config::Quantize(options) => options.validate(),
            Config::Recolor(options) => options.validate(),
        }
    }
}
