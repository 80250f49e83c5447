//! kquant - k-means color quantization and fixed-palette recoloring
//!
//! This library reduces the colors of an RGBA pixel buffer to a small derived
//! palette, or maps it onto a palette supplied by the caller.
//!
//! ## Features
//!
//! - **Redmean distance**, a cheap perceptual approximation of color difference
//! - **K-means clustering** with random initialization and empty-cluster reseeding
//! - **Two stability tests** (centroid shift or cluster variance delta)
//! - **Fixed-palette remapping** onto any list of colors
//! - **Grayscale preprocessing** with Rec. 709 luma
//!
//! ## Example
//!
//! ```rust
//! use kquant::{Config, PixelBuffer, QuantizeOptions, compute};
//!
//! let buffer = PixelBuffer::new(vec![
//!     255, 0, 0, 255,
//!     250, 5, 5, 255,
//!     0, 0, 255, 255,
//!     5, 5, 250, 255,
//! ])?;
//!
//! let result = compute(&buffer, &Config::Quantize(QuantizeOptions::with_colors(2)))?;
//! assert_eq!(result.palette.len(), 2);
//! assert_eq!(result.buffer.pixel_count(), 4);
//! # Ok::<(), kquant::QuantizeError>(())
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod image_io;
pub mod kmeans;
pub mod messages;
pub mod pixel_buffer;
pub mod random;
pub mod recolor;

pub use color::{Color, distance, nearest_color_index};
pub use config::{Config, QuantizeOptions, RecolorOptions};
pub use error::QuantizeError;
pub use image_io::{ImageData, load_image, save_image};
pub use kmeans::{ClusterResult, KMeansOptions, Stability, cluster};
pub use pixel_buffer::PixelBuffer;
pub use random::{RandomSource, SequenceSource};
pub use recolor::recolor;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A recolored buffer and the palette it was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantized {
    pub buffer: PixelBuffer,
    pub palette: Vec<Color>,
}

/// Quantize or recolor `buffer` according to `config`.
///
/// Random draws come from a freshly seeded [`StdRng`]; use
/// [`compute_with_rng`] for reproducible runs.
pub fn compute(buffer: &PixelBuffer, config: &Config) -> error::Result<Quantized> {
    compute_with_rng(buffer, config, &mut StdRng::from_entropy())
}

/// Quantize or recolor `buffer`, drawing random pixels from `rng`.
///
/// The configuration is fully validated before any work starts. The input
/// buffer is never modified.
pub fn compute_with_rng<R: RandomSource + ?Sized>(
    buffer: &PixelBuffer,
    config: &Config,
    rng: &mut R,
) -> error::Result<Quantized> {
    config.validate()?;

    match config {
        Config::Recolor(options) => {
            debug!(
                pixels = buffer.pixel_count(),
                palette = options.palette.len(),
                "recoloring onto fixed palette"
            );
            let recolored = recolor(buffer, &options.palette, None)?;
            Ok(Quantized {
                buffer: recolored,
                palette: options.palette.clone(),
            })
        }
        Config::Quantize(options) => {
            if buffer.is_empty() {
                return Err(QuantizeError::EmptyBuffer);
            }
            if options.k > buffer.pixel_count() {
                return Err(QuantizeError::InvalidConfig(format!(
                    "k ({}) exceeds the pixel count ({})",
                    options.k,
                    buffer.pixel_count()
                )));
            }
            debug!(
                pixels = buffer.pixel_count(),
                k = options.k,
                grayscale = options.grayscale,
                "quantizing"
            );

            let gray;
            let working = if options.grayscale {
                gray = buffer.to_grayscale();
                &gray
            } else {
                buffer
            };

            let clusters = cluster(working, options.k, &options.kmeans, rng)?;
            let recolored = recolor(working, &clusters.palette, Some(&clusters.assignment))?;
            Ok(Quantized {
                buffer: recolored,
                palette: clusters.palette,
            })
        }
    }
}

/// Quantize or recolor an image file and write the result as a new image.
///
/// Returns the palette used.
///
/// # Example
///
/// ```rust,no_run
/// use kquant::{Config, process_file};
/// use std::path::Path;
///
/// let palette = process_file(
///     Path::new("input.png"),
///     Path::new("output.png"),
///     &Config::default(),
///     None,
/// )?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn process_file(
    input_path: &Path,
    output_path: &Path,
    config: &Config,
    seed: Option<u64>,
) -> anyhow::Result<Vec<Color>> {
    let image = load_image(input_path)?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let result = compute_with_rng(&image.buffer, config, &mut rng)?;

    let output = ImageData {
        width: image.width,
        height: image.height,
        buffer: result.buffer,
    };
    save_image(&output, output_path)?;

    Ok(result.palette)
}
