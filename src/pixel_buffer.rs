use crate::color::Color;
use crate::error::{QuantizeError, Result};
use serde::{Deserialize, Serialize};

/// Bytes per pixel: red, green, blue, alpha.
pub const CHANNELS: usize = 4;

/// Flat row-major RGBA pixel data.
///
/// The length is always a multiple of [`CHANNELS`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct PixelBuffer {
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(data: Vec<u8>) -> Result<Self> {
        if data.len() % CHANNELS != 0 {
            return Err(QuantizeError::InvalidBuffer { len: data.len() });
        }
        Ok(Self { data })
    }

    /// A zeroed (transparent black) buffer holding `pixel_count` pixels.
    pub fn with_pixel_count(pixel_count: usize) -> Self {
        Self {
            data: vec![0; pixel_count * CHANNELS],
        }
    }

    /// Build an opaque buffer from a list of colors.
    pub fn from_colors(colors: &[Color]) -> Self {
        let mut buffer = Self::with_pixel_count(colors.len());
        for (i, color) in colors.iter().enumerate() {
            buffer.set_color_at(i, color);
        }
        buffer
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Color channels of the pixel at `index`.
    ///
    /// Panics if `index >= pixel_count()`.
    #[inline]
    pub fn color_at(&self, index: usize) -> Color {
        let i = index * CHANNELS;
        Color::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    #[inline]
    pub fn alpha_at(&self, index: usize) -> u8 {
        self.data[index * CHANNELS + 3]
    }

    /// Write a color at `index`, forcing the pixel opaque.
    #[inline]
    pub fn set_color_at(&mut self, index: usize, color: &Color) {
        let i = index * CHANNELS;
        self.data[i] = color.r;
        self.data[i + 1] = color.g;
        self.data[i + 2] = color.b;
        self.data[i + 3] = 255;
    }

    /// Iterate over pixel colors in buffer order.
    pub fn colors(&self) -> impl ExactSizeIterator<Item = Color> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|p| Color::new(p[0], p[1], p[2]))
    }

    /// Luma grayscale copy. Alpha is carried over untouched.
    pub fn to_grayscale(&self) -> PixelBuffer {
        let mut data = self.data.clone();
        for p in data.chunks_exact_mut(CHANNELS) {
            let y = luma(p[0], p[1], p[2]);
            p[0] = y;
            p[1] = y;
            p[2] = y;
        }
        PixelBuffer { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl TryFrom<Vec<u8>> for PixelBuffer {
    type Error = QuantizeError;

    fn try_from(data: Vec<u8>) -> Result<Self> {
        Self::new(data)
    }
}

impl From<PixelBuffer> for Vec<u8> {
    fn from(buffer: PixelBuffer) -> Self {
        buffer.data
    }
}

/// Rec. 709 luma, rounded and clamped to a byte.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64;
    y.round().clamp(0.0, 255.0) as u8
}
