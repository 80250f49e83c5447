use crate::pixel_buffer::PixelBuffer;
use anyhow::{Context, Result};
use std::path::Path;

/// A decoded image: dimensions plus its RGBA pixels.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub buffer: PixelBuffer,
}

pub fn load_image(path: &Path) -> Result<ImageData> {
    let img = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(ImageData {
        width,
        height,
        buffer: PixelBuffer::new(rgba.into_raw())?,
    })
}

/// Encode `image_data`; the format follows the file extension.
pub fn save_image(image_data: &ImageData, path: &Path) -> Result<()> {
    let expected = image_data.width as usize * image_data.height as usize;
    if image_data.buffer.pixel_count() != expected {
        return Err(anyhow::anyhow!(
            "buffer holds {} pixels but image is {}x{}",
            image_data.buffer.pixel_count(),
            image_data.width,
            image_data.height
        ));
    }

    let img = image::RgbaImage::from_raw(
        image_data.width,
        image_data.height,
        image_data.buffer.as_bytes().to_vec(),
    )
    .ok_or_else(|| anyhow::anyhow!("failed to build image buffer"))?;

    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
