use crate::color::{Color, nearest_color_index};
use crate::error::{QuantizeError, Result};
use crate::pixel_buffer::PixelBuffer;

/// Write every pixel of `buffer` with a color from `palette` into a new buffer.
///
/// With an `assignment` (one palette index per pixel, as produced by
/// clustering) each pixel takes its assigned entry. Without one, each pixel
/// takes the nearest palette color. The output is always fully opaque and the
/// input is left untouched.
pub fn recolor(
    buffer: &PixelBuffer,
    palette: &[Color],
    assignment: Option<&[usize]>,
) -> Result<PixelBuffer> {
    if palette.is_empty() {
        return Err(QuantizeError::InvalidPalette("palette is empty".to_string()));
    }

    let pixel_count = buffer.pixel_count();
    let mut output = PixelBuffer::with_pixel_count(pixel_count);

    match assignment {
        Some(assignment) => {
            if assignment.len() != pixel_count {
                return Err(QuantizeError::InvalidAssignment(format!(
                    "{} entries for {} pixels",
                    assignment.len(),
                    pixel_count
                )));
            }
            for (i, &idx) in assignment.iter().enumerate() {
                let color = palette.get(idx).ok_or_else(|| {
                    QuantizeError::InvalidAssignment(format!(
                        "pixel {} points at entry {} of a {}-color palette",
                        i,
                        idx,
                        palette.len()
                    ))
                })?;
                output.set_color_at(i, color);
            }
        }
        None => {
            for (i, color) in buffer.colors().enumerate() {
                let idx = nearest_color_index(&color, palette).unwrap_or(0);
                output.set_color_at(i, &palette[idx]);
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gameboy_palette() -> Vec<Color> {
        vec![
            Color::new(15, 56, 15),
            Color::new(48, 98, 48),
            Color::new(139, 172, 15),
            Color::new(155, 188, 15),
        ]
    }

    fn create_gradient_buffer(n: usize) -> PixelBuffer {
        let mut bytes = Vec::with_capacity(n * 4);
        for i in 0..n {
            let v = (i * 255 / n.max(1)) as u8;
            bytes.extend_from_slice(&[v, 255 - v, v / 2, 128]);
        }
        PixelBuffer::new(bytes).unwrap()
    }

    #[test]
    fn test_recolor_single_entry_palette() {
        let buffer = create_gradient_buffer(32);
        let out = recolor(&buffer, &[Color::new(10, 10, 10)], None).unwrap();
        assert_eq!(out.pixel_count(), 32);
        for p in out.as_bytes().chunks_exact(4) {
            assert_eq!(p, &[10, 10, 10, 255]);
        }
    }

    #[test]
    fn test_recolor_is_idempotent() {
        let palette = gameboy_palette();
        let once = recolor(&create_gradient_buffer(64), &palette, None).unwrap();
        let twice = recolor(&once, &palette, None).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_recolor_with_assignment_skips_lookup() {
        let buffer = PixelBuffer::from_colors(&[Color::new(0, 0, 0), Color::new(0, 0, 0)]);
        let palette = [Color::new(1, 1, 1), Color::new(250, 250, 250)];
        let out = recolor(&buffer, &palette, Some(&[1, 0])).unwrap();
        assert_eq!(out.as_bytes(), &[250, 250, 250, 255, 1, 1, 1, 255]);
    }

    #[test]
    fn test_recolor_does_not_mutate_input() {
        let buffer = create_gradient_buffer(8);
        let before = buffer.clone();
        let _ = recolor(&buffer, &gameboy_palette(), None).unwrap();
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_recolor_rejects_bad_inputs() {
        let buffer = create_gradient_buffer(2);
        assert!(matches!(
            recolor(&buffer, &[], None),
            Err(QuantizeError::InvalidPalette(_))
        ));
        assert!(matches!(
            recolor(&buffer, &gameboy_palette(), Some(&[0])),
            Err(QuantizeError::InvalidAssignment(_))
        ));
        assert!(matches!(
            recolor(&buffer, &gameboy_palette(), Some(&[0, 9])),
            Err(QuantizeError::InvalidAssignment(_))
        ));
    }

    #[test]
    fn test_recolor_empty_buffer() {
        let out = recolor(&PixelBuffer::default(), &gameboy_palette(), None).unwrap();
        assert!(out.is_empty());
    }
}
