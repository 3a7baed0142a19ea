//! Color quantization against the fixed thread palette.

use crate::core::palette::{self, GRAYSCALE_ENTRIES, PALETTE};
use crate::core::settings::ColorMode;
use crate::utils::image_buffer::ImageBuffer;
use std::collections::HashSet;

/// Map every pixel of `image` to its nearest thread-palette color and
/// report which palette hex colors were actually used.
///
/// Grayscale mode converts each pixel to BT.601-ish luminance
/// (`Y = 0.299R + 0.587G + 0.114B`) and matches `(Y, Y, Y)` against only
/// the first [`GRAYSCALE_ENTRIES`] palette entries. Color mode matches
/// `(R, G, B)` directly against the full palette.
pub fn process_image(image: &ImageBuffer, mode: ColorMode) -> (ImageBuffer, Vec<String>) {
    let mut out = ImageBuffer::new(image.width(), image.height());
    let mut used = HashSet::new();
    let mut used_order = Vec::new();

    let candidates: &[_] = if mode == ColorMode::Grayscale {
        &PALETTE[..GRAYSCALE_ENTRIES]
    } else {
        &PALETTE[..]
    };

    for y in 0..image.height() {
        for x in 0..image.width() {
            let (r, g, b, a) = image.get(x, y);
            let idx = if mode == ColorMode::Grayscale {
                let lum = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
                let y8 = lum.round().clamp(0.0, 255.0) as u8;
                palette::nearest_index(y8, y8, y8, candidates)
            } else {
                palette::nearest_index(r, g, b, candidates)
            };
            let chosen = candidates[idx];
            out.set(x, y, (chosen.r, chosen.g, chosen.b, a));
            let hex = chosen.hex();
            if used.insert(hex.clone()) {
                used_order.push(hex);
            }
        }
    }

    (out, used_order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_dark_pixel_maps_to_black() {
        let img = ImageBuffer::from_raw(1, 1, vec![10, 10, 10, 255]).unwrap();
        let (out, used) = process_image(&img, ColorMode::Grayscale);
        assert_eq!(out.get(0, 0), (0, 0, 0, 255));
        assert_eq!(used, vec!["#000000".to_string()]);
    }

    #[test]
    fn grayscale_light_pixel_maps_to_white() {
        let img = ImageBuffer::from_raw(1, 1, vec![250, 250, 250, 255]).unwrap();
        let (out, _used) = process_image(&img, ColorMode::Grayscale);
        assert_eq!(out.get(0, 0), (255, 255, 255, 255));
    }

    #[test]
    fn color_mode_matches_full_palette() {
        let img = ImageBuffer::from_raw(1, 1, vec![250, 0, 0, 255]).unwrap();
        let (out, used) = process_image(&img, ColorMode::Color);
        assert_eq!(out.get(0, 0), (0xFF, 0x00, 0x00, 255));
        assert_eq!(used, vec!["#FF0000".to_string()]);
    }

    #[test]
    fn used_colors_preserve_first_appearance_order() {
        let mut img = ImageBuffer::new(2, 1);
        img.set(0, 0, (0xFF, 0x00, 0x00, 255));
        img.set(1, 0, (0x00, 0x00, 0xFF, 255));
        let (_out, used) = process_image(&img, ColorMode::Color);
        assert_eq!(used, vec!["#FF0000".to_string(), "#0000FF".to_string()]);
    }
}
