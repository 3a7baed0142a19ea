//! Bitmap normalization: histogram equalization, grayscale conversion, and
//! an adaptive contrast/brightness/denoise pass.

use crate::utils::error::{Error, Result};
use crate::utils::image_buffer::ImageBuffer;

/// Run the full normalization sequence on `image`:
///
/// 1. Histogram-equalize channel-averaged intensity.
/// 2. Convert to grayscale via BT.709 luminance, preserving alpha.
/// 3. Branch on the resulting intensity range/mean: gamma contrast
///    enhancement for low-contrast images, brightness correction for very
///    dark/bright images, or a 3x3 median denoise otherwise.
///
/// Fails [`Error::InvalidInput`] for images smaller than 3x3.
pub fn create_bitmap(image: &ImageBuffer) -> Result<ImageBuffer> {
    if !image.meets_minimum_size() {
        return Err(Error::invalid_input("image must be at least 3x3"));
    }

    let equalized = histogram_equalize(image);
    let gray = to_grayscale_bt709(&equalized);

    let (min, max, mean) = intensity_stats(&gray);

    if max - min < 20.0 {
        Ok(gamma_enhance(&gray, min, max))
    } else if mean < 20.0 || mean > 235.0 {
        Ok(brightness_adjust(&gray, mean))
    } else {
        Ok(median_filter_3x3(&gray))
    }
}

fn histogram_equalize(image: &ImageBuffer) -> ImageBuffer {
    let w = image.width();
    let h = image.height();
    let total = (w as u64 * h as u64).max(1) as f64;

    let mut histogram = [0u64; 256];
    for y in 0..h {
        for x in 0..w {
            let (r, g, b, _a) = image.get(x, y);
            let avg = ((r as u32 + g as u32 + b as u32) / 3) as usize;
            histogram[avg] += 1;
        }
    }

    let mut cdf = [0f64; 256];
    let mut running = 0u64;
    for (i, count) in histogram.iter().enumerate() {
        running += count;
        cdf[i] = running as f64 / total;
    }
    let cdf_min = cdf.iter().cloned().find(|v| *v > 0.0).unwrap_or(0.0);
    let cdf_max = cdf[255];
    let range = (cdf_max - cdf_min).max(1e-9);

    let mut remap = [0u8; 256];
    for i in 0..256 {
        let v = ((cdf[i] - cdf_min) / range * 255.0).round().clamp(0.0, 255.0);
        remap[i] = v as u8;
    }

    let mut out = ImageBuffer::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let (r, g, b, a) = image.get(x, y);
            out.set(x, y, (remap[r as usize], remap[g as usize], remap[b as usize], a));
        }
    }
    out
}

fn to_grayscale_bt709(image: &ImageBuffer) -> ImageBuffer {
    let w = image.width();
    let h = image.height();
    let mut out = ImageBuffer::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let (r, g, b, a) = image.get(x, y);
            let lum = 0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64;
            let y8 = lum.round().clamp(0.0, 255.0) as u8;
            out.set(x, y, (y8, y8, y8, a));
        }
    }
    out
}

fn intensity_stats(gray: &ImageBuffer) -> (f64, f64, f64) {
    let mut min = 255.0f64;
    let mut max = 0.0f64;
    let mut sum = 0.0f64;
    let mut n = 0u64;
    for y in 0..gray.height() {
        for x in 0..gray.width() {
            let (v, ..) = gray.get(x, y);
            let v = v as f64;
            min = min.min(v);
            max = max.max(v);
            sum += v;
            n += 1;
        }
    }
    let mean = if n > 0 { sum / n as f64 } else { 0.0 };
    (min, max, mean)
}

fn gamma_enhance(gray: &ImageBuffer, min: f64, max: f64) -> ImageBuffer {
    const GAMMA: f64 = 1.2;
    let range = (max - min).max(1e-9);
    map_intensity(gray, |v| {
        let normalized = ((v as f64 - min) / range).clamp(0.0, 1.0);
        (normalized.powf(1.0 / GAMMA) * 255.0).round().clamp(0.0, 255.0) as u8
    })
}

fn brightness_adjust(gray: &ImageBuffer, mean: f64) -> ImageBuffer {
    let factor = if mean > 0.0 { 128.0 / mean } else { 1.0 };
    map_intensity(gray, |v| (v as f64 * factor).round().clamp(0.0, 255.0) as u8)
}

fn map_intensity(gray: &ImageBuffer, f: impl Fn(u8) -> u8) -> ImageBuffer {
    let w = gray.width();
    let h = gray.height();
    let mut out = ImageBuffer::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let (v, _, _, a) = gray.get(x, y);
            let nv = f(v);
            out.set(x, y, (nv, nv, nv, a));
        }
    }
    out
}

fn median_filter_3x3(gray: &ImageBuffer) -> ImageBuffer {
    let w = gray.width();
    let h = gray.height();
    let mut out = ImageBuffer::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut window = [0u8; 9];
            let mut i = 0;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let (v, ..) = gray.get_clamped(x as i64 + dx, y as i64 + dy);
                    window[i] = v;
                    i += 1;
                }
            }
            window.sort_unstable();
            let median = window[4];
            let (_, _, _, a) = gray.get(x, y);
            out.set(x, y, (median, median, median, a));
        }
    }
    out
}
