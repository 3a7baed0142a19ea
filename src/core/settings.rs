//! User-facing processing settings and their sanitizer.

use serde::{Deserialize, Serialize};

/// Whether image colors are quantized against the full palette or the
/// grayscale-only subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Match only the grayscale palette entries (Black..White).
    Grayscale,
    /// Match the full 11-entry palette.
    Color,
}

/// Caller-provided parameters controlling the conversion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSettings {
    /// Target canvas width, millimeters.
    pub width: f64,
    /// Target canvas height, millimeters.
    pub height: f64,
    /// Fill density, stitches per square millimeter.
    pub density: f64,
    /// Sobel magnitude cutoff, 0-255.
    pub edge_threshold: f64,
    /// Scanline fill direction, degrees.
    pub fill_angle: f64,
    /// Whether to plan a perpendicular underlay fill first.
    pub use_underlay: bool,
    /// Uniform offset applied to compensate for fabric pull, millimeters.
    pub pull_compensation: f64,
    /// Requested base color, `#RRGGBB`.
    pub color: String,
    /// Grayscale or full-color quantization.
    pub color_mode: ColorMode,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            density: 2.0,
            edge_threshold: 128.0,
            fill_angle: 0.0,
            use_underlay: false,
            pull_compensation: 0.0,
            color: "#000000".to_string(),
            color_mode: ColorMode::Color,
        }
    }
}

/// Which fields the sanitizer had to adjust, for diagnostic logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Names of fields that were clamped, normalized, or replaced.
    pub adjusted_fields: Vec<&'static str>,
}

impl SanitizeReport {
    fn mark(&mut self, field: &'static str) {
        self.adjusted_fields.push(field);
    }

    /// Whether anything was adjusted.
    pub fn is_clean(&self) -> bool {
        self.adjusted_fields.is_empty()
    }
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

fn is_valid_hex_color(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 7
        && bytes[0] == b'#'
        && bytes[1..].iter().all(|b| b.is_ascii_hexdigit())
}

fn normalize_angle(deg: f64) -> f64 {
    if !deg.is_finite() {
        return 0.0;
    }
    let mut a = deg % 360.0;
    if a < 0.0 {
        a += 360.0;
    }
    a
}

/// Clamp and normalize settings per the documented ranges, falling back to
/// safe defaults for malformed fields. Returns the sanitized settings and a
/// report of which fields were touched. Idempotent: sanitizing an already
/// sanitized value reports nothing changed.
pub fn sanitize(settings: &ProcessingSettings) -> (ProcessingSettings, SanitizeReport) {
    let mut report = SanitizeReport::default();
    let mut out = settings.clone();

    let width = clamp(settings.width, 10.0, 1000.0);
    if width != settings.width {
        report.mark("width");
    }
    out.width = width;

    let height = clamp(settings.height, 10.0, 1000.0);
    if height != settings.height {
        report.mark("height");
    }
    out.height = height;

    let density = clamp(settings.density, 1.0, 5.0);
    if density != settings.density {
        report.mark("density");
    }
    out.density = density;

    let edge_threshold = clamp(settings.edge_threshold, 64.0, 192.0);
    if edge_threshold != settings.edge_threshold {
        report.mark("edgeThreshold");
    }
    out.edge_threshold = edge_threshold;

    let fill_angle = normalize_angle(settings.fill_angle);
    if fill_angle != settings.fill_angle {
        report.mark("fillAngle");
    }
    out.fill_angle = fill_angle;

    let pull_compensation = clamp(settings.pull_compensation, 0.0, 100.0);
    if pull_compensation != settings.pull_compensation {
        report.mark("pullCompensation");
    }
    out.pull_compensation = pull_compensation;

    if !is_valid_hex_color(&settings.color) {
        report.mark("color");
        out.color = "#000000".to_string();
    }

    (out, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_fields() {
        let raw = ProcessingSettings {
            width: 5.0,
            height: 5000.0,
            density: 0.0,
            edge_threshold: 300.0,
            fill_angle: -30.0,
            use_underlay: true,
            pull_compensation: -10.0,
            color: "not-a-color".to_string(),
            color_mode: ColorMode::Color,
        };
        let (sanitized, report) = sanitize(&raw);
        assert_eq!(sanitized.width, 10.0);
        assert_eq!(sanitized.height, 1000.0);
        assert_eq!(sanitized.density, 1.0);
        assert_eq!(sanitized.edge_threshold, 192.0);
        assert_eq!(sanitized.fill_angle, 330.0);
        assert_eq!(sanitized.pull_compensation, 0.0);
        assert_eq!(sanitized.color, "#000000");
        assert!(!report.is_clean());
    }

    #[test]
    fn sanitize_is_idempotent() {
        let raw = ProcessingSettings {
            width: 5.0,
            fill_angle: 400.0,
            ..ProcessingSettings::default()
        };
        let (once, _) = sanitize(&raw);
        let (twice, report_twice) = sanitize(&once);
        assert_eq!(once, twice);
        assert!(report_twice.is_clean());
    }

    #[test]
    fn valid_settings_pass_through_clean() {
        let raw = ProcessingSettings::default();
        let (sanitized, report) = sanitize(&raw);
        assert_eq!(sanitized, raw);
        assert!(report.is_clean());
    }
}
