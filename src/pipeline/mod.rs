//! The conversion pipeline: image to stitch pattern.
//!
//! Stages run in sequence — `ColorQuantizer`, `BitmapNormalizer`,
//! `EdgeDetector`, `ContourTracer`, `StitchPlanner`, `StitchOptimizer` —
//! with progress notifications fired at 0% and 100% of each stage. The
//! [`Pipeline`] value owns the progress callback and an optional
//! cancellation flag; the stages themselves are free functions with no
//! retained state.

/// Contour tracing.
pub mod contours;
/// Sobel edge detection.
pub mod edges;
/// Bitmap normalization.
pub mod normalizer;
/// Stitch optimization.
pub mod optimizer;
/// Stitch planning (scanline fills, outlines, pull compensation).
pub mod planner;
/// Color quantization.
pub mod quantizer;

use crate::core::settings::{sanitize, ProcessingSettings};
use crate::core::stitch::{Dimensions, Metadata, StitchPattern};
use crate::utils::error::{Error, Result};
use crate::utils::image_buffer::ImageBuffer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const MIN_OPTIMIZED_STITCHES: usize = 10;

/// Progress-callback stage names, in pipeline order.
pub const STAGES: [&str; 6] = ["processing", "bitmap", "edges", "contours", "generating", "optimizing"];

/// Orchestrates a single image-to-pattern conversion.
///
/// Not safe to invoke concurrently on the same instance: the cancellation
/// flag and progress callback are shared state for the one in-flight
/// `convert` call.
pub struct Pipeline {
    progress: Option<Box<dyn Fn(&str, u8) + Send + Sync>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Pipeline {
    /// A pipeline with no progress callback and no cancellation support.
    pub fn new() -> Self {
        Self { progress: None, cancel: None }
    }

    /// Attach a progress callback, invoked with a stage name from
    /// [`STAGES`] and a percentage (`0` or `100`).
    pub fn with_progress(mut self, f: impl Fn(&str, u8) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    /// Attach a cooperative cancellation flag, checked at each stage
    /// boundary. Setting it from another thread aborts the next boundary
    /// check with [`Error::Cancelled`].
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn emit(&self, stage: &str, percent: u8) {
        if let Some(f) = &self.progress {
            f(stage, percent);
        }
    }

    fn check_cancelled(&self, stage: &str) -> Result<()> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(Error::Cancelled { stage: Some(stage.to_string()) });
            }
        }
        Ok(())
    }

    /// Run the full conversion: validate input, sanitize settings, execute
    /// every stage in order, and construct the final [`StitchPattern`].
    pub fn convert(&self, image: &ImageBuffer, settings: &ProcessingSettings) -> Result<StitchPattern> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::invalid_input("image has zero width or height"));
        }

        let (sanitized, report) = sanitize(settings);
        if !report.is_clean() {
            log::debug!("settings sanitizer adjusted fields: {:?}", report.adjusted_fields);
        }

        self.check_cancelled("processing")?;
        self.emit("processing", 0);
        log::trace!("stage processing: starting quantization");
        let (quantized, used_colors) = quantizer::process_image(image, sanitized.color_mode);
        log::debug!("stage processing: {} colors in use", used_colors.len());
        self.emit("processing", 100);

        self.check_cancelled("bitmap")?;
        self.emit("bitmap", 0);
        log::trace!("stage bitmap: starting normalization");
        let bitmap = normalizer::create_bitmap(&quantized).map_err(|e| e.with_stage("bitmap"))?;
        self.emit("bitmap", 100);

        self.check_cancelled("edges")?;
        self.emit("edges", 0);
        log::trace!("stage edges: starting detection");
        let edges = edges::detect_edges(&bitmap, sanitized.edge_threshold).map_err(|e| e.with_stage("edges"))?;
        self.emit("edges", 100);

        self.check_cancelled("contours")?;
        self.emit("contours", 0);
        log::trace!("stage contours: starting tracing");
        let contours = contours::trace_contours(&edges);
        log::debug!("stage contours: traced {} contours", contours.len());
        if contours.is_empty() {
            return Err(Error::no_contours("no contours traced from edge image").with_stage("contours"));
        }
        self.emit("contours", 100);

        self.check_cancelled("generating")?;
        self.emit("generating", 0);
        log::trace!("stage generating: planning stitches");
        let stitches = planner::generate_stitches(&contours, &sanitized);
        self.emit("generating", 100);

        self.check_cancelled("optimizing")?;
        self.emit("optimizing", 0);
        log::trace!("stage optimizing: {} raw stitches", stitches.len());
        let optimized = optimizer::optimize_stitches(&stitches).map_err(|e| e.with_stage("optimizing"))?;
        log::debug!("stage optimizing: {} stitches after optimization", optimized.len());
        self.emit("optimizing", 100);

        if optimized.len() < MIN_OPTIMIZED_STITCHES {
            return Err(Error::insufficient_stitches(format!(
                "only {} stitches after optimization, need at least {}",
                optimized.len(),
                MIN_OPTIMIZED_STITCHES
            ))
            .with_stage("optimizing"));
        }

        for s in &optimized {
            if !s.is_valid() {
                return Err(Error::invalid_coordinates("non-finite stitch coordinate").with_stage("optimizing"));
            }
        }

        // This implementation plans one fill pass per conversion call, so
        // every stitch is stamped with the same resolved color: the first
        // color `ColorQuantizer` reported in use (guaranteed non-empty
        // here, since the image was validated non-empty above).
        let fill_color = used_colors
            .first()
            .cloned()
            .unwrap_or_else(|| sanitized.color.clone());
        let colored: Vec<_> = optimized.into_iter().map(|s| s.with_color(fill_color.clone())).collect();

        let dimensions = Dimensions { width: sanitized.width, height: sanitized.height };
        let metadata = Metadata::now("pattern", "internal");
        StitchPattern::new(colored, used_colors, dimensions, metadata)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
