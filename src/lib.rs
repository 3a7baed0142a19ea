//! # stitchgen
//!
//! Converts raster images into machine-embroidery stitch patterns and
//! serializes them into the binary file formats consumed by commercial
//! embroidery machines.
//!
//! ## Pipeline
//!
//! An RGBA image and a [`core::settings::ProcessingSettings`] record go
//! through six stages — color quantization, bitmap normalization, Sobel
//! edge detection, contour tracing, stitch planning, and stitch
//! optimization — orchestrated by [`pipeline::Pipeline`], producing a
//! [`core::stitch::StitchPattern`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use stitchgen::core::settings::ProcessingSettings;
//! use stitchgen::formats::{convert_to_format, EmbroideryFormat};
//! use stitchgen::pipeline::Pipeline;
//! use stitchgen::utils::image_buffer::ImageBuffer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let image = ImageBuffer::new(100, 100);
//! let settings = ProcessingSettings::default();
//!
//! let pattern = Pipeline::new()
//!     .with_progress(|stage, pct| println!("{stage}: {pct}%"))
//!     .convert(&image, &settings)?;
//!
//! let dst_bytes = convert_to_format(&pattern, EmbroideryFormat::Dst)?;
//! # let _ = dst_bytes;
//! # Ok(())
//! # }
//! ```
//!
//! ## Supported output formats
//!
//! DST (the fully bit-specified reference format), PES, JEF, EXP, VP3,
//! HUS, PAT, and QCC — see [`formats::EmbroideryFormat`].

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Core data model: geometry, stitch/pattern types, settings, palette.
pub mod core;
/// Format serializers and the format-dispatch layer.
pub mod formats;
/// The image-to-stitch-pattern conversion pipeline.
pub mod pipeline;
/// Supporting utilities: error taxonomy, binary I/O, shared image buffer.
pub mod utils;

pub use core::palette::PALETTE;
pub use core::settings::ProcessingSettings;
pub use core::stitch::StitchPattern;
pub use formats::{convert_to_format, EmbroideryFormat};
pub use pipeline::Pipeline;
pub use utils::error::{Error, Result};

/// Convenient re-exports of the crate's most commonly used types.
pub mod prelude {
    pub use crate::core::palette::{color_distance, nearest, ThreadColor, PALETTE};
    pub use crate::core::settings::{ColorMode, ProcessingSettings};
    pub use crate::core::stitch::{Dimensions, Metadata, StitchPattern, StitchPoint, StitchType};
    pub use crate::formats::{convert_to_format, EmbroideryFormat};
    pub use crate::pipeline::Pipeline;
    pub use crate::utils::error::{Error, Result};
    pub use crate::utils::image_buffer::ImageBuffer;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::ColorMode;
    use crate::utils::image_buffer::ImageBuffer;

    #[test]
    fn convert_empty_image_is_rejected() {
        let pipeline = Pipeline::new();
        let image = ImageBuffer::new(0, 0);
        let settings = ProcessingSettings::default();
        assert!(matches!(pipeline.convert(&image, &settings), Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn color_mode_round_trips_through_settings() {
        let settings = ProcessingSettings { color_mode: ColorMode::Grayscale, ..ProcessingSettings::default() };
        assert_eq!(settings.color_mode, ColorMode::Grayscale);
    }
}
