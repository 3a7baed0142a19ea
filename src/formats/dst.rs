//! Tajima DST writer — the one format with a bit-exact, fully pinned
//! wire layout.
//!
//! Structurally ported from the ancestor library's DST writer (512-byte
//! header, then 3-byte stitch records via a shared [`WriteHelper`]), but
//! the bit math itself is replaced wholesale: the ancestor implements the
//! canonical Tajima nibble layout (specific bits distinguish the x and y
//! high nibbles), while this writer implements the divergent nibble-OR
//! packing documented in `DESIGN.md` Open Question 1. The two are not
//! interchangeable — this writer will not round-trip against a canonical
//! Tajima DST reader.

use crate::core::stitch::{StitchPattern, StitchPoint};
use crate::utils::error::{Error, Result};
use crate::utils::io::WriteHelper;

const PPMM: f64 = 10.0;
const MAX_STITCH: i32 = 121;
const MAX_JUMP: i32 = 121;
const HEADER_SIZE: usize = 512;
const MAX_STITCHES: usize = 999_999;
const MAX_DIMENSION_MM: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordType {
    Normal,
    Jump,
    Stop,
    End,
}

impl RecordType {
    fn type_bits(self) -> u8 {
        match self {
            RecordType::Normal => 0x03,
            RecordType::Jump => 0x83,
            RecordType::Stop => 0xC3,
            RecordType::End => 0xF3,
        }
    }
}

/// Encode one logical `(dx, dy, type)` record into its 3-byte wire form.
///
/// `b2`'s high nibbles are combined with a bitwise OR rather than packed
/// into disjoint bit ranges (see module docs). This is an intentional
/// divergence from canonical Tajima DST, preserved rather than
/// "corrected".
fn encode_record(dx: i32, dy: i32, kind: RecordType) -> [u8; 3] {
    let dx = dx.clamp(-MAX_STITCH, MAX_STITCH);
    let dy = dy.clamp(-MAX_STITCH, MAX_STITCH);
    let x = dx.unsigned_abs();
    let y = dy.unsigned_abs();

    let b0 = (y & 0x0F) as u8;
    let b1 = (x & 0x0F) as u8;
    let mut b2 = (((y & 0xF0) >> 4) | ((x & 0xF0) >> 4)) as u8;

    if dx < 0 {
        b2 |= 0x20;
    }
    if dy < 0 {
        b2 |= 0x40;
    }
    b2 |= kind.type_bits();

    [b0, b1, b2]
}

/// Split a large movement into `MAX_JUMP`-bounded `Jump` steps, each
/// carrying the incremental delta so the steps sum exactly to `(dx, dy)`.
fn split_large_movement(dx: i32, dy: i32) -> Vec<(i32, i32)> {
    let steps = ((dx.abs() as f64 / MAX_JUMP as f64).ceil())
        .max((dy.abs() as f64 / MAX_JUMP as f64).ceil())
        .max(1.0) as i32;

    let mut out = Vec::with_capacity(steps as usize);
    let mut prev_x = 0i32;
    let mut prev_y = 0i32;
    for i in 1..=steps {
        let x_i = ((dx as f64) * (i as f64) / (steps as f64)).round() as i32;
        let y_i = ((dy as f64) * (i as f64) / (steps as f64)).round() as i32;
        out.push((x_i - prev_x, y_i - prev_y));
        prev_x = x_i;
        prev_y = y_i;
    }
    out
}

/// Push the wire records for one logical movement, splitting it first if
/// either component exceeds `MAX_STITCH`.
fn push_records(out: &mut Vec<[u8; 3]>, dx: i32, dy: i32, kind: RecordType) {
    if dx.abs() > MAX_STITCH || dy.abs() > MAX_STITCH {
        for (sx, sy) in split_large_movement(dx, dy) {
            out.push(encode_record(sx, sy, RecordType::Jump));
        }
    } else {
        out.push(encode_record(dx, dy, kind));
    }
}

fn record_type_for(stitch: &StitchPoint) -> RecordType {
    use crate::core::stitch::StitchType;
    match stitch.stitch_type {
        StitchType::Normal => RecordType::Normal,
        StitchType::Jump | StitchType::Trim => RecordType::Jump,
        StitchType::Stop => RecordType::Stop,
        StitchType::End => RecordType::End,
    }
}

fn header_field(tag: &str, value: impl std::fmt::Display) -> String {
    format!("{tag}:{value}\r\n")
}

fn build_header(count: usize, max_x: i32, min_x: i32, max_y: i32, min_y: i32) -> Result<Vec<u8>> {
    let mut text = String::new();
    text.push_str(&header_field("LA", "Design Studio"));
    text.push_str(&header_field("ST", count));
    text.push_str(&header_field("CO", 1));
    text.push_str(&header_field("+X", max_x));
    text.push_str(&header_field("-X", min_x.abs()));
    text.push_str(&header_field("+Y", max_y));
    text.push_str(&header_field("-Y", min_y.abs()));
    text.push_str(&header_field("AX", "+0"));
    text.push_str(&header_field("AY", "+0"));
    text.push_str(&header_field("MX", "+0"));
    text.push_str(&header_field("MY", "+0"));
    text.push_str("PD:******\r\n");

    if text.len() > HEADER_SIZE {
        return Err(Error::format_limit(format!(
            "DST header is {} bytes, exceeds {HEADER_SIZE}",
            text.len()
        )));
    }

    let mut bytes = text.into_bytes();
    bytes.resize(HEADER_SIZE, 0x00);
    Ok(bytes)
}

/// Write `pattern` as a complete DST byte stream.
///
/// Coordinates are normalized against the pattern's own bounding box
/// (`PPMM = 10` units per millimeter), independent of whatever machine-
/// coordinate conversion the format dispatch layer applies to other
/// formats — DST's header fields are defined directly in terms of this
/// normalization (§4.9), so this writer always receives pattern-space
/// (millimeter) coordinates.
pub fn write(pattern: &StitchPattern) -> Result<Vec<u8>> {
    if pattern.stitches.is_empty() {
        return Err(Error::invalid_input("pattern has no stitches"));
    }
    if pattern.stitches.len() > MAX_STITCHES {
        return Err(Error::format_limit(format!(
            "{} stitches exceeds DST maximum of {MAX_STITCHES}",
            pattern.stitches.len()
        )));
    }
    for s in &pattern.stitches {
        if !s.is_valid() {
            return Err(Error::invalid_coordinates("non-finite stitch coordinate"));
        }
    }
    if pattern.dimensions.width <= 0.0
        || pattern.dimensions.height <= 0.0
        || !pattern.dimensions.width.is_finite()
        || !pattern.dimensions.height.is_finite()
    {
        return Err(Error::format_limit("pattern has no usable dimensions"));
    }
    if pattern.dimensions.width > MAX_DIMENSION_MM || pattern.dimensions.height > MAX_DIMENSION_MM {
        return Err(Error::format_limit(format!(
            "dimensions {}x{}mm exceed DST maximum of {MAX_DIMENSION_MM}mm",
            pattern.dimensions.width, pattern.dimensions.height
        )));
    }

    let (min_x, min_y, _, _) = pattern.bounds();

    let normalized: Vec<(i32, i32, RecordType)> = pattern
        .stitches
        .iter()
        .map(|s| {
            let x = ((s.point.x - min_x) * PPMM).round() as i32;
            let y = ((s.point.y - min_y) * PPMM).round() as i32;
            (x, y, record_type_for(s))
        })
        .collect();

    let mut records: Vec<[u8; 3]> = Vec::with_capacity(normalized.len() + 2);
    records.push(encode_record(0, 0, RecordType::Jump));

    let mut prev_x = normalized[0].0;
    let mut prev_y = normalized[0].1;
    for (i, (x, y, kind)) in normalized.iter().enumerate() {
        let (dx, dy) = if i == 0 { (0, 0) } else { (x - prev_x, y - prev_y) };
        push_records(&mut records, dx, dy, *kind);
        prev_x = *x;
        prev_y = *y;
    }
    records.push(encode_record(0, 0, RecordType::End));

    let max_x = normalized.iter().map(|(x, _, _)| *x).max().unwrap_or(0);
    let max_y = normalized.iter().map(|(_, y, _)| *y).max().unwrap_or(0);
    let header = build_header(records.len(), max_x, 0, max_y, 0)?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + records.len() * 3);
    let mut helper = WriteHelper::new(&mut buf);
    helper.write_bytes(&header)?;
    for record in &records {
        helper.write_bytes(record)?;
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stitch::{Dimensions, Metadata, StitchType};

    fn pattern_with(stitches: Vec<StitchPoint>, dimensions: Dimensions) -> StitchPattern {
        StitchPattern::new(stitches, vec!["#000000".to_string()], dimensions, Metadata::now("t", "internal")).unwrap()
    }

    #[test]
    fn empty_pattern_rejected() {
        let err = write(&StitchPattern {
            stitches: vec![],
            colors: vec![],
            dimensions: Dimensions { width: 10.0, height: 10.0 },
            metadata: Metadata::now("x", "internal"),
        });
        assert!(matches!(err, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn single_stitch_length_matches_spec_example() {
        let pattern = pattern_with(
            vec![StitchPoint::new(0.0, 0.0, StitchType::Normal)],
            Dimensions { width: 100.0, height: 100.0 },
        );
        let bytes = write(&pattern).unwrap();
        assert_eq!(bytes.len(), 512 + 3 * 3);
    }

    #[test]
    fn header_is_exactly_512_bytes_and_padding_is_zero() {
        let pattern = pattern_with(
            vec![StitchPoint::new(0.0, 0.0, StitchType::Normal)],
            Dimensions { width: 100.0, height: 100.0 },
        );
        let bytes = write(&pattern).unwrap();
        assert_eq!(bytes[511], 0x00);
    }

    #[test]
    fn sign_bits_match_spec_worked_example() {
        // delta (-1, -1) of type Normal -> b0=1, b1=1, b2=0x63
        let record = encode_record(-1, -1, RecordType::Normal);
        assert_eq!(record, [0x01, 0x01, 0x63]);
    }

    #[test]
    fn large_movement_splits_into_bounded_jumps() {
        let steps = split_large_movement(300, 0);
        assert!(steps.len() >= 2);
        for (dx, dy) in &steps {
            assert!(dx.abs() <= MAX_JUMP);
            assert!(dy.abs() <= MAX_JUMP);
        }
        let summed: i32 = steps.iter().map(|(dx, _)| dx).sum();
        assert_eq!(summed, 300);
    }

    #[test]
    fn exact_121_delta_is_not_split() {
        let steps = split_large_movement(121, 121);
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn oversized_stitch_count_hits_format_limit() {
        let mut stitches = Vec::with_capacity(MAX_STITCHES + 2);
        for i in 0..(MAX_STITCHES + 1) {
            stitches.push(StitchPoint::new((i % 50) as f64 * 0.1, 0.0, StitchType::Normal));
        }
        let pattern = pattern_with(stitches, Dimensions { width: 100.0, height: 100.0 });
        let err = write(&pattern);
        assert!(matches!(err, Err(Error::FormatLimit { .. })));
    }

    #[test]
    fn oversized_dimension_hits_format_limit() {
        let pattern = pattern_with(
            vec![StitchPoint::new(0.0, 0.0, StitchType::Normal)],
            Dimensions { width: 500.0, height: 500.0 },
        );
        let err = write(&pattern);
        assert!(matches!(err, Err(Error::FormatLimit { .. })));
    }
}
