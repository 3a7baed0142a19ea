//! Husqvarna Viking HUS writer.
//!
//! HUS stitch/color sections are normally Huffman-compressed; decoding
//! that is out of scope here (format-reading is a non-goal), so this
//! writer reuses only the ancestor's trivial `compress()` framing
//! (`utils::compress::compress`, a 6-byte length/marker header plus the
//! raw payload verbatim) rather than re-implementing a Huffman encoder
//! neither the ancestor nor any example in the retrieval pack provides.

use crate::core::stitch::{StitchPattern, StitchType};
use crate::utils::error::Result;
use crate::utils::io::WriteHelper;

fn frame(data: &[u8]) -> Vec<u8> {
    let size = data.len();
    let mut result = vec![(size & 0xFF) as u8, ((size >> 8) & 0xFF) as u8, 0x02, 0xA0, 0x01, 0xFE];
    result.extend_from_slice(data);
    result
}

fn encode_command(kind: StitchType) -> u8 {
    match kind {
        StitchType::Normal => 0x80,
        StitchType::Jump => 0x81,
        StitchType::Trim => 0x82,
        StitchType::Stop => 0x84,
        StitchType::End => 0x88,
    }
}

fn build_stitch_payload(pattern: &StitchPattern) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    let mut helper = WriteHelper::new(&mut payload);
    let mut prev_x = 0.0;
    let mut prev_y = 0.0;
    for s in &pattern.stitches {
        let dx = (s.point.x - prev_x).round().clamp(-127.0, 127.0) as i8;
        let dy = (s.point.y - prev_y).round().clamp(-127.0, 127.0) as i8;
        prev_x += dx as f64;
        prev_y += dy as f64;
        helper.write_i8(dx)?;
        helper.write_i8(dy)?;
        helper.write_u8(encode_command(s.stitch_type))?;
    }
    Ok(payload)
}

/// Serialize `pattern` (already in machine coordinates) to HUS bytes.
pub fn write(pattern: &StitchPattern) -> Result<Vec<u8>> {
    let (min_x, min_y, max_x, max_y) = pattern.bounds();

    let mut header = Vec::new();
    {
        let mut h = WriteHelper::new(&mut header);
        h.write_bytes(b"HUS ")?;
        h.write_i32_le(pattern.stitches.len() as i32)?;
        h.write_i32_le(pattern.colors.len().max(1) as i32)?;
        h.write_i32_le((max_x - min_x).round() as i32)?;
        h.write_i32_le((max_y - min_y).round() as i32)?;
    }

    let payload = build_stitch_payload(pattern)?;
    let framed = frame(&payload);

    let mut buf = header;
    buf.extend_from_slice(&framed);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stitch::{Dimensions, Metadata, StitchPoint};

    fn pattern() -> StitchPattern {
        StitchPattern::new(
            vec![
                StitchPoint::new(0.0, 0.0, StitchType::Jump),
                StitchPoint::new(10.0, 10.0, StitchType::Normal),
                StitchPoint::new(10.0, 10.0, StitchType::End),
            ],
            vec!["#000000".to_string()],
            Dimensions { width: 200.0, height: 200.0 },
            Metadata::now("t", "hus"),
        )
        .unwrap()
    }

    #[test]
    fn starts_with_hus_marker() {
        let bytes = write(&pattern()).unwrap();
        assert_eq!(&bytes[0..4], b"HUS ");
    }

    #[test]
    fn frame_encodes_payload_length_in_first_two_bytes() {
        let payload = vec![1u8, 2, 3, 4];
        let framed = frame(&payload);
        let len = framed[0] as usize | ((framed[1] as usize) << 8);
        assert_eq!(len, payload.len());
        assert_eq!(&framed[6..], &payload[..]);
    }
}
