//! Tripart records: groups of textured triangle strips.
//!
//! # Layout
//!
//! ```text
//! i16  type_spec            (type_spec - 0x0408) % 0x1000 == 0 for textured triparts
//! u16  texture_index ^ 0x4000
//! u16  reserved
//! i16  size in 16-bit words, counted from the end of this field
//! ---- payload (size * 2 bytes) ----
//! i16  strip_count
//!      per strip: i16 point_count (sign ignored), point_count * (i16 vi, i16 u, i16 v)
//! ```
//!
//! Read as a little-endian float, the first four bytes of a textured
//! tripart come out near 2.0 (the masked texture index supplies the 0x40
//! exponent byte). The texture index is read unsigned: raw values of
//! 0x8000 and above come out as large indices rather than negative ones,
//! and either way they fall outside any material list.
//!
//! Nothing else marks the end of the stream, so the four bytes following
//! each payload are inspected with a [`TerminalPredicate`].

use std::io::{Read, Seek};

use crate::cursor::StreamCursor;
use crate::error::ExtractResult;

/// Mask applied to the stored texture index.
pub const TEXTURE_INDEX_MASK: u16 = 0x4000;

/// Sentinel bytes that end a tripart stream.
pub const ESCAPE_MARKER: [u8; 4] = [0xFF, 0x00, 0x00, 0x00];

/// Tripart headers start with a float around 2.0; anything below this ends the stream.
pub const ESCAPE_FLOAT_THRESHOLD: f32 = 1.5;

const TEXTURED_TYPE_BASE: i32 = 0x0408;
const TEXTURED_TYPE_STRIDE: i32 = 0x1000;

/// Decides from the four bytes after a tripart whether the stream ends there.
pub type TerminalPredicate = fn([u8; 4]) -> bool;

/// Default end-of-stream test: the escape marker, or a header float below 1.5.
pub fn is_escape_marker(peek: [u8; 4]) -> bool {
    peek == ESCAPE_MARKER || f32::from_le_bytes(peek) < ESCAPE_FLOAT_THRESHOLD
}

pub fn is_textured(type_spec: i16) -> bool {
    (i32::from(type_spec) - TEXTURED_TYPE_BASE).rem_euclid(TEXTURED_TYPE_STRIDE) == 0
}

/// One corner of a strip, with a 1-based vertex index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StripPoint {
    pub vertex_index: i32,
    pub tex_u: f32,
    pub tex_v: f32,
}

impl StripPoint {
    pub fn from_raw(vertex_index: i16, u: i16, v: i16) -> Self {
        Self {
            vertex_index: i32::from(vertex_index) + 1,
            tex_u: f32::from(u) / 255.0,
            tex_v: f32::from(v) / -255.0 + 1.0,
        }
    }
}

pub type Strip = Vec<StripPoint>;

/// A decoded textured tripart.
#[derive(Clone, Debug, PartialEq)]
pub struct Tripart {
    pub strips: Vec<Strip>,
    pub texture_index: u16,
}


#[derive(Clone, Debug, PartialEq)]
pub enum TripartRecord {
    Textured { tripart: Tripart, is_terminal: bool },
    /// Recognised but not decoded. Always ends the stream.
    Untextured { type_spec: i16 },
}

impl TripartRecord {
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Textured { is_terminal, .. } => *is_terminal,
            Self::Untextured { .. } => true,
        }
    }

    pub fn into_tripart(self) -> Option<Tripart> {
        match self {
            Self::Textured { tripart, .. } => Some(tripart),
            Self::Untextured { .. } => None,
        }
    }
}

/// Decode the tripart at the current position and leave the cursor at the
/// end of its payload.
pub fn read_tripart<R: Read + Seek>(
    cursor: &mut StreamCursor<R>,
    terminal: TerminalPredicate,
) -> ExtractResult<TripartRecord> {
    let type_spec = cursor.read_i16()?;
    if !is_textured(type_spec) {
        tracing::debug!(
            "Non-texture tripart at 0x{:X} (type_spec - 0x0408 = {:#x})",
            cursor.position() - 2,
            i32::from(type_spec) - TEXTURED_TYPE_BASE
        );
        return Ok(TripartRecord::Untextured { type_spec });
    }

    let texture_index = cursor.read_u16()? ^ TEXTURE_INDEX_MASK;
    cursor.skip(2)?;

    let size = i64::from(cursor.read_i16()?) * 2;
    let (tripart_end, is_terminal) = cursor.peek(|c| {
        c.skip(size)?;
        let end = c.position();
        Ok((end, terminal(c.read_array::<4>()?)))
    })?;

    let strip_count = cursor.read_i16()?;
    let mut strips = Vec::with_capacity(usize::try_from(strip_count).unwrap_or(0));
    for _ in 0..strip_count {
        let point_count = cursor.read_i16()?.unsigned_abs();
        let mut strip = Vec::with_capacity(usize::from(point_count));
        for _ in 0..point_count {
            let vi = cursor.read_i16()?;
            let u = cursor.read_i16()?;
            let v = cursor.read_i16()?;
            strip.push(StripPoint::from_raw(vi, u, v));
        }
        strips.push(strip);
    }

    cursor.seek_to(tripart_end)?;

    Ok(TripartRecord::Textured {
        tripart: Tripart {
            strips,
            texture_index,
        },
        is_terminal,
    })
}
