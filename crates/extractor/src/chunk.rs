//! Chunk decoding: pointer block, vertex array and tripart stream.

use std::io::{Read, Seek};

use crate::address::SectionTable;
use crate::cursor::StreamCursor;
use crate::error::{ExtractError, ExtractResult};
use crate::transform::{Vec3, WorldTransform};
use crate::tripart::{TerminalPredicate, Tripart, is_escape_marker, read_tripart};

pub const POINTER_BLOCK_FLOATS: usize = 6;
pub const DEFAULT_MAX_TRIPARTS: usize = 4096;

/// The vertex count sits 6 bytes into the vertex sub-block.
const VERTEX_COUNT_OFFSET: u64 = 6;
const VERTEX_HEADER_RESERVED: i64 = 8;
const VERTEX_PADDING: i64 = 4;

/// A leading i32 above this is not a marker but the start of the triangle header.
const TRIANGLE_MARKER_LIMIT: i32 = 50;

/// Fixed record the chunk's block pointer refers to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerBlock {
    pub vertex_data_offset: i32,
    pub triangle_data_offset: i32,
    pub float_params: [f32; POINTER_BLOCK_FLOATS],
}

impl PointerBlock {
    pub fn read<R: Read + Seek>(cursor: &mut StreamCursor<R>) -> ExtractResult<Self> {
        let vertex_data_offset = cursor.read_i32()?;
        let triangle_data_offset = cursor.read_i32()?;
        let mut float_params = [0.0; POINTER_BLOCK_FLOATS];
        for value in &mut float_params {
            *value = cursor.read_f32()?;
        }
        Ok(Self {
            vertex_data_offset,
            triangle_data_offset,
            float_params,
        })
    }
}

/// Header fields of the scene-graph node that owns a chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkHeader {
    pub section: String,
    /// File offset of the node entry; only used for naming.
    pub offset: u32,
    /// Virtual address of the pointer block.
    pub block: i32,
    pub world_coords: Vec3,
    pub parent_coords: Vec3,
}

impl ChunkHeader {
    pub fn name(&self) -> String {
        format!("ch_{}_{:#x}", self.section, self.offset)
    }

    pub fn world_offset(&self) -> Vec3 {
        self.world_coords.add(self.parent_coords)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DecodeOptions {
    /// Place vertices in world space; otherwise keep chunk-local coordinates.
    pub world_space: bool,
    /// Records read before a stream without a terminal tripart is rejected.
    pub max_triparts: usize,
    pub terminal: TerminalPredicate,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            world_space: true,
            max_triparts: DEFAULT_MAX_TRIPARTS,
            terminal: is_escape_marker,
        }
    }
}

/// A decoded mesh unit. `vertices` and `triangles` stay `None` in
/// header-only mode.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    pub name: String,
    pub block: PointerBlock,
    /// Resolved file offset of the vertex sub-block.
    pub vertex_offset: u64,
    /// Resolved file offset of the triangle data.
    pub triangle_offset: u64,
    pub vertices: Option<Vec<Vec3>>,
    pub triangles: Option<Vec<Tripart>>,
}

impl Chunk {
    pub fn decode<R: Read + Seek>(
        cursor: &mut StreamCursor<R>,
        table: &SectionTable,
        header: &ChunkHeader,
        transform: &dyn WorldTransform,
        options: &DecodeOptions,
    ) -> ExtractResult<Self> {
        let mut chunk = Self::decode_header_only(cursor, table, header)?;

        let placement = options
            .world_space
            .then(|| (transform, header.world_offset()));
        chunk.vertices = Some(read_vertices(cursor, chunk.vertex_offset, placement)?);
        chunk.triangles = Some(read_triangles(cursor, chunk.triangle_offset, options)?);

        Ok(chunk)
    }

    /// Read only the pointer block and resolve its offsets.
    pub fn decode_header_only<R: Read + Seek>(
        cursor: &mut StreamCursor<R>,
        table: &SectionTable,
        header: &ChunkHeader,
    ) -> ExtractResult<Self> {
        cursor.seek_to(table.resolve(i64::from(header.block), &header.section)?)?;
        let block = PointerBlock::read(cursor)?;
        tracing::trace!("Pointer block of {}: {:?}", header.name(), block);

        let vertex_offset = table.resolve(i64::from(block.vertex_data_offset), &header.section)?;
        let triangle_offset =
            table.resolve(i64::from(block.triangle_data_offset), &header.section)?;

        Ok(Self {
            name: header.name(),
            block,
            vertex_offset,
            triangle_offset,
            vertices: None,
            triangles: None,
        })
    }

    pub fn has_geometry(&self) -> bool {
        self.vertices.as_ref().is_some_and(|v| !v.is_empty())
            && self.triangles.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// Read the vertex array at `offset`. With a placement, every vertex goes
/// through the transform with the composed world offset.
pub fn read_vertices<R: Read + Seek>(
    cursor: &mut StreamCursor<R>,
    offset: u64,
    placement: Option<(&dyn WorldTransform, Vec3)>,
) -> ExtractResult<Vec<Vec3>> {
    cursor.seek_to(offset + VERTEX_COUNT_OFFSET)?;
    let count = cursor.read_i16()?;
    cursor.skip(VERTEX_HEADER_RESERVED)?;

    tracing::debug!("Parsing {} vertices at {:#x}", count, offset);

    let count = usize::try_from(count).unwrap_or(0);
    let mut vertices = Vec::with_capacity(count);
    for _ in 0..count {
        let x = cursor.read_f32()?;
        let y = cursor.read_f32()?;
        let z = cursor.read_f32()?;
        let mut vertex = Vec3::new(x, y, z);
        if let Some((transform, world_offset)) = placement {
            vertex = transform.transform(vertex, world_offset);
        }
        vertices.push(vertex);
        cursor.skip(VERTEX_PADDING)?;
    }

    Ok(vertices)
}

/// Read the tripart stream at `offset`, keeping textured triparts only.
pub fn read_triangles<R: Read + Seek>(
    cursor: &mut StreamCursor<R>,
    offset: u64,
    options: &DecodeOptions,
) -> ExtractResult<Vec<Tripart>> {
    cursor.seek_to(offset)?;

    tracing::debug!("Parsing triangles at {:#x}", offset);

    // Some sections carry an unknown small value before the header.
    if cursor.read_i32()? > TRIANGLE_MARKER_LIMIT {
        cursor.skip(-4)?;
    }

    cursor.skip(2)?;
    let header_size = i64::from(cursor.read_i16()?) * 2;
    cursor.skip(header_size)?;

    let start = cursor.position();
    let limit = options.max_triparts.max(1);
    let mut triangles = Vec::new();
    for index in 0..limit {
        tracing::trace!("Parsing tripart {} at {:#x}", index, cursor.position());

        let record = read_tripart(cursor, options.terminal)?;
        let is_terminal = record.is_terminal();
        if let Some(tripart) = record.into_tripart() {
            triangles.push(tripart);
        }
        if is_terminal {
            return Ok(triangles);
        }
    }

    Err(ExtractError::UnterminatedTripartStream {
        offset: start,
        limit,
    })
}
