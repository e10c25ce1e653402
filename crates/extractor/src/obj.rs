//! Wavefront OBJ output.
//!
//! Per chunk the record order is fixed: `o`, every `v`, every `vt` (one per
//! strip point, numbered across all triparts of the chunk), then the faces
//! of each tripart, preceded by `usemtl` when a material list is given.

use std::io::Write;

use crate::chunk::Chunk;
use crate::error::ExtractResult;
use crate::texlist::MaterialList;

/// Corner positions of each triangle in a strip of `len` points.
/// Odd triangles swap their first two corners to keep the winding.
pub fn strip_faces(len: usize) -> impl Iterator<Item = [usize; 3]> {
    (0..len.saturating_sub(2)).map(|c| {
        if c % 2 == 0 {
            [c, c + 1, c + 2]
        } else {
            [c + 1, c, c + 2]
        }
    })
}

/// Writes chunks into one OBJ stream, offsetting indices by what earlier
/// chunks already wrote.
pub struct ObjWriter<W> {
    out: W,
    vertex_base: usize,
    texcoord_base: usize,
}

impl<W: Write> ObjWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            vertex_base: 0,
            texcoord_base: 0,
        }
    }

    pub fn vertices_written(&self) -> usize {
        self.vertex_base
    }

    pub fn texcoords_written(&self) -> usize {
        self.texcoord_base
    }

    pub fn write_mtllib(&mut self, materials: &MaterialList) -> ExtractResult<()> {
        writeln!(self.out, "mtllib {}", materials.mtl_file_name())?;
        Ok(())
    }

    /// A single chunk file: `mtllib` (when materials are given) followed by the chunk.
    pub fn write_standalone(
        &mut self,
        chunk: &Chunk,
        materials: Option<&MaterialList>,
    ) -> ExtractResult<()> {
        if let Some(materials) = materials {
            self.write_mtllib(materials)?;
        }
        self.write_chunk(chunk, materials)
    }

    /// Write one chunk. Material lookups are checked before anything is
    /// written, so a failing chunk leaves no partial records behind.
    pub fn write_chunk(
        &mut self,
        chunk: &Chunk,
        materials: Option<&MaterialList>,
    ) -> ExtractResult<()> {
        let triangles = chunk.triangles.as_deref().unwrap_or_default();
        if let Some(materials) = materials {
            for tripart in triangles {
                materials.material(usize::from(tripart.texture_index))?;
            }
        }

        writeln!(self.out, "o {}", chunk.name)?;

        let vertices = chunk.vertices.as_deref().unwrap_or_default();
        if vertices.is_empty() {
            tracing::warn!("No vertices found in {}", chunk.name);
        }
        for v in vertices {
            writeln!(self.out, "v {} {} {}", v.x, v.y, v.z)?;
        }

        if triangles.is_empty() {
            tracing::warn!("No triangles found in {}", chunk.name);
        }

        let mut texcoords = 0;
        for tripart in triangles {
            for point in tripart.strips.iter().flatten() {
                writeln!(self.out, "vt {} {}", point.tex_u, point.tex_v)?;
                texcoords += 1;
            }
        }

        let vertex_base = self.vertex_base as i64;
        let mut strip_start = self.texcoord_base;
        for tripart in triangles {
            if let Some(materials) = materials {
                let name = materials.material(usize::from(tripart.texture_index))?;
                writeln!(self.out, "usemtl {name}")?;
            }

            for strip in &tripart.strips {
                for corners in strip_faces(strip.len()) {
                    let [a, b, c] = corners.map(|p| {
                        (
                            vertex_base + i64::from(strip[p].vertex_index),
                            strip_start + p + 1,
                        )
                    });
                    writeln!(
                        self.out,
                        "f {}/{} {}/{} {}/{}",
                        a.0, a.1, b.0, b.1, c.0, c.1
                    )?;
                }
                strip_start += strip.len();
            }
        }

        self.vertex_base += vertices.len();
        self.texcoord_base += texcoords;
        Ok(())
    }

    pub fn flush(&mut self) -> ExtractResult<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::tests::{header, image, table, triangle_prefix};
    use crate::chunk::{DecodeOptions, PointerBlock};
    use crate::cursor::StreamCursor;
    use crate::error::ExtractError;
    use crate::transform::{Translation, Vec3};
    use crate::tripart::tests::push_tripart;
    use crate::tripart::{ESCAPE_MARKER, StripPoint, Tripart};
    use std::io::Cursor;

    fn chunk(name: &str, vertices: Option<Vec<Vec3>>, triangles: Option<Vec<Tripart>>) -> Chunk {
        Chunk {
            name: name.to_string(),
            block: PointerBlock {
                vertex_data_offset: 0,
                triangle_data_offset: 0,
                float_params: [0.0; 6],
            },
            vertex_offset: 0,
            triangle_offset: 0,
            vertices,
            triangles,
        }
    }

    fn tripart(texture_index: u16, strips: &[&[i16]]) -> Tripart {
        Tripart {
            strips: strips
                .iter()
                .map(|s| s.iter().map(|&vi| StripPoint::from_raw(vi, 0, 0)).collect())
                .collect(),
            texture_index,
        }
    }

    fn lines(out: Vec<u8>) -> Vec<String> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn square() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_strip_faces_winding() {
        let faces: Vec<[usize; 3]> = strip_faces(4).collect();
        assert_eq!(faces, vec![[0, 1, 2], [2, 1, 3]]);
        let faces: Vec<[usize; 3]> = strip_faces(5).collect();
        assert_eq!(faces, vec![[0, 1, 2], [2, 1, 3], [2, 3, 4]]);
        assert_eq!(strip_faces(2).count(), 0);
        assert_eq!(strip_faces(0).count(), 0);
    }

    #[test]
    fn test_decode_and_write_triangle() {
        let mut tdata = triangle_prefix(2);
        push_tripart(&mut tdata, 0, &[&[(0, 0, 0), (1, 255, 0), (2, 0, 255)]], 0);
        tdata.extend_from_slice(&ESCAPE_MARKER);
        let data = image(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], &tdata);

        let options = DecodeOptions {
            world_space: false,
            ..DecodeOptions::default()
        };
        let mut cursor = StreamCursor::new(Cursor::new(data)).unwrap();
        let chunk = Chunk::decode(&mut cursor, &table(), &header(), &Translation, &options).unwrap();

        let mut writer = ObjWriter::new(Vec::new());
        writer.write_standalone(&chunk, None).unwrap();
        assert_eq!(
            lines(writer.into_inner()),
            vec![
                "o ch_MDLEN_0xbc58",
                "v 0 0 0",
                "v 1 0 0",
                "v 0 1 0",
                "vt 0 1",
                "vt 1 1",
                "vt 0 0",
                "f 1/1 2/2 3/3",
            ]
        );
    }

    #[test]
    fn test_faces_alternate_and_texcoords_continue() {
        let chunk = chunk(
            "ch_test",
            Some(square()),
            Some(vec![tripart(0, &[&[0, 1, 2, 3], &[3, 2, 1]]), tripart(1, &[&[1, 2, 3]])]),
        );
        let mut writer = ObjWriter::new(Vec::new());
        writer.write_chunk(&chunk, None).unwrap();
        assert_eq!(writer.vertices_written(), 4);
        assert_eq!(writer.texcoords_written(), 10);

        let out = lines(writer.into_inner());
        let faces: Vec<&str> = out
            .iter()
            .filter(|l| l.starts_with("f "))
            .map(String::as_str)
            .collect();
        assert_eq!(
            faces,
            vec![
                "f 1/1 2/2 3/3",
                "f 3/3 2/2 4/4",
                "f 4/5 3/6 2/7",
                "f 2/8 3/9 4/10",
            ]
        );
        assert_eq!(out.iter().filter(|l| l.starts_with("vt ")).count(), 10);
    }

    #[test]
    fn test_usemtl_per_tripart() {
        let materials = MaterialList::parse("stage1", "wall\nfloor\n");
        let chunk = chunk(
            "ch_test",
            Some(square()),
            Some(vec![tripart(1, &[&[0, 1, 2]]), tripart(0, &[&[1, 2, 3]])]),
        );
        let mut writer = ObjWriter::new(Vec::new());
        writer.write_standalone(&chunk, Some(&materials)).unwrap();

        let out = lines(writer.into_inner());
        assert_eq!(out[0], "mtllib stage1.mtl");
        assert_eq!(out[1], "o ch_test");
        let tail: Vec<&str> = out[out.len() - 4..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec!["usemtl floor", "f 1/1 2/2 3/3", "usemtl wall", "f 2/4 3/5 4/6"]
        );
    }

    #[test]
    fn test_missing_material_writes_nothing() {
        let materials = MaterialList::parse("stage1", "wall\n");
        let chunk = chunk("ch_test", Some(square()), Some(vec![tripart(4, &[&[0, 1, 2]])]));
        let mut writer = ObjWriter::new(Vec::new());
        let err = writer.write_chunk(&chunk, Some(&materials)).unwrap_err();
        assert!(matches!(err, ExtractError::MissingMaterial { index: 4, count: 1 }));
        assert!(writer.into_inner().is_empty());
    }

    #[test]
    fn test_second_chunk_indices_offset() {
        let first = chunk("ch_a", Some(square()), Some(vec![tripart(0, &[&[0, 1, 2]])]));
        let second = chunk("ch_b", Some(square()), Some(vec![tripart(0, &[&[0, 1, 2]])]));
        let mut writer = ObjWriter::new(Vec::new());
        writer.write_chunk(&first, None).unwrap();
        writer.write_chunk(&second, None).unwrap();

        let out = lines(writer.into_inner());
        assert_eq!(out.last().unwrap(), "f 5/4 6/5 7/6");
        assert_eq!(out.iter().filter(|l| l.starts_with("o ")).count(), 2);
    }

    #[test]
    fn test_missing_geometry_is_skipped() {
        let empty = chunk("ch_empty", None, None);
        let mut writer = ObjWriter::new(Vec::new());
        writer.write_chunk(&empty, None).unwrap();
        assert_eq!(lines(writer.into_inner()), vec!["o ch_empty"]);

        let no_triangles = chunk("ch_points", Some(square()), Some(Vec::new()));
        let mut writer = ObjWriter::new(Vec::new());
        writer.write_chunk(&no_triangles, None).unwrap();
        let out = lines(writer.into_inner());
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|l| !l.starts_with("f ")));
    }

    #[test]
    fn test_short_strips_keep_numbering() {
        let chunk = chunk(
            "ch_test",
            Some(square()),
            Some(vec![tripart(0, &[&[0], &[0, 1, 2]])]),
        );
        let mut writer = ObjWriter::new(Vec::new());
        writer.write_chunk(&chunk, None).unwrap();
        let out = lines(writer.into_inner());
        assert_eq!(out.last().unwrap(), "f 1/2 2/3 3/4");
    }
}
