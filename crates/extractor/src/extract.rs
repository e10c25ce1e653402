//! Decode-and-write orchestration shared by the command-line front end.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::chunk::Chunk;
use crate::cursor::StreamCursor;
use crate::error::{ExtractError, ExtractResult};
use crate::manifest::ChunkEntry;
use crate::obj::ObjWriter;
use crate::settings::Settings;
use crate::texlist::MaterialList;
use crate::transform::Translation;

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: usize,
    pub failed: Vec<(String, ExtractError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Open an executable image for one decode session.
pub fn open_image(path: &Path) -> anyhow::Result<StreamCursor<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(StreamCursor::new(BufReader::new(file))?)
}

pub fn create_output(path: &Path) -> anyhow::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Write `<texlist>.mtl` next to the OBJ file and return its path.
pub fn write_material_library(
    obj_path: &Path,
    materials: &MaterialList,
    texture_extension: &str,
) -> anyhow::Result<PathBuf> {
    let path = obj_path.with_file_name(materials.mtl_file_name());
    let mut out = create_output(&path)?;
    materials.write_mtl(&mut out, texture_extension)?;
    out.flush()?;
    Ok(path)
}

/// Decode every entry and append it to `writer`. A chunk that fails to
/// decode, or references a missing material, is reported and skipped;
/// output errors abort the batch.
pub fn write_batch<R: Read + Seek, W: Write>(
    cursor: &mut StreamCursor<R>,
    entries: &[ChunkEntry],
    settings: &Settings,
    materials: Option<&MaterialList>,
    writer: &mut ObjWriter<W>,
) -> ExtractResult<BatchReport> {
    let mut report = BatchReport::default();

    if let Some(materials) = materials {
        writer.write_mtllib(materials)?;
    }

    for entry in entries {
        let header = entry.header();
        let name = entry.name.clone().unwrap_or_else(|| header.name());

        let mut chunk = match Chunk::decode(
            cursor,
            &settings.sections,
            &header,
            &Translation,
            &settings.decode,
        ) {
            Ok(chunk) => chunk,
            Err(err) => {
                tracing::error!("Failed to decode {}: {}", name, err);
                report.failed.push((name, err));
                continue;
            }
        };
        chunk.name = name;

        match writer.write_chunk(&chunk, materials) {
            Ok(()) => report.written += 1,
            Err(err @ ExtractError::MissingMaterial { .. }) => {
                tracing::error!("Failed to write {}: {}", chunk.name, err);
                report.failed.push((chunk.name, err));
            }
            Err(err) => return Err(err),
        }
    }

    writer.flush()?;
    Ok(report)
}
