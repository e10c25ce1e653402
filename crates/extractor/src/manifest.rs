//! JSON manifest describing a batch of chunks in one image.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::chunk::ChunkHeader;
use crate::transform::Vec3;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Executable image holding the chunks.
    pub xbe: PathBuf,
    /// Optional texture list, one material name per line.
    #[serde(default)]
    pub texlist: Option<PathBuf>,
    pub chunks: Vec<ChunkEntry>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkEntry {
    pub section: String,
    pub offset: u32,
    pub block: i32,
    #[serde(default)]
    pub world: Vec3,
    #[serde(default)]
    pub parent: Vec3,
    /// Replaces the generated `ch_<section>_<offset>` name.
    #[serde(default)]
    pub name: Option<String>,
}

impl ChunkEntry {
    pub fn header(&self) -> ChunkHeader {
        ChunkHeader {
            section: self.section.clone(),
            offset: self.offset,
            block: self.block,
            world_coords: self.world,
            parent_coords: self.parent,
        }
    }
}

impl Manifest {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a manifest; relative paths inside it are taken relative to the
    /// manifest's directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let mut manifest = Self::from_json(&json)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))?;

        if let Some(base) = path.parent() {
            manifest.xbe = base.join(&manifest.xbe);
            manifest.texlist = manifest.texlist.map(|t| base.join(t));
        }
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "xbe": "default.xbe",
        "texlist": "stage1.txt",
        "chunks": [
            { "section": "MDLEN", "offset": 48216, "block": 3219456,
              "world": [1.0, 2.0, 3.0], "parent": [0.5, 0, 0] },
            { "section": "MDLEN", "offset": 48300, "block": 3219500, "name": "door" }
        ]
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_json(SAMPLE).unwrap();
        assert_eq!(manifest.xbe, PathBuf::from("default.xbe"));
        assert_eq!(manifest.texlist, Some(PathBuf::from("stage1.txt")));
        assert_eq!(manifest.chunks.len(), 2);

        let header = manifest.chunks[0].header();
        assert_eq!(header.name(), "ch_MDLEN_0xbc58");
        assert_eq!(header.world_offset(), Vec3::new(1.5, 2.0, 3.0));

        let second = &manifest.chunks[1];
        assert_eq!(second.world, Vec3::ZERO);
        assert_eq!(second.parent, Vec3::ZERO);
        assert_eq!(second.name.as_deref(), Some("door"));
    }

    #[test]
    fn test_missing_chunks_rejected() {
        assert!(Manifest::from_json(r#"{ "xbe": "default.xbe" }"#).is_err());
    }
}
