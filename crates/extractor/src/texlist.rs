//! Texture list: material names indexed by tripart texture index.

use std::io::Write;
use std::path::Path;

use crate::error::{ExtractError, ExtractResult};

pub const DEFAULT_TEXTURE_EXTENSION: &str = "png";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialList {
    /// Library name; the OBJ references `<name>.mtl`.
    pub name: String,
    pub materials: Vec<String>,
}

impl MaterialList {
    pub fn new(name: &str, materials: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            materials,
        }
    }

    /// One material name per line; blank lines and `#` comments are skipped.
    /// The list is named after the file stem.
    pub fn load(path: &Path) -> ExtractResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::parse(&name, &content))
    }

    pub fn parse(name: &str, content: &str) -> Self {
        let materials = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self::new(name, materials)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn material(&self, index: usize) -> ExtractResult<&str> {
        self.materials
            .get(index)
            .map(String::as_str)
            .ok_or(ExtractError::MissingMaterial {
                index,
                count: self.materials.len(),
            })
    }

    pub fn mtl_file_name(&self) -> String {
        format!("{}.mtl", self.name)
    }

    /// Write the material library the OBJ's `mtllib` line points to.
    pub fn write_mtl<W: Write>(&self, out: &mut W, texture_extension: &str) -> ExtractResult<()> {
        for material in &self.materials {
            writeln!(out, "newmtl {material}")?;
            writeln!(out, "Kd 1.0 1.0 1.0")?;
            writeln!(out, "map_Kd {material}.{texture_extension}")?;
            writeln!(out)?;
        }
        Ok(())
    }
}
