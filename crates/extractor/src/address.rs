//! Virtual-to-file address translation.

use std::collections::BTreeMap;

use crate::error::{ExtractError, ExtractResult};

/// Where one section is mapped in memory and where it lives in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionBase {
    pub virtual_address: u32,
    pub raw_address: u32,
}

/// Section base-address table of an executable image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionTable {
    sections: BTreeMap<String, SectionBase>,
}

impl SectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, name: &str, virtual_address: u32, raw_address: u32) -> Self {
        self.insert(name, virtual_address, raw_address);
        self
    }

    pub fn insert(&mut self, name: &str, virtual_address: u32, raw_address: u32) {
        self.sections.insert(
            name.to_string(),
            SectionBase {
                virtual_address,
                raw_address,
            },
        );
    }

    fn get(&self, name: &str) -> Option<SectionBase> {
        self.sections.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Translate a virtual offset inside `section` to an absolute file offset.
    pub fn resolve(&self, virtual_offset: i64, section: &str) -> ExtractResult<u64> {
        let base = self
            .get(section)
            .ok_or_else(|| ExtractError::UnknownSection(section.to_string()))?;

        let absolute =
            virtual_offset - i64::from(base.virtual_address) + i64::from(base.raw_address);
        u64::try_from(absolute).map_err(|_| ExtractError::AddressOutOfRange {
            section: section.to_string(),
            offset: virtual_offset,
        })
    }
}

/// Parse a `"<virtual>, <raw>"` table entry. Both numbers accept a `0x` prefix.
pub fn parse_section_entry(value: &str) -> Option<(u32, u32)> {
    let mut parts = value.split(',').map(str::trim);
    let virtual_address = parse_number(parts.next()?)?;
    let raw_address = parse_number(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((virtual_address, raw_address))
}

/// Parse a decimal or `0x`-prefixed hexadecimal number.
pub fn parse_number(value: &str) -> Option<u32> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SectionTable {
        SectionTable::new()
            .with_section("MDLEN", 0x0031_2000, 0x0029_5000)
            .with_section("ZERO", 0, 0)
    }

    #[test]
    fn test_resolve() {
        let table = table();
        assert_eq!(table.resolve(0x0031_2010, "MDLEN").unwrap(), 0x0029_5010);
        assert_eq!(table.resolve(0x40, "ZERO").unwrap(), 0x40);
        // Deterministic.
        assert_eq!(
            table.resolve(0x0031_2010, "MDLEN").unwrap(),
            table.resolve(0x0031_2010, "MDLEN").unwrap()
        );
    }

    #[test]
    fn test_resolve_unknown_section() {
        assert!(matches!(
            table().resolve(0, "NOPE"),
            Err(ExtractError::UnknownSection(name)) if name == "NOPE"
        ));
    }

    #[test]
    fn test_resolve_before_file_start() {
        assert!(matches!(
            table().resolve(-4, "ZERO"),
            Err(ExtractError::AddressOutOfRange { offset: -4, .. })
        ));
    }

    #[test]
    fn test_parse_section_entry() {
        assert_eq!(parse_section_entry("0x1000, 0x200"), Some((0x1000, 0x200)));
        assert_eq!(parse_section_entry("4096,512"), Some((4096, 512)));
        assert_eq!(parse_section_entry("0x1000"), None);
        assert_eq!(parse_section_entry("0x1000, 2, 3"), None);
        assert_eq!(parse_section_entry("zz, 1"), None);
    }
}
