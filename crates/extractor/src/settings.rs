//! Extractor settings read from the INI configuration.
//!
//! ```ini
//! [sections]
//! ; name = virtual base, raw base
//! MDLEN = 0x00312000, 0x00295000
//!
//! [decode]
//! MaxTriparts = 4096
//! WorldSpace = true
//!
//! [output]
//! TextureExtension = png
//!
//! [log]
//! LogsDir = logs
//! LogLevel = 2
//! ```

use blinx_shared::config::Config;

use crate::address::{SectionTable, parse_section_entry};
use crate::chunk::{DEFAULT_MAX_TRIPARTS, DecodeOptions};
use crate::error::{ExtractError, ExtractResult};
use crate::texlist::DEFAULT_TEXTURE_EXTENSION;

const SECTIONS: &str = "sections";
const DECODE: &str = "decode";
const OUTPUT: &str = "output";
const LOG: &str = "log";

#[derive(Clone, Debug)]
pub struct Settings {
    pub sections: SectionTable,
    pub decode: DecodeOptions,
    pub texture_extension: String,
    pub logs_dir: Option<String>,
    pub log_level: i32,
}

impl Settings {
    pub fn from_config(config: &Config) -> ExtractResult<Self> {
        let mut sections = SectionTable::new();
        for (name, value) in config.section_entries(SECTIONS) {
            let (virtual_address, raw_address) = parse_section_entry(&value).ok_or_else(|| {
                ExtractError::InvalidConfig(format!("section {name}: '{value}'"))
            })?;
            sections.insert(&name, virtual_address, raw_address);
        }

        let default_cap = i32::try_from(DEFAULT_MAX_TRIPARTS).unwrap_or(i32::MAX);
        let max_triparts = config.get_int_default(DECODE, "MaxTriparts", default_cap);
        let max_triparts = usize::try_from(max_triparts)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                ExtractError::InvalidConfig(format!("MaxTriparts must be positive, got {max_triparts}"))
            })?;

        let decode = DecodeOptions {
            world_space: config.get_bool_default(DECODE, "WorldSpace", true),
            max_triparts,
            ..DecodeOptions::default()
        };

        let logs_dir = config.get_string(LOG, "LogsDir");

        Ok(Self {
            sections,
            decode,
            texture_extension: config.get_string_default(
                OUTPUT,
                "TextureExtension",
                DEFAULT_TEXTURE_EXTENSION,
            ),
            logs_dir: (!logs_dir.is_empty()).then_some(logs_dir),
            log_level: config.get_int_default(LOG, "LogLevel", 2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(content: &str) -> Config {
        let mut config = Config::default();
        assert!(config.set_content(content));
        config
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_config(&Config::default()).unwrap();
        assert!(settings.sections.is_empty());
        assert!(settings.decode.world_space);
        assert_eq!(settings.decode.max_triparts, DEFAULT_MAX_TRIPARTS);
        assert_eq!(settings.texture_extension, "png");
        assert_eq!(settings.logs_dir, None);
        assert_eq!(settings.log_level, 2);
    }

    #[test]
    fn test_full_config() {
        let settings = Settings::from_config(&config(
            "[sections]\nMDLEN = 0x00312000, 0x00295000\nMDLA = 4096, 0\n\
             [decode]\nMaxTriparts = 16\nWorldSpace = false\n\
             [output]\nTextureExtension = dds\n\
             [log]\nLogsDir = logs\nLogLevel = 3\n",
        ))
        .unwrap();

        assert_eq!(settings.sections.len(), 2);
        assert_eq!(settings.sections.resolve(0x0031_2004, "MDLEN").unwrap(), 0x0029_5004);
        assert_eq!(settings.sections.resolve(4100, "MDLA").unwrap(), 4);
        assert!(!settings.decode.world_space);
        assert_eq!(settings.decode.max_triparts, 16);
        assert_eq!(settings.texture_extension, "dds");
        assert_eq!(settings.logs_dir.as_deref(), Some("logs"));
        assert_eq!(settings.log_level, 3);
    }

    #[test]
    fn test_invalid_section_entry() {
        let err = Settings::from_config(&config("[sections]\nMDLEN = 0x10\n")).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn test_invalid_tripart_cap() {
        let err = Settings::from_config(&config("[decode]\nMaxTriparts = 0\n")).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }
}
