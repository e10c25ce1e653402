// Configuration module
// Reads INI-style configuration files with environment variable overrides
//
// A Config is an ordinary value: binaries load it once and hand the parts
// they need to the code that uses them. Nothing here is global.

use configparser::ini::Ini;

/// Configuration file parser
/// Keys are addressed as (section, key); an environment variable named
/// `<prefix><section>_<key>` wins over the file.
pub struct Config {
    ini: Ini,
    filename: String,
    env_prefix: String,
}

impl Config {
    pub fn new(env_prefix: &str) -> Self {
        Config {
            ini: Ini::new_cs(),
            filename: String::new(),
            env_prefix: env_prefix.to_string(),
        }
    }

    /// Load configuration from a file
    /// Returns false when the file is missing or unreadable; defaults and
    /// environment overrides still apply in that case.
    pub fn set_source(&mut self, filename: &str) -> bool {
        self.filename = filename.to_string();
        self.reload()
    }

    /// Reload the configuration file
    pub fn reload(&mut self) -> bool {
        self.ini = Ini::new_cs();
        match self.ini.load(&self.filename) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!("Config '{}' not loaded: {}", self.filename, err);
                false
            }
        }
    }

    /// Load configuration from an in-memory string
    pub fn set_content(&mut self, content: &str) -> bool {
        self.ini = Ini::new_cs();
        self.ini.read(content.to_string()).is_ok()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Check if a key is set
    pub fn is_set(&self, section: &str, key: &str) -> bool {
        self.get_env_or_config(section, key).is_some()
    }

    /// Get a string value with a default
    pub fn get_string_default(&self, section: &str, key: &str, default: &str) -> String {
        self.get_env_or_config(section, key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Get a string value (empty string default)
    pub fn get_string(&self, section: &str, key: &str) -> String {
        self.get_string_default(section, key, "")
    }

    /// Get a boolean value with a default
    pub fn get_bool_default(&self, section: &str, key: &str, default: bool) -> bool {
        match self.get_env_or_config(section, key) {
            Some(val) => {
                let lower = val.to_lowercase();
                matches!(lower.as_str(), "1" | "true" | "yes")
            }
            None => default,
        }
    }

    /// Get an integer value with a default
    pub fn get_int_default(&self, section: &str, key: &str, default: i32) -> i32 {
        match self.get_env_or_config(section, key) {
            Some(val) => val.parse().unwrap_or(default),
            None => default,
        }
    }

    /// All key/value pairs of a section, sorted by key.
    /// Environment overrides apply to keys that exist in the file.
    pub fn section_entries(&self, section: &str) -> Vec<(String, String)> {
        let Some(keys) = self.ini.get_map_ref().get(section) else {
            return Vec::new();
        };

        let mut entries: Vec<(String, String)> = keys
            .keys()
            .filter_map(|key| {
                self.get_env_or_config(section, key)
                    .map(|value| (key.clone(), value))
            })
            .collect();
        entries.sort();
        entries
    }

    /// Try environment variable first, then config file
    fn get_env_or_config(&self, section: &str, key: &str) -> Option<String> {
        if !self.env_prefix.is_empty() {
            let env_key = format!("{}{}_{}", self.env_prefix, section, key).replace('.', "_");
            if let Ok(val) = std::env::var(&env_key) {
                return Some(val);
            }
        }

        self.ini
            .get(section, key)
            .map(|value| strip_quotes(value.trim()).to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("")
    }
}

fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
