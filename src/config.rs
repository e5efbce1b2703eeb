// Configuration module
// Internal representation of user configuration

use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub keybindings: HashMap<String, String>,
    pub settings: HashMap<String, ConfigValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl Config {
    /// Bind a key sequence to a command
    pub fn bind(&mut self, key: &str, command: &str) {
        self.keybindings
            .insert(key.to_string(), command.to_string());
    }

    /// Set a configuration value
    pub fn set<V: Into<ConfigValue>>(&mut self, key: &str, value: V) {
        self.settings.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.settings.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| match v {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        })
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| match v {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        })
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| match v {
            ConfigValue::String(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Int(i)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

pub const DEFAULT_TAB_WIDTH: usize = 4;
pub const DEFAULT_OUTPUT_HEIGHT: usize = 8;
pub const DEFAULT_LOG_FILE: &str = "zypy.log";

/// Typed view of the settings the editor core reads
#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    pub auto_pair: bool,
    pub pair_delete: bool,
    pub script_input: bool,
    pub tab_width: usize,
    pub output_height: usize,
    pub log_file: PathBuf,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            auto_pair: true,
            pair_delete: true,
            script_input: true,
            tab_width: DEFAULT_TAB_WIDTH,
            output_height: DEFAULT_OUTPUT_HEIGHT,
            log_file: std::env::temp_dir().join(DEFAULT_LOG_FILE),
        }
    }
}

impl EditorOptions {
    /// Missing or mistyped settings keep their defaults
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        let positive = |key: &str, fallback: usize| match config.get_int(key) {
            Some(n) if n > 0 => n as usize,
            _ => fallback,
        };
        Self {
            auto_pair: config.get_bool("auto_pair").unwrap_or(defaults.auto_pair),
            pair_delete: config.get_bool("pair_delete").unwrap_or(defaults.pair_delete),
            script_input: config
                .get_bool("script_input")
                .unwrap_or(defaults.script_input),
            tab_width: positive("tab_width", defaults.tab_width),
            output_height: positive("output_height", defaults.output_height),
            log_file: match config.get_string("log_file") {
                Some(path) if !path.is_empty() => PathBuf::from(path),
                _ => defaults.log_file,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert!(config.keybindings.is_empty());
        assert!(config.settings.is_empty());
    }

    #[test]
    fn test_bind_key() {
        let mut config = Config::default();
        config.bind("^R", "run-script");
        assert_eq!(config.keybindings.get("^R"), Some(&"run-script".to_string()));
    }

    #[test]
    fn test_type_mismatch() {
        let mut config = Config::default();
        config.set("val", 10);
        assert_eq!(config.get_bool("val"), None);
        assert_eq!(config.get_string("val"), None);
        assert_eq!(config.get_int("val"), Some(10));
    }

    #[test]
    fn test_options_from_empty_config() {
        let options = EditorOptions::from_config(&Config::default());
        assert_eq!(options, EditorOptions::default());
        assert!(options.auto_pair && options.pair_delete && options.script_input);
    }

    #[test]
    fn test_options_read_settings() {
        let mut config = Config::default();
        config.set("pair_delete", false);
        config.set("script_input", false);
        config.set("tab_width", 8);
        config.set("output_height", 0);
        config.set("log_file", "/tmp/custom.log");

        let options = EditorOptions::from_config(&config);
        assert!(!options.pair_delete);
        assert!(!options.script_input);
        assert_eq!(options.tab_width, 8);
        assert_eq!(options.output_height, DEFAULT_OUTPUT_HEIGHT);
        assert_eq!(options.log_file, PathBuf::from("/tmp/custom.log"));
    }
}
