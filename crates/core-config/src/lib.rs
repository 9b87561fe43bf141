//! Configuration loading and parsing.
//!
//! Parses `termedit.toml` from an explicit override path, the working
//! directory, or the user config directory, in that order. Unknown fields
//! are ignored (TOML deserialization tolerance) so the file format can
//! evolve without breaking older configs; every field defaults to the
//! control's built-in behavior when absent.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "termedit.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_tab_width")]
    pub tab_width: usize,
    #[serde(default)]
    pub auto_indent: bool,
    #[serde(default)]
    pub traditional_navigation: bool,
    #[serde(default)]
    pub read_only: bool,
}

impl EditorConfig {
    fn default_tab_width() -> usize {
        4
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: Self::default_tab_width(),
            auto_indent: false,
            traditional_navigation: false,
            read_only: false,
        }
    }
}

/// Attribute pair in the classic 4-bit foreground/background encoding.
#[derive(Debug, Deserialize, Clone)]
pub struct ColorConfig {
    #[serde(default = "ColorConfig::default_text")]
    pub text_attr: u16,
    #[serde(default = "ColorConfig::default_selected")]
    pub selected_attr: u16,
}

impl ColorConfig {
    fn default_text() -> u16 {
        0x07
    }
    fn default_selected() -> u16 {
        0x70
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            text_attr: Self::default_text(),
            selected_attr: Self::default_selected(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive string.
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub colors: ColorConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Default, Clone)]
pub struct Config {
    pub file: ConfigFile,
    /// Where the file was found, when it was.
    pub source: Option<PathBuf>,
}

/// Load configuration, trying the override path first, then the working
/// directory, then the user config directory. A missing file is the
/// default configuration; a malformed file is an error.
pub fn load(override_path: Option<PathBuf>) -> Result<Config> {
    let candidates: Vec<PathBuf> = override_path
        .into_iter()
        .chain(std::iter::once(PathBuf::from(CONFIG_FILE_NAME)))
        .chain(
            dirs::config_dir()
                .map(|d| d.join("termedit").join(CONFIG_FILE_NAME))
                .into_iter(),
        )
        .collect();

    for path in candidates {
        if !path.is_file() {
            continue;
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(target: "runtime.config", path = %path.display(), "config loaded");
        return Ok(Config {
            file,
            source: Some(path),
        });
    }
    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_file() {
        let cfg = Config::default();
        assert_eq!(cfg.file.editor.tab_width, 4);
        assert!(!cfg.file.editor.auto_indent);
        assert_eq!(cfg.file.colors.text_attr, 0x07);
        assert!(cfg.file.log.filter.is_none());
    }

    #[test]
    fn parses_partial_file_with_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
[editor]
tab_width = 8
auto_indent = true
future_knob = "ignored"

[log]
filter = "state.undo=trace"
"#,
        )
        .unwrap();
        let cfg = load(Some(path.clone())).unwrap();
        assert_eq!(cfg.file.editor.tab_width, 8);
        assert!(cfg.file.editor.auto_indent);
        assert!(!cfg.file.editor.traditional_navigation);
        assert_eq!(cfg.file.log.filter.as_deref(), Some("state.undo=trace"));
        assert_eq!(cfg.source, Some(path));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "editor = 3").unwrap();
        assert!(load(Some(path)).is_err());
    }
}
