use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result, render::RenderConfig};

/// Settings read from an optional TOML file. Every key has a default, so an
/// empty file is a valid configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  pub data_path:     PathBuf,
  pub download_dir:  PathBuf,
  pub overview_rows: usize,
  pub window:        WindowConfig,
  pub export:        ExportConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
  pub width:  u32,
  pub height: u32,
}

/// Pixel size of the PNG images written by `export`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
  pub width:  u32,
  pub height: u32,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      data_path:     PathBuf::from("food_wastage_data.csv"),
      download_dir:  PathBuf::from("."),
      overview_rows: 5,
      window:        WindowConfig::default(),
      export:        ExportConfig::default(),
    }
  }
}

impl Default for WindowConfig {
  fn default() -> Self { WindowConfig { width: 1600, height: 1000 } }
}

impl Default for ExportConfig {
  fn default() -> Self { ExportConfig { width: 1024, height: 768 } }
}

impl Config {
  pub fn load(path: &Path) -> Result<Self> {
    let text = std::fs::read_to_string(path).map_err(Error::io(path))?;
    let config = Self::from_toml_str(&text)?;
    log::debug!("loaded configuration from {}", path.display());
    Ok(config)
  }

  pub fn from_toml_str(text: &str) -> Result<Self> {
    let config: Config = toml::from_str(text)?;
    RenderConfig::new(config.window.width, config.window.height)?;
    RenderConfig::new(config.export.width, config.export.height)?;
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_uses_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.data_path, PathBuf::from("food_wastage_data.csv"));
    assert_eq!(config.overview_rows, 5);
    assert_eq!(config.window.width, 1600);
    assert_eq!(config.export.height, 768);
  }

  #[test]
  fn partial_tables_keep_remaining_defaults() {
    let config = Config::from_toml_str(
      r#"
      data_path = "data/waste.csv"

      [export]
      width = 640
      "#,
    )
    .unwrap();

    assert_eq!(config.data_path, PathBuf::from("data/waste.csv"));
    assert_eq!(config.export.width, 640);
    assert_eq!(config.export.height, 768);
    assert_eq!(config.download_dir, PathBuf::from("."));
  }

  #[test]
  fn rejects_wrong_types() {
    let err = Config::from_toml_str("overview_rows = \"five\"").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
  }

  #[test]
  fn rejects_unrenderable_sizes() {
    let err = Config::from_toml_str("[export]\nwidth = 0").unwrap_err();
    assert!(matches!(err, Error::CanvasSize { width: 0, height: 768, .. }));

    let err = Config::from_toml_str("[window]\nheight = 100000").unwrap_err();
    assert!(matches!(err, Error::CanvasSize { width: 1600, height: 100000, .. }));
  }
}
