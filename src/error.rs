use std::path::PathBuf;

use polars::error::PolarsError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("failed to read {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("dataset is missing column `{0}`")]
  MissingColumn(&'static str),

  #[error("column `{column}` is not usable: {reason}")]
  InvalidColumn { column: &'static str, reason: String },

  #[error("column `{column}` has {count} missing values")]
  MissingValues { column: &'static str, count: usize },

  #[error("dataset has no rows")]
  EmptyDataset,

  #[error("unknown event type `{0}`")]
  UnknownEventType(String),

  #[error("invalid configuration: {0}")]
  Config(#[from] toml::de::Error),

  #[error(transparent)]
  Polars(#[from] PolarsError),

  #[error("failed to encode image: {0}")]
  Image(#[from] image::ImageError),

  #[error("canvas {width}x{height} must be between 1 and {max} pixels on each side")]
  CanvasSize { width: u32, height: u32, max: u32 },

  #[error("gpu error: {0}")]
  Gpu(String),

  #[error("window error: {0}")]
  Window(String),
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Error {
    let path = path.into();
    move |source| Error::Io { path, source }
  }

  pub(crate) fn gpu(err: impl std::fmt::Display) -> Error { Error::Gpu(err.to_string()) }
}

/// Logs and discards errors for values where a partial result is better than none.
pub trait ResultExt<T> {
  fn log_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
  fn log_err(self) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        log::warn!("{e}");
        None
      }
    }
  }
}
