//! Locating and loading the client config
//! file.

use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use taskdesk_core::Config;
use tracing::{
  debug,
  info
};

/// Where the config comes from and whether
/// it has to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
  /// Named by `--config` or
  /// `TASKDESK_CONFIG`.
  Explicit(PathBuf),
  Default(PathBuf),
  None
}

pub fn resolve_config_path(
  explicit: Option<&Path>
) -> ConfigSource {
  if let Some(path) = explicit {
    return ConfigSource::Explicit(
      path.to_path_buf()
    );
  }
  match dirs::config_dir() {
    | Some(dir) => ConfigSource::Default(
      dir
        .join("taskdesk")
        .join("config.toml")
    ),
    | None => ConfigSource::None
  }
}

#[tracing::instrument]
pub fn load_config(
  source: &ConfigSource
) -> anyhow::Result<Config> {
  let path = match source {
    | ConfigSource::Explicit(path) => {
      if !path.exists() {
        return Err(anyhow!(
          "config file not found: {}",
          path.display()
        ));
      }
      path
    }
    | ConfigSource::Default(path)
      if path.exists() =>
    {
      path
    }
    | ConfigSource::Default(path) => {
      debug!(path = %path.display(), "no config file; using defaults");
      return Ok(Config::default());
    }
    | ConfigSource::None => {
      debug!(
        "no config directory; using \
         defaults"
      );
      return Ok(Config::default());
    }
  };

  info!(path = %path.display(), "loading config");
  let text = std::fs::read_to_string(path)
    .with_context(|| {
      format!(
        "failed to read config file: {}",
        path.display()
      )
    })?;
  Config::from_toml_str(&text)
    .with_context(|| {
      format!(
        "in config file {}",
        path.display()
      )
    })
}
