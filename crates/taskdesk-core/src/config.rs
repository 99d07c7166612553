use anyhow::{
  Context,
  anyhow
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  warn
};

use crate::task::Priority;
use crate::view::NOTICE_TIMEOUT_MS;

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct Config {
  /// Prefix for every endpoint path.
  /// Empty means same origin.
  pub api_base_url:         String,
  pub notice_timeout_ms:    u32,
  pub request_timeout_secs: u64,
  /// Preselected in the create form.
  pub default_priority:     Priority
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api_base_url:         String::new(),
      notice_timeout_ms:    NOTICE_TIMEOUT_MS,
      request_timeout_secs: 30,
      default_priority:     Priority::Medium
    }
  }
}

impl Config {
  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let cfg =
      toml::from_str::<Config>(text)
        .context(
          "failed to parse client \
           config"
        )?;
    debug!(?cfg, "parsed client config");
    Ok(cfg)
  }

  /// Parses `text`, keeping defaults when
  /// it is malformed.
  pub fn from_toml_or_default(
    text: &str
  ) -> Self {
    match Self::from_toml_str(text) {
      | Ok(cfg) => cfg,
      | Err(error) => {
        warn!(error = %format!("{error:#}"), "invalid client config; using defaults");
        Config::default()
      }
    }
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      let key = key.trim();
      let value = value.trim();
      debug!(key, value, "applying override");
      match key {
        | "api_base_url" => {
          self.api_base_url =
            value.to_string();
        }
        | "notice_timeout_ms" => {
          self.notice_timeout_ms =
            value.parse().with_context(
              || {
                format!(
                  "invalid \
                   notice_timeout_ms: \
                   {value}"
                )
              }
            )?;
        }
        | "request_timeout_secs" => {
          self.request_timeout_secs =
            value.parse().with_context(
              || {
                format!(
                  "invalid \
                   request_timeout_secs: \
                   {value}"
                )
              }
            )?;
        }
        | "default_priority" => {
          self.default_priority = value
            .parse()
            .map_err(|e: String| {
              anyhow!(e)
            })?;
        }
        | other => {
          return Err(anyhow!(
            "unknown config key: {other}"
          ));
        }
      }
    }
    Ok(())
  }

  /// Joins the base URL and an endpoint
  /// path without doubling slashes.
  pub fn endpoint(
    &self,
    path: &str
  ) -> String {
    format!(
      "{}/{}",
      self.api_base_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }
}
