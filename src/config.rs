use std::{path::PathBuf, time::Duration};

use directories::BaseDirs;
use figment::{
   Figment,
   providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::Result;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEOLOCATION_URL: &str = "https://ipapi.co/json/";

pub const PROPOSAL_COUNT: usize = 3;
pub const MAX_SUGGESTIONS: usize = 5;
pub const DEBOUNCE_MS: u64 = 400;
pub const MIN_QUERY_CHARS: usize = 2;

/// Days from today until a default search window opens.
pub const DEFAULT_WINDOW_LEAD_DAYS: i64 = 14;
pub const DEFAULT_WINDOW_SPAN_DAYS: i64 = 21;
pub const DEFAULT_STAY_DAYS: u32 = 7;

const ENV_PREFIX: &str = "THRIFTTRIP_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
   pub api_key:                Option<String>,
   pub model:                  String,
   pub suggest_model:          String,
   pub base_url:               String,
   pub max_suggestions:        usize,
   pub debounce_ms:            u64,
   pub min_query_chars:        usize,
   /// Reject proposals whose flight dates fall outside the requested window.
   pub verify_window:          bool,
   pub geolocation_url:        String,
   pub geolocation_timeout_ms: u64,
   pub connect_timeout_ms:     u64,
}

impl Default for Config {
   fn default() -> Self {
      Self {
         api_key:                None,
         model:                  DEFAULT_MODEL.to_string(),
         suggest_model:          DEFAULT_MODEL.to_string(),
         base_url:               DEFAULT_BASE_URL.to_string(),
         max_suggestions:        MAX_SUGGESTIONS,
         debounce_ms:            DEBOUNCE_MS,
         min_query_chars:        MIN_QUERY_CHARS,
         verify_window:          true,
         geolocation_url:        DEFAULT_GEOLOCATION_URL.to_string(),
         geolocation_timeout_ms: 3000,
         connect_timeout_ms:     10_000,
      }
   }
}

impl Config {
   /// Resolves defaults, then `~/.thrifttrip/config.toml`, then `THRIFTTRIP_*`
   /// variables. `GEMINI_API_KEY` and `API_KEY` fill the key when nothing
   /// else does.
   pub fn load() -> Result<Self> {
      Self::from_figment(Self::figment(&config_path()))
   }

   pub fn figment(path: &std::path::Path) -> Figment {
      Figment::from(Serialized::defaults(Self::default()))
         .merge(Toml::file(path))
         .merge(Env::prefixed(ENV_PREFIX))
   }

   pub fn from_figment(figment: Figment) -> Result<Self> {
      let mut config: Self = figment.extract()?;

      if config.api_key.as_deref().is_none_or(str::is_empty) {
         config.api_key = ["GEMINI_API_KEY", "API_KEY"]
            .into_iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()));
      }

      Ok(config)
   }

   pub const fn debounce(&self) -> Duration {
      Duration::from_millis(self.debounce_ms)
   }

   pub const fn geolocation_timeout(&self) -> Duration {
      Duration::from_millis(self.geolocation_timeout_ms)
   }

   pub const fn connect_timeout(&self) -> Duration {
      Duration::from_millis(self.connect_timeout_ms)
   }
}

pub fn data_dir() -> PathBuf {
   BaseDirs::new().map_or_else(
      || PathBuf::from(".thrifttrip"),
      |dirs| dirs.home_dir().join(".thrifttrip"),
   )
}

pub fn config_path() -> PathBuf {
   data_dir().join("config.toml")
}

pub fn debug_requests() -> bool {
   std::env::var("THRIFTTRIP_DEBUG_REQUESTS")
      .ok()
      .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}
