//! Best-effort origin pre-fill from IP geolocation.
//!
//! Nothing here returns an error: any failure, odd payload or delay simply
//! means "no origin detected".

use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::config::Config;

/// Builds `"City, Country"` from an ipapi-shaped payload.
pub fn parse_location(payload: &Value) -> Option<String> {
   let field = |key: &str| {
      payload
         .get(key)
         .and_then(Value::as_str)
         .map(str::trim)
         .filter(|s| !s.is_empty())
   };
   let city = field("city")?;
   let country = field("country_name").or_else(|| field("country"))?;
   Some(format!("{city}, {country}"))
}

pub async fn detect_origin(http: &reqwest::Client, url: &str) -> Option<String> {
   let response = match http.get(url).send().await {
      Ok(r) if r.status().is_success() => r,
      Ok(r) => {
         tracing::warn!("location auto-detection failed: {}", r.status());
         return None;
      },
      Err(e) => {
         tracing::warn!("location auto-detection failed: {e}");
         return None;
      },
   };

   match response.json::<Value>().await {
      Ok(payload) => parse_location(&payload),
      Err(e) => {
         tracing::warn!("location auto-detection returned junk: {e}");
         None
      },
   }
}

/// Starts detection in the background. The handle may be awaited, raced or
/// dropped; dropping it never affects anything else.
pub fn spawn_detect(config: &Config) -> JoinHandle<Option<String>> {
   let url = config.geolocation_url.clone();
   let timeout = config.geolocation_timeout();
   tokio::spawn(async move {
      let http = reqwest::Client::builder().timeout(timeout).build().ok()?;
      detect_origin(&http, &url).await
   })
}

/// Awaits a detection started with [`spawn_detect`] for at most `wait`.
pub async fn take_detected(handle: JoinHandle<Option<String>>, wait: Duration) -> Option<String> {
   match tokio::time::timeout(wait, handle).await {
      Ok(Ok(origin)) => origin,
      Ok(Err(e)) => {
         tracing::warn!("location auto-detection task failed: {e}");
         None
      },
      Err(_) => {
         tracing::debug!("location auto-detection still running after {wait:?}, ignoring");
         None
      },
   }
}
