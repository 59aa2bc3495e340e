use chrono::NaiveDate;
use thiserror::Error;

/// Rejections raised before any external call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
   #[error("origin must not be empty")]
   EmptyOrigin,

   #[error("stay duration must be at least one day")]
   ZeroStay,

   #[error("at least one passenger is required")]
   ZeroPassengers,

   #[error("window end {end} is before window start {start}")]
   WindowInverted { start: NaiveDate, end: NaiveDate },

   #[error("window {start} to {end} must fall between {earliest} and {latest}")]
   WindowOutOfRange { start: NaiveDate, end: NaiveDate, earliest: NaiveDate, latest: NaiveDate },

   #[error("window shorter than stay: {window_days} day window cannot fit a {stay} day stay")]
   WindowTooShort { window_days: i64, stay: u32 },
}

#[derive(Debug, Error)]
pub enum Error {
   #[error(transparent)]
   Validation(#[from] ValidationError),

   #[error("{op} request failed: {reason}")]
   Service { op: &'static str, reason: String },

   #[error("http error: {0}")]
   Http(#[from] reqwest::Error),

   #[error("malformed {what} payload: {reason}")]
   DataFormat { what: &'static str, reason: String },

   #[error("no API key configured (set THRIFTTRIP_API_KEY or GEMINI_API_KEY)")]
   MissingApiKey,

   #[error("configuration error: {0}")]
   Config(#[from] Box<figment::Error>),

   #[error("io error: {0}")]
   Io(#[from] std::io::Error),

   #[error("json error: {0}")]
   Json(#[from] serde_json::Error),
}

impl From<figment::Error> for Error {
   fn from(err: figment::Error) -> Self {
      Self::Config(Box::new(err))
   }
}

impl Error {
   pub fn data_format(what: &'static str, reason: impl ToString) -> Self {
      Self::DataFormat { what, reason: reason.to_string() }
   }

   /// The external call failed outright (transport, quota, non-success status).
   pub const fn is_service(&self) -> bool {
      matches!(self, Self::Service { .. } | Self::Http(_))
   }

   pub const fn is_data_format(&self) -> bool {
      matches!(self, Self::DataFormat { .. })
   }

   /// Text shown to the traveler. Service and payload failures collapse into
   /// one message since neither is actionable beyond resubmitting.
   pub fn user_message(&self) -> String {
      match self {
         Self::Validation(err) => err.to_string(),
         Self::Service { .. } | Self::Http(_) | Self::DataFormat { .. } => {
            "Search failed. Live travel pricing is volatile; please try again or adjust your date \
             window slightly."
               .to_string()
         },
         other => other.to_string(),
      }
   }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn window_too_short_mentions_shortfall() {
      let err = ValidationError::WindowTooShort { window_days: 9, stay: 10 };
      assert!(err.to_string().starts_with("window shorter than stay"));
   }

   #[test]
   fn service_and_format_errors_share_user_message() {
      let service = Error::Service { op: "search", reason: "503".into() };
      let format = Error::data_format("trip", "expected array");
      assert!(service.is_service());
      assert!(format.is_data_format());
      assert_eq!(service.user_message(), format.user_message());
   }

   #[test]
   fn validation_user_message_is_specific() {
      let err = Error::from(ValidationError::ZeroPassengers);
      assert_eq!(err.user_message(), "at least one passenger is required");
   }
}
