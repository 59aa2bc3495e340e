use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One search submission. Built once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
   pub origin:        String,
   pub window_start:  NaiveDate,
   pub window_end:    NaiveDate,
   pub stay_duration: u32,
   pub passengers:    u32,
}

impl SearchParams {
   /// Whole days between window start and end.
   pub fn window_days(&self) -> i64 {
      (self.window_end - self.window_start).num_days()
   }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySuggestion {
   pub city:    String,
   pub country: String,
}

impl CitySuggestion {
   /// The origin string a selection fills in.
   pub fn label(&self) -> String {
      format!("{}, {}", self.city, self.country)
   }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightInfo {
   pub airline:        String,
   pub price:          f64,
   pub departure_date: String,
   pub return_date:    String,
   pub booking_url:    String,
   #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
   pub departure_time: Option<String>,
   #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
   pub arrival_time:   Option<String>,
   #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
   pub stops:          Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelInfo {
   pub name:            String,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub rating:          Option<f64>,
   pub total_price:     f64,
   pub booking_url:     String,
   #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
   pub price_per_night: Option<f64>,
   #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
   pub location:        Option<String>,
}

/// Incidental spend for the whole stay. Only `total` feeds aggregation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalCosts {
   pub total:       f64,
   #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
   pub food:        Option<f64>,
   #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
   pub sightseeing: Option<f64>,
   #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
   pub transport:   Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryDay {
   pub day:         u32,
   pub activity:    String,
   pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
   pub title: String,
   pub uri:   String,
}

/// Citation entry as the search provider reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCitation {
   pub title: Option<String>,
   pub uri:   Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripProposal {
   pub id:          String,
   pub destination: String,
   pub country:     String,
   pub currency:    String,
   pub image_url:   String,
   pub summary:     String,
   pub flight:      FlightInfo,
   pub hotel:       HotelInfo,
   pub local_costs: LocalCosts,
   pub itinerary:   Vec<ItineraryDay>,
   pub total_cost:  u64,
   #[serde(default, skip_serializing_if = "Vec::is_empty")]
   pub sources:     Vec<Source>,
}

/// Reply of a trip search call before any interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchReply {
   pub raw:       String,
   pub citations: Vec<RawCitation>,
}

/// Ranked result of one search. Index 0 is the best-value pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
   pub proposals: Vec<TripProposal>,
   pub sources:   Vec<Source>,
}

impl SearchOutcome {
   pub fn best_value(&self) -> Option<&TripProposal> {
      self.proposals.first()
   }
}

/// Deserializers for display-only extras. A value of the wrong shape becomes
/// `None` instead of failing the surrounding record.
mod lenient {
   use serde::{Deserialize, Deserializer};
   use serde_json::Value;

   pub fn text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
      Ok(match Value::deserialize(de)? {
         Value::String(s) => Some(s),
         Value::Number(n) => Some(n.to_string()),
         Value::Bool(b) => Some(b.to_string()),
         _ => None,
      })
   }

   fn as_number(value: &Value) -> Option<f64> {
      let number = match value {
         Value::Number(n) => n.as_f64(),
         Value::String(s) => s.trim().parse().ok(),
         _ => None,
      };
      number.filter(|n| n.is_finite())
   }

   pub fn number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
      Ok(as_number(&Value::deserialize(de)?))
   }

   pub fn count<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u32>, D::Error> {
      Ok(as_number(&Value::deserialize(de)?)
         .filter(|n| *n >= 0.0 && *n <= f64::from(u32::MAX))
         .map(|n| n.round() as u32))
   }
}
