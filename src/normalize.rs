//! Parsing and coercion of provider payloads into typed records.
//!
//! A batch either parses completely or fails as a whole; nothing is salvaged
//! from a payload that does not match the schema.

use chrono::NaiveDate;
use reqwest::Url;
use serde::Deserialize;

use crate::{
   error::{Error, Result},
   query::{self, parse_date},
   types::{
      CitySuggestion, FlightInfo, HotelInfo, ItineraryDay, LocalCosts, SearchParams, TripProposal,
   },
};

const IMAGE_BASE_URL: &str = "https://images.unsplash.com/photo-1500530855697-b586d89ba3ee";

/// One proposal exactly as the provider shaped it. Any `totalCost` the
/// provider includes is not even read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTripProposal {
   pub destination: String,
   pub country:     String,
   pub currency:    String,
   #[serde(default)]
   pub summary:     Option<String>,
   #[serde(default)]
   pub image_url:   Option<String>,
   pub flight:      FlightInfo,
   pub hotel:       HotelInfo,
   pub local_costs: LocalCosts,
   #[serde(default)]
   pub itinerary:   Vec<RawItineraryDay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawItineraryDay {
   pub day:         Option<f64>,
   pub activity:    Option<String>,
   pub description: Option<String>,
}

/// Parses the raw trip payload.
pub fn normalize(raw: &str) -> Result<Vec<RawTripProposal>> {
   let proposals: Vec<RawTripProposal> =
      serde_json::from_str(unfence(raw)).map_err(|e| Error::data_format("trip", e))?;

   for (i, p) in proposals.iter().enumerate() {
      let amounts = [
         ("flight.price", p.flight.price),
         ("hotel.totalPrice", p.hotel.total_price),
         ("localCosts.total", p.local_costs.total),
      ];
      if let Some((field, value)) = amounts
         .into_iter()
         .find(|(_, v)| !v.is_finite() || *v < 0.0)
      {
         return Err(Error::data_format("trip", format!("proposal {i}: {field} is {value}")));
      }
   }

   Ok(proposals)
}

/// Parses a city completion payload, keeping the provider's order.
pub fn parse_suggestions(raw: &str, max: usize) -> Result<Vec<CitySuggestion>> {
   let mut suggestions: Vec<CitySuggestion> =
      serde_json::from_str(unfence(raw)).map_err(|e| Error::data_format("suggestion", e))?;
   suggestions.truncate(max);
   Ok(suggestions)
}

/// Per-batch identifier source.
///
/// Ids are `trip-{token}-{index}`; the token is random per batch, so ids stay
/// distinct across rapid repeated searches.
#[derive(Debug, Clone)]
pub struct BatchIds {
   token: String,
}

impl BatchIds {
   pub fn new() -> Self {
      let mut token = uuid::Uuid::new_v4().simple().to_string();
      token.truncate(12);
      Self { token }
   }

   pub fn id(&self, index: usize) -> String {
      format!("trip-{}-{index}", self.token)
   }
}

impl Default for BatchIds {
   fn default() -> Self {
      Self::new()
   }
}

/// Coerces one raw proposal. `total_cost` is left at zero for the aggregator.
pub fn coerce(raw: RawTripProposal, id: String, origin: &str) -> TripProposal {
   let RawTripProposal {
      destination,
      country,
      currency,
      summary,
      image_url,
      mut flight,
      mut hotel,
      local_costs,
      itinerary,
   } = raw;

   if flight.booking_url.trim().is_empty() {
      flight.booking_url =
         query::flight_link(&destination, origin, &flight.departure_date, &flight.return_date);
   }
   if hotel.booking_url.trim().is_empty() {
      hotel.booking_url =
         query::hotel_link(&hotel.name, &destination, &flight.departure_date, &flight.return_date);
   }

   let itinerary = itinerary
      .into_iter()
      .enumerate()
      .map(|(i, day)| ItineraryDay {
         day:         day
            .day
            .filter(|d| d.is_finite() && *d >= 1.0)
            .map_or(i as u32 + 1, |d| d.round() as u32),
         activity:    day.activity.unwrap_or_default(),
         description: day.description.unwrap_or_default(),
      })
      .collect();

   TripProposal {
      id,
      image_url: image_url
         .filter(|u| !u.trim().is_empty())
         .unwrap_or_else(|| default_image_url(&destination)),
      destination,
      country,
      currency,
      summary: summary.unwrap_or_default(),
      flight,
      hotel,
      local_costs,
      itinerary,
      total_cost: 0,
      sources: Vec::new(),
   }
}

/// Illustrative image derived only from the destination name.
pub fn default_image_url(destination: &str) -> String {
   Url::parse_with_params(IMAGE_BASE_URL, &[
      ("auto", "format"),
      ("fit", "crop"),
      ("w", "1200"),
      ("q", "80"),
      ("sig", destination),
   ])
   .map_or_else(|_| IMAGE_BASE_URL.to_string(), String::from)
}

/// Rejects the batch if any flight leaves before the window opens, returns
/// after it closes, or carries an unreadable date.
pub fn verify_window(proposals: &[TripProposal], params: &SearchParams) -> Result<()> {
   for p in proposals {
      let departure = parse_date(&p.flight.departure_date);
      let ret = parse_date(&p.flight.return_date);

      let (Some(departure), Some(ret)) = (departure, ret) else {
         return Err(Error::data_format(
            "trip",
            format!(
               "{}: unreadable flight dates {:?} / {:?}",
               p.destination, p.flight.departure_date, p.flight.return_date
            ),
         ));
      };

      let inside = |d: NaiveDate| d >= params.window_start && d <= params.window_end;
      if !inside(departure) || !inside(ret) || ret < departure {
         return Err(Error::data_format(
            "trip",
            format!(
               "{}: flight {departure}..{ret} outside window {}..{}",
               p.destination, params.window_start, params.window_end
            ),
         ));
      }
   }

   Ok(())
}

/// Strips a single surrounding markdown code fence, if present.
fn unfence(raw: &str) -> &str {
   let trimmed = raw.trim();
   let Some(body) = trimmed.strip_prefix("```") else {
      return trimmed;
   };
   let Some(body) = body.strip_suffix("```") else {
      return trimmed;
   };
   body
      .strip_prefix("json")
      .unwrap_or(body)
      .trim()
}

#[cfg(test)]
mod tests {
   use super::*;

   const ROME: &str = r#"{
      "destination": "Rome",
      "country": "Italy",
      "currency": "€",
      "summary": "Ancient streets on a budget",
      "totalCost": 1,
      "flight": {
         "airline": "TAP",
         "price": 300,
         "departureDate": "2025-06-02",
         "returnDate": "2025-06-09",
         "bookingUrl": "https://www.google.com/travel/flights?q=Flights%20to%20Rome"
      },
      "hotel": { "name": "Hotel Roma", "totalPrice": 200, "bookingUrl": "" },
      "localCosts": { "total": 50 },
      "itinerary": [
         { "day": 1, "activity": "Colosseum", "description": "Morning tour" },
         { "activity": "Trastevere" }
      ]
   }"#;

   fn params() -> SearchParams {
      SearchParams {
         origin:        "Lisbon, Portugal".to_string(),
         window_start:  parse_date("2025-06-01").unwrap(),
         window_end:    parse_date("2025-06-20").unwrap(),
         stay_duration: 7,
         passengers:    2,
      }
   }

   fn rome_batch() -> Vec<TripProposal> {
      let ids = BatchIds::new();
      normalize(&format!("[{ROME}]"))
         .unwrap()
         .into_iter()
         .enumerate()
         .map(|(i, raw)| coerce(raw, ids.id(i), "Lisbon, Portugal"))
         .collect()
   }

   #[test]
   fn parses_and_defaults_optional_fields() {
      let trips = rome_batch();
      let rome = &trips[0];

      assert_eq!(rome.destination, "Rome");
      assert_eq!(rome.hotel.rating, None);
      assert_eq!(rome.local_costs.food, None);
      assert_eq!(rome.total_cost, 0);
      assert_eq!(rome.itinerary[0].day, 1);
      assert_eq!(rome.itinerary[1].day, 2);
      assert_eq!(rome.itinerary[1].description, "");
      assert_eq!(rome.image_url, default_image_url("Rome"));
   }

   #[test]
   fn blank_hotel_link_is_filled_from_template() {
      let rome = &rome_batch()[0];
      assert!(rome.hotel.booking_url.starts_with("https://www.google.com/travel/hotels?q="));
      assert!(rome.hotel.booking_url.contains("2025-06-09"));
      assert!(rome.flight.booking_url.contains("Flights%20to%20Rome"));
   }

   #[test]
   fn mistyped_extras_become_absent() {
      let extras = ROME.replace(
         r#""airline": "TAP","#,
         r#""airline": "TAP", "stops": 1.0, "departureTime": 930, "arrivalTime": ["late"],"#,
      );
      let extras = extras.replace(
         r#""name": "Hotel Roma","#,
         r#""name": "Hotel Roma", "location": {"lat": 41.9}, "pricePerNight": "28.5","#,
      );
      let extras = extras.replace(r#""total": 50"#, r#""total": 50, "food": "lots""#);

      let raw = normalize(&format!("[{extras}]")).unwrap();
      let flight = &raw[0].flight;
      assert_eq!(flight.stops, Some(1));
      assert_eq!(flight.departure_time.as_deref(), Some("930"));
      assert_eq!(flight.arrival_time, None);
      assert_eq!(raw[0].hotel.location, None);
      assert_eq!(raw[0].hotel.price_per_night, Some(28.5));
      assert_eq!(raw[0].local_costs.food, None);
      assert_eq!(raw[0].local_costs.total, 50.0);
   }

   #[test]
   fn null_and_negative_stops_are_absent() {
      for stops in ["null", "-1", "\"direct\""] {
         let extras =
            ROME.replace(r#""airline": "TAP","#, &format!(r#""airline": "TAP", "stops": {stops},"#));
         assert_eq!(normalize(&format!("[{extras}]")).unwrap()[0].flight.stops, None, "{stops}");
      }
   }

   #[test]
   fn malformed_text_is_format_error() {
      let err = normalize("Sorry, I could not find any trips.").unwrap_err();
      assert!(err.is_data_format());
   }

   #[test]
   fn missing_required_field_fails_whole_batch() {
      let broken = ROME.replace(r#""currency": "€","#, "");
      let err = normalize(&format!("[{ROME}, {broken}]")).unwrap_err();
      assert!(err.is_data_format());
      assert!(err.to_string().contains("currency"));
   }

   #[test]
   fn single_object_is_not_a_batch() {
      assert!(normalize(ROME).is_err());
   }

   #[test]
   fn negative_amount_fails_batch() {
      let negative = ROME.replace(r#""total": 50"#, r#""total": -5"#);
      let err = normalize(&format!("[{negative}]")).unwrap_err();
      assert!(err.to_string().contains("localCosts.total"));
   }

   #[test]
   fn fenced_payload_is_unwrapped() {
      let fenced = format!("```json\n[{ROME}]\n```");
      assert_eq!(normalize(&fenced).unwrap().len(), 1);
      assert!(normalize("``` [] ").is_err());
   }

   #[test]
   fn empty_array_is_an_empty_batch() {
      assert!(normalize("[]").unwrap().is_empty());
   }

   #[test]
   fn ids_are_unique_within_a_batch_and_across_batches() {
      let a = BatchIds::new();
      let b = BatchIds::new();
      assert_ne!(a.id(0), a.id(1));
      assert_ne!(a.id(0), b.id(0));
      assert!(a.id(2).starts_with("trip-") && a.id(2).ends_with("-2"));
   }

   #[test]
   fn image_url_is_deterministic_per_destination() {
      assert_eq!(default_image_url("São Paulo"), default_image_url("São Paulo"));
      assert_ne!(default_image_url("Rome"), default_image_url("Paris"));
      assert!(default_image_url("São Paulo").contains("sig=S%C3%A3o+Paulo"));
   }

   #[test]
   fn window_check_accepts_in_window_dates() {
      assert!(verify_window(&rome_batch(), &params()).is_ok());
   }

   #[test]
   fn window_check_rejects_out_of_window_and_garbled_dates() {
      let mut trips = rome_batch();
      trips[0].flight.return_date = "2025-06-21".to_string();
      assert!(verify_window(&trips, &params()).unwrap_err().is_data_format());

      trips[0].flight.return_date = "June 9th".to_string();
      assert!(verify_window(&trips, &params()).is_err());
   }

   #[test]
   fn suggestions_keep_order_and_cap() {
      let raw = r#"[
         {"city":"Paris","country":"France"},
         {"city":"Parma","country":"Italy"},
         {"city":"Paramaribo","country":"Suriname"}
      ]"#;
      let suggestions = parse_suggestions(raw, 2).unwrap();
      assert_eq!(suggestions.len(), 2);
      assert_eq!(suggestions[0].city, "Paris");
      assert_eq!(suggestions[1].city, "Parma");
      assert!(parse_suggestions("{}", 5).is_err());
   }
}
