//! Turns search parameters into validated, fully specified requests for the
//! AI search provider.
//!
//! Everything here is a pure transform: no I/O, no clock reads.

use chrono::{Months, NaiveDate};
use reqwest::Url;
use serde_json::{Value, json};

use crate::{
   error::ValidationError,
   types::SearchParams,
};

const FLIGHTS_URL: &str = "https://www.google.com/travel/flights";
const HOTELS_URL: &str = "https://www.google.com/travel/hotels";

/// Flight deep link as advertised to the provider.
pub const FLIGHT_LINK_TEMPLATE: &str = "https://www.google.com/travel/flights?q=Flights%20to%20[DESTINATION]%20from%20[ORIGIN]%20on%20[DEPARTURE_DATE]%20returning%20[RETURN_DATE]";
/// Hotel deep link as advertised to the provider.
pub const HOTEL_LINK_TEMPLATE: &str = "https://www.google.com/travel/hotels?q=[HOTEL_NAME]%20in%20[DESTINATION]%20checkin%20[DEPARTURE_DATE]%20checkout%20[RETURN_DATE]";

/// A request the provider must answer with JSON matching `schema`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
   pub prompt:   String,
   pub schema:   Value,
   /// Allow the provider to ground its answer in live web search.
   pub grounded: bool,
}

/// How far ahead a window may reach.
pub const BOOKING_HORIZON_MONTHS: u32 = 3;

/// Latest date a window may end on when searching on `today`.
pub fn latest_window_end(today: NaiveDate) -> NaiveDate {
   today
      .checked_add_months(Months::new(BOOKING_HORIZON_MONTHS))
      .unwrap_or(NaiveDate::MAX)
}

/// Checks the params that can be checked locally. The window must open no
/// earlier than `today` and close within the booking horizon.
pub fn validate(params: &SearchParams, today: NaiveDate) -> Result<(), ValidationError> {
   if params.origin.trim().is_empty() {
      return Err(ValidationError::EmptyOrigin);
   }
   if params.stay_duration == 0 {
      return Err(ValidationError::ZeroStay);
   }
   if params.passengers == 0 {
      return Err(ValidationError::ZeroPassengers);
   }
   if params.window_end < params.window_start {
      return Err(ValidationError::WindowInverted {
         start: params.window_start,
         end:   params.window_end,
      });
   }

   let latest = latest_window_end(today);
   if params.window_start < today || params.window_end > latest {
      return Err(ValidationError::WindowOutOfRange {
         start:    params.window_start,
         end:      params.window_end,
         earliest: today,
         latest,
      });
   }

   let window_days = params.window_days();
   if window_days < i64::from(params.stay_duration) {
      return Err(ValidationError::WindowTooShort { window_days, stay: params.stay_duration });
   }

   Ok(())
}

/// Validates `params` against `today` and builds the trip search request for
/// `count` proposals.
pub fn build_trip_query(
   params: &SearchParams,
   count: usize,
   today: NaiveDate,
) -> Result<StructuredRequest, ValidationError> {
   validate(params, today)?;

   let SearchParams { origin, window_start, window_end, stay_duration, passengers } = params;
   let prompt = format!(
      r#"You are the pricing engine of a budget travel search. Find the {count} cheapest international vacation pairings of one round-trip flight and one hotel.

Parameters:
- Origin: {origin}
- Availability window: {window_start} to {window_end}
- Stay duration: exactly {stay_duration} days
- Travelers: {passengers}

Rules:
1. Search for the {count} lowest round-trip fares. Departure and return dates MUST both fall inside the availability window, and the stay between them MUST span exactly {stay_duration} days.
2. For each fare, find the most affordable well-rated hotel for those exact dates.
3. Booking links MUST be deep links built from these templates, substituting every bracketed placeholder:
   - Flights: {FLIGHT_LINK_TEMPLATE}
   - Hotels: {HOTEL_LINK_TEMPLATE}
   The hotel check-in date is the flight departure date and the check-out date is the flight return date.
4. Identify the local currency of {origin}. Every amount (flight price, hotel total for {stay_duration} days, local costs) MUST be expressed in that single currency.
5. Local costs cover food, local transit and entry fees for the whole stay.
6. Give a short summary and a day-by-day itinerary.

Return a JSON array of exactly {count} objects matching the response schema."#
   );

   Ok(StructuredRequest { prompt, schema: trip_schema(), grounded: true })
}

/// Builds the city completion request for `prefix`.
pub fn build_suggestion_query(prefix: &str, max: usize) -> StructuredRequest {
   let prompt = format!(
      r#"Identify {max} major international cities that match or start with "{prefix}". Return a JSON array of objects with keys "city" and "country", most relevant first."#
   );

   StructuredRequest { prompt, schema: suggestion_schema(), grounded: false }
}

pub fn trip_schema() -> Value {
   json!({
      "type": "ARRAY",
      "items": {
         "type": "OBJECT",
         "properties": {
            "destination": { "type": "STRING" },
            "country": { "type": "STRING" },
            "currency": { "type": "STRING", "description": "Currency symbol or code (e.g. $, £, €, INR)" },
            "summary": { "type": "STRING" },
            "flight": {
               "type": "OBJECT",
               "properties": {
                  "airline": { "type": "STRING" },
                  "price": { "type": "NUMBER" },
                  "departureDate": { "type": "STRING", "description": "YYYY-MM-DD" },
                  "returnDate": { "type": "STRING", "description": "YYYY-MM-DD" },
                  "bookingUrl": { "type": "STRING", "description": "Flight deep link with parameters" }
               },
               "required": ["airline", "price", "departureDate", "returnDate", "bookingUrl"]
            },
            "hotel": {
               "type": "OBJECT",
               "properties": {
                  "name": { "type": "STRING" },
                  "rating": { "type": "NUMBER" },
                  "totalPrice": { "type": "NUMBER" },
                  "bookingUrl": { "type": "STRING", "description": "Hotel deep link with parameters" }
               },
               "required": ["name", "totalPrice", "bookingUrl"]
            },
            "localCosts": {
               "type": "OBJECT",
               "properties": {
                  "total": { "type": "NUMBER" }
               },
               "required": ["total"]
            },
            "itinerary": {
               "type": "ARRAY",
               "items": {
                  "type": "OBJECT",
                  "properties": {
                     "day": { "type": "NUMBER" },
                     "activity": { "type": "STRING" },
                     "description": { "type": "STRING" }
                  }
               }
            }
         },
         "required": ["destination", "country", "currency", "flight", "hotel", "localCosts"]
      }
   })
}

pub fn suggestion_schema() -> Value {
   json!({
      "type": "ARRAY",
      "items": {
         "type": "OBJECT",
         "properties": {
            "city": { "type": "STRING" },
            "country": { "type": "STRING" }
         },
         "required": ["city", "country"]
      }
   })
}

/// Flight deep link for concrete values.
pub fn flight_link(destination: &str, origin: &str, departure: &str, ret: &str) -> String {
   deep_link(FLIGHTS_URL, &format!("Flights to {destination} from {origin} on {departure} returning {ret}"))
}

/// Hotel deep link for concrete values.
pub fn hotel_link(hotel: &str, destination: &str, check_in: &str, check_out: &str) -> String {
   deep_link(HOTELS_URL, &format!("{hotel} in {destination} checkin {check_in} checkout {check_out}"))
}

fn deep_link(base: &str, q: &str) -> String {
   Url::parse_with_params(base, &[("q", q)]).map_or_else(|_| base.to_string(), String::from)
}

/// Parses the `YYYY-MM-DD` dates used throughout requests and replies.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
   NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
   use super::*;

   fn today() -> NaiveDate {
      parse_date("2025-05-20").unwrap()
   }

   fn params(start: &str, end: &str, stay: u32) -> SearchParams {
      SearchParams {
         origin:        "Lisbon, Portugal".to_string(),
         window_start:  parse_date(start).unwrap(),
         window_end:    parse_date(end).unwrap(),
         stay_duration: stay,
         passengers:    2,
      }
   }

   #[test]
   fn rejects_window_shorter_than_stay() {
      let err = build_trip_query(&params("2025-06-01", "2025-06-10", 10), 3, today()).unwrap_err();
      assert_eq!(err, ValidationError::WindowTooShort { window_days: 9, stay: 10 });
   }

   #[test]
   fn rejects_inverted_window() {
      let err = validate(&params("2025-06-10", "2025-06-01", 1), today()).unwrap_err();
      assert!(matches!(err, ValidationError::WindowInverted { .. }));
   }

   #[test]
   fn rejects_zero_counts_and_blank_origin() {
      let mut p = params("2025-06-01", "2025-06-20", 7);
      p.passengers = 0;
      assert_eq!(validate(&p, today()), Err(ValidationError::ZeroPassengers));

      let mut p = params("2025-06-01", "2025-06-20", 7);
      p.stay_duration = 0;
      assert_eq!(validate(&p, today()), Err(ValidationError::ZeroStay));

      let mut p = params("2025-06-01", "2025-06-20", 7);
      p.origin = "   ".to_string();
      assert_eq!(validate(&p, today()), Err(ValidationError::EmptyOrigin));
   }

   #[test]
   fn accepts_window_exactly_equal_to_stay() {
      assert!(validate(&params("2025-06-01", "2025-06-08", 7), today()).is_ok());
   }

   #[test]
   fn rejects_window_opening_in_the_past() {
      let err = validate(&params("2019-01-01", "2025-06-20", 7), today()).unwrap_err();
      assert_eq!(err, ValidationError::WindowOutOfRange {
         start:    parse_date("2019-01-01").unwrap(),
         end:      parse_date("2025-06-20").unwrap(),
         earliest: today(),
         latest:   parse_date("2025-08-20").unwrap(),
      });
   }

   #[test]
   fn rejects_window_closing_beyond_three_months() {
      let err = validate(&params("2025-08-01", "2025-08-21", 7), today()).unwrap_err();
      assert!(matches!(err, ValidationError::WindowOutOfRange { .. }));
   }

   #[test]
   fn window_bounds_are_inclusive() {
      assert!(validate(&params("2025-05-20", "2025-08-20", 7), today()).is_ok());
      assert_eq!(
         latest_window_end(parse_date("2025-11-30").unwrap()),
         parse_date("2026-02-28").unwrap()
      );
   }

   #[test]
   fn builds_grounded_request() {
      let request = build_trip_query(&params("2025-06-01", "2025-06-20", 7), 3, today()).unwrap();

      assert!(request.grounded);
      assert!(request.prompt.contains("Origin: Lisbon, Portugal"));
      assert!(request.prompt.contains("2025-06-01 to 2025-06-20"));
      assert!(request.prompt.contains("exactly 7 days"));
      assert!(request.prompt.contains("Travelers: 2"));
      assert!(request.prompt.contains("exactly 3 objects"));
      assert!(request.prompt.contains(FLIGHT_LINK_TEMPLATE));
      assert!(request.prompt.contains(HOTEL_LINK_TEMPLATE));
      assert!(request.prompt.contains("single currency"));
   }

   #[test]
   fn trip_schema_requires_core_fields() {
      let schema = trip_schema();
      let required = schema["items"]["required"].as_array().unwrap();
      for field in ["destination", "country", "currency", "flight", "hotel", "localCosts"] {
         assert!(required.iter().any(|v| v == field), "missing {field}");
      }
      let hotel_required = schema["items"]["properties"]["hotel"]["required"]
         .as_array()
         .unwrap();
      assert!(!hotel_required.iter().any(|v| v == "rating"));
   }

   #[test]
   fn suggestion_request_is_not_grounded() {
      let request = build_suggestion_query("Par", 5);
      assert!(!request.grounded);
      assert!(request.prompt.contains("\"Par\""));
      assert!(request.prompt.contains("Identify 5"));
   }

   #[test]
   fn deep_links_carry_all_parameters() {
      let link = flight_link("Rome", "Lisbon", "2025-06-02", "2025-06-09");
      assert!(link.starts_with("https://www.google.com/travel/flights?q="));
      for part in ["Rome", "Lisbon", "2025-06-02", "2025-06-09"] {
         assert!(link.contains(part), "{link} missing {part}");
      }

      let link = hotel_link("Hotel B&B", "Rome", "2025-06-02", "2025-06-09");
      assert!(link.contains("Hotel+B%26B"));
   }
}
