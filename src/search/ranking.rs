//! Result ordering for trip proposals.

use crate::types::TripProposal;

/// Orders proposals cheapest first.
///
/// The sort is stable: proposals with equal totals keep their input order.
/// Entries are moved, never modified.
pub fn rank(mut proposals: Vec<TripProposal>) -> Vec<TripProposal> {
   proposals.sort_by_key(|p| p.total_cost);
   proposals
}

#[cfg(test)]
mod tests {
   use serde_json::json;

   use super::*;

   fn trip(id: &str, total_cost: u64) -> TripProposal {
      serde_json::from_value(json!({
         "id": id,
         "destination": id,
         "country": "Nowhere",
         "currency": "$",
         "imageUrl": "",
         "summary": "",
         "flight": {
            "airline": "X",
            "price": 0.0,
            "departureDate": "2025-06-02",
            "returnDate": "2025-06-09",
            "bookingUrl": ""
         },
         "hotel": { "name": "H", "totalPrice": 0.0, "bookingUrl": "" },
         "localCosts": { "total": 0.0 },
         "itinerary": [],
         "totalCost": total_cost
      }))
      .unwrap()
   }

   fn ids(trips: &[TripProposal]) -> Vec<&str> {
      trips.iter().map(|t| t.id.as_str()).collect()
   }

   #[test]
   fn orders_cheapest_first() {
      let ranked = rank(vec![trip("a", 550), trip("b", 500), trip("c", 610)]);
      assert_eq!(ids(&ranked), ["b", "a", "c"]);
   }

   #[test]
   fn ties_keep_input_order() {
      let ranked = rank(vec![trip("a", 700), trip("b", 300), trip("c", 700), trip("d", 300)]);
      assert_eq!(ids(&ranked), ["b", "d", "a", "c"]);
   }

   #[test]
   fn output_is_non_decreasing() {
      let totals = [9, 3, 3, 12, 0, 7, 7, 1];
      let input: Vec<_> = totals
         .iter()
         .enumerate()
         .map(|(i, t)| trip(&i.to_string(), *t))
         .collect();
      let ranked = rank(input);
      assert!(ranked.windows(2).all(|w| w[0].total_cost <= w[1].total_cost));
      assert_eq!(ranked.len(), totals.len());
   }

   #[test]
   fn empty_and_single_inputs() {
      assert!(rank(Vec::new()).is_empty());
      assert_eq!(ids(&rank(vec![trip("only", 1)])), ["only"]);
   }
}
