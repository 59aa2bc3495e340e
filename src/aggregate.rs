//! Authoritative trip totals.

use crate::types::TripProposal;

/// `round(flight + hotel + local)`, ties rounded away from zero.
pub fn total_cost(flight: f64, hotel: f64, local: f64) -> u64 {
   let sum = flight + hotel + local;
   if sum.is_finite() && sum > 0.0 {
      sum.round() as u64
   } else {
      0
   }
}

/// Replaces the proposal's total with one recomputed from its components.
pub fn aggregate(mut proposal: TripProposal) -> TripProposal {
   proposal.total_cost = total_cost(
      proposal.flight.price,
      proposal.hotel.total_price,
      proposal.local_costs.total,
   );
   proposal
}
