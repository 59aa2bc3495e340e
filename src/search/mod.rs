pub mod ranking;

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::{
   aggregate::aggregate,
   client::SearchClient,
   config::{Config, PROPOSAL_COUNT},
   error::Result,
   normalize::{self, BatchIds},
   query,
   sources::extract_sources,
   types::{SearchOutcome, SearchParams},
};

/// The trip search pipeline: validate, query, normalize, reconcile, rank.
pub struct TripSearchEngine {
   client:        Arc<dyn SearchClient>,
   verify_window: bool,
   /// Pinned date the window is checked against; the local date when unset.
   today:         Option<NaiveDate>,
}

impl TripSearchEngine {
   pub fn new(client: Arc<dyn SearchClient>, config: &Config) -> Self {
      Self { client, verify_window: config.verify_window, today: None }
   }

   pub fn with_today(mut self, today: NaiveDate) -> Self {
      self.today = Some(today);
      self
   }

   /// Runs one search. Validation failures return before the provider is
   /// contacted; provider and payload failures yield no proposals at all.
   pub async fn search(&self, params: &SearchParams) -> Result<SearchOutcome> {
      let today = self.today.unwrap_or_else(|| Local::now().date_naive());
      let request = query::build_trip_query(params, PROPOSAL_COUNT, today)?;

      tracing::info!(
         origin = %params.origin,
         window_start = %params.window_start,
         window_end = %params.window_end,
         stay = params.stay_duration,
         passengers = params.passengers,
         "searching trip pairings"
      );

      let reply = self.client.search(&request).await?;
      let raw = normalize::normalize(&reply.raw)?;

      let ids = BatchIds::new();
      let proposals: Vec<_> = raw
         .into_iter()
         .enumerate()
         .map(|(i, raw)| aggregate(normalize::coerce(raw, ids.id(i), &params.origin)))
         .collect();

      if self.verify_window {
         normalize::verify_window(&proposals, params)?;
      }

      let sources = extract_sources(&reply.citations);
      let mut proposals = ranking::rank(proposals);
      proposals.truncate(PROPOSAL_COUNT);
      for proposal in &mut proposals {
         proposal.sources.clone_from(&sources);
      }

      tracing::info!(
         proposals = proposals.len(),
         sources = sources.len(),
         cheapest = proposals.first().map(|p| p.total_cost),
         "search complete"
      );

      Ok(SearchOutcome { proposals, sources })
   }
}
