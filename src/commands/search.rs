use std::{sync::Arc, time::Duration};

use chrono::{Local, NaiveDate, TimeDelta};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinHandle;

use crate::{
   Result,
   client::{GeminiClient, SearchClient},
   config::{self, Config},
   error::ValidationError,
   geo,
   search::TripSearchEngine,
   types::{SearchOutcome, SearchParams, TripProposal},
};

#[derive(Debug, Clone)]
pub struct SearchArgs {
   pub origin:     Option<String>,
   pub from:       Option<NaiveDate>,
   pub to:         Option<NaiveDate>,
   pub stay:       u32,
   pub passengers: u32,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct SearchOptions {
   pub json:  bool,
   pub plain: bool,
}

pub async fn execute(
   config: &Config,
   args: SearchArgs,
   options: SearchOptions,
   detected: Option<JoinHandle<Option<String>>>,
) -> Result<()> {
   let origin = match (args.origin, detected) {
      (Some(origin), _) => origin,
      (None, Some(handle)) => geo::take_detected(handle, config.geolocation_timeout())
         .await
         .ok_or(ValidationError::EmptyOrigin)?,
      (None, None) => return Err(ValidationError::EmptyOrigin.into()),
   };

   let params = resolve_params(origin, args.from, args.to, args.stay, args.passengers, today());
   let client: Arc<dyn SearchClient> = Arc::new(GeminiClient::from_config(config)?);
   let engine = TripSearchEngine::new(client, config);

   let spinner = (!options.json).then(|| {
      let spinner = ProgressBar::new_spinner();
      spinner.set_style(
         ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
      );
      spinner.enable_steady_tick(Duration::from_millis(100));
      spinner.set_message(format!(
         "Scanning pairings from {} for {} nights...",
         params.origin, params.stay_duration
      ));
      spinner
   });

   let result = engine.search(&params).await;
   if let Some(spinner) = spinner {
      spinner.finish_and_clear();
   }
   let outcome = result?;

   if options.json {
      println!("{}", serde_json::to_string_pretty(&outcome)?);
   } else if outcome.proposals.is_empty() {
      println!("No pairings found from {}", params.origin);
      println!("\nTip: widen the date window or pick a more common origin city");
   } else {
      format_results(&outcome, &params, options.plain);
   }

   Ok(())
}

fn today() -> NaiveDate {
   Local::now().date_naive()
}

/// Fills omitted dates: the window opens two weeks out and spans three weeks.
pub fn resolve_params(
   origin: String,
   from: Option<NaiveDate>,
   to: Option<NaiveDate>,
   stay: u32,
   passengers: u32,
   today: NaiveDate,
) -> SearchParams {
   let window_start =
      from.unwrap_or_else(|| today + TimeDelta::days(config::DEFAULT_WINDOW_LEAD_DAYS));
   let window_end =
      to.unwrap_or_else(|| window_start + TimeDelta::days(config::DEFAULT_WINDOW_SPAN_DAYS));

   SearchParams { origin, window_start, window_end, stay_duration: stay, passengers }
}

fn money(currency: &str, amount: f64) -> String {
   format!("{currency}{}", amount.round())
}

fn format_results(outcome: &SearchOutcome, params: &SearchParams, plain: bool) {
   let count = outcome.proposals.len();
   let context = format!("{} • {} Days Stay", params.origin, params.stay_duration);

   if plain {
      println!("\nBest pairs found ({count})");
      println!("{context}\n");
   } else {
      println!("\n{}", style(format!("Best pairs found ({count})")).bold());
      println!("{}\n", style(context).dim());
   }

   for (i, trip) in outcome.proposals.iter().enumerate() {
      format_trip(i, trip, plain);
      println!();
   }

   if !outcome.sources.is_empty() {
      if plain {
         println!("Sources:");
      } else {
         println!("{}", style("Sources:").bold());
      }
      for source in &outcome.sources {
         println!("  - {} <{}>", source.title, source.uri);
      }
   }
}

fn format_trip(i: usize, trip: &TripProposal, plain: bool) {
   let total = format!("{}{}", trip.currency, trip.total_cost);
   let flight = &trip.flight;
   let hotel = &trip.hotel;

   if plain {
      print!("{}) {}, {} - {total}", i + 1, trip.destination, trip.country);
      if i == 0 {
         print!(" [Best value]");
      }
      println!();
   } else {
      print!("{}", style(format!("{}) ", i + 1)).bold().cyan());
      print!("{} {}", style(format!("{}, {}", trip.destination, trip.country)).green(), style(total).bold());
      if i == 0 {
         print!(" {}", style("[Best value]").yellow());
      }
      println!();
   }

   if !trip.summary.is_empty() {
      println!("   {}", trip.summary);
   }
   println!(
      "   flight  {} {} ({} -> {})",
      flight.airline,
      money(&trip.currency, flight.price),
      flight.departure_date,
      flight.return_date
   );
   let rating = hotel.rating.map(|r| format!(" ★{r:.1}")).unwrap_or_default();
   println!("   hotel   {}{rating} {}", hotel.name, money(&trip.currency, hotel.total_price));
   println!("   local   {}", money(&trip.currency, trip.local_costs.total));
   println!("   book    {}", flight.booking_url);
   println!("           {}", hotel.booking_url);

   for day in &trip.itinerary {
      if plain {
         println!("   day {:>2}  {}: {}", day.day, day.activity, day.description);
      } else {
         println!(
            "   {} {}: {}",
            style(format!("day {:>2}", day.day)).dim(),
            day.activity,
            style(&day.description).dim()
         );
      }
   }
}
