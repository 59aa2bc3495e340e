use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use console::style;
use thrifttrip::{
   commands::{
      self,
      search::{SearchArgs, SearchOptions},
   },
   config::{self, Config},
   geo,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thrifttrip", version, about = "Find the cheapest city-and-dates pairing for your next trip")]
struct Cli {
   #[command(subcommand)]
   command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
   /// Search for the cheapest destination and dates
   Search {
      /// Departure city; detected from your IP when omitted
      #[arg(short, long)]
      origin: Option<String>,

      /// First possible departure date (YYYY-MM-DD)
      #[arg(long)]
      from: Option<NaiveDate>,

      /// Last possible return date (YYYY-MM-DD)
      #[arg(long)]
      to: Option<NaiveDate>,

      /// Nights at the destination
      #[arg(short, long, default_value_t = config::DEFAULT_STAY_DAYS)]
      stay: u32,

      #[arg(short, long, default_value_t = 1)]
      passengers: u32,

      /// Print proposals as JSON
      #[arg(long)]
      json: bool,

      /// Disable colours and decoration
      #[arg(long)]
      plain: bool,
   },

   /// Interactive origin-city autocomplete reading lines from stdin
   Suggest,

   /// Print the origin detected from your IP
   Locate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
   let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
   tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_writer(std::io::stderr)
      .with_target(false)
      .init();

   let cli = Cli::parse();
   let config = Config::load()?;

   let result = match cli.command {
      Cmd::Search { origin, from, to, stay, passengers, json, plain } => {
         let detected = origin.is_none().then(|| geo::spawn_detect(&config));
         let args = SearchArgs { origin, from, to, stay, passengers };
         commands::search::execute(&config, args, SearchOptions { json, plain }, detected).await
      },
      Cmd::Suggest => commands::suggest::execute(&config).await,
      Cmd::Locate => {
         commands::locate::execute(&config).await;
         Ok(())
      },
   };

   if let Err(e) = result {
      tracing::debug!("{e:?}");
      eprintln!("{} {}", style("error:").red().bold(), e.user_message());
      std::process::exit(1);
   }

   Ok(())
}
