use console::style;

use crate::{config::Config, geo};

pub async fn execute(config: &Config) {
   let handle = geo::spawn_detect(config);
   match geo::take_detected(handle, config.geolocation_timeout()).await {
      Some(origin) => println!("{origin}"),
      None => println!("{}", style("Could not detect your location; pass --origin instead").dim()),
   }
}
