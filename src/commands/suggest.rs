use std::sync::Arc;

use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
   Result,
   autocomplete::{AutocompleteController, AutocompleteOptions, AutocompleteState, Snapshot},
   client::{GeminiClient, SearchClient},
   config::Config,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
   Input(String),
   Pick(usize),
   Dismiss,
   Quit,
}

/// `:pick N` selects (1-based), `:dismiss` closes the panel, `:quit` exits.
/// Anything else is the new content of the input field.
fn parse_line(line: &str) -> Line {
   let trimmed = line.trim();
   match trimmed.split_once(' ').unwrap_or((trimmed, "")) {
      (":pick", n) => n
         .trim()
         .parse::<usize>()
         .ok()
         .filter(|n| *n > 0)
         .map_or_else(|| Line::Input(line.to_string()), |n| Line::Pick(n - 1)),
      (":dismiss", "") => Line::Dismiss,
      (":quit" | ":q", "") => Line::Quit,
      _ => Line::Input(line.to_string()),
   }
}

pub async fn execute(config: &Config) -> Result<()> {
   let client: Arc<dyn SearchClient> = Arc::new(GeminiClient::from_config(config)?);
   let controller = AutocompleteController::new(client, AutocompleteOptions::from_config(config));

   let mut updates = controller.subscribe();
   let printer = tokio::spawn(async move {
      while updates.changed().await.is_ok() {
         let snapshot = updates.borrow_and_update().clone();
         if snapshot.state == AutocompleteState::Settled {
            print_suggestions(&snapshot);
         }
      }
   });

   println!(
      "{}",
      style("Type an origin; each line is the field's new content. :pick N, :dismiss, :quit").dim()
   );

   let mut lines = BufReader::new(tokio::io::stdin()).lines();
   while let Some(line) = lines.next_line().await? {
      match parse_line(&line) {
         Line::Input(text) => controller.input(text),
         Line::Pick(index) => match controller.select(index) {
            Some(picked) => println!("{} {}", style("origin:").green(), picked.label()),
            None => println!("{}", style("no such suggestion").red()),
         },
         Line::Dismiss => controller.dismiss(),
         Line::Quit => break,
      }
   }

   controller.settled().await;
   printer.abort();
   Ok(())
}

fn print_suggestions(snapshot: &Snapshot) {
   if snapshot.suggestions.is_empty() {
      println!("{}", style(format!("no suggestions for {:?}", snapshot.input)).dim());
      return;
   }
   for (i, s) in snapshot.suggestions.iter().enumerate() {
      println!("  {} {}, {}", style(format!("{}.", i + 1)).cyan(), s.city, style(&s.country).dim());
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn parses_commands() {
      assert_eq!(parse_line(":pick 2"), Line::Pick(1));
      assert_eq!(parse_line(":dismiss"), Line::Dismiss);
      assert_eq!(parse_line(" :q "), Line::Quit);
   }

   #[test]
   fn everything_else_is_input() {
      assert_eq!(parse_line("Par"), Line::Input("Par".into()));
      assert_eq!(parse_line(":pick 0"), Line::Input(":pick 0".into()));
      assert_eq!(parse_line(":pick x"), Line::Input(":pick x".into()));
      assert_eq!(parse_line(""), Line::Input(String::new()));
   }
}
