//! Debounced origin-city completion.
//!
//! Every keystroke re-arms a debounce timer. When it fires with more than
//! `min_chars` characters and the panel open, exactly one suggestion request
//! is issued and tagged with a sequence number. A response is applied only if
//! its sequence number is still the one awaited; any later keystroke, selection
//! or dismissal clears the awaited number, so superseded responses are dropped
//! no matter when they arrive.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
   client::SearchClient,
   config::Config,
   normalize::parse_suggestions,
   query::build_suggestion_query,
   types::CitySuggestion,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutocompleteState {
   #[default]
   Idle,
   /// Debounce timer armed.
   Pending,
   /// Request issued, response not yet applied.
   InFlight,
   /// Suggestions (possibly none) are available.
   Settled,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
   pub state:       AutocompleteState,
   pub input:       String,
   pub panel_open:  bool,
   pub suggestions: Vec<CitySuggestion>,
}

#[derive(Debug, Clone, Copy)]
pub struct AutocompleteOptions {
   pub debounce:        Duration,
   pub min_chars:       usize,
   pub max_suggestions: usize,
}

impl AutocompleteOptions {
   pub const fn from_config(config: &Config) -> Self {
      Self {
         debounce:        config.debounce(),
         min_chars:       config.min_query_chars,
         max_suggestions: config.max_suggestions,
      }
   }
}

impl Default for AutocompleteOptions {
   fn default() -> Self {
      Self::from_config(&Config::default())
   }
}

#[derive(Default)]
struct Inner {
   input:       String,
   panel_open:  bool,
   state:       AutocompleteState,
   suggestions: Vec<CitySuggestion>,
   timer:       Option<JoinHandle<()>>,
   /// Bumped on every re-arm so a timer that already woke cannot fire late.
   timer_gen:   u64,
   last_seq:    u64,
   awaited:     Option<u64>,
}

impl Inner {
   fn snapshot(&self) -> Snapshot {
      Snapshot {
         state:       self.state,
         input:       self.input.clone(),
         panel_open:  self.panel_open,
         suggestions: self.suggestions.clone(),
      }
   }

   fn cancel_timer(&mut self) {
      self.timer_gen += 1;
      if let Some(timer) = self.timer.take() {
         timer.abort();
      }
   }
}

struct Shared {
   client:  Arc<dyn SearchClient>,
   options: AutocompleteOptions,
   inner:   Mutex<Inner>,
   updates: watch::Sender<Snapshot>,
}

/// Suggestion controller for one input field. Cheap to clone; clones share
/// state. Must be driven from inside a tokio runtime.
#[derive(Clone)]
pub struct AutocompleteController {
   shared: Arc<Shared>,
}

impl AutocompleteController {
   pub fn new(client: Arc<dyn SearchClient>, options: AutocompleteOptions) -> Self {
      let (updates, _) = watch::channel(Snapshot::default());
      Self {
         shared: Arc::new(Shared { client, options, inner: Mutex::new(Inner::default()), updates }),
      }
   }

   pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
      self.shared.updates.subscribe()
   }

   pub fn snapshot(&self) -> Snapshot {
      self.shared.inner.lock().snapshot()
   }

   /// Keystroke: records the new input and re-arms the debounce.
   pub fn input(&self, text: impl Into<String>) {
      let mut inner = self.shared.inner.lock();
      inner.input = text.into();
      inner.panel_open = true;
      self.shared.arm(&mut inner);
   }

   /// Focus: reopens the panel and re-arms the debounce for the current input.
   pub fn focus(&self) {
      let mut inner = self.shared.inner.lock();
      inner.panel_open = true;
      self.shared.arm(&mut inner);
   }

   /// Picks the suggestion at `index`, fills the input with it and closes the
   /// panel.
   pub fn select(&self, index: usize) -> Option<CitySuggestion> {
      let mut inner = self.shared.inner.lock();
      let picked = inner.suggestions.get(index).cloned()?;
      inner.input = picked.label();
      self.shared.close(&mut inner);
      Some(picked)
   }

   /// Interaction outside the input and panel.
   pub fn dismiss(&self) {
      let mut inner = self.shared.inner.lock();
      self.shared.close(&mut inner);
   }

   /// Waits until no timer or request is outstanding.
   pub async fn settled(&self) -> Snapshot {
      let mut rx = self.subscribe();
      let current = self.snapshot();
      if matches!(current.state, AutocompleteState::Idle | AutocompleteState::Settled) {
         return current;
      }
      rx.wait_for(|s| matches!(s.state, AutocompleteState::Idle | AutocompleteState::Settled))
         .await
         .map_or(current, |s| s.clone())
   }
}

impl Shared {
   fn publish(&self, inner: &Inner) {
      self.updates.send_replace(inner.snapshot());
   }

   fn arm(self: &Arc<Self>, inner: &mut Inner) {
      inner.cancel_timer();
      inner.awaited = None;
      inner.state = AutocompleteState::Pending;

      let generation = inner.timer_gen;
      let debounce = self.options.debounce;
      let shared = Arc::clone(self);
      inner.timer = Some(tokio::spawn(async move {
         tokio::time::sleep(debounce).await;
         shared.fire(generation);
      }));

      self.publish(inner);
   }

   fn close(&self, inner: &mut Inner) {
      inner.cancel_timer();
      inner.awaited = None;
      inner.panel_open = false;
      inner.suggestions.clear();
      inner.state = AutocompleteState::Idle;
      self.publish(inner);
   }

   fn fire(self: &Arc<Self>, generation: u64) {
      let mut inner = self.inner.lock();
      if inner.timer_gen != generation {
         return;
      }
      inner.timer = None;

      // raw field length, whitespace included
      let query = inner.input.clone();
      if !inner.panel_open || query.chars().count() <= self.options.min_chars {
         inner.awaited = None;
         inner.suggestions.clear();
         inner.state = AutocompleteState::Idle;
         self.publish(&inner);
         return;
      }

      inner.last_seq += 1;
      let seq = inner.last_seq;
      inner.awaited = Some(seq);
      inner.state = AutocompleteState::InFlight;
      self.publish(&inner);
      drop(inner);

      tracing::debug!(seq, query = %query, "requesting city suggestions");
      let shared = Arc::clone(self);
      tokio::spawn(async move {
         let suggestions = shared.fetch(&query).await;
         shared.apply(seq, suggestions);
      });
   }

   async fn fetch(&self, query: &str) -> Vec<CitySuggestion> {
      let max = self.options.max_suggestions;
      let request = build_suggestion_query(query, max);
      self
         .client
         .suggest(&request)
         .await
         .and_then(|raw| parse_suggestions(&raw, max))
         .unwrap_or_else(|e| {
            tracing::warn!("city suggestions unavailable for {query:?}: {e}");
            Vec::new()
         })
   }

   fn apply(&self, seq: u64, suggestions: Vec<CitySuggestion>) {
      let mut inner = self.inner.lock();
      if inner.awaited != Some(seq) {
         tracing::debug!(seq, awaited = ?inner.awaited, "discarding superseded suggestions");
         return;
      }

      inner.awaited = None;
      inner.suggestions = suggestions;
      inner.state = AutocompleteState::Settled;
      self.publish(&inner);
   }
}
