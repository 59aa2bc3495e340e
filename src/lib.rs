//! Budget trip discovery: one grounded model query per search, turned into
//! ranked, fully-costed trip proposals, plus a debounced origin-city
//! autocomplete.

pub mod aggregate;
pub mod autocomplete;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod geo;
pub mod normalize;
pub mod query;
pub mod search;
pub mod sources;
pub mod types;

pub use error::{Error, Result};
