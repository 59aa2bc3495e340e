use crate::types::{RawCitation, Source};

pub const DEFAULT_SOURCE_TITLE: &str = "Deal Source";

/// Converts grounding citations into displayable sources.
///
/// Citations without a usable uri are dropped. Order is kept and duplicates
/// are not collapsed.
pub fn extract_sources(citations: &[RawCitation]) -> Vec<Source> {
   citations
      .iter()
      .filter_map(|c| {
         let uri = c.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
         let title = c
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_SOURCE_TITLE);
         Some(Source { title: title.to_string(), uri: uri.to_string() })
      })
      .collect()
}
