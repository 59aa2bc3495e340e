//! AI search provider seam
//!
//! The pipeline only talks to [`SearchClient`]; the concrete provider is
//! constructed once at startup and injected.

pub mod gemini;

use std::sync::Arc;

pub use gemini::GeminiClient;

use crate::{error::Result, query::StructuredRequest, types::SearchReply};

#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
   /// Runs a structured trip search, returning the raw JSON text plus any
   /// grounding citations.
   async fn search(&self, request: &StructuredRequest) -> Result<SearchReply>;
   /// Runs a city completion request, returning the raw JSON text.
   async fn suggest(&self, request: &StructuredRequest) -> Result<String>;
}

#[async_trait::async_trait]
impl<T: SearchClient + ?Sized> SearchClient for Arc<T> {
   async fn search(&self, request: &StructuredRequest) -> Result<SearchReply> {
      (**self).search(request).await
   }

   async fn suggest(&self, request: &StructuredRequest) -> Result<String> {
      (**self).suggest(request).await
   }
}
