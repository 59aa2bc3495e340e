use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
   client::SearchClient,
   config::{self, Config},
   error::{Error, Result},
   query::StructuredRequest,
   types::{RawCitation, SearchReply},
};

const MAX_ERROR_BODY: usize = 512;

/// Gemini `generateContent` over REST.
pub struct GeminiClient {
   http:          reqwest::Client,
   api_key:       String,
   base_url:      String,
   model:         String,
   suggest_model: String,
}

impl GeminiClient {
   pub fn from_config(config: &Config) -> Result<Self> {
      let api_key = config
         .api_key
         .clone()
         .filter(|k| !k.is_empty())
         .ok_or(Error::MissingApiKey)?;

      // No overall timeout: a trip search runs to completion or failure.
      let http = reqwest::Client::builder()
         .connect_timeout(config.connect_timeout())
         .build()?;

      Ok(Self {
         http,
         api_key,
         base_url: config.base_url.trim_end_matches('/').to_string(),
         model: config.model.clone(),
         suggest_model: config.suggest_model.clone(),
      })
   }

   async fn generate(
      &self,
      op: &'static str,
      model: &str,
      request: &StructuredRequest,
   ) -> Result<GenerateResponse> {
      if config::debug_requests() {
         tracing::info!("{op} prompt for {model}:\n{}", request.prompt);
      }

      let url = format!("{}/models/{model}:generateContent", self.base_url);
      let response = self
         .http
         .post(url)
         .header("x-goog-api-key", &self.api_key)
         .json(&GenerateRequest::new(request))
         .send()
         .await?;

      let status = response.status();
      if !status.is_success() {
         let body: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(MAX_ERROR_BODY)
            .collect();
         return Err(Error::Service { op, reason: format!("{status}: {body}") });
      }

      let body = response.text().await?;
      tracing::debug!("{op} response: {} bytes", body.len());
      serde_json::from_str(&body).map_err(|e| Error::data_format("provider response", e))
   }
}

#[async_trait::async_trait]
impl SearchClient for GeminiClient {
   async fn search(&self, request: &StructuredRequest) -> Result<SearchReply> {
      self
         .generate("search", &self.model, request)
         .await?
         .into_reply()
   }

   async fn suggest(&self, request: &StructuredRequest) -> Result<String> {
      self
         .generate("suggest", &self.suggest_model, request)
         .await?
         .into_reply()
         .map(|reply| reply.raw)
   }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
   contents:          [Content<'a>; 1],
   #[serde(skip_serializing_if = "Vec::is_empty")]
   tools:             Vec<Tool>,
   generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
   role:  &'static str,
   parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
   text: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
   google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
   response_mime_type: &'static str,
   response_schema:    &'a Value,
}

impl<'a> GenerateRequest<'a> {
   fn new(request: &'a StructuredRequest) -> Self {
      let tools = if request.grounded {
         vec![Tool { google_search: GoogleSearch {} }]
      } else {
         Vec::new()
      };

      Self {
         contents: [Content { role: "user", parts: [Part { text: &request.prompt }] }],
         tools,
         generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema:    &request.schema,
         },
      }
   }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
   #[serde(default)]
   candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
   content:            Option<CandidateContent>,
   grounding_metadata: Option<GroundingMetadata>,
   finish_reason:      Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
   #[serde(default)]
   parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
   text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
   #[serde(default)]
   grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
   web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
   title: Option<String>,
   uri:   Option<String>,
}

impl GenerateResponse {
   fn into_reply(self) -> Result<SearchReply> {
      let Some(candidate) = self.candidates.into_iter().next() else {
         return Err(Error::data_format("provider response", "no candidates"));
      };

      let raw: String = candidate
         .content
         .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
         .unwrap_or_default();

      if raw.trim().is_empty() {
         let reason = candidate
            .finish_reason
            .map_or_else(|| "empty candidate".to_string(), |r| format!("empty candidate ({r})"));
         return Err(Error::data_format("provider response", reason));
      }

      let citations = candidate
         .grounding_metadata
         .map(|meta| {
            meta
               .grounding_chunks
               .into_iter()
               .map(|chunk| match chunk.web {
                  Some(web) => RawCitation { title: web.title, uri: web.uri },
                  None => RawCitation::default(),
               })
               .collect()
         })
         .unwrap_or_default();

      Ok(SearchReply { raw, citations })
   }
}
