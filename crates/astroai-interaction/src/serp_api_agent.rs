//! Daily forecast snippets from Google results via SerpAPI.

use std::time::Duration;

use astroai_core::config::SerpApiSection;
use astroai_core::error::{AstroError, Result};
use astroai_core::forecast::ForecastSign;
use astroai_core::gateway::ForecastFetcher;
use astroai_core::language::Language;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::http_error::{map_http_error, map_transport_error, parse_retry_after};

const SERVICE: &str = "SerpAPI";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// [`ForecastFetcher`] that searches Google for today's horoscope.
#[derive(Clone)]
pub struct SerpApiFetcher {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl SerpApiFetcher {
    pub fn new(api_key: impl Into<String>, section: &SerpApiSection) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AstroError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: section.base_url.clone(),
        })
    }

    fn query_params(&self, sign: ForecastSign, language: Language) -> Vec<(&'static str, String)> {
        vec![
            ("api_key", self.api_key.clone()),
            ("q", build_query(sign, language)),
            ("engine", "google".to_string()),
            ("gl", region_for(language).to_string()),
            ("hl", language.code().to_string()),
        ]
    }
}

#[async_trait]
impl ForecastFetcher for SerpApiFetcher {
    async fn fetch(&self, sign: ForecastSign, language: Language) -> Result<Option<String>> {
        let params = self.query_params(sign, language);
        tracing::debug!(sign = sign.id(), lang = %language, "Searching daily forecast");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|err| map_transport_error(SERVICE, err))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read SerpAPI error body".to_string());
            return Err(map_http_error(SERVICE, status, body, retry_after));
        }

        let payload: Value = response.json().await.map_err(|err| {
            AstroError::upstream(None, format!("Failed to parse SerpAPI response: {err}"), false)
        })?;

        let snippet = extract_snippet(&payload);
        if snippet.is_none() {
            tracing::warn!(sign = sign.id(), lang = %language, "SerpAPI returned no usable snippet");
        }
        Ok(snippet)
    }
}

impl std::fmt::Debug for SerpApiFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiFetcher")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Search phrase for a sign, in Devanagari for Hindi and Nepali.
pub fn build_query(sign: ForecastSign, language: Language) -> String {
    let western = sign.western();
    match language {
        Language::Hi => format!("{} आज का राशिफल", western.devanagari_name()),
        Language::Ne => format!("{} आजको राशिफल", western.devanagari_name()),
        _ => format!("{} horoscope today", western.name()),
    }
}

fn region_for(language: Language) -> &'static str {
    if language.uses_devanagari() { "in" } else { "us" }
}

/// Picks the most direct answer from a SerpAPI result page.
pub fn extract_snippet(root: &Value) -> Option<String> {
    let candidates = [
        root.pointer("/answer_box/answer"),
        root.pointer("/answer_box/snippet"),
        root.pointer("/knowledge_graph/description"),
        root.pointer("/organic_results/0/snippet"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}
