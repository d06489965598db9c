use anyhow::{Result, anyhow};
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum SummaryError {
  #[error("summary request returned status {status}")]
  BadStatus { status: u16 },
  #[error("summary payload is missing {field}")]
  MalformedPayload { field: &'static str },
}

/// The part of a Wikipedia page summary the popup renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
  pub title: String,
  /// Canonical desktop page URL.
  pub page_url: String,
  pub extract: Option<String>,
}

/// Trait for summary document lookups, keyed by an opaque page title.
#[async_trait::async_trait]
pub trait SummaryProvider: Send + Sync {
  /// Human-readable name of the provider.
  fn name(&self) -> &str;

  async fn summary(&self, page_title: &str) -> Result<PageSummary>;
}

/// Wikipedia REST API summary endpoint.
pub struct WikipediaProvider {
  base_url: String,
  user_agent: String,
  client: surf::Client,
}

impl WikipediaProvider {
  #[must_use]
  pub fn new(config: &Config) -> Self {
    let client: surf::Client = surf::Config::new()
      .set_timeout(Some(config.fetch_timeout()))
      .try_into()
      .expect("client");
    Self {
      base_url: config.wiki_api_url().to_string(),
      user_agent: config.user_agent().to_string(),
      client,
    }
  }
}

#[async_trait::async_trait]
impl SummaryProvider for WikipediaProvider {
  fn name(&self) -> &'static str {
    "Wikipedia"
  }

  async fn summary(&self, page_title: &str) -> Result<PageSummary> {
    let url = format!("{}/{}", self.base_url, urlencoding::encode(page_title));
    log::debug!("fetching summary from {url}");

    let mut response = self
      .client
      .get(&url)
      .header("User-Agent", self.user_agent.as_str())
      .await
      .map_err(|e| anyhow!("summary request for '{page_title}' failed: {e}"))?;

    if response.status() != 200 {
      return Err(
        SummaryError::BadStatus {
          status: response.status().into(),
        }
        .into(),
      );
    }

    let value = response
      .body_json::<Value>()
      .await
      .map_err(|e| anyhow!("summary response for '{page_title}' is not JSON: {e}"))?;
    parse_summary(&value)
  }
}

/// Extracts the fields the popup needs from a summary document. The canonical
/// page URL is required; everything else degrades gracefully.
pub fn parse_summary(value: &Value) -> Result<PageSummary> {
  let page_url = value["content_urls"]["desktop"]["page"]
    .as_str()
    .ok_or(SummaryError::MalformedPayload {
      field: "content_urls.desktop.page",
    })?;
  let title = value["title"]
    .as_str()
    .ok_or(SummaryError::MalformedPayload { field: "title" })?;
  let extract = value["extract"].as_str().map(ToString::to_string);

  Ok(PageSummary {
    title: title.to_string(),
    page_url: page_url.to_string(),
    extract,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn parses_well_formed_summary() {
    let value = json!({
      "title": "Shedd Aquarium",
      "extract": "The Shedd Aquarium is an indoor public aquarium in Chicago.",
      "content_urls": {
        "desktop": { "page": "https://en.wikipedia.org/wiki/Shedd_Aquarium" },
        "mobile": { "page": "https://en.m.wikipedia.org/wiki/Shedd_Aquarium" }
      }
    });

    let summary = parse_summary(&value).unwrap();
    assert_eq!(summary.title, "Shedd Aquarium");
    assert_eq!(
      summary.page_url,
      "https://en.wikipedia.org/wiki/Shedd_Aquarium"
    );
    assert!(summary.extract.unwrap().contains("aquarium"));
  }

  #[test]
  fn missing_page_url_is_an_error() {
    let value = json!({ "title": "Pui Tak Center" });
    let err = parse_summary(&value).unwrap_err();
    assert!(err.to_string().contains("content_urls.desktop.page"));
  }

  #[test]
  fn non_object_payload_is_an_error() {
    assert!(parse_summary(&json!("gone")).is_err());
    assert!(parse_summary(&json!(null)).is_err());
  }

  #[test]
  fn extract_is_optional() {
    let value = json!({
      "title": "Hull House",
      "content_urls": { "desktop": { "page": "https://en.wikipedia.org/wiki/Hull_House" } }
    });
    let summary = parse_summary(&value).unwrap();
    assert_eq!(summary.extract, None);
  }
}
