//! Template catalog client.
//!
//! Thin HTTP wrapper for an imgflip-style `get_memes` endpoint. The catalog
//! lists background templates; pure parsing lives in `parse_catalog` for
//! testability.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use surface::caption::Background;

use crate::error::ErrorCode;

/// Public catalog endpoint used when no override is configured.
pub const DEFAULT_CATALOG_URL: &str = "https://api.imgflip.com";

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Network-level failure talking to the catalog.
    #[error("catalog request failed: {0}")]
    Request(String),

    /// The catalog answered with a non-200 status.
    #[error("catalog error: status {status}")]
    Response { status: u16, body: String },

    /// The catalog answered 200 but flagged the call as unsuccessful.
    #[error("catalog rejected the request")]
    Rejected,

    /// The response body was not the expected envelope.
    #[error("catalog parse failed: {0}")]
    Parse(String),

    /// The catalog answered successfully with zero templates.
    #[error("catalog returned no templates")]
    Empty,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for CatalogError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_CATALOG_REQUEST",
            Self::Response { .. } => "E_CATALOG_RESPONSE",
            Self::Rejected => "E_CATALOG_REJECTED",
            Self::Parse(_) => "E_CATALOG_PARSE",
            Self::Empty => "E_CATALOG_EMPTY",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// One background template as listed by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Caption slots the template is traditionally run with. Informational
    /// only; compositions may carry any number of captions.
    pub box_count: u32,
}

impl Template {
    /// Convert a catalog row into the surface's background record.
    #[must_use]
    pub fn to_background(&self) -> Background {
        Background {
            template_id: self.id.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Deserialize)]
struct CatalogEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<CatalogData>,
}

#[derive(Deserialize)]
struct CatalogData {
    memes: Vec<Template>,
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// Build a client against `base_url`. A trailing slash is tolerated.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: String) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CatalogError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// Fetch the full template catalog, in the order the catalog lists it.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-200 status, an envelope
    /// that flags failure, or an empty template list.
    pub async fn fetch_templates(&self) -> Result<Vec<Template>, CatalogError> {
        let url = format!("{}/get_memes", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        if status != 200 {
            return Err(CatalogError::Response { status, body: text });
        }

        parse_catalog(&text)
    }

    /// Fetch the raw bytes of a template image. The URL comes from the
    /// catalog listing and points at the catalog's image host.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-200 status.
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(CatalogError::Response { status, body: String::new() });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_catalog(json: &str) -> Result<Vec<Template>, CatalogError> {
    let envelope: CatalogEnvelope =
        serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;

    if !envelope.success {
        return Err(CatalogError::Rejected);
    }

    let templates = envelope.data.map(|d| d.memes).unwrap_or_default();
    if templates.is_empty() {
        return Err(CatalogError::Empty);
    }

    Ok(templates)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
