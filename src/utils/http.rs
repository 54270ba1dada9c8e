//! HTTP fetching utilities.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::api::ElsevierError;
use crate::config::Credentials;

const API_KEY_HEADER: &str = "X-ELS-APIKey";
const INST_TOKEN_HEADER: &str = "X-ELS-Insttoken";

/// Decoded response of a single GET request
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// Parsed JSON body
    Json(Value),
    /// Raw image or PDF payload
    Binary { content_type: String, bytes: Vec<u8> },
}

impl FetchResult {
    pub fn into_json(self) -> Result<Value, ElsevierError> {
        match self {
            FetchResult::Json(value) => Ok(value),
            FetchResult::Binary { content_type, .. } => Err(ElsevierError::UnexpectedContentType(
                format!("expected JSON, got {}", content_type),
            )),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, ElsevierError> {
        match self {
            FetchResult::Binary { bytes, .. } => Ok(bytes),
            FetchResult::Json(_) => Err(ElsevierError::UnexpectedContentType(
                "expected a binary object, got JSON".to_string(),
            )),
        }
    }
}

/// How a response body should be handled, by declared content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    Binary,
    Json,
    Xml,
    Other,
}

/// Classify a `Content-Type` header value. Binary wins over JSON.
pub fn classify_content_type(content_type: &str) -> ContentClass {
    let content_type = content_type.to_lowercase();
    if content_type.contains("image") || content_type.contains("pdf") {
        ContentClass::Binary
    } else if content_type.contains("json") {
        ContentClass::Json
    } else if content_type.contains("xml") {
        ContentClass::Xml
    } else {
        ContentClass::Other
    }
}

/// Build request headers: API key, institutional token (omitted when empty) and `Accept`
pub fn build_headers(credentials: &Credentials, accept: &str) -> Result<HeaderMap, ElsevierError> {
    let mut headers = HeaderMap::new();

    if let Some(key) = credentials.api_key.as_deref() {
        headers.insert(
            HeaderName::from_static("x-els-apikey"),
            header_value(API_KEY_HEADER, key)?,
        );
    }

    if !credentials.inst_token.is_empty() {
        headers.insert(
            HeaderName::from_static("x-els-insttoken"),
            header_value(INST_TOKEN_HEADER, &credentials.inst_token)?,
        );
    }

    headers.insert(ACCEPT, header_value("Accept", accept)?);
    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ElsevierError> {
    HeaderValue::from_str(value)
        .map_err(|_| ElsevierError::Config(format!("{} is not a valid header value", name)))
}

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, ElsevierError> {
        Self::with_timeout(30)
    }

    /// Create a new HTTP client with a custom request timeout
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ElsevierError> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ElsevierError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Issue one GET request and decode it by content type.
    ///
    /// Images and PDFs come back as [`FetchResult::Binary`], JSON bodies as
    /// [`FetchResult::Json`]. XML fails with [`ElsevierError::InvalidFormat`]
    /// and any other type with [`ElsevierError::UnexpectedContentType`].
    /// Status codes are not interpreted: provider error bodies are JSON and
    /// flow through to the caller.
    pub async fn fetch(
        &self,
        url: &str,
        headers: HeaderMap,
        params: Option<&[(&str, String)]>,
    ) -> Result<FetchResult, ElsevierError> {
        let mut request = self.client.get(url).headers(headers);
        if let Some(params) = params {
            request = request.query(params);
        }

        tracing::debug!("GET {}", url);
        let response = request
            .send()
            .await
            .map_err(|e| ElsevierError::Network(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        tracing::debug!("{} -> {} ({})", url, status, content_type);

        match classify_content_type(&content_type) {
            ContentClass::Binary => {
                let bytes = response.bytes().await?;
                Ok(FetchResult::Binary {
                    content_type,
                    bytes: bytes.to_vec(),
                })
            }
            ContentClass::Json => {
                let value = response.json::<Value>().await.map_err(|e| {
                    ElsevierError::Parse(format!("Invalid JSON from {}: {}", url, e))
                })?;
                Ok(FetchResult::Json(value))
            }
            ContentClass::Xml => Err(ElsevierError::InvalidFormat(
                "Output is in XML. Specify 'application/json' in headers.".to_string(),
            )),
            ContentClass::Other => Err(ElsevierError::UnexpectedContentType(format!(
                "'{}' from {}",
                content_type, url
            ))),
        }
    }
}
