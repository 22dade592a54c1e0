//! Threat-intelligence lookups against a VirusTotal-compatible API.
//!
//! The client classifies a raw query as an IP, domain or file hash, fetches
//! the matching collection upstream and condenses the per-engine verdicts
//! into a small summary the frontend can render directly.

use crate::config::IntelConfig;
use crate::error::ApiError;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{Request, StatusCode, header};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use utoipa::ToSchema;

/// What kind of indicator a raw query string looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    IpAddress,
    Domain,
    FileHash,
}

impl TargetKind {
    /// Wire label, mirrored into the response body.
    pub fn label(self) -> &'static str {
        match self {
            TargetKind::IpAddress => "ip_address",
            TargetKind::Domain => "domain",
            TargetKind::FileHash => "file",
        }
    }

    /// Path segment of the upstream collection.
    fn path_segment(self) -> &'static str {
        match self {
            TargetKind::IpAddress => "ip_addresses",
            TargetKind::Domain => "domains",
            TargetKind::FileHash => "files",
        }
    }
}

/// Classify a query as an IPv4 address, a domain or a file hash, in that
/// order of precedence.
pub fn classify(query: &str) -> Option<TargetKind> {
    if looks_like_ipv4(query) {
        Some(TargetKind::IpAddress)
    } else if looks_like_domain(query) {
        Some(TargetKind::Domain)
    } else if looks_like_hash(query) {
        Some(TargetKind::FileHash)
    } else {
        None
    }
}

// Four dot-separated groups of 1-3 digits. Octet range is not validated.
fn looks_like_ipv4(s: &str) -> bool {
    let mut octets = 0;
    for part in s.split('.') {
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        octets += 1;
    }
    octets == 4
}

fn looks_like_domain(s: &str) -> bool {
    let Some((prefix, tld)) = s.rsplit_once('.') else {
        return false;
    };
    !prefix.is_empty()
        && prefix
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
        && tld.len() >= 2
        && tld.bytes().all(|b| b.is_ascii_alphabetic())
}

// MD5, SHA-1 or SHA-256 hex digest.
fn looks_like_hash(s: &str) -> bool {
    matches!(s.len(), 32 | 40 | 64) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Per-engine verdict kept in the summary; only engines that flagged the
/// indicator as malicious are included.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EngineDetection {
    pub category: String,
    pub result: Option<String>,
    pub method: Option<String>,
}

/// Condensed scan verdict.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScanSummary {
    pub query: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub total_engines: usize,
    pub detected_by: usize,
    pub detections: BTreeMap<String, EngineDetection>,
    pub last_analysis_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VtResponse {
    data: VtData,
}

#[derive(Debug, Deserialize)]
struct VtData {
    attributes: VtAttributes,
}

#[derive(Debug, Deserialize)]
struct VtAttributes {
    #[serde(default)]
    last_analysis_results: BTreeMap<String, EngineDetection>,
    last_analysis_date: Option<i64>,
}

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, Empty<Bytes>>;

/// Client for a VirusTotal-compatible lookup API.
pub struct IntelClient {
    http: HttpsClient,
    api_base: String,
    api_key: String,
}

// Manual Debug: the api key must not end up in logs.
impl fmt::Debug for IntelClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntelClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl IntelClient {
    pub fn new(config: &IntelConfig) -> IntelClient {
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let http = Client::builder(TokioExecutor::new()).build(https);
        IntelClient {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Look up an indicator upstream and condense the malicious verdicts.
    #[tracing::instrument(skip(self))]
    pub async fn scan(&self, query: &str) -> Result<ScanSummary, ApiError> {
        let kind = classify(query).ok_or_else(|| {
            ApiError::Validation(
                "Invalid query format. Please provide a valid IP, domain, or file hash.".into(),
            )
        })?;

        let url = format!("{}/{}/{}", self.api_base, kind.path_segment(), query);
        let request = Request::get(url.as_str())
            .header("x-apikey", self.api_key.as_str())
            .header(header::ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| ApiError::Internal(format!("failed to build intel request: {e}")))?;

        let response = self
            .http
            .request(request)
            .await
            .map_err(|e| ApiError::Internal(format!("intel lookup failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(
                "Indicator not found in the intelligence database.".into(),
            ));
        }
        if !status.is_success() {
            return Err(ApiError::Internal(format!(
                "intel lookup returned HTTP {status}"
            )));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ApiError::Internal(format!("failed to read intel response: {e}")))?
            .to_bytes();
        let parsed: VtResponse = serde_json::from_slice(&body)
            .map_err(|e| ApiError::Internal(format!("unexpected intel response body: {e}")))?;

        Ok(summarize(query, kind, parsed.data.attributes))
    }
}

fn summarize(query: &str, kind: TargetKind, attrs: VtAttributes) -> ScanSummary {
    let total_engines = attrs.last_analysis_results.len();
    let detections: BTreeMap<String, EngineDetection> = attrs
        .last_analysis_results
        .into_iter()
        .filter(|(_, verdict)| verdict.category == "malicious")
        .collect();
    let last_analysis_date = attrs.last_analysis_date.and_then(|ts| {
        OffsetDateTime::from_unix_timestamp(ts)
            .ok()
            .and_then(|t| t.format(&Rfc3339).ok())
    });
    ScanSummary {
        query: query.to_string(),
        kind: kind.label(),
        total_engines,
        detected_by: detections.len(),
        detections,
        last_analysis_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_ipv4_first() {
        assert_eq!(classify("8.8.8.8"), Some(TargetKind::IpAddress));
        // Octet range is deliberately not validated.
        assert_eq!(classify("999.1.1.1"), Some(TargetKind::IpAddress));
    }

    #[test]
    fn classifies_domains_before_hashes() {
        assert_eq!(classify("example.com"), Some(TargetKind::Domain));
        assert_eq!(classify("sub.domain.co.uk"), Some(TargetKind::Domain));
        assert_eq!(classify("deadbeef.com"), Some(TargetKind::Domain));
    }

    #[test]
    fn classifies_hashes_by_length() {
        assert_eq!(classify(&"a".repeat(32)), Some(TargetKind::FileHash));
        assert_eq!(classify(&"0".repeat(40)), Some(TargetKind::FileHash));
        assert_eq!(classify(&"F".repeat(64)), Some(TargetKind::FileHash));
        assert_eq!(classify(&"a".repeat(63)), None);
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("not a query"), None);
        assert_eq!(classify("1.2.3"), None);
        assert_eq!(classify("host.123"), None);
    }

    #[test]
    fn labels_match_the_wire_format() {
        assert_eq!(TargetKind::IpAddress.label(), "ip_address");
        assert_eq!(TargetKind::Domain.label(), "domain");
        assert_eq!(TargetKind::FileHash.label(), "file");
    }
}
