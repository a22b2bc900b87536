// Scout signature feed client
//
// Lists systems currently connected to a hub (Thera by default).

use std::collections::HashSet;

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::Signature;
use crate::transport::TransportConfig;

/// Default public scout endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.eve-scout.com";

/// Raw HTTP client for the scout signature feed.
pub struct ScoutClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ScoutClient {
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Fetch every signature currently listed by the feed.
    pub async fn signatures(&self) -> Result<Vec<Signature>, Error> {
        let url = Url::parse(&format!(
            "{}/v2/public/signatures",
            self.base_url.as_str().trim_end_matches('/')
        ))?;
        debug!("GET {}", url);

        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Names of systems with a live connection out of `hub`, in feed
    /// order, without duplicates.
    pub async fn connections(&self, hub: &str) -> Result<Vec<String>, Error> {
        let signatures = self.signatures().await?;
        Ok(connected_systems(&signatures, hub))
    }
}

fn connected_systems(signatures: &[Signature], hub: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    signatures
        .iter()
        .filter(|sig| sig.out_system_name.eq_ignore_ascii_case(hub))
        .map(|sig| sig.in_system_name.to_uppercase())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
