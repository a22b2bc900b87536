// Killboard HTTP client
//
// Wraps `reqwest::Client` with killboard URL construction and payload
// decoding. Only the most recent record of each response is surfaced.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::KillSummary;
use crate::transport::TransportConfig;

/// Default public killboard endpoint.
pub const DEFAULT_BASE_URL: &str = "https://zkillboard.com";

/// Raw HTTP client for the killboard's per-system kill list.
pub struct KillboardClient {
    http: reqwest::Client,
    base_url: Url,
}

impl KillboardClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The killboard base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/api/solarSystemID/{id}/limit/{limit}/`.
    pub(crate) fn kills_url(&self, system_id: u64, limit: u32) -> Result<Url, Error> {
        let full = format!(
            "{}/api/solarSystemID/{system_id}/limit/{limit}/",
            self.base_url.as_str().trim_end_matches('/'),
        );
        Ok(Url::parse(&full)?)
    }

    /// Fetch the most recent kill in a solar system.
    ///
    /// `limit` widens the window the killboard returns; callers grow it
    /// across cycles so an unchanged URL does not keep hitting a cached
    /// "nothing new" response. Returns `Ok(None)` for an empty list.
    pub async fn latest_kill(
        &self,
        system_id: u64,
        limit: u32,
    ) -> Result<Option<KillSummary>, Error> {
        let url = self.kills_url(system_id, limit)?;
        let kills: Vec<KillSummary> = self.get_json(url).await?;
        Ok(kills.into_iter().next())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
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
}
