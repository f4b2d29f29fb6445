//! Label resolvers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{fallback_label, Coordinates, LabelResolver, LocationError, Result};

/// Reverse geocoding against a postcodes.io compatible service.
///
/// Asks for postcodes near the coordinates and takes the closest one.
#[derive(Debug, Clone)]
pub struct PostcodesIoResolver {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: u16,
    #[serde(default)]
    result: Option<Vec<PostcodeHit>>,
}

#[derive(Debug, Deserialize)]
struct PostcodeHit {
    postcode: String,
}

impl PostcodesIoResolver {
    /// Create a resolver for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/postcodes", self.base_url.trim_end_matches('/'))
    }
}

/// Pick the closest postcode out of a lookup response.
fn closest_postcode(response: LookupResponse, coords: Coordinates) -> Result<String> {
    if response.status != 200 {
        return Err(LocationError::Lookup(format!(
            "service answered with status {}",
            response.status
        )));
    }
    response
        .result
        .and_then(|hits| hits.into_iter().next())
        .map(|hit| hit.postcode)
        .ok_or(LocationError::NoResult(coords))
}

#[async_trait]
impl LabelResolver for PostcodesIoResolver {
    fn name(&self) -> &'static str {
        "postcodes.io"
    }

    async fn resolve(&self, coords: Coordinates) -> Result<String> {
        let url = self.endpoint();
        debug!(%url, %coords, "Looking up postcode");

        let response = self
            .client
            .get(&url)
            .query(&[("lon", coords.longitude()), ("lat", coords.latitude())])
            .send()
            .await
            .map_err(|e| LocationError::Lookup(e.to_string()))?;

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Lookup(e.to_string()))?;

        closest_postcode(body, coords)
    }
}

/// Labels every position with its coordinates, never touching the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateLabels;

#[async_trait]
impl LabelResolver for CoordinateLabels {
    fn name(&self) -> &'static str {
        "coordinates"
    }

    async fn resolve(&self, coords: Coordinates) -> Result<String> {
        Ok(fallback_label(coords))
    }
}
