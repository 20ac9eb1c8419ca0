//! Shared HTTP GET helper.

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{Endpoint, Error, FetchError, Lookup, Result, WorkbenchConfig};

/// Client for the Workbench REST API.
///
/// Cheap to clone; every lookup is an independent GET with no caching.
#[derive(Debug, Clone)]
pub struct WorkbenchClient {
    http: reqwest::Client,
    base_url: Url,
}

impl WorkbenchClient {
    /// Build a client from the given config.
    pub fn new(config: WorkbenchConfig) -> Result<Self> {
        let invalid = |reason: String| Error::BaseUrl {
            url: config.base_url.clone(),
            reason,
        };
        let base_url = Url::parse(&config.base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL".into()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// REST root this client talks to.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Full URL for a lookup. The study ID is percent-encoded as a single
    /// path segment, so it can never add a query or fragment.
    pub fn url_for(&self, endpoint: Endpoint, study_id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(endpoint.segments(study_id));
        }
        url
    }

    /// Run a catalogue lookup. Never fails; failures become [`Lookup::Failure`].
    pub async fn lookup(&self, endpoint: Endpoint, study_id: Option<&str>) -> Lookup {
        let url = self.url_for(endpoint, study_id);
        let lookup = Lookup::from(self.get(url.clone()).await);
        if let Lookup::Failure(e) = &lookup {
            warn!(tool = %endpoint, %url, error = %e, "lookup failed");
        }
        lookup
    }

    /// GET a URL and decode the body as JSON.
    pub async fn get(&self, url: Url) -> std::result::Result<Value, FetchError> {
        debug!(%url, "GET");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        debug!(%url, %status, "upstream responded");

        let response = response
            .error_for_status()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|_| FetchError::Decode)
    }
}
