//! Radar image retrieval.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use radar_common::{RadarError, RadarResult, TimeBucket};
use reqwest::Client;
use tracing::{debug, info, instrument};

/// Anything that can produce the raw radar image for a time bucket.
#[async_trait]
pub trait RasterSource: Send + Sync {
    /// Download the image for `bucket`.
    ///
    /// Transport failures, timeouts and non-success responses are all errors;
    /// the caller keeps its previous state and tries again next tick.
    async fn fetch(&self, bucket: &TimeBucket) -> RadarResult<Bytes>;
}

/// Fetches images over HTTP from a URL template.
pub struct HttpRasterSource {
    client: Client,
    url_template: String,
}

impl HttpRasterSource {
    /// Create a source with a whole-request timeout.
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> RadarResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| RadarError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }

    /// The URL requested for `bucket`.
    pub fn url_for(&self, bucket: &TimeBucket) -> String {
        self.url_template.replace("{timestamp}", &bucket.key())
    }
}

#[async_trait]
impl RasterSource for HttpRasterSource {
    #[instrument(skip(self), fields(bucket = %bucket))]
    async fn fetch(&self, bucket: &TimeBucket) -> RadarResult<Bytes> {
        let url = self.url_for(bucket);
        info!(url = %url, "Downloading radar image");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                RadarError::Fetch(format!("request timed out: {}", e))
            } else {
                RadarError::Fetch(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RadarError::HttpStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RadarError::Fetch(format!("error reading body: {}", e)))?;

        debug!(size = body.len(), "Downloaded radar image");
        Ok(body)
    }
}
