//! Screenshot downloads.
//!
//! [`ImageSource`] is the seam the materializer fetches bytes through.
//! [`HttpImageSource`] disables reqwest's automatic redirects and follows a
//! single 3xx hop itself; a second redirect is reported as a failure.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Url};

use crate::config::DownloadConfig;

#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .with_context(|| "Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut target = Url::parse(url).with_context(|| format!("Invalid image URL: {}", url))?;
        let mut redirected = false;

        loop {
            let resp = self
                .client
                .get(target.clone())
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        anyhow!("Timeout")
                    } else {
                        anyhow!(e)
                    }
                })?;
            let status = resp.status();

            if status.is_redirection() {
                if redirected {
                    bail!("Too many redirects ({})", status.as_u16());
                }
                let location = resp
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| anyhow!("Redirect {} without Location", status.as_u16()))?;
                target = target
                    .join(location)
                    .with_context(|| format!("Invalid redirect location: {}", location))?;
                redirected = true;
                continue;
            }

            if status.as_u16() != 200 {
                bail!("Failed to download: {}", status.as_u16());
            }

            let bytes = resp.bytes().await.map_err(|e| {
                if e.is_timeout() {
                    anyhow!("Timeout")
                } else {
                    anyhow!(e)
                }
            })?;
            return Ok(bytes.to_vec());
        }
    }
}
