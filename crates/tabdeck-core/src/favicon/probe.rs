use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use image::ImageReader;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;

use crate::config::FaviconConfig;
use crate::{Error, Result};

/// Outcome of loading one candidate image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub ok: bool,
    pub width: u32,
    pub height: u32,
    /// Body was SVG, so the dimensions carry no meaning
    pub vector: bool,
}

impl ProbeResult {
    pub fn loaded(width: u32, height: u32) -> Self {
        Self {
            ok: true,
            width,
            height,
            vector: false,
        }
    }

    pub fn vector() -> Self {
        Self {
            ok: true,
            vector: true,
            ..Self::default()
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }
}

/// Loads an image URL off-screen and reports whether it decoded, and its size
///
/// Failures of any kind (timeout, network, status, decode) are reported as
/// `ok == false` rather than as errors.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeResult;
}

/// [`ImageProbe`] over HTTP
pub struct HttpImageProbe {
    client: Client,
    max_bytes: usize,
}

impl HttpImageProbe {
    pub fn new(config: &FaviconConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.probe_timeout_ms))
            .referer(false)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("tabdeck/", env!("CARGO_PKG_VERSION")))
            .default_headers(Self::build_headers())
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            max_bytes: config.max_icon_bytes,
        })
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("image/avif,image/webp,image/png,image/svg+xml,image/*;q=0.8,*/*;q=0.5"),
        );
        headers
    }

    async fn fetch(&self, url: &str) -> Result<ProbeResult> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, %status, "Icon candidate rejected by status");
            return Ok(ProbeResult::failed());
        }

        if response
            .content_length()
            .is_some_and(|len| len as usize > self.max_bytes)
        {
            tracing::debug!(%url, "Icon candidate too large");
            return Ok(ProbeResult::failed());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);
        let body = response.bytes().await?;
        if body.len() > self.max_bytes {
            return Ok(ProbeResult::failed());
        }

        Ok(decode_dimensions(&body, content_type.as_deref(), url))
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn probe(&self, url: &str) -> ProbeResult {
        match self.fetch(url).await {
            Ok(result) => {
                tracing::debug!(
                    %url,
                    ok = result.ok,
                    width = result.width,
                    height = result.height,
                    vector = result.vector,
                    "Probed icon candidate"
                );
                result
            }
            Err(e) => {
                tracing::debug!(%url, error = %e, "Icon candidate failed to load");
                ProbeResult::failed()
            }
        }
    }
}

/// Measure an icon body
///
/// SVG reports `ok` with zero dimensions and `vector` set, whatever the URL
/// looks like. Scoring treats that as a resolution-independent icon.
pub fn decode_dimensions(body: &Bytes, content_type: Option<&str>, url: &str) -> ProbeResult {
    if body.is_empty() {
        return ProbeResult::failed();
    }
    if is_svg(body, content_type, url) {
        return ProbeResult::vector();
    }

    let reader = match ImageReader::new(Cursor::new(body.as_ref())).with_guessed_format() {
        Ok(reader) => reader,
        Err(_) => return ProbeResult::failed(),
    };
    match reader.into_dimensions() {
        Ok((width, height)) if width > 0 && height > 0 => ProbeResult::loaded(width, height),
        _ => ProbeResult::failed(),
    }
}

fn is_svg(body: &[u8], content_type: Option<&str>, url: &str) -> bool {
    if content_type.is_some_and(|ct| ct.contains("image/svg")) {
        return true;
    }
    let head_len = body.len().min(1024);
    let head = String::from_utf8_lossy(&body[..head_len]);
    let head = head.trim_start();
    let looks_like_svg = head.starts_with("<svg")
        || (head.starts_with("<?xml") && head.contains("<svg"));
    looks_like_svg
        || (url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase().ends_with(".svg")
            && head.starts_with('<'))
}
