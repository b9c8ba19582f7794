//! Preview image acquisition.
//!
//! Loads a web page, finds its `og:image` meta tag, and downloads the image
//! it points to.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::sources::ImageInput;

/// Browsers get the full page; some sites serve bots a stripped one without
/// Open Graph tags.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_1) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/62.0.3202.94 Safari/537.36";

const OG_IMAGE_SELECTORS: &[&str] = &[
    r#"meta[property="og:image"]"#,
    r#"meta[name="og:image"]"#,
];

/// A preview image resolved from a page URL.
#[derive(Debug, Clone)]
pub struct AcquiredImage {
    /// Absolute URL of the image
    pub url: String,
    /// Downloaded image
    pub input: ImageInput,
}

/// Resolves a page URL to its preview image.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, page_url: &str) -> Result<AcquiredImage, PipelineError>;
}

/// Fetches the image advertised by a page's Open Graph metadata.
pub struct OpenGraphFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
}

impl OpenGraphFetcher {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_millis(limits.fetch_timeout_ms),
            max_bytes: limits.max_image_size_mb * 1024 * 1024,
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, String> {
        let resp = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| format!("request to {url} failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {status} from {url}"));
        }
        Ok(resp)
    }

    /// Read the response body, failing once it grows past `max_bytes`.
    async fn read_limited(
        &self,
        mut resp: reqwest::Response,
        what: &str,
    ) -> Result<Vec<u8>, String> {
        let too_large = || format!("{what} exceeds {} bytes", self.max_bytes);
        if resp.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| format!("failed to read {what}: {e}"))?
        {
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    async fn acquire(&self, page_url: &str) -> Result<AcquiredImage, String> {
        let resp = self.get(page_url).await?;
        let page = self.read_limited(resp, "page").await?;
        let html = String::from_utf8_lossy(&page);

        let content = extract_og_image(&html).ok_or("page has no og:image meta tag")?;
        let image_url = resolve_url(page_url, &content)?;
        tracing::debug!("Preview image for {page_url}: {image_url}");

        let resp = self.get(&image_url).await?;
        let bytes = self.read_limited(resp, "image").await?;
        let input = ImageInput::sniff(bytes)
            .ok_or_else(|| format!("{image_url} is not a supported image"))?;

        Ok(AcquiredImage {
            url: image_url,
            input,
        })
    }
}

#[async_trait]
impl ImageFetcher for OpenGraphFetcher {
    async fn fetch(&self, page_url: &str) -> Result<AcquiredImage, PipelineError> {
        self.acquire(page_url)
            .await
            .map_err(|message| PipelineError::SourceFetchFailed {
                url: page_url.to_string(),
                message,
            })
    }
}

/// Resolve a possibly relative image URL against the page it came from.
fn resolve_url(page_url: &str, image_url: &str) -> Result<String, String> {
    let base = reqwest::Url::parse(page_url).map_err(|e| format!("invalid page URL: {e}"))?;
    base.join(image_url)
        .map(String::from)
        .map_err(|e| format!("invalid image URL '{image_url}': {e}"))
}

/// Find the `content` of the first `og:image` meta tag.
///
/// `property="og:image"` wins over the non-standard `name="og:image"`.
pub fn extract_og_image(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    OG_IMAGE_SELECTORS.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        doc.select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty())
            .map(String::from)
    })
}
