//! Recognition-provider contract and request driver
//!
//! Providers are external collaborators (cloud or local vision/OCR services);
//! the core only consumes their normalized block streams. Per-page requests
//! are the sole network-bound operations in the system: they fan out
//! concurrently with no ordering dependency, carry a timeout and a bounded
//! retry budget with exponential backoff, and their results are re-sequenced
//! into page/reading order before construction, since provider response order
//! is not guaranteed.

use crate::construct::RecognizedBlock;
use crate::error::ProviderError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// A rasterized source page handed to a provider
#[derive(Debug, Clone)]
pub struct PageImage {
    pub page_index: usize,

    /// Encoded image bytes
    pub data: Vec<u8>,

    /// MIME type of `data`
    pub media_type: String,

    /// Page dimensions in points
    pub width: f32,
    pub height: f32,
}

/// A service that recognizes text blocks on one page image
#[async_trait]
pub trait RecognitionProvider: Send + Sync {
    /// Recognize the blocks of one page
    ///
    /// Block order in the response is not significant; the driver re-sorts.
    async fn recognize_page(&self, page: &PageImage) -> Result<Vec<RecognizedBlock>, ProviderError>;

    /// Provider name for logs and error reports
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Timeout and retry budget for provider requests
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per page before giving up
    pub max_attempts: u32,

    /// Backoff base; attempt N sleeps `base_delay * 2^(N-1)`
    pub base_delay: Duration,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Recognize a whole document, page requests in parallel
///
/// Transient failures (timeout, rate limit, transport) are retried within the
/// policy's budget; a page that keeps failing surfaces as
/// [`ProviderError::Exhausted`] rather than being silently skipped, since a
/// skipped page would silently drop document content. Results come back
/// sorted by page, then top-to-bottom, then left-to-right.
pub async fn recognize_pages(
    provider: Arc<dyn RecognitionProvider>,
    pages: Vec<PageImage>,
    policy: &RetryPolicy,
) -> Result<Vec<RecognizedBlock>, ProviderError> {
    let mut tasks = JoinSet::new();
    for page in pages {
        let provider = Arc::clone(&provider);
        let policy = policy.clone();
        tasks.spawn(async move { recognize_one(provider.as_ref(), &page, &policy).await });
    }

    let mut blocks = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let page_blocks =
            joined.map_err(|e| ProviderError::Transport(format!("recognition task failed: {e}")))??;
        blocks.extend(page_blocks);
    }

    blocks.sort_by(|a, b| {
        a.page_index
            .cmp(&b.page_index)
            .then(a.bbox.y0.total_cmp(&b.bbox.y0))
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });
    Ok(blocks)
}

async fn recognize_one(
    provider: &dyn RecognitionProvider,
    page: &PageImage,
    policy: &RetryPolicy,
) -> Result<Vec<RecognizedBlock>, ProviderError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let outcome = match tokio::time::timeout(policy.timeout, provider.recognize_page(page)).await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(policy.timeout)),
        };
        match outcome {
            Ok(mut blocks) => {
                // Providers report per-request coordinates; pin the page index
                for block in &mut blocks {
                    block.page_index = page.page_index;
                }
                return Ok(blocks);
            }
            Err(error) if error.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.base_delay * 2u32.saturating_pow(attempt - 1);
                tracing::warn!(
                    provider = provider.name(),
                    page = page.page_index,
                    attempt,
                    ?delay,
                    %error,
                    "transient recognition failure, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => {
                return Err(ProviderError::Exhausted {
                    page: page.page_index,
                    attempts: attempt,
                    source: Box::new(error),
                });
            }
        }
    }
}
