use crate::error::Result;
use crate::models::Page;
use async_trait::async_trait;

/// Anything that can serve the dataset one page at a time
///
/// Must be safe to call concurrently for distinct page numbers. Failures
/// are expected to be transient; the fetcher retries them.
#[async_trait]
pub trait PagedSource: Send + Sync {
    /// Fetch a 1-based `page` of at most `size` items
    async fn get_page(&self, page: u32, size: u32) -> Result<Page>;
}
