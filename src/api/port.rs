//! Product source trait

use async_trait::async_trait;

use crate::api::{errors::FetchResult, types::ProductPage};

/// Source of paginated product listings
#[async_trait]
pub trait ProductFetchPort: Send + Sync {
    /// Fetch one page of products together with its pagination metadata
    async fn fetch(&self, page: u32, limit: u32) -> FetchResult<ProductPage>;

    /// Short label for logs
    fn name(&self) -> &str;
}
