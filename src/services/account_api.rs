//! Trait for retrieving a user's account history from a bike-sharing provider.

use anyhow::Result;
use nextbike_analytics::models::RawAccountItem;

/// Abstraction over an account history provider (e.g., Nextbike).
#[async_trait::async_trait]
pub trait AccountApi {
    /// Returns the raw account body exactly as served, for saving to disk.
    async fn fetch_account_body(&self) -> Result<Vec<u8>>;

    /// Returns every account item of the authenticated user.
    async fn list_account_items(&self) -> Result<Vec<RawAccountItem>>;
}
