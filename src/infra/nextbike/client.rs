use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::services::account_api::AccountApi;
use nextbike_analytics::fetch::auth::UrlParam;
use nextbike_analytics::fetch::{BasicClient, HttpClient, fetch_bytes};
use nextbike_analytics::models::RawAccountItem;
use nextbike_analytics::parser::parse_account_items;

const LIST_URL: &str = "https://api.nextbike.net/api/v1.1/list.json";

/// Upper bound passed as `limit`; the API returns everything below it.
const LIST_LIMIT: u64 = 10_000_000_000;

/// Reads the account list with an API key and a login key that was obtained
/// by a separate login flow.
pub struct NextbikeClient<C: HttpClient = UrlParam<UrlParam<BasicClient>>> {
    http: C,
    list_url: String,
}

impl NextbikeClient {
    pub fn new(api_key: &str, login_key: &str) -> Result<Self> {
        let http = UrlParam::new(
            UrlParam::new(BasicClient::new()?, "apikey", api_key),
            "loginkey",
            login_key,
        );
        Ok(Self::with_client(http, LIST_URL))
    }

    /// Reads `NEXTBIKE_API_KEY` and `NEXTBIKE_LOGINKEY` from the environment.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("NEXTBIKE_API_KEY")
            .map_err(|_| anyhow::anyhow!("NEXTBIKE_API_KEY must be set"))?;
        let login_key = std::env::var("NEXTBIKE_LOGINKEY")
            .map_err(|_| anyhow::anyhow!("No active session: NEXTBIKE_LOGINKEY must be set"))?;
        Self::new(&api_key, &login_key)
    }
}

impl<C: HttpClient> NextbikeClient<C> {
    pub fn with_client(http: C, list_url: &str) -> Self {
        Self {
            http,
            list_url: list_url.to_string(),
        }
    }

    /// Points the client at a different `list.json` endpoint.
    pub fn with_list_url(mut self, list_url: &str) -> Self {
        self.list_url = list_url.to_string();
        self
    }
}

#[async_trait]
impl<C: HttpClient> AccountApi for NextbikeClient<C> {
    async fn fetch_account_body(&self) -> Result<Vec<u8>> {
        let mut url = reqwest::Url::parse(&self.list_url)?;
        url.query_pairs_mut()
            .append_pair("limit", &LIST_LIMIT.to_string());
        let bytes = fetch_bytes(&self.http, url.as_str()).await?;
        info!(bytes = bytes.len(), "Account list downloaded");
        Ok(bytes)
    }

    async fn list_account_items(&self) -> Result<Vec<RawAccountItem>> {
        let bytes = self.fetch_account_body().await?;
        let items = parse_account_items(&bytes)?;
        info!(items = items.len(), "Account items decoded");
        Ok(items)
    }
}
