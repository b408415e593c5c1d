use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use crate::prices::stores::{first_price_match, PriceSource, INLINE_PRICE};
use crate::prices::PriceQuote;

pub struct KauflandSource {
    client: Client,
}

impl KauflandSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PriceSource for KauflandSource {
    fn store_name(&self) -> &'static str {
        "Kaufland"
    }

    async fn fetch(&self, query: &str) -> Result<Option<PriceQuote>> {
        let response = self
            .client
            .get("https://www.kaufland.sk/search")
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            log::debug!("Kaufland search for '{}' returned {}", query, response.status());
            return Ok(None);
        }

        let body = response.text().await?;
        Ok(first_price_match(&body, &INLINE_PRICE)
            .map(|price| PriceQuote::priced(price, self.store_name())))
    }
}
