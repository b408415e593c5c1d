use anyhow::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;

use crate::prices::stores::{first_price_match, PriceSource};
use crate::prices::PriceQuote;

lazy_static! {
    /// Price field inside the script/JSON fragments embedded in the Tesco
    /// search page.
    static ref PRICE_VALUE: Regex = Regex::new(r#""priceValue":\s*(\d+\.?\d*)"#).unwrap();
}

pub struct TescoSource {
    client: Client,
}

impl TescoSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PriceSource for TescoSource {
    fn store_name(&self) -> &'static str {
        "Tesco"
    }

    async fn fetch(&self, query: &str) -> Result<Option<PriceQuote>> {
        let response = self
            .client
            .get("https://nakup.tesco.sk/groceries/sk-SK/search")
            .query(&[("query", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            log::debug!("Tesco search for '{}' returned {}", query, response.status());
            return Ok(None);
        }

        let body = response.text().await?;
        Ok(first_price_match(&body, &PRICE_VALUE)
            .map(|price| PriceQuote::priced(price, self.store_name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_price_value_fragments() {
        let body = r#"<script>{"priceValue": 1.19,"unitPrice":0.79}</script>"#;
        assert_eq!(first_price_match(body, &PRICE_VALUE), Some(1.19));
    }
}
