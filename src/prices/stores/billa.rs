use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::prices::stores::PriceSource;
use crate::prices::PriceQuote;

pub struct BillaSource {
    client: Client,
}

impl BillaSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// The price field is either {"finalPrice": x} or a bare number, depending on
/// promotion state.
fn extract_price(data: &Value) -> Option<f64> {
    data.get("results")
        .and_then(|results| results.get(0))
        .and_then(|item| item.get("price"))
        .and_then(|price| price.get("finalPrice").unwrap_or(price).as_f64())
}

#[async_trait]
impl PriceSource for BillaSource {
    fn store_name(&self) -> &'static str {
        "Billa"
    }

    async fn fetch(&self, query: &str) -> Result<Option<PriceQuote>> {
        let response = self
            .client
            .get("https://shop.billa.sk/api/v1/search")
            .query(&[("text", query), ("pageSize", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            log::debug!("Billa search for '{}' returned {}", query, response.status());
            return Ok(None);
        }

        let data: Value = response.json().await?;
        Ok(extract_price(&data).map(|price| PriceQuote::priced(price, self.store_name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_final_price_objects() {
        let data = json!({"results": [{"price": {"finalPrice": 2.49}}]});
        assert_eq!(extract_price(&data), Some(2.49));
    }

    #[test]
    fn reads_bare_number_prices() {
        let data = json!({"results": [{"price": 1.05}]});
        assert_eq!(extract_price(&data), Some(1.05));
    }

    #[test]
    fn empty_results_yield_nothing() {
        let data = json!({"results": []});
        assert_eq!(extract_price(&data), None);
    }
}
