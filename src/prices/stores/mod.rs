use anyhow::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

use crate::prices::PriceQuote;

pub mod billa;
pub mod kaufland;
pub mod lidl;
pub mod tesco;

pub use billa::BillaSource;
pub use kaufland::KauflandSource;
pub use lidl::LidlSource;
pub use tesco::TescoSource;

/// One retail storefront. Implementations issue a single search request and
/// extract a price with a retailer-specific pattern; a markup change on the
/// retailer side degrades the source to permanent `Ok(None)`, which the
/// aggregator treats as an expected miss rather than a fault.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn store_name(&self) -> &'static str;

    /// `Ok(None)` when the storefront yields no usable price.
    async fn fetch(&self, query: &str) -> Result<Option<PriceQuote>>;
}

lazy_static! {
    /// Inline price field in the Lidl and Kaufland search pages.
    pub(crate) static ref INLINE_PRICE: Regex = Regex::new(r#""price":\s*(\d+\.?\d*)"#).unwrap();
}

/// Shared client for all storefront requests. The search pages answer a
/// browser-looking request far more reliably than a bare one.
pub fn storefront_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("sk-SK,sk;q=0.9,en;q=0.8"),
    );

    Ok(Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}

/// First price-looking match in the page body, if any. Only the first match
/// counts; search pages list many products and the top hit is the answer.
pub(crate) fn first_price_match(body: &str, pattern: &Regex) -> Option<f64> {
    pattern
        .captures(body)?
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_inline_price() {
        let body = r#"{"products":[{"price": 1.89},{"price": 2.49}]}"#;
        assert_eq!(first_price_match(body, &INLINE_PRICE), Some(1.89));
    }

    #[test]
    fn integer_prices_parse() {
        let body = r#""price": 2"#;
        assert_eq!(first_price_match(body, &INLINE_PRICE), Some(2.0));
    }

    #[test]
    fn bodies_without_prices_yield_nothing() {
        assert_eq!(first_price_match("<html>sold out</html>", &INLINE_PRICE), None);
    }
}
