use anyhow::Result;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::vision::Ingredient;

pub mod cache;
pub mod stores;

use cache::{PriceCache, PRICE_CACHE_CAPACITY};
use stores::{BillaSource, KauflandSource, LidlSource, PriceSource, TescoSource};

/// Rendered in place of price and store when every lookup came up empty.
pub const NO_DATA: &str = "—";

const PRICE_NOTE: &str = "Real-time prices from Tesco, Billa, Lidl, Kaufland (Slovakia)";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: String,
    pub store: String,
}

impl PriceQuote {
    pub fn priced(price: f64, store: &str) -> Self {
        Self {
            price: format!("{:.2} €", price),
            store: store.to_string(),
        }
    }

    pub fn no_data() -> Self {
        Self {
            price: NO_DATA.to_string(),
            store: NO_DATA.to_string(),
        }
    }

    /// Numeric part of a "X.XX €" price; `None` for the no-data sentinel.
    pub fn numeric_price(&self) -> Option<f64> {
        self.price.strip_suffix(" €")?.trim().parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub item: String,
    pub amount: String,
    pub price: String,
    pub store: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub items: Vec<ShoppingItem>,
    pub estimated_total: f64,
    pub currency: String,
    pub note: String,
}

impl ShoppingList {
    pub fn empty(note: &str) -> Self {
        Self {
            items: Vec::new(),
            estimated_total: 0.0,
            currency: "€".to_string(),
            note: note.to_string(),
        }
    }

    /// Placeholder installed on dish results before price enrichment runs.
    pub fn pending() -> Self {
        Self::empty("Fetching real-time prices...")
    }
}

/// Resolves ingredient prices: cache first, then the storefronts in fixed
/// priority order, stopping at the first one that answers. Every outcome,
/// including "nothing found", is cached so repeated misses inside the TTL
/// window stay off the network.
pub struct PriceAggregator {
    cache: PriceCache,
    sources: Vec<Arc<dyn PriceSource>>,
}

impl PriceAggregator {
    pub fn new(sources: Vec<Arc<dyn PriceSource>>, cache: PriceCache) -> Self {
        Self { cache, sources }
    }

    /// The production wiring: Tesco, Billa, Lidl, Kaufland, in that order.
    pub fn with_default_sources(timeout: Duration, cache_ttl: Duration) -> Result<Self> {
        let client = stores::storefront_client(timeout)?;
        let sources: Vec<Arc<dyn PriceSource>> = vec![
            Arc::new(TescoSource::new(client.clone())),
            Arc::new(BillaSource::new(client.clone())),
            Arc::new(LidlSource::new(client.clone())),
            Arc::new(KauflandSource::new(client)),
        ];

        let capacity = NonZeroUsize::new(PRICE_CACHE_CAPACITY).expect("cache capacity is non-zero");
        Ok(Self::new(sources, PriceCache::new(capacity, cache_ttl)))
    }

    async fn resolve(&self, name: &str) -> PriceQuote {
        if let Some(hit) = self.cache.get(name) {
            return hit;
        }

        for source in &self.sources {
            match source.fetch(name).await {
                Ok(Some(quote)) => {
                    self.cache.put(name, quote.clone());
                    return quote;
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("{} lookup for '{}' failed: {}", source.store_name(), name, e);
                }
            }
        }

        // Cache the miss too, so the TTL window suppresses repeat lookups.
        let quote = PriceQuote::no_data();
        self.cache.put(name, quote.clone());
        quote
    }

    /// Price every ingredient concurrently and assemble the shopping list.
    /// Item order follows the input, not fetch completion order.
    pub async fn shopping_list(&self, ingredients: &[Ingredient]) -> ShoppingList {
        if ingredients.is_empty() {
            return ShoppingList::empty("No ingredients");
        }

        let quotes = join_all(ingredients.iter().map(|ing| self.resolve(&ing.name))).await;

        let mut total = 0.0;
        let mut items = Vec::with_capacity(ingredients.len());
        for (ingredient, quote) in ingredients.iter().zip(quotes) {
            if let Some(price) = quote.numeric_price() {
                total += price;
            }
            items.push(ShoppingItem {
                item: ingredient.name.clone(),
                amount: ingredient.amount.clone(),
                price: quote.price,
                store: quote.store,
            });
        }

        ShoppingList {
            items,
            estimated_total: (total * 100.0).round() / 100.0,
            currency: "€".to_string(),
            note: PRICE_NOTE.to_string(),
        }
    }
}
