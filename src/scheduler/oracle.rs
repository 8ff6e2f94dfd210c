use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Default cache lifetime for a price sample
pub const DEFAULT_PRICE_TTL: Duration = Duration::from_secs(60);

/// Errors from the upstream price source
///
/// These never escape [`PriceOracle::get`]; they only shape the log line.
#[derive(Debug, Error)]
pub enum PriceFeedError {
    #[error("Price request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed price response: {0}")]
    MalformedResponse(String),
}

/// Upstream price lookup, one token symbol at a time
#[async_trait::async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_usd_price(&self, token: &str) -> Result<Decimal, PriceFeedError>;
}

/// CoinGecko simple-price feed
pub struct CoinGeckoFeed {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoFeed {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://api.coingecko.com/api/v3".to_string(),
        }
    }

    /// Map a token symbol to the CoinGecko asset id
    fn asset_id(token: &str) -> String {
        match token.to_ascii_uppercase().as_str() {
            "SOL" => "solana".to_string(),
            other => other.to_ascii_lowercase(),
        }
    }
}

impl Default for CoinGeckoFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PriceFeed for CoinGeckoFeed {
    async fn fetch_usd_price(&self, token: &str) -> Result<Decimal, PriceFeedError> {
        let asset = Self::asset_id(token);
        let url = format!("{}/simple/price", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("ids", asset.as_str()), ("vs_currencies", "usd")])
            .send()
            .await
            .map_err(|e| PriceFeedError::RequestFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| PriceFeedError::RequestFailed(e.to_string()))?;

        // Response shape: {"solana": {"usd": 123.45}}
        let body: HashMap<String, HashMap<String, Decimal>> = response
            .json()
            .await
            .map_err(|e| PriceFeedError::MalformedResponse(e.to_string()))?;

        body.get(&asset)
            .and_then(|quotes| quotes.get("usd"))
            .copied()
            .ok_or_else(|| {
                PriceFeedError::MalformedResponse(format!("no usd quote for {}", asset))
            })
    }
}

/// One cached quote
#[derive(Debug, Clone)]
struct PriceSample {
    value_usd: Decimal,
    fetched_at: Instant,
}

/// TTL-cached price lookup that degrades instead of failing
///
/// At most one sample is kept per token. A sample younger than the TTL is
/// served without touching the network. When a refresh fails the previous
/// sample is served regardless of age; only with no sample at all does
/// `get` return `None`. Callers treat `None` as "skip price-based
/// evaluation this tick", never as an error.
pub struct PriceOracle {
    feed: Arc<dyn PriceFeed>,
    ttl: Duration,
    cache: RwLock<HashMap<String, PriceSample>>,
}

impl PriceOracle {
    pub fn new(feed: Arc<dyn PriceFeed>) -> Self {
        Self::with_ttl(feed, DEFAULT_PRICE_TTL)
    }

    pub fn with_ttl(feed: Arc<dyn PriceFeed>, ttl: Duration) -> Self {
        Self {
            feed,
            ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Current USD price for a token, or `None` when no data is available
    pub async fn get(&self, token: &str) -> Option<Decimal> {
        if let Some(sample) = self.cache.read().get(token) {
            if sample.fetched_at.elapsed() < self.ttl {
                return Some(sample.value_usd);
            }
        }

        match self.feed.fetch_usd_price(token).await {
            Ok(value_usd) => {
                self.cache.write().insert(
                    token.to_string(),
                    PriceSample {
                        value_usd,
                        fetched_at: Instant::now(),
                    },
                );
                Some(value_usd)
            }
            Err(e) => {
                tracing::warn!("Price fetch for {} failed: {}", token, e);
                // Serve the stale sample if we ever had one
                self.cache.read().get(token).map(|s| s.value_usd)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;

    /// Feed returning a scripted sequence of results
    struct ScriptedFeed {
        results: Mutex<Vec<Result<Decimal, PriceFeedError>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedFeed {
        fn new(results: Vec<Result<Decimal, PriceFeedError>>) -> Self {
            Self {
                results: Mutex::new(results),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.lock()
        }
    }

    #[async_trait::async_trait]
    impl PriceFeed for ScriptedFeed {
        async fn fetch_usd_price(&self, _token: &str) -> Result<Decimal, PriceFeedError> {
            *self.calls.lock() += 1;
            let mut results = self.results.lock();
            if results.is_empty() {
                Err(PriceFeedError::RequestFailed("exhausted".to_string()))
            } else {
                results.remove(0)
            }
        }
    }

    #[tokio::test]
    async fn test_fresh_sample_served_from_cache() {
        let feed = Arc::new(ScriptedFeed::new(vec![Ok(dec!(150))]));
        let oracle = PriceOracle::new(Arc::clone(&feed) as Arc<dyn PriceFeed>);

        assert_eq!(oracle.get("SOL").await, Some(dec!(150)));
        // Second read within the TTL must not hit the network
        assert_eq!(oracle.get("SOL").await, Some(dec!(150)));
        assert_eq!(feed.call_count(), 1);
    }

    #[tokio::test]
    async fn test_stale_value_served_on_fetch_failure() {
        let feed = Arc::new(ScriptedFeed::new(vec![
            Ok(dec!(240)),
            Err(PriceFeedError::RequestFailed("upstream down".to_string())),
        ]));
        // Zero TTL: every get attempts a refresh
        let oracle =
            PriceOracle::with_ttl(Arc::clone(&feed) as Arc<dyn PriceFeed>, Duration::ZERO);

        assert_eq!(oracle.get("SOL").await, Some(dec!(240)));
        // Refresh fails, the expired sample is still served
        assert_eq!(oracle.get("SOL").await, Some(dec!(240)));
        assert_eq!(feed.call_count(), 2);
    }

    #[tokio::test]
    async fn test_no_data_yields_none() {
        let feed = Arc::new(ScriptedFeed::new(vec![Err(PriceFeedError::RequestFailed(
            "upstream down".to_string(),
        ))]));
        let oracle = PriceOracle::new(Arc::clone(&feed) as Arc<dyn PriceFeed>);

        assert_eq!(oracle.get("SOL").await, None);
    }

    #[tokio::test]
    async fn test_successful_refresh_replaces_cache() {
        let feed = Arc::new(ScriptedFeed::new(vec![Ok(dec!(240)), Ok(dec!(251))]));
        let oracle =
            PriceOracle::with_ttl(Arc::clone(&feed) as Arc<dyn PriceFeed>, Duration::ZERO);

        assert_eq!(oracle.get("SOL").await, Some(dec!(240)));
        assert_eq!(oracle.get("SOL").await, Some(dec!(251)));
    }

    #[test]
    fn test_asset_id_mapping() {
        assert_eq!(CoinGeckoFeed::asset_id("SOL"), "solana");
        assert_eq!(CoinGeckoFeed::asset_id("sol"), "solana");
        assert_eq!(CoinGeckoFeed::asset_id("BTC"), "btc");
    }
}
