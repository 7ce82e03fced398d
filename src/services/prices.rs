//! CoinGecko price client with a per-coin TTL cache.

use super::cache::TtlCache;
use crate::constants::PRICE_CACHE_TTL_SECS;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("price request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unknown coin `{0}`")]
    UnknownCoin(String),
    #[error("response for `{coin}` is missing `{field}`")]
    MissingField { coin: String, field: &'static str },
}

/// One tradeable asset: the short symbol users type and its CoinGecko id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crypto {
    pub symbol: &'static str,
    pub name: &'static str,
    pub coingecko_id: &'static str,
}

impl Crypto {
    pub fn ticker(&self) -> String {
        self.symbol.to_uppercase()
    }
}

pub const CRYPTOS: &[Crypto] = &[
    Crypto { symbol: "btc", name: "Bitcoin", coingecko_id: "bitcoin" },
    Crypto { symbol: "eth", name: "Ethereum", coingecko_id: "ethereum" },
    Crypto { symbol: "bnb", name: "BNB", coingecko_id: "binancecoin" },
    Crypto { symbol: "sol", name: "Solana", coingecko_id: "solana" },
    Crypto { symbol: "xrp", name: "XRP", coingecko_id: "ripple" },
    Crypto { symbol: "gold", name: "Gold", coingecko_id: "pax-gold" },
    Crypto { symbol: "silver", name: "Silver", coingecko_id: "silver-tokenized-stock-defichain" },
];

pub fn find_crypto(symbol: &str) -> Option<&'static Crypto> {
    let symbol = symbol.to_lowercase();
    CRYPTOS.iter().find(|c| c.symbol == symbol)
}

/// IDR price with its 24 h change in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub change_24h: f64,
}

pub struct PriceClient {
    http: reqwest::Client,
    base_url: String,
    cache: TtlCache<&'static str, Quote>,
}

impl PriceClient {
    pub fn new() -> Result<Self, PriceError> {
        Self::with_base_url(COINGECKO_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, PriceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            cache: TtlCache::new(Duration::from_secs(PRICE_CACHE_TTL_SECS)),
        })
    }

    /// Current quote for a coin, served from cache for 30 seconds.
    #[instrument(level = "debug", skip(self), fields(coin = crypto.symbol))]
    pub async fn quote(&self, crypto: &'static Crypto) -> Result<Quote, PriceError> {
        if let Some(hit) = self.cache.get(&crypto.symbol).await {
            return Ok(hit);
        }
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=idr&include_24hr_change=true",
            self.base_url, crypto.coingecko_id
        );
        let body: Value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let quote = parse_simple_price(&body, crypto.coingecko_id)?;
        debug!(target: "trading.price", coin = crypto.symbol, price = quote.price, "fetched quote");
        self.cache.insert(crypto.symbol, quote).await;
        Ok(quote)
    }

    /// Quotes for every listed coin. Coins that fail are logged and left out.
    pub async fn quotes(&self) -> Vec<(&'static Crypto, Quote)> {
        let mut out = Vec::with_capacity(CRYPTOS.len());
        for crypto in CRYPTOS {
            match self.quote(crypto).await {
                Ok(q) => out.push((crypto, q)),
                Err(e) => warn!(target: "trading.price", coin = crypto.symbol, error = %e, "quote unavailable"),
            }
        }
        out
    }

    /// Price series for the last `days` days, oldest first.
    #[instrument(level = "debug", skip(self), fields(coin = crypto.symbol))]
    pub async fn market_chart(
        &self,
        crypto: &'static Crypto,
        days: u32,
    ) -> Result<Vec<f64>, PriceError> {
        let url = format!(
            "{}/coins/{}/market_chart?vs_currency=idr&days={days}",
            self.base_url, crypto.coingecko_id
        );
        let body: Value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_market_chart(&body, crypto.coingecko_id)
    }

    pub fn cache_stats(&self) -> (u64, u64) {
        self.cache.stats()
    }
}

/// Extracts a [`Quote`] from a `/simple/price` body. A missing change field counts as 0.
pub fn parse_simple_price(body: &Value, coin_id: &str) -> Result<Quote, PriceError> {
    let entry = body.get(coin_id).ok_or_else(|| PriceError::UnknownCoin(coin_id.to_string()))?;
    let price = entry
        .get("idr")
        .and_then(Value::as_f64)
        .ok_or_else(|| PriceError::MissingField {
            coin: coin_id.to_string(),
            field: "idr",
        })?;
    let change_24h = entry
        .get("idr_24h_change")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    Ok(Quote { price, change_24h })
}

/// Extracts the price column of a `/market_chart` body (`prices: [[ts, price], ..]`).
pub fn parse_market_chart(body: &Value, coin_id: &str) -> Result<Vec<f64>, PriceError> {
    let missing = || PriceError::MissingField {
        coin: coin_id.to_string(),
        field: "prices",
    };
    let points = body.get("prices").and_then(Value::as_array).ok_or_else(missing)?;
    Ok(points
        .iter()
        .filter_map(|p| p.get(1).and_then(Value::as_f64))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simple_price_defaults_change() {
        let body = json!({ "bitcoin": { "idr": 1_500_000_000.0 } });
        let q = parse_simple_price(&body, "bitcoin").unwrap();
        assert_eq!(q.price, 1_500_000_000.0);
        assert_eq!(q.change_24h, 0.0);
        assert!(matches!(
            parse_simple_price(&body, "ethereum"),
            Err(PriceError::UnknownCoin(_))
        ));
    }

    #[test]
    fn chart_takes_second_column() {
        let body = json!({ "prices": [[1, 10.0], [2, 12.5], [3]] });
        assert_eq!(parse_market_chart(&body, "x").unwrap(), vec![10.0, 12.5]);
        assert!(parse_market_chart(&json!({}), "x").is_err());
    }

    #[test]
    fn symbols_are_case_insensitive() {
        assert_eq!(find_crypto("BTC").map(|c| c.coingecko_id), Some("bitcoin"));
        assert!(find_crypto("doge").is_none());
    }
}
