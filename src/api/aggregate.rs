//! Aggregate endpoint decoder: subscribers, crypto prices, headlines.
//!
//! Two payload shapes are accepted:
//!
//! ```text
//! flat    {"youtube": 1234, "btc": 65000.5, "eth": 3400.1, "rss": [{"title": ".."}]}
//! nested  {"crypto": {"bitcoin": {"usd": ..}, "ethereum": {"usd": ..}}, "rss": [..]}
//! ```
//!
//! Any field may be missing or hold an error string instead of data; such
//! fields fall back to zero / empty rather than failing the fetch.

use alloc::string::String;
use alloc::vec::Vec;

use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::api::reject_array;
use crate::data::{bounded, AggregateSnapshot};
use crate::error::FetchError;

/// A field that is used when it has the expected type and ignored otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Other(IgnoredAny),
}

impl<T> Lenient<T> {
    fn ok(self) -> Option<T> {
        match self {
            Lenient::Value(v) => Some(v),
            Lenient::Other(_) => None,
        }
    }
}

fn lenient<T>(field: Option<Lenient<T>>) -> Option<T> {
    field.and_then(Lenient::ok)
}

#[derive(Deserialize)]
struct WireAggregate {
    #[serde(default)]
    youtube: Option<Lenient<u64>>,
    #[serde(default)]
    btc: Option<Lenient<f32>>,
    #[serde(default)]
    eth: Option<Lenient<f32>>,
    #[serde(default)]
    crypto: Option<Lenient<WireCrypto>>,
    #[serde(default)]
    rss: Option<Lenient<Vec<Lenient<WireArticle>>>>,
}

#[derive(Deserialize)]
struct WireCrypto {
    #[serde(default)]
    bitcoin: Option<Lenient<WirePrice>>,
    #[serde(default)]
    ethereum: Option<Lenient<WirePrice>>,
}

#[derive(Deserialize)]
struct WirePrice {
    #[serde(default)]
    usd: Option<Lenient<f32>>,
}

#[derive(Deserialize)]
struct WireArticle {
    #[serde(default)]
    title: Option<String>,
}

fn usd(price: Option<Lenient<WirePrice>>) -> Option<f32> {
    lenient(price).and_then(|p| lenient(p.usd))
}

/// Decode an aggregate body. Only invalid JSON or a non-object top level
/// fail; everything else degrades to defaults.
pub fn parse_aggregate(body: &[u8]) -> Result<AggregateSnapshot, FetchError> {
    reject_array(body)?;
    let wire: WireAggregate = serde_json::from_slice(body)?;

    let (nested_btc, nested_eth) = match lenient(wire.crypto) {
        Some(c) => (usd(c.bitcoin), usd(c.ethereum)),
        None => (None, None),
    };

    let mut snapshot = AggregateSnapshot {
        subscriber_count: lenient(wire.youtube).unwrap_or(0),
        btc_usd: lenient(wire.btc).or(nested_btc).unwrap_or(0.0),
        eth_usd: lenient(wire.eth).or(nested_eth).unwrap_or(0.0),
        ..AggregateSnapshot::default()
    };

    let articles = lenient(wire.rss).unwrap_or_default();
    let titles = articles
        .into_iter()
        .filter_map(Lenient::ok)
        .map(|a| a.title.unwrap_or_default());
    for (slot, title) in snapshot.headlines.iter_mut().zip(titles) {
        *slot = bounded(&title);
    }

    Ok(snapshot)
}
