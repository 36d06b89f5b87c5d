//! Loading and caching of the GeoJSON asset behind each map type.
//!
//! Assets are resolved by name through an [`AssetSource`]: a directory on disk or an HTTP
//! base URL. The [`AssetCache`] keeps one slot per asset identity so that concurrent
//! requests for the same map type share a single fetch:
//! - the first request starts the fetch ([`AssetRequest::Fetch`]),
//! - later requests while it is in flight coalesce ([`AssetRequest::Pending`]),
//! - once resolved, requests are served from the cache ([`AssetRequest::Ready`]).
//!
//! A failed fetch clears its slot, so re-selecting the map type retries.

use crate::error::{ChoroplethError, Result};
use crate::models::FeatureCollection;
use ahash::AHashMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Somewhere assets can be fetched from by name.
pub trait AssetSource {
    fn fetch(&self, asset: &str) -> Result<FeatureCollection>;
}

/// Assets stored as files in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    pub root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirectorySource {
    fn fetch(&self, asset: &str) -> Result<FeatureCollection> {
        let path = self.root.join(asset);
        let text = fs::read_to_string(&path).map_err(|e| ChoroplethError::Asset {
            asset: asset.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Assets served over HTTP under a common base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    pub base_url: String,
    http: HttpClient,
}

// Allow -, _, . unescaped in asset names (`india.tamil_nadu.geo.json`)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("choropleth-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn url_for(&self, asset: &str) -> String {
        format!(
            "{}/{}",
            self.base_url,
            percent_encoding::utf8_percent_encode(asset.trim(), SAFE)
        )
    }
}

impl AssetSource for HttpSource {
    fn fetch(&self, asset: &str) -> Result<FeatureCollection> {
        let url = self.url_for(asset);
        let fail = |reason: String| ChoroplethError::Asset {
            asset: asset.to_string(),
            reason,
        };

        // Small retry for transient failures (5xx / network errors)
        let outcome = with_retries(&RETRY_BACKOFF, std::thread::sleep, || {
            match self.http.get(&url).send() {
                Ok(r) if r.status().is_success() => {
                    Attempt::Done(r.json().map_err(ChoroplethError::from))
                }
                Ok(r) if r.status().is_server_error() => {
                    Attempt::Retry(format!("GET {url}: HTTP {}", r.status()))
                }
                Ok(r) => Attempt::Done(Err(fail(format!("GET {url}: HTTP {}", r.status())))),
                Err(e) => Attempt::Retry(format!("GET {url}: {e}")),
            }
        });
        match outcome {
            Attempt::Done(result) => result,
            Attempt::Retry(reason) => Err(fail(reason)),
        }
    }
}

/// Pauses between attempts; one more attempt is made than there are pauses.
const RETRY_BACKOFF: [Duration; 2] = [Duration::from_millis(100), Duration::from_millis(300)];

enum Attempt<T> {
    Done(Result<T>),
    /// Transient failure, worth another try.
    Retry(String),
}

/// Run `attempt` until it is done or the pauses run out. No pause follows the last attempt.
fn with_retries<T>(
    backoff: &[Duration],
    mut sleep: impl FnMut(Duration),
    mut attempt: impl FnMut() -> Attempt<T>,
) -> Attempt<T> {
    let mut pauses = backoff.iter();
    loop {
        match attempt() {
            Attempt::Retry(reason) => match pauses.next() {
                Some(pause) => {
                    log::warn!("{reason}; retrying in {}ms", pause.as_millis());
                    sleep(*pause);
                }
                None => return Attempt::Retry(reason),
            },
            done => return done,
        }
    }
}

/// Outcome of [`AssetCache::request`].
#[derive(Debug, Clone)]
pub enum AssetRequest {
    /// Already loaded.
    Ready(Arc<FeatureCollection>),
    /// Another request is fetching this asset; wait for its completion.
    Pending,
    /// Caller owns the fetch and must report it through [`AssetCache::complete`].
    Fetch,
}

#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Ready(Arc<FeatureCollection>),
}

/// Per-session asset cache keyed by asset identity.
#[derive(Debug, Default)]
pub struct AssetCache {
    slots: AHashMap<String, Slot>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, asset: &str) -> AssetRequest {
        match self.slots.get(asset) {
            Some(Slot::Ready(fc)) => AssetRequest::Ready(Arc::clone(fc)),
            Some(Slot::Pending) => {
                log::debug!("asset {asset}: joining in-flight request");
                AssetRequest::Pending
            }
            None => {
                log::debug!("asset {asset}: starting fetch");
                self.slots.insert(asset.to_string(), Slot::Pending);
                AssetRequest::Fetch
            }
        }
    }

    /// Record the result of a fetch.
    ///
    /// If the asset was already resolved (a duplicate late response) the cached value wins.
    /// On failure the slot is cleared so the next request fetches again.
    pub fn complete(
        &mut self,
        asset: &str,
        result: Result<FeatureCollection>,
    ) -> Result<Arc<FeatureCollection>> {
        if let Some(Slot::Ready(fc)) = self.slots.get(asset) {
            log::debug!("asset {asset}: duplicate response ignored");
            return Ok(Arc::clone(fc));
        }
        match result {
            Ok(fc) => {
                let fc = Arc::new(fc);
                self.slots
                    .insert(asset.to_string(), Slot::Ready(Arc::clone(&fc)));
                Ok(fc)
            }
            Err(e) => {
                log::warn!("asset {asset}: load failed: {e}");
                self.slots.remove(asset);
                Err(e)
            }
        }
    }

    /// Synchronous convenience: serve from cache or fetch through `source` now.
    ///
    /// Returns `Ok(None)` when another request for the asset is still in flight.
    pub fn load(
        &mut self,
        asset: &str,
        source: &dyn AssetSource,
    ) -> Result<Option<Arc<FeatureCollection>>> {
        match self.request(asset) {
            AssetRequest::Ready(fc) => Ok(Some(fc)),
            AssetRequest::Pending => Ok(None),
            AssetRequest::Fetch => self.complete(asset, source.fetch(asset)).map(Some),
        }
    }

    pub fn get(&self, asset: &str) -> Option<Arc<FeatureCollection>> {
        match self.slots.get(asset) {
            Some(Slot::Ready(fc)) => Some(Arc::clone(fc)),
            _ => None,
        }
    }

    pub fn is_pending(&self, asset: &str) -> bool {
        matches!(self.slots.get(asset), Some(Slot::Pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_pause_only_between_attempts() {
        let mut pauses = Vec::new();
        let mut calls = 0;
        let out: Attempt<()> = with_retries(&RETRY_BACKOFF, |d| pauses.push(d), || {
            calls += 1;
            Attempt::Retry(format!("attempt {calls}"))
        });
        assert_eq!(calls, 3);
        assert_eq!(pauses, RETRY_BACKOFF.to_vec());
        assert!(matches!(out, Attempt::Retry(r) if r == "attempt 3"));
    }

    #[test]
    fn retries_stop_at_first_success() {
        let mut pauses = 0;
        let mut calls = 0;
        let out = with_retries(&RETRY_BACKOFF, |_| pauses += 1, || {
            calls += 1;
            if calls == 2 {
                Attempt::Done(Ok(calls))
            } else {
                Attempt::Retry("HTTP 503".into())
            }
        });
        assert!(matches!(out, Attempt::Done(Ok(2))));
        assert_eq!(pauses, 1);
    }

    #[test]
    fn url_for_encodes_asset_names() {
        let src = HttpSource::new("https://example.org/maps/").unwrap();
        assert_eq!(
            src.url_for("india.tamil_nadu.geo.json"),
            "https://example.org/maps/india.tamil_nadu.geo.json"
        );
        assert_eq!(src.url_for("a b.json"), "https://example.org/maps/a%20b.json");
    }
}
