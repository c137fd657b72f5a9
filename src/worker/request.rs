// Allow dead code: Request constructors for each interception path
#![allow(dead_code)]

//! Intercepted request identity and cache keys.

use reqwest::Url;

use super::WorkerError;

/// What kind of response the requester expects. Document requests fall
/// back to the cached application shell when everything else fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Resource,
}

/// An intercepted outgoing request. Cache entries are keyed by method +
/// full URL, so two requests are the same entry exactly when both match.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: String,
    pub url: Url,
    pub destination: Destination,
}

impl FetchRequest {
    pub fn new(method: &str, url: &str, destination: Destination) -> Result<Self, WorkerError> {
        let url = Url::parse(url).map_err(|_| WorkerError::InvalidUrl(url.to_string()))?;
        Ok(Self {
            method: method.to_ascii_uppercase(),
            url,
            destination,
        })
    }

    /// A plain GET for a resource.
    pub fn get(url: &str) -> Result<Self, WorkerError> {
        Self::new("GET", url, Destination::Resource)
    }

    /// A GET that expects a full page.
    pub fn document(url: &str) -> Result<Self, WorkerError> {
        Self::new("GET", url, Destination::Document)
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    pub fn expects_document(&self) -> bool {
        self.destination == Destination::Document
    }

    /// Filename-safe cache key for this request identity.
    pub fn cache_key(&self) -> String {
        cache_key(&self.method, self.url.as_str())
    }
}

/// Build a filename-safe key from a request identity. A readable prefix
/// keeps the cache directory inspectable; the hash suffix keeps distinct
/// URLs from colliding after sanitization.
pub fn cache_key(method: &str, url: &str) -> String {
    let raw = format!("{} {}", method.to_ascii_uppercase(), url);
    let prefix: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(80)
        .collect();
    format!("{}-{:016x}", prefix, fnv1a64(raw.as_bytes()))
}

/// 64-bit FNV-1a. Stable across builds so cache entries written by one
/// binary remain addressable by the next.
fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
