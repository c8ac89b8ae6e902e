//! A cache of parsed charts, keyed by the SHA-256 of their source text.
//!
//! The cache is an ordinary value owned by the caller. It holds at most a fixed number of charts
//! and evicts the least recently used one when full. Failed parses are never cached.

use std::{fmt, num::NonZeroUsize, sync::Arc};

use lru::LruCache;
use sha2::{Digest, Sha256};

use crate::{ParseError, ParseOutput, config::ChartConfig, parse_chart};

/// SHA-256 of a chart's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hashes `source`.
    #[must_use]
    pub fn of(source: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        Self(hasher.finalize().into())
    }

    /// The raw digest.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|byte| write!(f, "{byte:02x}"))
    }
}

/// A bounded, least-recently-used cache of [`ParseOutput`]s.
///
/// Every chart in one cache is built with the same [`ChartConfig`].
#[derive(Debug)]
pub struct ChartCache {
    config: ChartConfig,
    entries: LruCache<ContentHash, Arc<ParseOutput>>,
}

impl ChartCache {
    /// Creates an empty cache holding at most `capacity` charts.
    #[must_use]
    pub fn new(capacity: NonZeroUsize, config: ChartConfig) -> Self {
        Self {
            config,
            entries: LruCache::new(capacity),
        }
    }

    /// The configuration charts are built with.
    #[must_use]
    pub const fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Returns the cached chart for `source`, parsing and caching it on a miss.
    ///
    /// # Errors
    ///
    /// Returns whatever [`parse_chart`] returns on a miss. Nothing is cached then.
    pub fn get_or_parse(&mut self, source: &str) -> Result<Arc<ParseOutput>, ParseError> {
        let hash = ContentHash::of(source);
        if let Some(hit) = self.entries.get(&hash) {
            log::debug!("chart cache hit for {hash}");
            return Ok(Arc::clone(hit));
        }
        let output = Arc::new(parse_chart(source, &self.config)?);
        self.insert(hash, Arc::clone(&output));
        Ok(output)
    }

    /// Returns the cached chart for `hash` and marks it as recently used.
    pub fn get(&mut self, hash: &ContentHash) -> Option<Arc<ParseOutput>> {
        self.entries.get(hash).map(Arc::clone)
    }

    /// Caches `output` under `hash`, replacing any chart already there.
    ///
    /// Returns the hash of the chart evicted to make room, if any.
    pub fn insert(&mut self, hash: ContentHash, output: Arc<ParseOutput>) -> Option<ContentHash> {
        let (evicted, _) = self.entries.push(hash, output)?;
        if evicted == hash {
            return None;
        }
        log::debug!("chart cache evicted {evicted}");
        Some(evicted)
    }

    /// Removes the chart cached under `hash`.
    pub fn evict(&mut self, hash: &ContentHash) -> Option<Arc<ParseOutput>> {
        self.entries.pop(hash)
    }

    /// Removes every chart.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached charts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no chart is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached charts.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.entries.cap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(bpm: u32) -> String {
        format!(
            "[Song]\n{{\n  Resolution = 192\n}}\n[SyncTrack]\n{{\n  0 = TS 4\n  0 = B {bpm}\n}}\n"
        )
    }

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            ContentHash::of("").to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hit_returns_same_chart() {
        let mut cache = ChartCache::new(NonZeroUsize::MIN, ChartConfig::default());
        let first = cache.get_or_parse(&source(120000)).unwrap();
        let second = cache.get_or_parse(&source(120000)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let capacity = NonZeroUsize::new(2).unwrap();
        let mut cache = ChartCache::new(capacity, ChartConfig::default());
        let (a, b, c) = (source(100000), source(110000), source(120000));
        cache.get_or_parse(&a).unwrap();
        cache.get_or_parse(&b).unwrap();
        assert!(cache.get(&ContentHash::of(&a)).is_some());
        cache.get_or_parse(&c).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&ContentHash::of(&b)).is_none());
        assert!(cache.get(&ContentHash::of(&a)).is_some());
        assert!(cache.get(&ContentHash::of(&c)).is_some());
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = ChartCache::new(NonZeroUsize::MIN, ChartConfig::default());
        assert!(cache.get_or_parse("[Song]\n{\n}\n").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn evict_and_clear() {
        let mut cache = ChartCache::new(NonZeroUsize::new(4).unwrap(), ChartConfig::default());
        let a = source(100000);
        cache.get_or_parse(&a).unwrap();
        cache.get_or_parse(&source(110000)).unwrap();
        assert!(cache.evict(&ContentHash::of(&a)).is_some());
        assert!(cache.evict(&ContentHash::of(&a)).is_none());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
