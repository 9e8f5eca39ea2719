use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use registro_domain::{
    EntriesResult,
    Insert,
    MonthlySummary,
    NewEntry,
    Profile,
    Query,
    Retrieve,
    SummaryFilter,
};

/// How long each kind of read stays fresh
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub profiles: Duration,
    pub summary: Duration,
    pub entries: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            profiles: Duration::from_secs(60),
            summary: Duration::from_secs(30),
            entries: Duration::from_secs(30),
        }
    }
}

/// Values keyed by query, each valid for `ttl` after it was fetched.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (V, Instant)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get a value if it is still fresh
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, fetched_at)) if fetched_at.elapsed() < self.ttl => {
                Some(value.clone())
            },
            _ => None,
        }
    }

    pub async fn put(&self, key: K, value: V) {
        let mut entries = self.entries.lock().await;
        entries.insert(key, (value, Instant::now()));
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

/// A store with cached reads. A successful write through
/// the cache invalidates every cached read.
pub struct Cached<S> {
    inner: S,
    profiles: TtlCache<(), Vec<Profile>>,
    summary: TtlCache<SummaryFilter, Vec<MonthlySummary>>,
    entries: TtlCache<(), EntriesResult>,
}

impl<S> Cached<S> {
    pub fn new(inner: S, config: &CacheConfig) -> Self {
        Self {
            inner,
            profiles: TtlCache::new(config.profiles),
            summary: TtlCache::new(config.summary),
            entries: TtlCache::new(config.entries),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Forget everything fetched so far
    pub async fn invalidate_all(&self) {
        info!("invalidating cached reads");
        self.profiles.clear().await;
        self.summary.clear().await;
        self.entries.clear().await;
    }
}

#[async_trait]
impl<S> Query<Profile> for Cached<S>
where
    S: Query<Profile, Filter = ()> + Send + Sync,
{
    type Filter = ();

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Profile>> {
        if let Some(profiles) = self.profiles.get(&()).await {
            debug!("profiles served from cache");
            return Ok(profiles);
        }
        let profiles = self.inner.query(filter).await?;
        self.profiles.put((), profiles.clone()).await;
        Ok(profiles)
    }
}

#[async_trait]
impl<S> Query<MonthlySummary> for Cached<S>
where
    S: Query<MonthlySummary, Filter = SummaryFilter> + Send + Sync,
{
    type Filter = SummaryFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<MonthlySummary>> {
        if let Some(rows) = self.summary.get(filter).await {
            debug!(?filter, "monthly summary served from cache");
            return Ok(rows);
        }
        let rows = self.inner.query(filter).await?;
        self.summary.put(filter.clone(), rows.clone()).await;
        Ok(rows)
    }
}

#[async_trait]
impl<S> Retrieve<EntriesResult> for Cached<S>
where
    S: Retrieve<EntriesResult, Filter = ()> + Send + Sync,
{
    type Filter = ();

    async fn retrieve(&self, filter: &Self::Filter) -> Result<EntriesResult> {
        if let Some(entries) = self.entries.get(&()).await {
            debug!("income entries served from cache");
            return Ok(entries);
        }
        let entries = self.inner.retrieve(filter).await?;
        self.entries.put((), entries.clone()).await;
        Ok(entries)
    }
}

#[async_trait]
impl<S> Insert<NewEntry> for Cached<S>
where
    S: Insert<NewEntry> + Send + Sync,
    S::Output: Send,
{
    type Output = S::Output;

    async fn insert(&self, entry: NewEntry) -> Result<Self::Output> {
        let inserted = self.inner.insert(entry).await?;
        self.invalidate_all().await;
        Ok(inserted)
    }
}
