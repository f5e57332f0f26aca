use crate::error::{CacheError, Result};
use crate::handle::ResourceHandle;
use crate::source::RangeSource;
use sheetmirror_model::{SerialClock, SortedResource};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Passed to every fetch (default: none, the source decides).
    pub fetch_timeout: Option<Duration>,
    /// Used to turn serial tags into calendar time (default: UTC-08:00 shown
    /// in `America/Vancouver`).
    pub clock: SerialClock,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Fetches issued to the source, successful or not.
    pub fetches: u64,
    /// `get` calls answered from a fresh snapshot.
    pub hits: u64,
    /// Fetches or builds that failed.
    pub failures: u64,
}

#[derive(Debug, Default)]
struct StatCounters {
    fetches: AtomicU64,
    hits: AtomicU64,
    failures: AtomicU64,
}

#[derive(Debug)]
struct CacheEntry {
    handle: ResourceHandle,
    resource: Option<Arc<SortedResource>>,
    stale: bool,
}

/// Named, staleness-gated mirror of remote ranges.
///
/// Each registered name owns one entry with its own lock. Fetches run under
/// that lock only, so concurrent readers of one stale resource trigger a single
/// fetch while other resources stay available. Snapshots handed out are
/// immutable; a refresh installs a new one without disturbing readers of the
/// old.
///
/// Nothing is fetched until a resource is first read or refreshed.
pub struct ResourceCache {
    source: Arc<dyn RangeSource>,
    config: CacheConfig,
    entries: RwLock<HashMap<String, Arc<Mutex<CacheEntry>>>>,
    stats: StatCounters,
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("config", &self.config)
            .field("names", &self.names())
            .field("stats", &self.stats_snapshot())
            .finish_non_exhaustive()
    }
}

impl ResourceCache {
    pub fn new(source: Arc<dyn RangeSource>) -> Self {
        Self::with_config(source, CacheConfig::default())
    }

    pub fn with_config(source: Arc<dyn RangeSource>, config: CacheConfig) -> Self {
        Self {
            source,
            config,
            entries: RwLock::new(HashMap::new()),
            stats: StatCounters::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Register `handle` under `name`. The entry starts stale.
    ///
    /// Returns `false` if `name` was already registered, in which case the
    /// original handle is kept.
    pub fn register(&self, name: impl Into<String>, handle: ResourceHandle) -> bool {
        let name = name.into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.entry(name) {
            Entry::Occupied(existing) => {
                log::debug!("resource {} already registered; keeping original handle", existing.key());
                false
            }
            Entry::Vacant(slot) => {
                log::debug!("registered resource {} -> {}", slot.key(), handle.a1_range());
                slot.insert(Arc::new(Mutex::new(CacheEntry {
                    handle,
                    resource: None,
                    stale: true,
                })));
                true
            }
        }
    }

    /// Current snapshot of `name`, fetching first if it is stale.
    pub fn get(&self, name: &str) -> Result<Arc<SortedResource>> {
        let entry = self.entry(name)?;
        let mut entry = lock_entry(&entry);
        if !entry.stale {
            if let Some(resource) = &entry.resource {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(resource));
            }
        }
        self.reload(name, &mut entry)
    }

    /// Last installed snapshot, stale or not, without fetching.
    pub fn peek(&self, name: &str) -> Result<Option<Arc<SortedResource>>> {
        let entry = self.entry(name)?;
        let entry = lock_entry(&entry);
        Ok(entry.resource.clone())
    }

    /// Mark `name` stale; the next `get` refetches it.
    pub fn set_stale(&self, name: &str) -> Result<()> {
        let entry = self.entry(name)?;
        lock_entry(&entry).stale = true;
        Ok(())
    }

    /// Fetch and rebuild `name` regardless of staleness.
    pub fn refresh(&self, name: &str) -> Result<Arc<SortedResource>> {
        let entry = self.entry(name)?;
        let mut entry = lock_entry(&entry);
        self.reload(name, &mut entry)
    }

    /// Refresh every registered resource in name order, stopping at the first
    /// error. Resources after the failing one keep their previous state.
    pub fn refresh_all(&self) -> Result<()> {
        for name in self.names() {
            self.refresh(&name)?;
        }
        Ok(())
    }

    pub fn is_stale(&self, name: &str) -> Result<bool> {
        let entry = self.entry(name)?;
        let stale = lock_entry(&entry).stale;
        Ok(stale)
    }

    pub fn handle(&self, name: &str) -> Result<ResourceHandle> {
        let entry = self.entry(name)?;
        let handle = lock_entry(&entry).handle.clone();
        Ok(handle)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats_snapshot(&self) -> CacheStats {
        CacheStats {
            fetches: self.stats.fetches.load(Ordering::Relaxed),
            hits: self.stats.hits.load(Ordering::Relaxed),
            failures: self.stats.failures.load(Ordering::Relaxed),
        }
    }

    fn entry(&self, name: &str) -> Result<Arc<Mutex<CacheEntry>>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::NotRegistered {
                name: name.to_string(),
            })
    }

    /// Fetch, build and install a new snapshot. On failure the entry is left
    /// exactly as it was.
    fn reload(&self, name: &str, entry: &mut CacheEntry) -> Result<Arc<SortedResource>> {
        log::debug!("refreshing resource {name} from {}", entry.handle.a1_range());
        self.stats.fetches.fetch_add(1, Ordering::Relaxed);

        let rows = match self.source.fetch(&entry.handle, self.config.fetch_timeout) {
            Ok(rows) => rows,
            Err(source) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                log::warn!("fetch of resource {name} failed: {source}");
                return Err(CacheError::FetchFailed {
                    name: name.to_string(),
                    source,
                });
            }
        };

        let resource = SortedResource::build(rows, entry.handle.tag_kind, &self.config.clock)
            .map_err(|source| {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                log::warn!("resource {name} is malformed: {source}");
                CacheError::MalformedResource {
                    name: name.to_string(),
                    source,
                }
            })?;

        let resource = Arc::new(resource);
        log::debug!("resource {name} holds {} rows", resource.len());
        entry.resource = Some(Arc::clone(&resource));
        entry.stale = false;
        Ok(resource)
    }
}

// Entries are only ever replaced wholesale, so a panic while one was locked
// cannot leave it half-written.
fn lock_entry(entry: &Mutex<CacheEntry>) -> MutexGuard<'_, CacheEntry> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}
