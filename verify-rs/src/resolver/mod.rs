//! MX resolution for verification probes
//!
//! This module answers one question: which host receives mail for a domain?
//!
//! # Features
//! - MX record lookup via trust-dns
//! - Lowest-preference record selection
//! - Bounded in-process cache with LRU eviction
//! - Pluggable lookup backend so tests run without real DNS

use crate::error::{Result, VerifyError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Backend that answers MX queries
#[async_trait]
pub trait MxLookup: Send + Sync {
    /// Return `(preference, exchange)` pairs for a domain
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<(u16, String)>>;
}

/// Live DNS lookups through the system resolver configuration
pub struct DnsMx {
    resolver: TokioAsyncResolver,
}

impl DnsMx {
    pub fn new() -> Self {
        let resolver =
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
        Self { resolver }
    }
}

impl Default for DnsMx {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MxLookup for DnsMx {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<(u16, String)>> {
        let lookup = self
            .resolver
            .mx_lookup(domain)
            .await
            .map_err(|e| VerifyError::DnsLookup(format!("{}: {}", domain, e)))?;

        let records = lookup
            .iter()
            .map(|mx| {
                let exchange = mx.exchange().to_string().trim_end_matches('.').to_string();
                (mx.preference(), exchange)
            })
            .collect();

        Ok(records)
    }
}

struct CacheEntry {
    host: String,
    last_used: u64,
}

/// Cache body: entries plus a monotonic tick used for recency ordering
struct MxCache {
    entries: HashMap<String, CacheEntry>,
    tick: u64,
}

impl MxCache {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            tick: 0,
        }
    }

    fn get(&mut self, domain: &str) -> Option<String> {
        self.tick += 1;
        let tick = self.tick;
        let entry = self.entries.get_mut(domain)?;
        entry.last_used = tick;
        Some(entry.host.clone())
    }

    fn insert(&mut self, domain: String, host: String, capacity: usize) {
        self.tick += 1;
        if !self.entries.contains_key(&domain) && self.entries.len() >= capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(domain, _)| domain.clone());
            if let Some(oldest) = oldest {
                debug!("Evicting cached MX for {}", oldest);
                self.entries.remove(&oldest);
            }
        }
        let tick = self.tick;
        self.entries.insert(
            domain,
            CacheEntry {
                host,
                last_used: tick,
            },
        );
    }
}

/// Caching resolver shared by all verification workers
pub struct MxResolver {
    lookup: Arc<dyn MxLookup>,
    cache: RwLock<MxCache>,
    capacity: usize,
    timeout: Duration,
}

impl MxResolver {
    pub fn new(lookup: Arc<dyn MxLookup>, capacity: usize, timeout: Duration) -> Self {
        Self {
            lookup,
            cache: RwLock::new(MxCache::new()),
            capacity,
            timeout,
        }
    }

    /// Most-preferred mail-exchange host for `domain`
    ///
    /// Returns `None` on every failure mode: no records, nonexistent domain,
    /// lookup timeout, resolver error. Successful answers are cached for the
    /// life of the process; concurrent lookups for the same domain may race,
    /// in which case the last writer wins.
    pub async fn resolve(&self, domain: &str) -> Option<String> {
        if let Some(host) = self.cache.write().await.get(domain) {
            debug!("MX cache hit for {}", domain);
            return Some(host);
        }

        let records = match tokio::time::timeout(self.timeout, self.lookup.lookup_mx(domain)).await
        {
            Ok(Ok(records)) => records,
            Ok(Err(e)) => {
                warn!("MX lookup failed for {}: {}", domain, e);
                return None;
            }
            Err(_) => {
                warn!("MX lookup timed out for {}", domain);
                return None;
            }
        };

        let mut records = records;
        records.sort_by_key(|(preference, _)| *preference);

        let host = match records.into_iter().next() {
            Some((_, host)) if !host.is_empty() => host,
            _ => {
                warn!("No MX records found for {}", domain);
                return None;
            }
        };

        debug!("Resolved MX for {}: {}", domain, host);
        self.cache
            .write()
            .await
            .insert(domain.to_string(), host.clone(), self.capacity);

        Some(host)
    }
}
