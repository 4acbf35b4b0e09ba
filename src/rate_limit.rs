use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::time::interval;
use crate::metrics::RATE_LIMIT_ENTRIES;

// Rate limit entry - tracks requests per masked client key
#[derive(Debug, Clone)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
}

impl RateLimitEntry {
    fn open(now: Instant, window: Duration) -> Self {
        Self {
            count: 1,
            reset_at: now + window,
        }
    }
}

// Result of one rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub allowed: bool,
    pub reset_at: Option<Instant>, // only set when denied
}

impl RateLimitStatus {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reset_at: None,
        }
    }

    fn denied(reset_at: Instant) -> Self {
        Self {
            allowed: false,
            reset_at: Some(reset_at),
        }
    }

    // Whole seconds until the window reopens, rounded up
    pub fn retry_after_secs(&self, now: Instant) -> Option<u64> {
        self.reset_at.map(|reset| {
            let millis = reset.saturating_duration_since(now).as_millis() as u64;
            millis.div_ceil(1000).max(1)
        })
    }
}

/// Fixed-window request counter keyed by masked client address.
///
/// The `entry` API holds the shard lock across read, check and increment,
/// so two concurrent requests for the same key cannot both take the last
/// slot.
///
/// The table never holds more than `capacity` keys. New keys are inserted
/// under the `admission` lock, so the size check, eviction and insert are
/// one step even with many threads.
///
/// A full table of live windows evicts unlimited entries first. If every
/// entry is limited, one of them loses its count and that client gets up to
/// `max_requests` more inside the same window: the per-window limit is not
/// kept for it.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    admission: Mutex<()>,
    max_requests: u32, // max requests allowed per window
    window: Duration,
    capacity: usize,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            admission: Mutex::new(()),
            max_requests,
            window,
            capacity: capacity.max(1),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn check(&self, key: &str) -> RateLimitStatus {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitStatus {
        if let Some(mut entry) = self.entries.get_mut(key) {
            return self.count(&mut entry, now);
        }

        // only place keys are inserted, so len() cannot pass capacity
        let _admission = self.admission.lock().unwrap_or_else(PoisonError::into_inner);
        if self.entries.len() >= self.capacity && !self.entries.contains_key(key) {
            self.make_room(now);
        }

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => self.count(occupied.get_mut(), now),
            Entry::Vacant(vacant) => {
                vacant.insert(RateLimitEntry::open(now, self.window));
                RateLimitStatus::allowed()
            }
        }
    }

    fn count(&self, entry: &mut RateLimitEntry, now: Instant) -> RateLimitStatus {
        // window expired..? start a fresh one
        if now > entry.reset_at {
            *entry = RateLimitEntry::open(now, self.window);
            return RateLimitStatus::allowed();
        }

        if entry.count >= self.max_requests {
            return RateLimitStatus::denied(entry.reset_at);
        }

        entry.count += 1;
        RateLimitStatus::allowed()
    }

    // Drop every entry whose window has closed, returns how many went
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.reset_at);
        before.saturating_sub(self.entries.len())
    }

    fn make_room(&self, now: Instant) {
        self.sweep_expired(now);
        if self.entries.len() < self.capacity {
            return;
        }

        // Still full of live windows: evict the one closest to reset,
        // preferring clients that are not currently limited
        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| (entry.count >= self.max_requests, entry.reset_at))
            .map(|entry| (entry.key().clone(), entry.count >= self.max_requests));
        if let Some((key, was_limited)) = victim {
            self.entries.remove(&key);
            if was_limited {
                tracing::warn!(key = %key, "rate limit table full of limited clients, evicted a live limited window");
            } else {
                tracing::debug!(key = %key, "rate limit table full, evicted oldest window");
            }
        }
    }
}

/// Privacy-preserving rate limit key: the most specific address segment is
/// replaced, so `192.168.1.100` becomes `192.168.1.xxx`.
pub fn mask_client_key(ip: &str) -> String {
    let ip = ip.trim();
    if ip.is_empty() || ip == "unknown" {
        return "anonymous".to_string();
    }

    if ip.contains('.') {
        let parts: Vec<&str> = ip.split('.').collect();
        if parts.len() == 4 {
            return format!("{}.{}.{}.xxx", parts[0], parts[1], parts[2]);
        }
    }

    if ip.contains(':') {
        let parts: Vec<&str> = ip.split(':').collect();
        if parts.len() > 1 {
            return format!("{}:xxxx", parts[..parts.len() - 1].join(":"));
        }
    }

    "masked".to_string()
}

// Background sweep - keeps the table small between bursts
pub async fn sweeper(limiter: Arc<RateLimiter>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);

    tracing::info!(interval = ?sweep_interval, "rate limit sweeper started");

    loop {
        interval.tick().await;

        let removed = limiter.sweep_expired(Instant::now());
        RATE_LIMIT_ENTRIES.set(limiter.len() as f64);
        if removed > 0 {
            tracing::debug!(removed, remaining = limiter.len(), "swept expired rate limit windows");
        }
    }
}
