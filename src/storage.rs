use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::catalog::Page;

/// Keyed page cache with expiry. Entries live only as long as the process.
pub trait PageStore: Send + Sync {
    fn get_page(&self, key: &str, now: Instant) -> Option<Page>;
    fn put_page(&self, key: &str, page: Page, expires_at: Instant);
    /// Drop everything; returns how many entries were removed.
    fn clear(&self) -> usize;
}

struct CachedPage {
    page: Page,
    expires_at: Instant,
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, CachedPage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove expired entries.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let Ok(mut map) = self.entries.lock() else { return 0 };
        let before = map.len();
        map.retain(|_, c| c.expires_at > now);
        before - map.len()
    }
}

impl PageStore for MemoryStore {
    fn get_page(&self, key: &str, now: Instant) -> Option<Page> {
        let mut map = self.entries.lock().ok()?;
        match map.get(key) {
            Some(c) if c.expires_at > now => return Some(c.page.clone()),
            Some(_) => {}
            None => return None,
        }
        map.remove(key);
        None
    }

    // Expired entries are swept on every insert so the map tracks live pages only.
    fn put_page(&self, key: &str, page: Page, expires_at: Instant) {
        if let Ok(mut map) = self.entries.lock() {
            let now = Instant::now();
            map.retain(|_, c| c.expires_at > now);
            map.insert(key.to_string(), CachedPage { page, expires_at });
        }
    }

    fn clear(&self) -> usize {
        let Ok(mut map) = self.entries.lock() else { return 0 };
        let n = map.len();
        map.clear();
        n
    }
}

pub(crate) fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PageCursor;

    fn page(next: &str) -> Page {
        Page { records: Vec::new(), next_page: PageCursor::new(next) }
    }

    #[test]
    fn hit_until_expiry() {
        let store = MemoryStore::new();
        let now = Instant::now();
        store.put_page("p1", page("p2"), now + Duration::from_secs(10));

        assert_eq!(store.get_page("p1", now).unwrap().next_page.as_str(), "p2");
        assert!(store.get_page("p1", now + Duration::from_secs(10)).is_none());
        assert!(store.get_page("missing", now).is_none());
    }

    #[test]
    fn expired_entries_do_not_accumulate() {
        let store = MemoryStore::new();
        let past = Instant::now();
        store.put_page("p1", page("p2"), past);
        store.put_page("p2", page("p3"), past);
        assert_eq!(store.len(), 1);

        store.put_page("p3", page(""), Instant::now() + Duration::from_secs(60));
        assert_eq!(store.len(), 1);
        assert!(store.get_page("p3", Instant::now()).is_some());
    }

    #[test]
    fn expired_lookup_evicts_the_entry() {
        let store = MemoryStore::new();
        let now = Instant::now();
        store.put_page("p1", page(""), now + Duration::from_secs(5));
        assert!(store.get_page("p1", now + Duration::from_secs(6)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn purge_and_clear() {
        let store = MemoryStore::new();
        let now = Instant::now();
        store.put_page("new", page(""), now + Duration::from_secs(60));
        store.put_page("old", page(""), now);

        assert_eq!(store.purge_expired(now + Duration::from_secs(1)), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.clear(), 1);
        assert!(store.is_empty());
    }
}
