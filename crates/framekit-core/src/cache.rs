//! Process-wide resource cache statistics.

use serde::Serialize;
use std::cell::{Cell, RefCell};
use tracing::debug;

/// Memory pressure levels broadcast to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryPressureLevel {
    Moderate,
    Critical,
}

/// Kind of cached resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    CssStyleSheet,
    Script,
    XslStyleSheet,
    Font,
    Other,
}

/// Handle to a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(u64);

/// One cached resource.
#[derive(Debug, Clone)]
pub struct CachedResource {
    pub kind: ResourceType,
    /// Encoded size in bytes.
    pub size: u64,
    /// Decoded size in bytes (images).
    pub decoded_size: u64,
    /// Still referenced by a document.
    pub live: bool,
}

/// Totals for one resource type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTypeStat {
    pub count: u64,
    pub size: u64,
    pub live_size: u64,
    pub decoded_size: u64,
}

/// Totals for every resource type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTypeStats {
    pub images: ResourceTypeStat,
    pub css_style_sheets: ResourceTypeStat,
    pub scripts: ResourceTypeStat,
    pub xsl_style_sheets: ResourceTypeStat,
    pub fonts: ResourceTypeStat,
    pub other: ResourceTypeStat,
}

impl ResourceTypeStats {
    fn bucket(&mut self, kind: ResourceType) -> &mut ResourceTypeStat {
        match kind {
            ResourceType::Image => &mut self.images,
            ResourceType::CssStyleSheet => &mut self.css_style_sheets,
            ResourceType::Script => &mut self.scripts,
            ResourceType::XslStyleSheet => &mut self.xsl_style_sheets,
            ResourceType::Font => &mut self.fonts,
            ResourceType::Other => &mut self.other,
        }
    }
}

/// In-memory resource cache.
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: RefCell<Vec<(ResourceId, CachedResource)>>,
    next_id: Cell<u64>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, resource: CachedResource) -> ResourceId {
        let id = ResourceId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, resource));
        id
    }

    /// Mark an entry as (no longer) referenced.
    pub fn set_live(&self, id: ResourceId, live: bool) {
        if let Some((_, entry)) = self.entries.borrow_mut().iter_mut().find(|(i, _)| *i == id) {
            entry.live = live;
        }
    }

    pub fn stats(&self) -> ResourceTypeStats {
        let mut stats = ResourceTypeStats::default();
        for (_, entry) in self.entries.borrow().iter() {
            let bucket = stats.bucket(entry.kind);
            bucket.count += 1;
            bucket.size += entry.size;
            bucket.decoded_size += entry.decoded_size;
            if entry.live {
                bucket.live_size += entry.size;
            }
        }
        stats
    }

    /// Evict everything no document still references.
    pub fn clear(&self) {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(_, entry)| entry.live);
        debug!(evicted = before - entries.len(), kept = entries.len(), "Resource cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(kind: ResourceType, size: u64, live: bool) -> CachedResource {
        CachedResource {
            kind,
            size,
            decoded_size: if kind == ResourceType::Image { size * 4 } else { 0 },
            live,
        }
    }

    #[test]
    fn test_stats_by_type() {
        let cache = ResourceCache::new();
        cache.insert(resource(ResourceType::Image, 100, true));
        cache.insert(resource(ResourceType::Image, 50, false));
        cache.insert(resource(ResourceType::Script, 10, true));

        let stats = cache.stats();
        assert_eq!(stats.images.count, 2);
        assert_eq!(stats.images.size, 150);
        assert_eq!(stats.images.live_size, 100);
        assert_eq!(stats.images.decoded_size, 600);
        assert_eq!(stats.scripts.count, 1);
        assert_eq!(stats.fonts, ResourceTypeStat::default());
    }

    #[test]
    fn test_clear_keeps_live_entries() {
        let cache = ResourceCache::new();
        let logo = cache.insert(resource(ResourceType::Image, 100, true));
        cache.insert(resource(ResourceType::Font, 30, false));

        cache.clear();
        assert_eq!(cache.stats().fonts.count, 0);
        assert_eq!(cache.stats().images.count, 1);

        cache.set_live(logo, false);
        cache.clear();
        assert_eq!(cache.stats(), ResourceTypeStats::default());
    }
}
