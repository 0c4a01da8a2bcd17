use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
};

#[derive(Debug, Clone)]
struct Region {
    html: String,
    visible: bool,
}

/// Document
///
/// In-process stand-in for the page: named regions holding markup plus a
/// visibility flag. Controllers write into it; hosts and tests read from it.
#[derive(Debug, Default)]
pub struct Document {
    regions: Mutex<BTreeMap<String, Region>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a region's markup. A new region starts out visible; an existing
    /// one keeps its visibility.
    pub fn set_html(&self, region: &str, html: impl Into<String>) {
        let mut regions = self.regions.lock().unwrap_or_else(PoisonError::into_inner);
        let html = html.into();
        match regions.get_mut(region) {
            Some(existing) => existing.html = html,
            None => {
                regions.insert(region.to_string(), Region { html, visible: true });
            }
        }
    }

    pub fn html(&self, region: &str) -> Option<String> {
        self.regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(region)
            .map(|r| r.html.clone())
    }

    pub fn set_visible(&self, region: &str, visible: bool) {
        self.regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(region.to_string())
            .or_insert_with(|| Region {
                html: String::new(),
                visible,
            })
            .visible = visible;
    }

    /// Unknown regions are not visible.
    pub fn is_visible(&self, region: &str) -> bool {
        self.regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(region)
            .is_some_and(|r| r.visible)
    }

    pub fn remove(&self, region: &str) -> bool {
        self.regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(region)
            .is_some()
    }

    pub fn contains(&self, region: &str) -> bool {
        self.regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(region)
    }

    /// Region names starting with `prefix`, in sorted order.
    pub fn regions_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect()
    }
}
