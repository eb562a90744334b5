//! Pagination descriptors and metadata extraction.
//!
//! A paginator descriptor is a flat mapping holding the page items under
//! `data` plus positional keys (`total`, `per_page`, `current_page`, ...).
//! [`Page`] produces one; [`extract_meta`] projects any descriptor down to
//! the configured allow-list.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::PaginationConfig;
use crate::error::CoreError;

/// Key holding the page items inside a descriptor.
pub const DATA_KEY: &str = "data";

/// Query parameter used when building page URLs.
pub const PAGE_PARAM: &str = "page";

/// Project a descriptor onto the configured allow-list.
///
/// Returns `{ meta_field: { ...allow-listed keys present in descriptor } }`.
/// Keys follow allow-list order; keys absent from the descriptor are skipped.
pub fn extract_meta(descriptor: &Map<String, Value>, config: &PaginationConfig) -> Map<String, Value> {
    let filtered: Map<String, Value> = config
        .return_fields
        .iter()
        .filter_map(|field| descriptor.get(field).map(|v| (field.clone(), v.clone())))
        .collect();

    let mut meta = Map::new();
    meta.insert(config.meta_field.clone(), Value::Object(filtered));
    meta
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// One page of a length-aware result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    total: u64,
    per_page: u64,
    current_page: u64,
    path: String,
}

impl<T> Page<T> {
    /// `per_page` and `current_page` are clamped to at least 1.
    pub fn new(items: Vec<T>, total: u64, per_page: u64, current_page: u64, path: impl Into<String>) -> Self {
        Self {
            items,
            total,
            per_page: per_page.max(1),
            current_page: current_page.max(1),
            path: path.into(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    /// Last page number; never below 1, even for an empty result set.
    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }

    /// 1-based index of the first item on this page, `None` when empty.
    pub fn first_item(&self) -> Option<u64> {
        if self.items.is_empty() {
            None
        } else {
            Some(
                (self.current_page - 1)
                    .saturating_mul(self.per_page)
                    .saturating_add(1),
            )
        }
    }

    /// 1-based index of the last item on this page, `None` when empty.
    pub fn last_item(&self) -> Option<u64> {
        self.first_item()
            .map(|first| first.saturating_add(self.items.len() as u64 - 1))
    }

    pub fn url(&self, page: u64) -> String {
        format!("{}?{PAGE_PARAM}={}", self.path, page.max(1))
    }

    pub fn previous_page_url(&self) -> Option<String> {
        (self.current_page > 1).then(|| self.url(self.current_page - 1))
    }

    pub fn next_page_url(&self) -> Option<String> {
        (self.current_page < self.last_page()).then(|| self.url(self.current_page + 1))
    }

    /// Convert the items while keeping the positional metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            per_page: self.per_page,
            current_page: self.current_page,
            path: self.path,
        }
    }

    /// The descriptor without its `data` key.
    pub fn meta(&self) -> Map<String, Value> {
        let mut meta = Map::new();
        meta.insert("current_page".into(), json!(self.current_page));
        meta.insert("first_page_url".into(), json!(self.url(1)));
        meta.insert("from".into(), json!(self.first_item()));
        meta.insert("last_page".into(), json!(self.last_page()));
        meta.insert("last_page_url".into(), json!(self.url(self.last_page())));
        meta.insert("next_page_url".into(), json!(self.next_page_url()));
        meta.insert("path".into(), json!(self.path));
        meta.insert("per_page".into(), json!(self.per_page));
        meta.insert("prev_page_url".into(), json!(self.previous_page_url()));
        meta.insert("to".into(), json!(self.last_item()));
        meta.insert("total".into(), json!(self.total));
        meta
    }
}

impl<T: Serialize> Page<T> {
    /// Full descriptor: positional metadata plus the serialized items under `data`.
    pub fn descriptor(&self) -> Result<Map<String, Value>, CoreError> {
        let data = serde_json::to_value(&self.items)?;
        let mut descriptor = Map::new();
        descriptor.insert("current_page".into(), json!(self.current_page));
        descriptor.insert(DATA_KEY.into(), data);
        for (key, value) in self.meta() {
            descriptor.entry(key).or_insert(value);
        }
        Ok(descriptor)
    }
}
