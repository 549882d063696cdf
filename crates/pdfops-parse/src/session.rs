//! Caches shared across every stream analyzed for one document.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use lopdf::ObjectId;
use pdfops_core::{ColorSpace, FormXObject, InterpretOptions, PdfFlavour};
use tracing::debug;

use crate::font::Font;

/// A get-or-insert map. The first value stored for a key wins; later
/// inserts get the stored value back.
#[derive(Debug)]
pub struct SharedCache<K, V> {
    name: &'static str,
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K: Eq + Hash + Clone + std::fmt::Debug, V> SharedCache<K, V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        // A poisoned lock still holds a consistent map: values are only
        // ever inserted whole.
        let hit = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();
        debug!(cache = self.name, ?key, hit = hit.is_some(), "cache lookup");
        hit
    }

    pub fn get_or_insert(&self, key: K, value: Arc<V>) -> Arc<V> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key).or_insert(value))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Options plus resolution caches for one document.
///
/// Passed by reference to every analysis entry point. Safe to share across
/// threads analyzing different streams.
#[derive(Debug)]
pub struct ValidationSession {
    options: InterpretOptions,
    pub(crate) color_spaces: SharedCache<ObjectId, ColorSpace>,
    pub(crate) fonts: SharedCache<ObjectId, Font>,
    pub(crate) forms: SharedCache<ObjectId, FormXObject>,
    pub(crate) separations: SharedCache<String, ColorSpace>,
}

impl Default for ValidationSession {
    fn default() -> Self {
        Self::new(InterpretOptions::default())
    }
}

impl ValidationSession {
    pub fn new(options: InterpretOptions) -> Self {
        Self {
            options,
            color_spaces: SharedCache::new("color_space"),
            fonts: SharedCache::new("font"),
            forms: SharedCache::new("form"),
            separations: SharedCache::new("separation"),
        }
    }

    pub fn options(&self) -> &InterpretOptions {
        &self.options
    }

    pub fn flavour(&self) -> Option<PdfFlavour> {
        self.options.flavour
    }

    /// Separation spaces seen so far, keyed by colorant name.
    pub fn separation(&self, colorant: &str) -> Option<Arc<ColorSpace>> {
        self.separations.get(&colorant.to_string())
    }

    pub fn separation_count(&self) -> usize {
        self.separations.len()
    }
}
