//! Variant registry: a validated, immutable lookup table of named variants.
//!
//! Variants are usually registered in scoped sets (`fadeInUp.hidden`,
//! `fadeInUp.visible`) so sibling elements can share the labels a parent
//! fans out while each keeps its own definition.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::data::Variant;
use crate::error::{MotionError, Result};

/// Qualified registry name for `label` inside `scope`.
pub fn scoped_name(scope: &str, label: &str) -> String {
    format!("{scope}.{label}")
}

#[derive(Debug, Default)]
pub struct VariantRegistry {
    variants: HashMap<String, Arc<Variant>>,
}

impl VariantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a variant. Names are write-once.
    pub fn register(&mut self, name: impl Into<String>, variant: Variant) -> Result<Arc<Variant>> {
        let name = name.into();
        if self.variants.contains_key(&name) {
            return Err(MotionError::DuplicateVariant(name));
        }
        variant.validate(&name)?;
        let shared = Arc::new(variant);
        log::debug!("registered variant '{name}'");
        self.variants.insert(name, shared.clone());
        Ok(shared)
    }

    /// Register every `(label, variant)` under `scope`. Stops at the first error;
    /// labels registered before it stay registered.
    pub fn register_set<I, L>(&mut self, scope: &str, labels: I) -> Result<()>
    where
        I: IntoIterator<Item = (L, Variant)>,
        L: AsRef<str>,
    {
        for (label, variant) in labels {
            self.register(scoped_name(scope, label.as_ref()), variant)?;
        }
        Ok(())
    }

    /// Return the exact registered object for `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<Variant>> {
        self.variants
            .get(name)
            .cloned()
            .ok_or_else(|| MotionError::UnknownVariant(name.to_string()))
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.variants.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }
}
