//! Shared JSON fixtures for folio tests and benches.
//!
//! `fixtures/manifest.json` maps fixture names to files under `fixtures/`,
//! grouped by kind (variant sheets, scenes).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "variant-sheets")]
    variant_sheets: BTreeMap<String, Entry>,
    scenes: BTreeMap<String, Entry>,
}

/// A manifest entry: a bare relative path or `{ "path": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Path(String),
    Detailed { path: String },
}

impl Entry {
    fn rel(&self) -> &str {
        match self {
            Entry::Path(path) | Entry::Detailed { path } => path,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum Kind {
    VariantSheet,
    Scene,
}

impl Kind {
    fn entries(self) -> &'static BTreeMap<String, Entry> {
        match self {
            Kind::VariantSheet => &MANIFEST.variant_sheets,
            Kind::Scene => &MANIFEST.scenes,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Kind::VariantSheet => "variant sheet",
            Kind::Scene => "scene",
        }
    }

    fn locate(self, name: &str) -> Result<PathBuf> {
        let entry = self
            .entries()
            .get(name)
            .ok_or_else(|| anyhow!("no {} fixture named '{name}'", self.label()))?;
        Ok(Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(entry.rel()))
    }

    fn names(self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }

    fn read(self, name: &str) -> Result<String> {
        let path = self.locate(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("reading {} fixture {}", self.label(), path.display()))
    }

    fn parse<T: DeserializeOwned>(self, name: &str) -> Result<T> {
        let text = self.read(name)?;
        serde_json::from_str(&text)
            .with_context(|| format!("decoding {} fixture '{name}'", self.label()))
    }
}

/// Variant sheets: `{ scope: { label: variant } }` JSON files.
pub mod variant_sheets {
    use super::*;

    pub fn keys() -> Vec<String> {
        Kind::VariantSheet.names()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::VariantSheet.read(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Kind::VariantSheet.parse(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Kind::VariantSheet.locate(name)
    }
}

/// Scenes: node trees to mount, one `NodeConfig` per entry.
pub mod scenes {
    use super::*;

    pub fn keys() -> Vec<String> {
        Kind::Scene.names()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Scene.read(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Kind::Scene.parse(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Kind::Scene.locate(name)
    }
}
