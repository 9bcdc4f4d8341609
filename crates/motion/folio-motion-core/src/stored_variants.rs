//! Variant sheets: JSON files holding named variants grouped by scope.
//!
//! Parsing keeps file order so registration order is predictable.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::data::Variant;
use crate::error::{MotionError, Result};
use crate::registry::VariantRegistry;

/// Variant sheet: `{ "<scope>": { "<label>": <Variant> } }`, in file order.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct VariantSheet(IndexMap<String, IndexMap<String, Variant>>);

/// Public API: parse a variant sheet into `(scope, label, variant)` triples.
///
/// Notes:
/// - Durations and delays are seconds.
/// - A label's keyframes may be a single number (target) or a list (sequence).
/// - Validation happens on registration, not here.
pub fn parse_variant_sheet_json(s: &str) -> Result<Vec<(String, String, Variant)>> {
    let sheet: VariantSheet =
        serde_json::from_str(s).map_err(|e| MotionError::Parse(e.to_string()))?;
    Ok(sheet
        .0
        .into_iter()
        .flat_map(|(scope, labels)| {
            labels
                .into_iter()
                .map(move |(label, variant)| (scope.clone(), label, variant))
        })
        .collect())
}

/// Parse a sheet and register every variant under `scope.label`.
/// Returns the number registered. Stops at the first invalid or duplicate entry.
pub fn load_variant_sheet_json(registry: &mut VariantRegistry, s: &str) -> Result<usize> {
    let entries = parse_variant_sheet_json(s)?;
    let count = entries.len();
    for (scope, label, variant) in entries {
        registry.register(crate::registry::scoped_name(&scope, &label), variant)?;
    }
    log::debug!("loaded {count} variants from sheet");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Keyframes, Repeat};

    const SHEET: &str = r#"{
        "pulse": {
            "idle": { "keyframes": { "scale": 1 } },
            "active": {
                "keyframes": { "scale": [1, 1.05, 1] },
                "transition": { "duration": 2, "repeat": "infinite" }
            }
        }
    }"#;

    #[test]
    fn parses_in_file_order() {
        let entries = parse_variant_sheet_json(SHEET).unwrap();
        let names: Vec<_> = entries.iter().map(|(s, l, _)| format!("{s}.{l}")).collect();
        assert_eq!(names, ["pulse.idle", "pulse.active"]);
        let active = &entries[1].2;
        assert_eq!(active.transition.repeat, Repeat::Infinite);
        assert_eq!(
            active.keyframes["scale"],
            Keyframes::Sequence(vec![1.0, 1.05, 1.0])
        );
    }

    #[test]
    fn loads_into_registry() {
        let mut reg = VariantRegistry::new();
        assert_eq!(load_variant_sheet_json(&mut reg, SHEET).unwrap(), 2);
        assert!(reg.contains("pulse.active"));
        // Loading twice collides on names.
        assert!(matches!(
            load_variant_sheet_json(&mut reg, SHEET),
            Err(MotionError::DuplicateVariant(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            parse_variant_sheet_json("{ not json"),
            Err(MotionError::Parse(_))
        ));
    }
}
