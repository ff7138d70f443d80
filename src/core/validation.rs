// ─── Validation Filter ───
// Strips user-ignored entries out of the repair worker's validation report.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::patterns::matches_pattern;

/// A single invalid file reported by the repair worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationEntry {
    pub id: String,
    pub path: String,
}

/// Validation results grouped by category (e.g. "mods", "assets").
/// Category insertion order is preserved.
pub type ValidationReport = IndexMap<String, Vec<ValidationEntry>>;

/// Remove entries whose path matches any ignore pattern.
///
/// Category keys are always kept, even when every entry in a category is
/// filtered out. With an empty pattern set the report passes through
/// untouched.
pub fn filter_ignored(report: ValidationReport, patterns: &[String]) -> ValidationReport {
    if patterns.is_empty() {
        debug!("No ignored file patterns configured");
        return report;
    }

    info!(
        "Filtering validation results with {} ignore pattern(s)",
        patterns.len()
    );
    debug!("Ignore patterns: {:?}", patterns);

    let mut total_filtered = 0usize;
    let filtered: ValidationReport = report
        .into_iter()
        .map(|(category, entries)| {
            let kept: Vec<ValidationEntry> = entries
                .into_iter()
                .filter(|entry| {
                    let ignore = matches_pattern(&entry.path, patterns);
                    if ignore {
                        debug!("Ignoring entry: {} ({})", entry.id, entry.path);
                        total_filtered += 1;
                    }
                    !ignore
                })
                .collect();
            (category, kept)
        })
        .collect();

    if total_filtered > 0 {
        info!("Filtered out {} entry(ies) from validation", total_filtered);
    }

    filtered
}

/// Total number of invalid entries across all categories.
pub fn count_invalid(report: &ValidationReport) -> usize {
    report.values().map(Vec::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, path: &str) -> ValidationEntry {
        ValidationEntry {
            id: id.to_string(),
            path: path.to_string(),
        }
    }

    fn sample_report() -> ValidationReport {
        let mut report = ValidationReport::new();
        report.insert(
            "mods".to_string(),
            vec![
                entry("optifine", "mods/OptiFine.jar"),
                entry("jei", "mods/jei.jar"),
            ],
        );
        report.insert(
            "config".to_string(),
            vec![entry("options", "config/options.txt")],
        );
        report.insert("assets".to_string(), Vec::new());
        report
    }

    #[test]
    fn empty_patterns_is_identity() {
        let report = sample_report();
        let filtered = filter_ignored(report.clone(), &[]);
        assert_eq!(filtered, report);
    }

    #[test]
    fn matching_entries_are_removed() {
        let filtered = filter_ignored(sample_report(), &["mods/OptiFine.jar".to_string()]);
        assert_eq!(
            filtered["mods"],
            vec![entry("jei", "mods/jei.jar")]
        );
        assert_eq!(filtered["config"].len(), 1);
    }

    #[test]
    fn category_keys_survive_even_when_emptied() {
        let filtered = filter_ignored(sample_report(), &["**".to_string()]);
        let keys: Vec<&String> = filtered.keys().collect();
        assert_eq!(keys, ["mods", "config", "assets"]);
        assert!(filtered.values().all(Vec::is_empty));
    }

    #[test]
    fn category_order_is_preserved() {
        let filtered = filter_ignored(sample_report(), &["*.jar".to_string()]);
        let keys: Vec<&String> = filtered.keys().collect();
        assert_eq!(keys, ["mods", "config", "assets"]);
    }

    #[test]
    fn count_totals_across_categories() {
        let report = sample_report();
        assert_eq!(count_invalid(&report), 3);

        let filtered = filter_ignored(report, &["*.jar".to_string()]);
        assert_eq!(count_invalid(&filtered), 1);
    }

    #[test]
    fn count_of_empty_report_is_zero() {
        assert_eq!(count_invalid(&ValidationReport::new()), 0);
    }
}
