use chrono::NaiveDateTime;
use tracing::{debug, warn};

use super::matcher::RuleMatcher;
use crate::config::ConfigData;
use crate::dom::{Document, Style};
use crate::error::PatternError;
use crate::settings::RuleConfig;

/// Summary of one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub targets: usize,
    pub decorated: usize,
    pub badges: usize,
    pub rules_applied: usize,
    pub errors: Vec<PatternError>,
}

impl ScanReport {
    pub fn found_targets(&self) -> bool {
        self.targets > 0
    }
}

/// Undo every decoration left by a previous scan and drop all badges.
/// Returns how many elements were restored.
pub fn clear_decorations(doc: &mut Document, config: &ConfigData) -> usize {
    let markers = &config.markers;
    let styled = doc.elements_by_class(&markers.styled_class);

    for id in &styled {
        if let Some(element) = doc.element_mut(*id) {
            element.remove_class(&markers.styled_class);
            element.style = Style::parse(element.attribute(&markers.original_style_attr).unwrap_or(""));
            element.remove_attribute(&markers.original_style_attr);
            element.remove_attribute(&markers.config_id_attr);
        }
    }

    for badge in doc.elements_by_class(&config.badge.class) {
        doc.remove(badge);
    }

    debug!("Cleared {} decorated elements", styled.len());
    styled.len()
}

/// One full pass: clear, find the targets, apply the rules.
pub fn scan(
    doc: &mut Document,
    class_name: &str,
    rules: &[RuleConfig],
    config: &ConfigData,
    reference: NaiveDateTime,
) -> ScanReport {
    clear_decorations(doc, config);

    let targets = doc.elements_by_class(class_name);
    if targets.is_empty() {
        warn!("No elements found with class \"{}\"", class_name);
        return ScanReport::default();
    }

    let outcome = RuleMatcher::new(config, reference).apply_rules(doc, &targets, rules);

    ScanReport {
        targets: targets.len(),
        decorated: outcome.decorated.len(),
        badges: outcome.badged.len(),
        rules_applied: outcome.rules_applied,
        errors: outcome.errors,
    }
}
