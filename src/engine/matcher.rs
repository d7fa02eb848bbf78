use chrono::NaiveDateTime;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;
use tracing::{debug, error, info};

use super::badge::{self, Badge};
use crate::config::ConfigData;
use crate::dom::{Child, Document, NodeId, Style};
use crate::error::PatternError;
use crate::settings::RuleConfig;

/// Compile a rule's pattern for case-insensitive searching.
pub fn compile(rule: &RuleConfig) -> Result<Regex, PatternError> {
    RegexBuilder::new(&rule.pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| PatternError {
            rule: rule.name.clone(),
            rule_id: rule.id.clone(),
            source,
        })
}

/// What one pass of the rules did to the document.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub decorated: BTreeSet<NodeId>,
    /// Elements currently carrying a badge from this pass.
    pub badged: BTreeSet<NodeId>,
    pub rules_applied: usize,
    pub errors: Vec<PatternError>,
}

/// Applies rules to the descendants of target elements.
pub struct RuleMatcher<'a> {
    config: &'a ConfigData,
    reference: NaiveDateTime,
}

impl<'a> RuleMatcher<'a> {
    pub fn new(config: &'a ConfigData, reference: NaiveDateTime) -> Self {
        Self { config, reference }
    }

    /// Test every enabled rule, in order, against every descendant of
    /// `roots`. A rule whose pattern does not compile is reported and
    /// skipped; the remaining rules still run.
    pub fn apply_rules(
        &self,
        doc: &mut Document,
        roots: &[NodeId],
        rules: &[RuleConfig],
    ) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();

        for rule in rules {
            if !rule.enabled || rule.pattern.is_empty() {
                continue;
            }

            let regex = match compile(rule) {
                Ok(regex) => regex,
                Err(e) => {
                    error!("{}", e);
                    outcome.errors.push(e);
                    continue;
                }
            };

            for node in self.candidates(doc, roots) {
                let text = doc.text_content_skipping(node, &self.config.badge.class);
                if !regex.is_match(&text) {
                    continue;
                }

                if self.decorate(doc, node, rule) {
                    outcome.badged.remove(&node);
                }
                outcome.decorated.insert(node);

                if rule.enable_badge {
                    if let Some(badge) = badge::synthesize(
                        &text,
                        &rule.thresholds,
                        self.reference,
                        &self.config.badge.default_color,
                    ) {
                        self.attach_badge(doc, node, &badge);
                        outcome.badged.insert(node);
                    }
                }
            }

            outcome.rules_applied += 1;
            info!("Applied styles for config \"{}\"", rule.name);
        }

        outcome
    }

    /// Descendants of every root at the time of the call, minus badge
    /// overlays. Nested roots share descendants; each is listed once.
    fn candidates(&self, doc: &Document, roots: &[NodeId]) -> Vec<NodeId> {
        let mut seen = BTreeSet::new();
        roots
            .iter()
            .flat_map(|root| doc.descendants(*root))
            .filter(|id| {
                doc.element(*id)
                    .is_some_and(|e| !e.has_class(&self.config.badge.class))
            })
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Style `node` for `rule`. Returns whether an earlier rule had already
    /// styled it in this pass.
    fn decorate(&self, doc: &mut Document, node: NodeId, rule: &RuleConfig) -> bool {
        let markers = &self.config.markers;

        // An earlier rule in this scan owns the element: take it over, but
        // keep the style recorded before any rule touched it.
        let restyled = doc
            .element(node)
            .is_some_and(|e| e.has_class(&markers.styled_class));
        if restyled {
            self.detach_badges(doc, node);
        }

        let Some(element) = doc.element_mut(node) else {
            return restyled;
        };

        if !restyled {
            let original = element.style.css_text();
            element.set_attribute(&markers.original_style_attr, original);
        }
        element.set_attribute(&markers.config_id_attr, rule.id.clone());
        element.add_class(&markers.styled_class);

        if rule.enable_background {
            element.style.set("background-color", rule.background_color.clone());
        }
        if rule.enable_border {
            element.style.set("border", format!("1px solid {}", rule.border_color));
        }
        if rule.enable_font_size && rule.font_size > 0 {
            element.style.set("font-size", format!("{}px", rule.font_size));
        }
        if rule.enable_font_color {
            element.style.set("color", rule.font_color.clone());
        }

        debug!("Styled <{}> with config \"{}\"", element.tag, rule.name);
        restyled
    }

    fn attach_badge(&self, doc: &mut Document, node: NodeId, badge: &Badge) {
        let span = doc.create_element("span");
        if let Some(element) = doc.element_mut(span) {
            element.add_class(&self.config.badge.class);
            element.style = Style::parse(&badge.css_text());
        }
        doc.append_text(span, badge.label.clone());
        doc.append_child(node, span);
    }

    fn detach_badges(&self, doc: &mut Document, node: NodeId) {
        let badges: Vec<NodeId> = doc
            .element(node)
            .map(|e| {
                e.children()
                    .iter()
                    .filter_map(|child| match child {
                        Child::Element(id) => Some(*id),
                        Child::Text(_) => None,
                    })
                    .filter(|id| {
                        doc.element(*id)
                            .is_some_and(|c| c.has_class(&self.config.badge.class))
                    })
                    .collect()
            })
            .unwrap_or_default();

        for id in badges {
            doc.remove(id);
        }
    }
}
