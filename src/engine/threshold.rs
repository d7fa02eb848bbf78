use crate::settings::{Operator, Threshold};

/// Badge color used when no threshold matches.
pub const DEFAULT_COLOR: &str = "#cccccc";

/// Evaluation order for `thresholds`: every `>` entry goes last in the
/// order it was given, everything else ascends by value. Ties keep their
/// original order.
pub fn ordered(thresholds: &[Threshold]) -> Vec<&Threshold> {
    let mut sorted: Vec<&Threshold> = thresholds.iter().collect();
    sorted.sort_by_key(|t| match t.operator {
        Operator::Greater => (1, 0),
        _ => (0, t.value),
    });
    sorted
}

/// Color of the first threshold in evaluation order satisfied by `days`,
/// falling back to `default`.
pub fn evaluate_or<'a>(days: i64, thresholds: &'a [Threshold], default: &'a str) -> &'a str {
    ordered(thresholds)
        .into_iter()
        .find(|t| t.operator.holds(days, t.value))
        .map(|t| t.color.as_str())
        .unwrap_or(default)
}

pub fn evaluate(days: i64, thresholds: &[Threshold]) -> &str {
    evaluate_or(days, thresholds, DEFAULT_COLOR)
}
