//! Lexical comparison helpers shared by the detection strategies.
//!
//! Deliberately keyword-level: the pluggable scoring strategy is where
//! semantic models plug in, while detection itself stays deterministic.

use std::collections::BTreeSet;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "at", "but", "by", "for", "in", "is", "it", "of", "on", "or", "the", "to",
    "was", "with",
];

const NEGATIONS: &[&str] = &[
    "not", "never", "no", "cannot", "without", "barely", "hardly",
];

/// Lowercased alphanumeric tokens, stopwords removed.
pub(crate) fn tokens(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .filter(|word| !STOPWORDS.contains(&word.as_str()))
        .collect()
}

/// Jaccard overlap of the two texts' token sets in `[0, 1]`.
/// Zero when either side has no tokens.
pub(crate) fn overlap(a: &str, b: &str) -> f64 {
    let left = tokens(a);
    let right = tokens(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.union(&right).count();
    #[allow(clippy::cast_precision_loss)]
    {
        shared as f64 / union as f64
    }
}

/// Jaccard overlap of two pre-tokenized tag sets.
pub(crate) fn tag_overlap<'a>(
    left: impl IntoIterator<Item = &'a str>,
    right: impl IntoIterator<Item = &'a str>,
) -> f64 {
    let left: BTreeSet<String> = left.into_iter().map(str::to_lowercase).collect();
    let right: BTreeSet<String> = right.into_iter().map(str::to_lowercase).collect();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.union(&right).count();
    #[allow(clippy::cast_precision_loss)]
    {
        shared as f64 / union as f64
    }
}

/// True when exactly one side negates while both share a content token —
/// "takes the stairs" vs "never takes the stairs".
pub(crate) fn opposes(a: &str, b: &str) -> bool {
    let negated = |text: &str| {
        text.split(|c: char| !c.is_alphanumeric())
            .any(|word| NEGATIONS.contains(&word.to_lowercase().as_str()))
    };
    let left = tokens(a);
    let right = tokens(b);
    (negated(a) != negated(b)) && left.intersection(&right).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_of_restatement_is_high() {
        let value = overlap("John fears heights badly", "John fears heights");
        assert!(value > 0.7, "got {value}");
    }

    #[test]
    fn test_overlap_of_unrelated_statements_is_low() {
        let value = overlap("climbs the tower fearlessly", "fears heights");
        assert!(value < 0.25, "got {value}");
    }

    #[test]
    fn test_overlap_with_empty_side_is_zero() {
        assert!((overlap("", "fears heights") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_opposes_detects_single_sided_negation() {
        assert!(opposes("takes the stairs", "never takes the stairs"));
    }

    #[test]
    fn test_opposes_requires_shared_tokens() {
        assert!(!opposes("never hesitates", "loves the sea"));
    }

    #[test]
    fn test_opposes_is_false_when_both_negate() {
        assert!(!opposes("never takes the stairs", "does not take the stairs"));
    }
}
