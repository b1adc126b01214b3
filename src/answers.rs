use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

const ANGLE_WORD: &str = "angle ";
const ANGLE_SYMBOL: &str = "∠";

static MODEL_OUTPUT_SEPARATORS: OnceLock<Regex> = OnceLock::new();

fn model_output_separators() -> &'static Regex {
    MODEL_OUTPUT_SEPARATORS
        .get_or_init(|| Regex::new(r"[\n,;]+").expect("valid separator regex"))
}

/// Applies the substitutions shared by every answer fragment: the spelled
/// out "angle " becomes ∠ and underscores disappear.
fn substitute_symbols(text: &str) -> String {
    text.replace(ANGLE_WORD, ANGLE_SYMBOL).replace('_', "")
}

/// Canonical comparison token for one answer item.
///
/// `"angle ABC"`, `"∠ABC"` and `" ∠ a b c "` all normalize to `"∠ABC"`.
/// Empty input yields an empty token.
pub fn normalize_answer_item(item: &str) -> String {
    substitute_symbols(item)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// A set of normalized answer tokens.
///
/// Built either from a ground-truth answer (`"[AB, BC]"`) or from free-text
/// model output. Ordering is only kept so logs and tests are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnswerSet(BTreeSet<String>);

impl AnswerSet {
    /// Parses a ground-truth answer, optionally wrapped in `[` `]`, as a
    /// comma separated list.
    pub fn from_ground_truth(answer: &str) -> Self {
        let inner = answer.trim().trim_matches(|c| c == '[' || c == ']');
        Self::from_items(inner.split(','))
    }

    /// Parses free-text model output. Items may be separated by any run of
    /// newlines, commas or semicolons.
    pub fn from_model_output(description: &str) -> Self {
        let processed = substitute_symbols(description);
        Self::from_items(model_output_separators().split(&processed))
    }

    fn from_items<'a>(items: impl Iterator<Item = &'a str>) -> Self {
        Self(
            items
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(normalize_answer_item)
                .filter(|item| !item.is_empty())
                .collect(),
        )
    }

    /// Membership test on the normalized form of `item`.
    pub fn contains(&self, item: &str) -> bool {
        self.0.contains(&normalize_answer_item(item))
    }

    pub fn intersects(&self, other: &AnswerSet) -> bool {
        self.0.iter().any(|item| other.0.contains(item))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Open-form correctness: at least one model answer matches one of the
/// accepted ground-truth items.
pub fn is_correct_answer(answer: &str, description: &str) -> bool {
    AnswerSet::from_ground_truth(answer)
        .intersects(&AnswerSet::from_model_output(description))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> AnswerSet {
        AnswerSet(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_normalize_rewrites_angle_word() {
        assert_eq!(normalize_answer_item("angle ABC"), "∠ABC");
        assert_eq!(normalize_answer_item("∠ABC"), "∠ABC");
        assert_eq!(normalize_answer_item(" ∠ a b\tc "), "∠ABC");
    }

    #[test]
    fn test_normalize_strips_underscores_and_case() {
        assert_eq!(normalize_answer_item("seg_ab"), "SEGAB");
        assert_eq!(normalize_answer_item("a d"), "AD");
        assert_eq!(normalize_answer_item(""), "");
        assert_eq!(normalize_answer_item("   "), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in [
            "angle ABC",
            "angle_ABC",
            "ANGLE ABC",
            "  ⊙o  ",
            "a_n_g_l_e x",
            "ß",
            "",
            "∠ b a c",
        ] {
            let once = normalize_answer_item(input);
            assert_eq!(normalize_answer_item(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_ground_truth_bracketed_list() {
        assert_eq!(
            AnswerSet::from_ground_truth("[AB, BC, CA]"),
            set(&["AB", "BC", "CA"])
        );
        assert_eq!(AnswerSet::from_ground_truth("AD"), set(&["AD"]));
        assert_eq!(
            AnswerSet::from_ground_truth("[angle ABC, ∠CBA]"),
            set(&["∠ABC", "∠CBA"])
        );
    }

    #[test]
    fn test_ground_truth_degenerate_inputs() {
        assert!(AnswerSet::from_ground_truth("").is_empty());
        assert!(AnswerSet::from_ground_truth("[]").is_empty());
        assert!(AnswerSet::from_ground_truth("[ , ,]").is_empty());
    }

    #[test]
    fn test_ground_truth_duplicates_collapse() {
        let answers = AnswerSet::from_ground_truth("[ab, AB, a b]");
        assert_eq!(answers.len(), 1);
        assert!(answers.contains("ab"));
    }

    #[test]
    fn test_model_output_separators() {
        assert_eq!(
            AnswerSet::from_model_output("AD\nP;; angle BAC,\n\n,Q"),
            set(&["AD", "P", "∠BAC", "Q"])
        );
        assert!(AnswerSet::from_model_output("\n,;\n").is_empty());
    }

    #[test]
    fn test_contains_is_case_and_whitespace_insensitive() {
        let answers = AnswerSet::from_model_output("∠BAC, P");
        assert!(answers.contains("angle bac"));
        assert!(answers.contains(" p "));
        assert!(!answers.contains("Q"));
    }

    #[test]
    fn test_is_correct_answer() {
        assert!(is_correct_answer("[AD]", "AD\nP"));
        assert!(!is_correct_answer("[XY]", "AD, P"));
        assert!(is_correct_answer("[∠ABC, ∠CBA]", "angle CBA"));
        assert!(!is_correct_answer("[]", "AD"));
        assert!(!is_correct_answer("[AD]", ""));
    }
}
