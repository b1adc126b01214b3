use crate::answers::{is_correct_answer, AnswerSet};
use crate::category::Category;
use crate::options::OptionLetter;
use serde::Serialize;
use std::collections::BTreeMap;

/// Separator used when all model outputs are judged together.
pub const RESPONSE_SEPARATOR: &str = "\n";

/// How a ground-truth answer is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroundTruth {
    /// A multiple-choice answer such as `"B"` or `"[B]"`.
    Option(OptionLetter),
    /// A list of acceptable items such as `"[AD, DA]"`.
    OpenForm(AnswerSet),
}

impl GroundTruth {
    pub fn parse(answer: &str) -> Self {
        match OptionLetter::from_ground_truth(answer) {
            Some(letter) => GroundTruth::Option(letter),
            None => GroundTruth::OpenForm(AnswerSet::from_ground_truth(answer)),
        }
    }
}

/// The model's side of the comparison after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reconciled {
    /// The voted option letter, absent when nothing could be extracted.
    Voted { letter: Option<OptionLetter> },
    /// Every free-text response, original question first.
    Responses { responses: Vec<String> },
}

impl Reconciled {
    /// Short human-readable form for logs and the results file.
    pub fn describe(&self) -> String {
        match self {
            Reconciled::Voted { letter: Some(letter) } => letter.to_string(),
            Reconciled::Voted { letter: None } => "none".to_string(),
            Reconciled::Responses { responses } => {
                responses.join(RESPONSE_SEPARATOR)
            }
        }
    }
}

/// Compares a raw ground-truth answer with the reconciled model output.
///
/// Option ground truth needs a voted letter equal to it. Open-form ground
/// truth is correct when any accepted item appears among the responses.
/// Mismatched pairings are never correct.
pub fn judge(answer: &str, reconciled: &Reconciled) -> bool {
    match (GroundTruth::parse(answer), reconciled) {
        (GroundTruth::Option(expected), Reconciled::Voted { letter }) => {
            *letter == Some(expected)
        }
        (GroundTruth::OpenForm(_), Reconciled::Responses { responses }) => {
            is_correct_answer(answer, &responses.join(RESPONSE_SEPARATOR))
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub correct: usize,
    pub total: usize,
}

impl Tally {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    fn add(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracyLine {
    pub correct: usize,
    pub total: usize,
    pub accuracy: f64,
}

impl From<Tally> for AccuracyLine {
    fn from(tally: Tally) -> Self {
        Self {
            correct: tally.correct,
            total: tally.total,
            accuracy: tally.accuracy(),
        }
    }
}

/// End-of-run accuracy, serialized as one object keyed by category label
/// plus a `total` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracySummary {
    #[serde(flatten)]
    pub categories: BTreeMap<Category, AccuracyLine>,
    pub total: AccuracyLine,
}

/// Running correct/total counts per tracked category.
#[derive(Debug, Clone, Default)]
pub struct CategoryCounter {
    tallies: BTreeMap<Category, Tally>,
}

impl CategoryCounter {
    /// Starts every tracked category at zero.
    pub fn new(categories: &[Category]) -> Self {
        Self {
            tallies: categories.iter().map(|&c| (c, Tally::default())).collect(),
        }
    }

    pub fn record(&mut self, category: Category, correct: bool) {
        self.tallies.entry(category).or_default().add(correct);
    }

    pub fn get(&self, category: Category) -> Tally {
        self.tallies.get(&category).copied().unwrap_or_default()
    }

    pub fn overall(&self) -> Tally {
        self.tallies.values().fold(Tally::default(), |acc, t| Tally {
            correct: acc.correct + t.correct,
            total: acc.total + t.total,
        })
    }

    pub fn summary(&self) -> AccuracySummary {
        AccuracySummary {
            categories: self
                .tallies
                .iter()
                .map(|(&category, &tally)| (category, AccuracyLine::from(tally)))
                .collect(),
            total: self.overall().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responses(items: &[&str]) -> Reconciled {
        Reconciled::Responses {
            responses: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_ground_truth_parse() {
        assert_eq!(
            GroundTruth::parse("[B]"),
            GroundTruth::Option(OptionLetter::B)
        );
        assert!(matches!(GroundTruth::parse("[AD]"), GroundTruth::OpenForm(_)));
    }

    #[test]
    fn test_option_judging() {
        let voted_b = Reconciled::Voted {
            letter: Some(OptionLetter::B),
        };
        assert!(judge("B", &voted_b));
        assert!(judge("[b]", &voted_b));
        assert!(!judge("C", &voted_b));
        assert!(!judge("B", &Reconciled::Voted { letter: None }));
    }

    #[test]
    fn test_open_form_judging() {
        assert!(judge("[AD]", &responses(&["AD", "AD", "BC"])));
        assert!(judge("[∠ABC]", &responses(&["", "angle ABC, ∠CBA"])));
        assert!(!judge("[XY]", &responses(&["AD, P"])));
        assert!(!judge("[AD]", &responses(&[])));
    }

    #[test]
    fn test_mismatched_pairings_are_incorrect() {
        assert!(!judge("B", &responses(&["B"])));
        assert!(!judge(
            "[AD]",
            &Reconciled::Voted {
                letter: Some(OptionLetter::A)
            }
        ));
    }

    #[test]
    fn test_tally_accuracy() {
        let tally = Tally {
            correct: 3,
            total: 4,
        };
        assert_eq!(tally.accuracy(), 0.75);
        assert_eq!(Tally::default().accuracy(), 0.0);
    }

    #[test]
    fn test_counter_records_and_summarizes() {
        let mut counter = CategoryCounter::new(&Category::all());
        counter.record(Category::Position, true);
        counter.record(Category::Position, false);
        counter.record(Category::GeometryShape, true);

        assert_eq!(
            counter.get(Category::Position),
            Tally {
                correct: 1,
                total: 2
            }
        );
        assert_eq!(counter.get(Category::GeometricRelationship), Tally::default());

        let summary = counter.summary();
        assert_eq!(summary.categories.len(), 3);
        assert_eq!(summary.total.correct, 2);
        assert_eq!(summary.total.total, 3);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["Position"]["accuracy"], 0.5);
        assert_eq!(json["Geometric Relationship"]["total"], 0);
        assert_eq!(json["total"]["correct"], 2);
    }
}
