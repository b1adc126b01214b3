use crate::options::{extract_option, OptionLetter};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Occurrences of each extracted option letter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally(BTreeMap<OptionLetter, usize>);

/// What a tally says on its own, before any fallback is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consensus {
    /// Nothing was extracted.
    Empty,
    /// Every letter appeared exactly once.
    NoRepeats,
    /// Several letters share the highest count.
    Tie(Vec<OptionLetter>),
    /// One letter has the highest count, seen more than once.
    Majority(OptionLetter),
}

impl VoteTally {
    /// Builds a tally, skipping failed extractions.
    pub fn from_extractions(
        extractions: impl IntoIterator<Item = Option<OptionLetter>>,
    ) -> Self {
        let mut counts = BTreeMap::new();
        for letter in extractions.into_iter().flatten() {
            *counts.entry(letter).or_insert(0) += 1;
        }
        Self(counts)
    }

    pub fn count(&self, letter: OptionLetter) -> usize {
        self.0.get(&letter).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn consensus(&self) -> Consensus {
        let Some(max) = self.0.values().copied().max() else {
            return Consensus::Empty;
        };
        if max == 1 {
            return Consensus::NoRepeats;
        }

        let leaders: Vec<OptionLetter> = self
            .0
            .iter()
            .filter(|&(_, &count)| count == max)
            .map(|(&letter, _)| letter)
            .collect();
        match leaders.as_slice() {
            [only] => Consensus::Majority(*only),
            _ => Consensus::Tie(leaders),
        }
    }
}

/// Decides between already-extracted letters.
///
/// A letter wins only with a strict majority that was seen more than once.
/// Empty tallies, all-distinct tallies and ties defer to `fallback`, which
/// may itself be absent.
pub fn resolve_extracted(
    extractions: &[Option<OptionLetter>],
    fallback: Option<OptionLetter>,
) -> Option<OptionLetter> {
    let tally = VoteTally::from_extractions(extractions.iter().copied());
    match tally.consensus() {
        Consensus::Majority(letter) => {
            debug!(
                "Majority {} with {} of {} votes",
                letter,
                tally.count(letter),
                tally.total()
            );
            Some(letter)
        }
        other => {
            debug!("No consensus ({:?}), using fallback {:?}", other, fallback);
            fallback
        }
    }
}

/// Votes over free-text candidates, one per question variant. `fallback` is
/// the reply to the unparaphrased question.
pub fn resolve_vote<S: AsRef<str>>(
    candidates: &[S],
    fallback: &str,
) -> Option<OptionLetter> {
    let extractions: Vec<Option<OptionLetter>> = candidates
        .iter()
        .map(|candidate| extract_option(candidate.as_ref()))
        .collect();
    resolve_extracted(&extractions, extract_option(fallback))
}
