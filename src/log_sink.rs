use crate::category::Category;
use crate::judge::AccuracySummary;
use crate::records::{EvaluationRecord, RawQuestionRecord, RecordError};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const UNKNOWN_CATEGORY_DIR: &str = "Unknown";
pub const RESULTS_FILE: &str = "results.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Error,
    Unmatched,
}

impl Outcome {
    pub fn all() -> [Outcome; 3] {
        [Outcome::Correct, Outcome::Error, Outcome::Unmatched]
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            Outcome::Correct => "correct_logs",
            Outcome::Error => "error_logs",
            Outcome::Unmatched => "unmatched_logs",
        }
    }
}

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    id: &'a str,
    category: &'a str,
    outcome: Outcome,
    ground_truth: &'a str,
    reconciled: String,
    detail: String,
}

/// Replaces anything that is not safe in a file name.
fn file_stem_for(id: &str) -> String {
    let cleaned: String = id
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "unknown_id".to_string()
    } else {
        cleaned
    }
}

/// Writes per-question logs under
/// `<base>/<outcome>_logs/<category>/<id>.txt`, a `results.csv` row per
/// question, and the final accuracy summary.
pub struct LogSink {
    base: PathBuf,
    results: csv::Writer<File>,
}

impl LogSink {
    /// Creates the outcome/category directory tree and the results file.
    pub fn create(base: &Path, categories: &[Category]) -> Result<Self> {
        for outcome in Outcome::all() {
            for category in categories {
                let dir = base.join(outcome.dir_name()).join(category.as_str());
                fs::create_dir_all(&dir).with_context(|| {
                    format!("Failed to create log directory {}", dir.display())
                })?;
            }
        }

        let results_path = base.join(RESULTS_FILE);
        let results = csv::Writer::from_path(&results_path).with_context(|| {
            format!("Failed to create {}", results_path.display())
        })?;

        info!("Logging evaluation results under {}", base.display());
        Ok(Self {
            base: base.to_path_buf(),
            results,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn write_question_log(
        &self,
        outcome: Outcome,
        category_dir: &str,
        id: &str,
        body: &str,
    ) -> Result<PathBuf> {
        let dir = self.base.join(outcome.dir_name()).join(category_dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(format!("{}.txt", file_stem_for(id)));
        fs::write(&path, body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {:?} log {}", outcome, path.display());
        Ok(path)
    }

    /// Logs a judged question to the correct or error tree.
    pub fn record_evaluation(
        &mut self,
        record: &EvaluationRecord,
    ) -> Result<PathBuf> {
        let outcome = if record.correct {
            Outcome::Correct
        } else {
            Outcome::Error
        };

        let mut body = format!(
            "ID: {}\nQuestion: {}\nAnswer: {}\nDescription: {}\n",
            record.id,
            record.question,
            record.ground_truth,
            record.reconciled.describe(),
        );
        body.push_str(&format!(
            "Original response: {}\n",
            record.original_response
        ));
        for (variant, response) in
            record.variants.iter().zip(&record.variant_responses)
        {
            body.push_str(&format!(
                "Variant: {}\nVariant response: {}\n",
                variant, response
            ));
        }

        let path = self.write_question_log(
            outcome,
            record.category.as_str(),
            &record.id,
            &body,
        )?;

        self.results.serialize(ResultRow {
            id: &record.id,
            category: record.category.as_str(),
            outcome,
            ground_truth: &record.ground_truth,
            reconciled: record.reconciled.describe(),
            detail: String::new(),
        })?;
        Ok(path)
    }

    /// Logs a record that could not be evaluated. `fallback_id` names the
    /// log file when the record carries no id of its own.
    pub fn record_unmatched(
        &mut self,
        raw: &RawQuestionRecord,
        reason: &RecordError,
        fallback_id: &str,
    ) -> Result<PathBuf> {
        let category_dir = raw
            .question_type
            .as_deref()
            .and_then(|label| label.parse::<Category>().ok())
            .map(|c| c.as_str())
            .unwrap_or(UNKNOWN_CATEGORY_DIR);
        let id = raw
            .id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(fallback_id);
        let answer = raw.answer.as_deref().unwrap_or("N/A");

        let body = format!(
            "ID: {}\nQuestion: {}\nAnswer: {}\nDescription: N/A\nReason: {}\n",
            id,
            raw.question.as_deref().unwrap_or(""),
            answer,
            reason,
        );
        let path = self.write_question_log(
            Outcome::Unmatched,
            category_dir,
            id,
            &body,
        )?;

        self.results.serialize(ResultRow {
            id,
            category: category_dir,
            outcome: Outcome::Unmatched,
            ground_truth: answer,
            reconciled: String::new(),
            detail: reason.to_string(),
        })?;
        Ok(path)
    }

    /// Writes `summary_<timestamp>.log` and flushes the results file.
    pub fn write_summary(
        &mut self,
        summary: &AccuracySummary,
    ) -> Result<PathBuf> {
        self.results.flush().context("Failed to flush results file")?;

        let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let path = self.base.join(format!("summary_{}.log", timestamp));
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Summary logged to {}", path.display());
        Ok(path)
    }
}
