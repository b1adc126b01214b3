use crate::category::Category;
use crate::conversation::ImageRef;
use crate::judge::Reconciled;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why an input record could not be evaluated.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid question JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("unknown question category '{0}'")]
    UnknownCategory(String),
}

/// Fields that may be strings or numbers in the dataset files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    List(Vec<String>),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Integer(value) => value.to_string(),
            Scalar::List(items) => format!("[{}]", items.join(", ")),
        }
    }
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text))
}

/// A dataset entry as found on disk, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuestionRecord {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub answer: Option<String>,
    #[serde(default)]
    pub question_type: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub id: Option<String>,
}

fn required(
    value: &Option<String>,
    field: &'static str,
) -> Result<String, RecordError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or(RecordError::MissingField(field))
}

impl RawQuestionRecord {
    pub fn from_json_str(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, RecordError> {
        let json = std::fs::read_to_string(path).map_err(|source| {
            RecordError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_json_str(&json)
    }

    /// Checks required fields and that the category is one being tracked.
    pub fn validate(
        &self,
        tracked: &[Category],
    ) -> Result<QuestionRecord, RecordError> {
        let image = required(&self.image, "image")?;
        let question = required(&self.question, "question")?;
        let answer = required(&self.answer, "answer")?;
        let label = required(&self.question_type, "question_type")?;
        let id = required(&self.id, "id")?;

        let category = label
            .parse::<Category>()
            .ok()
            .filter(|c| tracked.contains(c))
            .ok_or_else(|| RecordError::UnknownCategory(label.clone()))?;

        Ok(QuestionRecord {
            id,
            image: ImageRef(image),
            question,
            answer,
            category,
        })
    }
}

/// A question that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub id: String,
    pub image: ImageRef,
    pub question: String,
    pub answer: String,
    pub category: Category,
}

/// Outcome of evaluating one question. Built once, then handed to the log
/// sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationRecord {
    pub id: String,
    pub category: Category,
    pub question: String,
    pub ground_truth: String,
    pub variants: Vec<String>,
    pub original_response: String,
    pub variant_responses: Vec<String>,
    pub reconciled: Reconciled,
    pub correct: bool,
}
