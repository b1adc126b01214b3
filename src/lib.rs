//! Self-consistency evaluation of vision-language models on geometry
//! diagram questions.
//!
//! Each question is rephrased into several equivalent variants, the model
//! answers every variant, and the answers are reconciled into one verdict
//! against the ground truth.

use anyhow::Result;
use std::path::PathBuf;

pub mod answers;
pub mod category;
pub mod cli;
pub mod conversation;
pub mod eval;
pub mod judge;
pub mod log_sink;
pub mod openai;
pub mod options;
pub mod prompts;
pub mod records;
pub mod test_utils;
pub mod variants;
pub mod voting;

use crate::category::Category;

pub const DEFAULT_K_ANSWERS: usize = 3;
pub const DEFAULT_K_PERTURBATIONS: usize = 3;

/// Everything one evaluation run needs to know.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub dataset_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Vision-language model answering the questions.
    pub model: String,
    /// Model asked for question rephrasings.
    pub paraphrase_model: String,
    /// Distinct answers requested per question.
    pub k_answers: usize,
    /// Paraphrased variants requested per question.
    pub k_perturbations: usize,
    pub categories: Vec<Category>,
    /// Directory holding the few-shot example diagrams, if any.
    pub few_shot_dir: Option<PathBuf>,
}

impl EvalConfig {
    pub fn new(
        dataset_dir: impl Into<PathBuf>,
        log_dir: impl Into<PathBuf>,
        model: impl Into<String>,
    ) -> Self {
        let model = model.into();
        Self {
            dataset_dir: dataset_dir.into(),
            log_dir: log_dir.into(),
            paraphrase_model: model.clone(),
            model,
            k_answers: DEFAULT_K_ANSWERS,
            k_perturbations: DEFAULT_K_PERTURBATIONS,
            categories: Category::all(),
            few_shot_dir: None,
        }
    }

    pub fn with_paraphrase_model(mut self, model: impl Into<String>) -> Self {
        self.paraphrase_model = model.into();
        self
    }

    pub fn with_k_answers(mut self, k_answers: usize) -> Self {
        self.k_answers = k_answers;
        self
    }

    pub fn with_k_perturbations(mut self, k_perturbations: usize) -> Self {
        self.k_perturbations = k_perturbations;
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_few_shot_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.few_shot_dir = dir;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.k_answers == 0 {
            anyhow::bail!("k_answers must be at least 1");
        }
        if self.k_perturbations == 0 {
            anyhow::bail!("k_perturbations must be at least 1");
        }
        if self.categories.is_empty() {
            anyhow::bail!("at least one question category must be tracked");
        }
        if self.model.trim().is_empty() {
            anyhow::bail!("model name cannot be empty");
        }
        Ok(())
    }
}
