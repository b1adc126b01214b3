use crate::conversation::{answer_conversation, AnswerFormat};
use crate::judge::{judge, CategoryCounter, GroundTruth, Reconciled};
use crate::log_sink::LogSink;
use crate::openai::{respond, OpenAIClientTrait};
use crate::records::{EvaluationRecord, QuestionRecord, RawQuestionRecord};
use crate::variants::request_variants;
use crate::voting::resolve_vote;
use crate::EvalConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

/// Totals of a finished run.
#[derive(Debug)]
pub struct RunReport {
    pub counter: CategoryCounter,
    pub evaluated: usize,
    pub unmatched: usize,
    pub summary_path: PathBuf,
}

/// `*.json` files directly inside `dir`, sorted by file name.
pub fn dataset_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| {
            format!("Failed to list dataset directory {}", dir.display())
        })?;
        let is_json =
            entry.path().extension().is_some_and(|ext| ext == "json");
        if entry.file_type().is_file() && is_json {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Runs the whole self-consistency pipeline for one question.
///
/// Model calls happen one after another: paraphrases first, then the
/// original question, then each variant in order. A failed call counts as
/// an empty response.
#[instrument(skip(config, client, record), fields(id = %record.id))]
pub async fn evaluate_question(
    config: &EvalConfig,
    client: &dyn OpenAIClientTrait,
    record: &QuestionRecord,
) -> EvaluationRecord {
    let variants = request_variants(
        client,
        &config.paraphrase_model,
        &record.question,
        config.k_perturbations,
    )
    .await;

    let ground_truth = GroundTruth::parse(&record.answer);
    let format = match ground_truth {
        GroundTruth::Option(_) => AnswerFormat::OptionLetter,
        GroundTruth::OpenForm(_) => AnswerFormat::OpenForm {
            k_answers: config.k_answers,
        },
    };

    let few_shot_dir = config.few_shot_dir.as_deref();
    let original_conversation = answer_conversation(
        &record.question,
        &record.image,
        format,
        few_shot_dir,
    );
    let original_response =
        respond(client, &config.model, &original_conversation).await;

    let mut variant_responses = Vec::with_capacity(variants.len());
    for variant in &variants {
        let conversation =
            answer_conversation(variant, &record.image, format, few_shot_dir);
        let response = respond(client, &config.model, &conversation).await;
        variant_responses.push(response);
    }

    let reconciled = match ground_truth {
        GroundTruth::Option(_) => Reconciled::Voted {
            letter: resolve_vote(&variant_responses, &original_response),
        },
        GroundTruth::OpenForm(_) => Reconciled::Responses {
            responses: std::iter::once(original_response.clone())
                .chain(variant_responses.iter().cloned())
                .collect(),
        },
    };
    let correct = judge(&record.answer, &reconciled);

    EvaluationRecord {
        id: record.id.clone(),
        category: record.category,
        question: record.question.clone(),
        ground_truth: record.answer.clone(),
        variants,
        original_response,
        variant_responses,
        reconciled,
        correct,
    }
}

fn log_console_summary(counter: &CategoryCounter) {
    let overall = counter.overall();
    info!("Total Files Processed: {}", overall.total);
    info!("Correct Answers: {}", overall.correct);
    info!("Overall Accuracy: {:.2}%", overall.accuracy() * 100.0);

    for (category, line) in counter.summary().categories {
        info!(
            "Question Type: {}, Total: {}, Correct: {}, Accuracy: {:.2}%",
            category,
            line.total,
            line.correct,
            line.accuracy * 100.0
        );
    }
}

/// Evaluates every question file in the dataset directory, strictly one
/// question at a time, and writes logs plus the final summary.
pub async fn run(
    config: &EvalConfig,
    client: Arc<dyn OpenAIClientTrait>,
) -> Result<RunReport> {
    config.validate()?;

    let mut sink = LogSink::create(&config.log_dir, &config.categories)?;
    let mut counter = CategoryCounter::new(&config.categories);
    let mut evaluated = 0;
    let mut unmatched = 0;

    for path in dataset_files(&config.dataset_dir)? {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        info!("Processing file: {}", file_name);

        let file_stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();

        let raw = match RawQuestionRecord::from_path(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping {}: {}", file_name, e);
                sink.record_unmatched(
                    &RawQuestionRecord::default(),
                    &e,
                    &file_stem,
                )?;
                unmatched += 1;
                continue;
            }
        };

        let record = match raw.validate(&config.categories) {
            Ok(record) => record,
            Err(e) => {
                warn!("File {} is unmatched: {}", file_name, e);
                sink.record_unmatched(&raw, &e, &file_stem)?;
                unmatched += 1;
                continue;
            }
        };

        let evaluation =
            evaluate_question(config, client.as_ref(), &record).await;
        counter.record(evaluation.category, evaluation.correct);
        info!(
            "Question {} ({}): {}",
            evaluation.id,
            evaluation.category,
            if evaluation.correct { "correct" } else { "incorrect" }
        );
        sink.record_evaluation(&evaluation)?;
        evaluated += 1;
    }

    log_console_summary(&counter);
    let summary_path = sink.write_summary(&counter.summary())?;

    Ok(RunReport {
        counter,
        evaluated,
        unmatched,
        summary_path,
    })
}
