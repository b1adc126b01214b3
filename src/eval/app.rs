use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, Registry};
use tracing_tree::HierarchicalLayer;

use crate::openai::real::RealOpenAIClient;
use crate::openai::OpenAIClientTrait;
use crate::{cli::CommonArgs, EvalConfig};
use crate::{DEFAULT_K_ANSWERS, DEFAULT_K_PERTURBATIONS};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    pub common_args: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate every question file in a dataset directory
    Run {
        /// Directory holding one JSON file per question
        #[arg(long, env = "GEOVOTE_DATASET_DIR")]
        dataset_dir: PathBuf,

        /// Directory receiving per-question logs and the summary
        #[arg(long, env = "GEOVOTE_LOG_DIR")]
        log_dir: PathBuf,

        /// Model used for paraphrasing (defaults to --model)
        #[arg(long)]
        paraphrase_model: Option<String>,

        /// Distinct answers requested per question
        #[arg(long, default_value_t = DEFAULT_K_ANSWERS)]
        k_answers: usize,

        /// Paraphrased variants requested per question
        #[arg(long, default_value_t = DEFAULT_K_PERTURBATIONS)]
        k_perturbations: usize,

        /// Directory with the few-shot example diagrams
        #[arg(long)]
        few_shot_dir: Option<PathBuf>,
    },

    /// List models exposed by the endpoint
    Models,
}

pub async fn main() -> Result<()> {
    let subscriber = Registry::default()
        .with(
            HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        );
    tracing::subscriber::set_global_default(subscriber)?;

    run_app(Cli::parse()).await
}

pub async fn run_app(cli: Cli) -> Result<()> {
    let common = cli.common_args;
    let client: Arc<dyn OpenAIClientTrait> =
        Arc::new(RealOpenAIClient::from_settings(
            common.openai_api_key.as_deref(),
            common.openai_api_base.as_deref(),
        ));

    match cli.command {
        Commands::Run {
            dataset_dir,
            log_dir,
            paraphrase_model,
            k_answers,
            k_perturbations,
            few_shot_dir,
        } => {
            let paraphrase_model =
                paraphrase_model.unwrap_or_else(|| common.model.clone());
            let config = EvalConfig::new(dataset_dir, log_dir, common.model)
                .with_paraphrase_model(paraphrase_model)
                .with_k_answers(k_answers)
                .with_k_perturbations(k_perturbations)
                .with_few_shot_dir(few_shot_dir);

            info!(
                "Evaluating {} with {} (paraphrases from {})",
                config.dataset_dir.display(),
                config.model,
                config.paraphrase_model
            );
            let report = super::runner::run(&config, client).await?;
            info!(
                "Evaluated {} questions ({} unmatched), summary at {}",
                report.evaluated,
                report.unmatched,
                report.summary_path.display()
            );
        }
        Commands::Models => {
            info!("Listing available models");
            for model in client.list_models().await? {
                println!("{}", model.id);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "geovote",
            "--model",
            "qwen-vl",
            "run",
            "--dataset-dir",
            "/data",
            "--log-dir",
            "/logs",
            "--k-perturbations",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.common_args.model, "qwen-vl");
        match cli.command {
            Commands::Run {
                dataset_dir,
                k_answers,
                k_perturbations,
                paraphrase_model,
                ..
            } => {
                assert_eq!(dataset_dir, PathBuf::from("/data"));
                assert_eq!(k_answers, DEFAULT_K_ANSWERS);
                assert_eq!(k_perturbations, 5);
                assert_eq!(paraphrase_model, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_models_command() {
        let cli = Cli::try_parse_from(["geovote", "models"]).unwrap();
        assert!(matches!(cli.command, Commands::Models));
    }
}
