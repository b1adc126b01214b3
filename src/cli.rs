use clap::Parser;

/// Command-line arguments shared by every subcommand
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    /// Model serving the diagram questions
    #[arg(
        long,
        env = "GEOVOTE_MODEL",
        default_value = "Qwen/Qwen2.5-VL-7B-Instruct"
    )]
    pub model: String,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible API base URL (e.g. a vLLM server)
    #[arg(long, env = "OPENAI_API_BASE")]
    pub openai_api_base: Option<String>,
}
