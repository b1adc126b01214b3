use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging once across all tests in the process.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .finish();

        // Another harness may already own the global subscriber.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Writes a dataset question file and returns its path.
pub fn write_question_file(
    dir: &Path,
    file_name: &str,
    record: &serde_json::Value,
) -> std::io::Result<PathBuf> {
    let path = dir.join(file_name);
    std::fs::write(&path, record.to_string())?;
    Ok(path)
}
