mod app;
pub mod runner;

pub use app::{main, run_app, Cli};
pub use runner::{evaluate_question, run, RunReport};
