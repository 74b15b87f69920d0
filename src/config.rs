use crate::logger::DEFAULT_LOG_FILE;
use crate::service::{DEFAULT_QUESTION_COUNT, DEFAULT_SERVER_URL};
use clap::builder::TypedValueParser;
use clap::Parser;
use std::path::PathBuf;

/// Terminal quiz client for a syllabus question-generation service.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "syllabus-quiz", version)]
pub struct Args {
    /// Base URL of the question-generation service.
    #[arg(long, env = "QUIZ_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Number of questions to request per topic.
    #[arg(long, default_value_t = DEFAULT_QUESTION_COUNT, value_parser = clap::value_parser!(u16).range(1..=50).map(usize::from))]
    pub questions: usize,

    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Disable the debug log file.
    #[arg(long)]
    pub no_log: bool,

    /// PDF to upload immediately on start.
    pub document: Option<PathBuf>,
}

impl Args {
    pub fn log_path(&self) -> Option<&PathBuf> {
        (!self.no_log).then_some(&self.log_file)
    }
}
