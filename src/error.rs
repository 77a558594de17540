use std::path::PathBuf;

use thiserror::Error;

/// Typed failures raised by the analysis stages.
///
/// Stages return these; the orchestrator decides whether a failure aborts the
/// run or is reported and skipped.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Input file is absent. Recoverable: the loader falls back to sample data.
    #[error("input file '{}' not found", .path.display())]
    MissingInput { path: PathBuf },

    #[error("malformed data{}: {message}", fmt_line(.line))]
    MalformedData { line: Option<usize>, message: String },

    #[error("empty series: {context}")]
    EmptySeries { context: &'static str },

    #[error("empty or zero pre-crisis baseline; percent increase is undefined")]
    EmptyBaseline,

    #[error("insufficient data: need at least {needed} observations, got {actual}")]
    InsufficientData { needed: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render {chart}: {message}")]
    Render { chart: &'static str, message: String },
}

fn fmt_line(line: &Option<usize>) -> String {
    match line {
        Some(l) => format!(" (line {l})"),
        None => String::new(),
    }
}

impl AnalysisError {
    pub fn malformed(line: Option<usize>, message: impl Into<String>) -> Self {
        Self::MalformedData {
            line,
            message: message.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Process-level error: a message plus the exit code the binary returns.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        // 2 = bad input/config, 3 = statistical precondition unmet, 4 = runtime.
        let exit_code = match &err {
            AnalysisError::MissingInput { .. }
            | AnalysisError::MalformedData { .. }
            | AnalysisError::InvalidConfig(_) => 2,
            AnalysisError::EmptySeries { .. }
            | AnalysisError::EmptyBaseline
            | AnalysisError::InsufficientData { .. } => 3,
            AnalysisError::Io { .. } | AnalysisError::Render { .. } => 4,
        };
        Self::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
