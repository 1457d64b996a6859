use serde_json::Value;
use std::fmt;

/// Where a recommendation call broke down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticStage {
    /// The service answered with a non-2xx status.
    Http,
    /// The reply carried no usable text (no candidates, blocked, thoughts only).
    EmptyResponse,
    /// The text was not a valid product array.
    Parse,
}

impl DiagnosticStage {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticStage::Http => "http",
            DiagnosticStage::EmptyResponse => "empty_response",
            DiagnosticStage::Parse => "parse",
        }
    }
}

impl fmt::Display for DiagnosticStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed recommendation call, with whatever the model sent back.
#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub model: String,
    pub stage: DiagnosticStage,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "recommendation call failed at {} (model={}): {}",
            self.stage, self.model, self.detail
        )
    }
}

impl std::error::Error for LlmDiagnosticsError {}
