// src/job_extraction/mod.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod job_extractor;

pub use job_extractor::JobInfoExtractor;

pub const PARSE_ERROR_TITLE: &str = "Parse Error";
pub const UNKNOWN_FIELD: &str = "Unknown";
pub const UNPARSED_REQUIREMENTS: &str = "Could not parse";
pub const FALLBACK_DESCRIPTION_CHARS: usize = 200;

/// Job posting fields pulled out of a page by the model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobInfo {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub salary: Option<String>,
}

impl JobInfo {
    /// Placeholder record used when the model's reply is not the expected JSON
    pub fn fallback(raw_text: &str) -> Self {
        Self {
            title: Some(PARSE_ERROR_TITLE.to_string()),
            company: Some(UNKNOWN_FIELD.to_string()),
            location: Some(UNKNOWN_FIELD.to_string()),
            description: Some(
                crate::utils::truncate_chars(raw_text, FALLBACK_DESCRIPTION_CHARS).to_string(),
            ),
            requirements: Some(UNPARSED_REQUIREMENTS.to_string()),
            salary: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    Parsed(JobInfo),
    Fallback { reason: String, raw_text: String },
}

impl ExtractOutcome {
    /// Decode model output. Only a JSON object whose known fields are strings
    /// or null is accepted; anything else becomes a fallback.
    pub fn from_model_output(text: &str) -> Self {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => return Self::fallback(format!("Invalid JSON: {}", e), text),
        };

        if !value.is_object() {
            return Self::fallback("Expected a JSON object", text);
        }

        match serde_json::from_value::<JobInfo>(value) {
            Ok(info) => Self::Parsed(info),
            Err(e) => Self::fallback(format!("Unexpected field type: {}", e), text),
        }
    }

    fn fallback(reason: impl Into<String>, raw_text: &str) -> Self {
        Self::Fallback {
            reason: reason.into(),
            raw_text: raw_text.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn into_record(self) -> JobInfo {
        match self {
            Self::Parsed(info) => info,
            Self::Fallback { raw_text, .. } => JobInfo::fallback(&raw_text),
        }
    }
}
