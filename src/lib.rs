//! Client for a locally hosted LLM server plus a job posting extractor built on it.

pub mod config;
pub mod error;
pub mod job_extraction;
pub mod llm_client;
pub mod utils;

pub use config::ClientConfig;
pub use error::ChatError;
pub use job_extraction::{ExtractOutcome, JobInfo, JobInfoExtractor};
pub use llm_client::{ChatClient, LocalLlmClient, Message, Role};
