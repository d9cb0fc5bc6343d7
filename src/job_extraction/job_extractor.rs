// src/job_extraction/job_extractor.rs
use super::{ExtractOutcome, JobInfo};
use crate::error::ChatError;
use crate::llm_client::{ChatClient, LocalLlmClient, Message, DEFAULT_MAX_TOKENS};
use crate::utils::truncate_chars;
use tracing::{info, warn};

pub const DEFAULT_HTML_PREFIX_CHARS: usize = 1000;
pub const EXTRACTION_TEMPERATURE: f64 = 0.1;

const SYSTEM_PROMPT: &str = r#"You are a job information extractor. Extract job details from HTML and return ONLY a JSON object with these fields:
- title: job title
- company: company name
- location: job location
- description: brief description (max 200 chars)
- requirements: key requirements (max 150 chars)
- salary: salary if mentioned, else null

Return only valid JSON, no other text."#;

/// Asks the model for the six job fields of a posting page
pub struct JobInfoExtractor<C = LocalLlmClient> {
    client: C,
    html_prefix_chars: usize,
}

impl<C: ChatClient> JobInfoExtractor<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            html_prefix_chars: DEFAULT_HTML_PREFIX_CHARS,
        }
    }

    pub fn with_html_prefix_chars(mut self, max_chars: usize) -> Self {
        self.html_prefix_chars = max_chars;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Always yields a record when the chat call succeeds; an unreadable reply
    /// becomes the placeholder record. Chat errors are returned as-is.
    pub async fn extract(&self, raw_html: &str) -> Result<JobInfo, ChatError> {
        Ok(self.extract_outcome(raw_html).await?.into_record())
    }

    pub async fn extract_outcome(&self, raw_html: &str) -> Result<ExtractOutcome, ChatError> {
        let messages = self.build_messages(raw_html);

        info!(
            "Extracting job info from {} characters of HTML",
            raw_html.chars().count()
        );

        let response = self
            .client
            .chat(&messages, EXTRACTION_TEMPERATURE, DEFAULT_MAX_TOKENS)
            .await?;

        let outcome = ExtractOutcome::from_model_output(&response);
        match &outcome {
            ExtractOutcome::Parsed(job) => info!(
                "Extracted job: {} at {}",
                job.title.as_deref().unwrap_or("?"),
                job.company.as_deref().unwrap_or("?")
            ),
            ExtractOutcome::Fallback { reason, .. } => {
                warn!("Model reply was not a job JSON object, using placeholder: {}", reason)
            }
        }

        Ok(outcome)
    }

    pub(crate) fn build_messages(&self, raw_html: &str) -> Vec<Message> {
        let html = truncate_chars(raw_html, self.html_prefix_chars);

        vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(format!("Extract job info from this HTML:\n{}...", html)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::Role;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays a canned reply and records what it was asked
    struct ScriptedClient {
        reply: Result<String, fn() -> ChatError>,
        calls: Mutex<Vec<(Vec<Message>, f64, u32)>>,
    }

    impl ScriptedClient {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(make_error: fn() -> ChatError) -> Self {
            Self {
                reply: Err(make_error),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn last_call(&self) -> (Vec<Message>, f64, u32) {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn chat(
            &self,
            messages: &[Message],
            temperature: f64,
            max_tokens: u32,
        ) -> Result<String, ChatError> {
            self.calls
                .lock()
                .unwrap()
                .push((messages.to_vec(), temperature, max_tokens));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make_error) => Err(make_error()),
            }
        }
    }

    fn user_prompt(client: &ScriptedClient) -> String {
        let (messages, _, _) = client.last_call();
        messages[1].content.clone()
    }

    #[tokio::test]
    async fn test_extract_parses_model_json() {
        let client = ScriptedClient::replying(
            r#"{"title":"Engineer","company":"Acme","location":"Remote","description":"Build stuff","requirements":"Python","salary":null}"#,
        );
        let extractor = JobInfoExtractor::new(client);

        let job = extractor.extract("<h1>Engineer</h1>").await.unwrap();

        assert_eq!(job.title.as_deref(), Some("Engineer"));
        assert_eq!(job.company.as_deref(), Some("Acme"));
        assert_eq!(job.location.as_deref(), Some("Remote"));
        assert_eq!(job.description.as_deref(), Some("Build stuff"));
        assert_eq!(job.requirements.as_deref(), Some("Python"));
        assert_eq!(job.salary, None);
    }

    #[tokio::test]
    async fn test_extract_falls_back_on_prose() {
        let extractor =
            JobInfoExtractor::new(ScriptedClient::replying("Sorry, I cannot help with that."));

        let outcome = extractor.extract_outcome("<p>job</p>").await.unwrap();
        assert!(outcome.is_fallback());

        let job = outcome.into_record();
        assert_eq!(job.title.as_deref(), Some("Parse Error"));
        assert_eq!(job.company.as_deref(), Some("Unknown"));
        assert_eq!(job.location.as_deref(), Some("Unknown"));
        assert_eq!(job.description.as_deref(), Some("Sorry, I cannot help with that."));
        assert_eq!(job.requirements.as_deref(), Some("Could not parse"));
        assert_eq!(job.salary, None);
    }

    #[tokio::test]
    async fn test_extract_sends_fixed_prompt_and_low_temperature() {
        let extractor = JobInfoExtractor::new(ScriptedClient::replying("{}"));
        extractor.extract("<h1>Rust Developer</h1>").await.unwrap();

        let (messages, temperature, max_tokens) = extractor.client().last_call();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("return ONLY a JSON object"));
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(
            messages[1].content,
            "Extract job info from this HTML:\n<h1>Rust Developer</h1>..."
        );
        assert_eq!(temperature, 0.1);
        assert_eq!(max_tokens, 500);
    }

    #[tokio::test]
    async fn test_extract_truncates_html_deterministically() {
        let html = format!("{}{}", "a".repeat(1000), "TAIL");
        let extractor = JobInfoExtractor::new(ScriptedClient::replying("{}"));

        extractor.extract(&html).await.unwrap();
        let first = user_prompt(extractor.client());
        extractor.extract(&html).await.unwrap();
        let second = user_prompt(extractor.client());

        assert_eq!(first, second);
        assert!(!first.contains("TAIL"));
        assert_eq!(
            first,
            format!("Extract job info from this HTML:\n{}...", "a".repeat(1000))
        );
    }

    #[tokio::test]
    async fn test_custom_prefix_bound() {
        let extractor =
            JobInfoExtractor::new(ScriptedClient::replying("{}")).with_html_prefix_chars(10);

        extractor.extract("<div class=\"posting\">").await.unwrap();
        assert_eq!(
            user_prompt(extractor.client()),
            "Extract job info from this HTML:\n<div class..."
        );
    }

    #[tokio::test]
    async fn test_chat_errors_propagate_unchanged() {
        let extractor = JobInfoExtractor::new(ScriptedClient::failing(|| {
            ChatError::unavailable("http://localhost:1234")
        }));
        let err = extractor.extract("<p>job</p>").await.unwrap_err();
        assert!(matches!(err, ChatError::Unavailable { .. }));

        let extractor = JobInfoExtractor::new(ScriptedClient::failing(|| {
            ChatError::http_status(502, "bad gateway")
        }));
        let err = extractor.extract("<p>job</p>").await.unwrap_err();
        assert_eq!(err.status(), Some(502));

        let extractor = JobInfoExtractor::new(ScriptedClient::failing(|| ChatError::Timeout {
            timeout: std::time::Duration::from_secs(30),
        }));
        let err = extractor.extract("<p>job</p>").await.unwrap_err();
        assert!(matches!(err, ChatError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_extract_over_http() {
        use crate::config::ClientConfig;
        use mockito::{Matcher, Server};
        use serde_json::json;

        let mut server = Server::new_async().await;
        let _models = server
            .mock("GET", "/v1/models")
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;
        let completion = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(json!({ "temperature": 0.1 })))
            .with_status(200)
            .with_body(
                json!({
                    "choices": [{"message": {"content":
                        "{\"title\":\"SRE\",\"company\":\"Initech\",\"location\":\"Austin\",\"description\":\"Keep it up\",\"requirements\":\"Linux\",\"salary\":\"$150k\"}"
                    }}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = LocalLlmClient::new(ClientConfig::new(server.url())).unwrap();
        let job = JobInfoExtractor::new(client)
            .extract("<h1>SRE</h1>")
            .await
            .unwrap();

        assert_eq!(job.title.as_deref(), Some("SRE"));
        assert_eq!(job.salary.as_deref(), Some("$150k"));
        completion.assert_async().await;
    }
}
