// src/llm_client/client.rs
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, warn};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, Message};
use super::ChatClient;
use crate::config::ClientConfig;
use crate::error::ChatError;

/// Client for a locally hosted, OpenAI-compatible model server (LM Studio, llama.cpp, ...)
pub struct LocalLlmClient {
    client: Client,
    config: ClientConfig,
}

impl LocalLlmClient {
    pub fn new(config: ClientConfig) -> Result<Self, ChatError> {
        // The server is local; never route it through a system proxy
        let client = Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| ChatError::request_failed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Check that the server answers its model listing within the probe timeout.
    /// Never fails: anything but a 200 counts as unreachable.
    pub async fn probe(&self) -> bool {
        let url = self.config.models_url();

        match self
            .client
            .get(&url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status() == StatusCode::OK => {
                debug!("LLM server reachable at {}", self.config.base_url);
                true
            }
            Ok(response) => {
                warn!("LLM server probe returned {}", response.status());
                false
            }
            Err(e) => {
                warn!("LLM server probe failed: {}", e);
                false
            }
        }
    }

    async fn send_completion(
        &self,
        messages: &[Message],
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, ChatError> {
        let url = self.config.chat_completions_url();
        let request_body = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature,
            max_tokens,
        };

        info!(
            "Sending {} message(s) to {} (model: {})",
            messages.len(),
            url,
            self.config.model
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if status != StatusCode::OK {
            error!("LLM server returned {}: {}", status, response_text);
            return Err(ChatError::http_status(status.as_u16(), &response_text));
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| ChatError::request_failed(format!("Failed to parse completion response: {}", e)))?;

        let content = completion
            .first_content()
            .ok_or_else(|| ChatError::request_failed("Completion response has no message content"))?;

        debug!("Received {} characters from LLM", content.len());
        Ok(content.trim().to_string())
    }

    fn transport_error(&self, e: reqwest::Error) -> ChatError {
        if e.is_timeout() {
            warn!("LLM request timed out after {:?}", self.config.request_timeout);
            ChatError::Timeout {
                timeout: self.config.request_timeout,
            }
        } else {
            error!("LLM request failed: {}", e);
            ChatError::request_failed(e.to_string())
        }
    }
}

#[async_trait]
impl ChatClient for LocalLlmClient {
    /// Probe first, then send a single completion request. Fails fast with
    /// [`ChatError::Unavailable`] when the probe does not succeed.
    async fn chat(
        &self,
        messages: &[Message],
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, ChatError> {
        if messages.is_empty() {
            return Err(ChatError::request_failed("At least one message is required"));
        }

        if !self.probe().await {
            return Err(ChatError::unavailable(&self.config.base_url));
        }

        self.send_completion(messages, temperature, max_tokens).await
    }
}
