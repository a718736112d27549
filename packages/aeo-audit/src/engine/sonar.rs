//! Perplexity Sonar engine implementation.
//!
//! Adapts the `answer-client` crate to the [`AnswerEngine`] seam.
//! Gated behind the `perplexity` feature so the pipeline core carries no
//! HTTP dependency.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use answer_client::{AnswerApiError, AnswerClient, AnswerRequest, ApiKey};

use crate::error::{EngineError, EngineResult};
use crate::traits::AnswerEngine;

/// What the Sonar engine needs from its caller. The key stays redacted
/// (see [`ApiKey`]) until the HTTP client writes the Authorization header.
pub struct EngineCredentials {
    pub api_key: ApiKey,
    pub model: String,
    pub base_url: Option<String>,
}

impl EngineCredentials {
    pub fn new(api_key: impl Into<ApiKey>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    /// Point at a proxy or a compatible engine.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

impl fmt::Debug for EngineCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineCredentials")
            .field("api_key", &self.api_key)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Answer engine backed by the Perplexity Sonar API.
pub struct SonarEngine {
    client: AnswerClient,
    model: String,
}

impl SonarEngine {
    /// Create an engine. The key moves into the HTTP client and is never
    /// logged.
    pub fn new(credentials: EngineCredentials) -> Self {
        let mut client = AnswerClient::new(credentials.api_key);
        if let Some(url) = credentials.base_url {
            client = client.with_base_url(url);
        }
        Self {
            client,
            model: credentials.model,
        }
    }
}

#[async_trait]
impl AnswerEngine for SonarEngine {
    async fn ask(&self, query_text: &str) -> EngineResult<Value> {
        let response = self
            .client
            .answer(AnswerRequest::question(&self.model, query_text))
            .await
            .map_err(map_api_error)?;

        Ok(response.payload)
    }
}

fn map_api_error(e: AnswerApiError) -> EngineError {
    match e {
        AnswerApiError::Timeout => EngineError::Timeout,
        AnswerApiError::RateLimited => EngineError::RateLimited,
        AnswerApiError::Server { status } => EngineError::Server { status },
        AnswerApiError::Network(m) => EngineError::Network(m),
        AnswerApiError::InvalidCredentials => EngineError::InvalidCredentials,
        AnswerApiError::InvalidRequest { status, message } => {
            EngineError::InvalidRequest { status, message }
        }
        AnswerApiError::Parse(m) => EngineError::Parse(m),
        // Client-side configuration problems are credential problems here:
        // SonarEngine builds its client from EngineCredentials.
        AnswerApiError::Config(_) => EngineError::InvalidCredentials,
    }
}
