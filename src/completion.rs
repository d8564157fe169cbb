//! HTTP client for the AI chat-completion backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub struct Client {
    api_url: String,
    api_key: String,
    timeout: Duration,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    reply: String,
}

impl Client {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            api_url,
            api_key,
            timeout,
            http: reqwest::Client::new(),
        }
    }

    /// Send a single prompt and return the full reply text.
    pub async fn chat(&self, model: &str, prompt: &str) -> Result<String, Error> {
        let request = ApiRequest {
            model,
            prompt,
            system: "",
        };

        let mut builder = self
            .http
            .post(&self.api_url)
            .timeout(self.timeout)
            .json(&request);

        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout
            } else {
                Error::Http(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(api_response.reply)
    }
}

#[derive(Debug)]
pub enum Error {
    Timeout,
    Http(String),
    Api(String),
    Parse(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Timeout => write!(f, "request timed out"),
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Api(e) => write!(f, "API error: {e}"),
            Error::Parse(e) => write!(f, "Parse error: {e}"),
        }
    }
}

impl std::error::Error for Error {}
