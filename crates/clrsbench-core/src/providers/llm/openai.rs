use super::ChatClient;
use crate::errors::ProviderError;
use async_trait::async_trait;
use serde_json::json;

/// Every request carries the same system instruction; the benchmark compares
/// prompting strategies, so nothing else about the exchange may vary.
const SYSTEM_PROMPT: &str = "You are a helpful math assistant.";

/// Client for an OpenAI-compatible `/chat/completions` endpoint, typically a
/// locally served model. Sampling is pinned to temperature 0.0 so repeated
/// runs score reproducibly.
pub struct OpenAiCompatClient {
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(model: String, base_url: String, api_key: String, max_tokens: u32) -> Self {
        Self {
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            temperature: 0.0,
            max_tokens,
            client: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatClient for OpenAiCompatClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let resp = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_else(|_| String::new());
            return Err(ProviderError::Api { status, body }.into());
        }

        let json: serde_json::Value = resp.json().await?;
        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ProviderError::MalformedResponse("missing choices[0].message.content".into())
            })?
            .to_string();

        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "openai-compat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_duplicate_slash() {
        let client = OpenAiCompatClient::new(
            "tei".into(),
            "http://0.0.0.0:30000/v1/".into(),
            "sk".into(),
            8000,
        );
        assert_eq!(client.completions_url(), "http://0.0.0.0:30000/v1/chat/completions");
    }

    #[test]
    fn sampling_is_deterministic_by_construction() {
        let client =
            OpenAiCompatClient::new("tei".into(), "http://0.0.0.0:30000/v1".into(), "sk".into(), 8000);
        assert_eq!(client.temperature, 0.0);
    }
}
