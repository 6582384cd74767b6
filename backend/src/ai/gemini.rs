use async_trait::async_trait;
use log::debug;
use serde_json::json;
use std::time::Duration;

use super::provider::{AiError, CompletionProvider, Message, Role};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, AiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    /// Request body for the `generateContent` API.
    fn build_request_body(
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
    ) -> serde_json::Value {
        let system = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>();

        let contents: Vec<serde_json::Value> = messages
            .iter()
            .filter_map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                    Role::System => return None,
                };
                Some(json!({
                    "role": role,
                    "parts": [{ "text": m.content }],
                }))
            })
            .collect();

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": max_tokens,
                "topP": 0.8,
                "topK": 40,
            },
        });

        if !system.is_empty() {
            body["system_instruction"] = json!({
                "parts": [{ "text": system.join("\n\n") }],
            });
        }

        body
    }

    fn parse_response(resp: &serde_json::Value) -> Result<String, AiError> {
        resp["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                AiError::Parse("missing candidates[0].content.parts[0].text".into())
            })
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, AiError> {
        let url = format!("{}/{}:generateContent", BASE_URL, self.model);
        let body = Self::build_request_body(&messages, temperature, max_tokens);

        debug!("Gemini request to model={}", self.model);

        // Key goes in a header so it never shows up in a logged URL.
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        Self::parse_response(&resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_separates_system_instruction() {
        let messages = vec![
            Message::system("Answer from the document."),
            Message::user("What happened to revenue?"),
            Message {
                role: Role::Assistant,
                content: "It grew.".into(),
            },
        ];

        let body = GeminiProvider::build_request_body(&messages, 0.7, 500);

        assert_eq!(
            body["system_instruction"]["parts"][0]["text"],
            "Answer from the document."
        );
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 500);
        let temp = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 1e-6);
    }

    #[test]
    fn request_body_without_system_has_no_instruction() {
        let body = GeminiProvider::build_request_body(&[Message::user("hi")], 0.5, 100);
        assert!(body.get("system_instruction").is_none());
    }

    #[test]
    fn parses_first_candidate() {
        let resp = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Revenue grew 10%." }] } }]
        });
        assert_eq!(
            GeminiProvider::parse_response(&resp).unwrap(),
            "Revenue grew 10%."
        );
        assert!(matches!(
            GeminiProvider::parse_response(&json!({ "candidates": [] })),
            Err(AiError::Parse(_))
        ));
    }
}
