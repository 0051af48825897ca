use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};

use crate::session::{Role, Turn};

pub const API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const MODEL: &str = "llama-3.3-70b-versatile";
pub const MAX_TOKENS: u32 = 1000;
pub const TEMPERATURE: f32 = 0.7;
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that answers questions clearly and accurately.";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
}

impl GroqClient {
    /// Build the HTTP client. If the default builder cannot initialize, one
    /// alternate construction with proxy discovery disabled is attempted
    /// before giving up.
    pub fn new(api_key: &str) -> Result<Self> {
        let client = match Client::builder().build() {
            Ok(client) => client,
            Err(_) => Client::builder().no_proxy().build()?,
        };

        Ok(Self {
            client,
            api_key: api_key.to_string(),
        })
    }

    /// One request per user turn: the fixed system instruction followed by
    /// the full conversation, latest user turn last. Returns the first
    /// choice's text.
    pub async fn complete(&self, turns: &[Turn]) -> Result<String> {
        let request = build_request(turns);

        let response = self.client
            .post(API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Groq API error {}: {}", status, text));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("Groq API returned no choices"))
    }
}

fn build_request(turns: &[Turn]) -> ChatRequest<'_> {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatMessage {
        role: Role::System.as_str(),
        content: SYSTEM_PROMPT,
    });
    for turn in turns {
        messages.push(ChatMessage {
            role: turn.role.as_str(),
            content: &turn.content,
        });
    }

    ChatRequest {
        model: MODEL,
        messages,
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: Role, content: &str) -> Turn {
        Turn {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn request_replays_conversation_after_system_instruction() {
        let turns = vec![
            turn(Role::User, "What is bioinformatics?"),
            turn(Role::Assistant, "Bioinformatics is..."),
            turn(Role::User, "Explain DNA sequencing"),
        ];

        let request = build_request(&turns);
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(request.messages[2].role, "assistant");
        assert_eq!(request.messages[3].role, "user");
        assert_eq!(request.messages[3].content, "Explain DNA sequencing");
    }

    #[test]
    fn request_carries_fixed_parameters() {
        let turns = vec![turn(Role::User, "q")];
        let body = serde_json::to_value(build_request(&turns)).unwrap();

        assert_eq!(body["model"], MODEL);
        assert_eq!(body["max_tokens"], MAX_TOKENS);
        assert!((body["temperature"].as_f64().unwrap() - f64::from(TEMPERATURE)).abs() < 1e-6);
    }

    #[test]
    fn client_construction_succeeds() {
        assert!(GroqClient::new("gsk_test_key").is_ok());
    }
}
