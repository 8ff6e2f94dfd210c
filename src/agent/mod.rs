use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::connection::DatabaseError;
use crate::database::models::{NewChat, NewMessage};
use crate::database::repositories::ChatRepository;

/// Instructions for the external classifier. The model's only job is to
/// turn free-form text into the structured action list below; everything
/// the wallet can actually do is decided and signed client-side.
const SYSTEM_PROMPT: &str = r#"You are an assistant operating a Solana wallet. Parse the user's natural language intent into a structured JSON array of actions.
The action type MUST be one of: "transfer", "swap", "balance", "stake", or "unknown".

If the user requests multiple actions, extract EACH supported action into the "actions" array.
If an action is unsupported, use "type": "unknown" and provide a brief helpful "message" explaining what you CAN do.

Return ONLY valid JSON matching this structure:
{
  "actions": [
    {
      "type": "transfer" | "swap" | "balance" | "stake" | "unknown",
      "amount": number (optional),
      "useMax": boolean (optional, true to spend the entire balance),
      "token": string (optional, token symbol like SOL, USDC),
      "sourceToken": string (optional, for swap),
      "destinationToken": string (optional, for swap),
      "recipient": string (optional, base58 address),
      "message": string (optional, for limitations or unknown requests),
      "schedule": { (optional, include when the action should happen LATER or on a CONDITION)
         "type": "time" | "price_gte" | "price_lte" | "idle",
         "isoDate": string (ISO 8601, REQUIRED if type=time),
         "token": string (REQUIRED for price types, e.g. "SOL"),
         "priceUsd": number (REQUIRED for price types),
         "hours": number (REQUIRED if type=idle)
      }
    }
  ]
}

Examples:
"Send 0.1 SOL to 7Zbk..." -> {"actions": [{"type":"transfer", "amount":0.1, "token":"SOL", "recipient":"7Zbk..."}]}
"Swap 1 SOL to USDC when SOL reaches 250" -> {"actions": [{"type":"swap", "amount":1, "sourceToken":"SOL", "destinationToken":"USDC", "schedule": {"type":"price_gte", "token":"SOL", "priceUsd": 250}}]}
"What's my balance?" -> {"actions": [{"type":"balance"}]}

User Intent:
"#;

/// Errors from the external language-model endpoint
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Completion request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("No API key configured for the intent parser")]
    NotConfigured,
}

/// Schedule attached to an action the user wants deferred
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionSchedule {
    #[serde(rename = "type")]
    pub schedule_type: String,
    pub iso_date: Option<chrono::DateTime<chrono::Utc>>,
    pub token: Option<String>,
    #[schema(value_type = Option<String>, example = "250")]
    pub price_usd: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "24")]
    pub hours: Option<Decimal>,
}

/// One structured action extracted from a natural-language message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[schema(value_type = Option<String>, example = "0.5")]
    pub amount: Option<Decimal>,
    pub use_max: Option<bool>,
    pub token: Option<String>,
    pub source_token: Option<String>,
    pub destination_token: Option<String>,
    pub recipient: Option<String>,
    pub message: Option<String>,
    pub schedule: Option<ActionSchedule>,
}

impl AgentAction {
    /// Fallback action surfaced when parsing or the provider fails
    pub fn unknown(message: String) -> Self {
        Self {
            action_type: "unknown".to_string(),
            amount: None,
            use_max: None,
            token: None,
            source_token: None,
            destination_token: None,
            recipient: None,
            message: Some(message),
            schedule: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ActionList {
    #[serde(default)]
    actions: Vec<AgentAction>,
}

/// The agent's reply to one user message
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentReply {
    pub actions: Vec<AgentAction>,
    pub raw_response: String,
}

/// Opaque completion endpoint - the NL parsing itself is out of scope here
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Chat-completions style HTTP client (OpenAI-compatible wire format)
pub struct HttpLlmClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpLlmClient {
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::NotConfigured);
        }

        let request = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response: serde_json::Value = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        response
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| LlmError::MalformedResponse("missing completion content".to_string()))
    }
}

/// Strip the markdown code fences providers like to wrap JSON in
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Intent-parsing service: persists the conversation and turns a message
/// into structured actions through the opaque classifier
pub struct AgentService {
    llm: Arc<dyn LlmClient>,
    chats: Arc<dyn ChatRepository>,
}

impl AgentService {
    pub fn new(llm: Arc<dyn LlmClient>, chats: Arc<dyn ChatRepository>) -> Self {
        Self { llm, chats }
    }

    /// Process one user message end to end
    ///
    /// Provider and parse failures never surface as errors: the reply
    /// degrades to a single `unknown` action carrying the failure message,
    /// so the client always has something to render. Only store failures
    /// propagate.
    pub async fn process_message(
        &self,
        user_id: Uuid,
        content: &str,
    ) -> Result<AgentReply, DatabaseError> {
        let chat = match self.chats.latest_chat(user_id).await? {
            Some(chat) => chat,
            None => self.chats.create_chat(NewChat::new(user_id)).await?,
        };

        self.chats
            .insert_message(NewMessage::new(chat.id, "user", content.to_string()))
            .await?;

        let prompt = format!("{}{}", SYSTEM_PROMPT, content);

        let (actions, raw_response) = match self.llm.complete(&prompt).await {
            Ok(text) => {
                let sanitized = strip_code_fences(&text);
                match serde_json::from_str::<ActionList>(&sanitized) {
                    Ok(list) => (list.actions, text),
                    Err(e) => {
                        tracing::warn!("Intent response was not valid JSON: {}", e);
                        let message = "I couldn't understand that request. I can help you \
                                       transfer SOL, swap tokens, stake, or check your balance."
                            .to_string();
                        (vec![AgentAction::unknown(message)], text)
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Intent parsing failed: {}", e);
                (vec![AgentAction::unknown(e.to_string())], e.to_string())
            }
        };

        self.chats
            .insert_message(NewMessage::new(chat.id, "agent", raw_response.clone()))
            .await?;

        Ok(AgentReply {
            actions,
            raw_response,
        })
    }

    /// Messages of the user's latest chat, oldest first
    pub async fn history(&self, user_id: Uuid) -> Result<Vec<crate::database::models::Message>, DatabaseError> {
        match self.chats.latest_chat(user_id).await? {
            Some(chat) => self.chats.list_messages(chat.id).await,
            None => Ok(Vec::new()),
        }
    }
}
