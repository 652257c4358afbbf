//! Coach - the content-generation collaborator
//!
//! Every piece of generated content (routines, study plans, simulated
//! dialogue, praise, tips, comfort messages, outdoor missions) comes from a
//! [`Collaborator`]. Callers never talk to it directly: they go through
//! [`Coach`], which logs failures and substitutes the fixed fallback for
//! that request shape, so no flow ever stalls on a failed call.

pub mod error;
pub mod fallback;
pub mod llm;
pub mod prompts;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::config::{Config, ModelsConfig};
use crate::types::{Mood, SocialReply, StudyPlan};
pub use error::CollaboratorError;
use llm::{ChatMessage, LlmClient, OutputShape, ProviderConfig};

/// One prior turn of a simulation, as (role, content)
pub type HistoryTurn = (String, String);

/// Fallible content generation, one method per request shape
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Mood + energy -> short micro-tasks
    async fn routine(&self, mood: Mood, energy: u8) -> Result<Vec<String>, CollaboratorError>;

    /// Goal -> intro message and ordered steps
    async fn study_breakdown(&self, goal: &str) -> Result<StudyPlan, CollaboratorError>;

    /// Scenario + transcript + new message -> in-character reply and feedback
    async fn social_reply(
        &self,
        scenario: &str,
        history: &[HistoryTurn],
        message: &str,
    ) -> Result<SocialReply, CollaboratorError>;

    /// Completed task -> one-line praise
    async fn praise(&self, task: &str) -> Result<String, CollaboratorError>;

    /// One grounding technique or comforting thought
    async fn grounding_tip(&self) -> Result<String, CollaboratorError>;

    /// Recipient + context -> a message the user can send
    async fn comfort_message(&self, recipient: &str, context: &str) -> Result<String, CollaboratorError>;

    /// Outdoor level -> missions scaled to that tier
    async fn outdoor_missions(&self, level: u32) -> Result<Vec<String>, CollaboratorError>;
}

/// Routine and mission replies; a bare array is accepted from models that
/// ignore the schema
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringList {
    Wrapped { items: Vec<String> },
    Bare(Vec<String>),
}

impl StringList {
    fn into_items(self) -> Vec<String> {
        match self {
            StringList::Wrapped { items } | StringList::Bare(items) => items,
        }
    }
}

/// Collaborator backed by an OpenAI-compatible LLM endpoint
pub struct LlmCollaborator {
    client: LlmClient,
    models: ModelsConfig,
    language: String,
    max_tokens: Option<u32>,
}

impl LlmCollaborator {
    pub fn new(client: LlmClient, models: ModelsConfig, language: String) -> Self {
        Self { client, models, language, max_tokens: None }
    }

    /// Cap completion tokens; reasoning models spend part of this before answering
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build from config with the given API key
    pub fn from_config(config: &Config, api_key: String) -> Result<Self, CollaboratorError> {
        let mut provider = ProviderConfig::openrouter(api_key);
        if config.provider.base_url != llm::OPENROUTER_BASE_URL {
            provider = ProviderConfig::custom(provider.api_key, config.provider.base_url.clone());
        }
        if config.provider.timeout_secs > 0 {
            provider.timeout = Some(std::time::Duration::from_secs(config.provider.timeout_secs));
        }
        let max_tokens = Some(config.provider.max_tokens).filter(|n| *n > 0);
        Ok(Self::new(
            LlmClient::with_provider(provider)?,
            config.models.clone(),
            config.content.language.clone(),
        )
        .with_max_tokens(max_tokens))
    }

    async fn text(&self, model: &str, messages: Vec<ChatMessage>) -> Result<String, CollaboratorError> {
        let text = self.client.complete(model, messages, &OutputShape::Text, self.max_tokens).await?;
        Ok(text.trim().to_string())
    }

    async fn json<T: DeserializeOwned>(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        shape: OutputShape,
    ) -> Result<T, CollaboratorError> {
        let raw = self.client.complete(model, messages, &shape, self.max_tokens).await?;
        Ok(serde_json::from_str(llm::strip_code_fence(&raw))?)
    }
}

#[async_trait]
impl Collaborator for LlmCollaborator {
    async fn routine(&self, mood: Mood, energy: u8) -> Result<Vec<String>, CollaboratorError> {
        let prompt = prompts::routine(mood, energy, &self.language);
        let list: StringList = self
            .json(&self.models.routine, vec![ChatMessage::user(prompt)], prompts::string_list_shape("routine"))
            .await?;
        Ok(list.into_items())
    }

    async fn study_breakdown(&self, goal: &str) -> Result<StudyPlan, CollaboratorError> {
        let prompt = prompts::study_breakdown(goal, &self.language);
        self.json(&self.models.study, vec![ChatMessage::user(prompt)], prompts::study_plan_shape())
            .await
    }

    async fn social_reply(
        &self,
        scenario: &str,
        history: &[HistoryTurn],
        message: &str,
    ) -> Result<SocialReply, CollaboratorError> {
        let mut messages = vec![ChatMessage::system(prompts::social_system(scenario, &self.language))];
        for (role, content) in history {
            messages.push(match role.as_str() {
                "user" => ChatMessage::user(content.clone()),
                _ => ChatMessage::assistant(content.clone()),
            });
        }
        messages.push(ChatMessage::user(prompts::social_turn(message)));
        self.json(&self.models.social, messages, prompts::social_reply_shape()).await
    }

    async fn praise(&self, task: &str) -> Result<String, CollaboratorError> {
        let prompt = prompts::praise(task, &self.language);
        self.text(&self.models.praise, vec![ChatMessage::user(prompt)]).await
    }

    async fn grounding_tip(&self) -> Result<String, CollaboratorError> {
        let prompt = prompts::grounding_tip(&self.language);
        self.text(&self.models.rescue, vec![ChatMessage::user(prompt)]).await
    }

    async fn comfort_message(&self, recipient: &str, context: &str) -> Result<String, CollaboratorError> {
        let prompt = prompts::comfort_message(recipient, context, &self.language);
        self.text(&self.models.rescue, vec![ChatMessage::user(prompt)]).await
    }

    async fn outdoor_missions(&self, level: u32) -> Result<Vec<String>, CollaboratorError> {
        let prompt = prompts::outdoor_missions(level, &self.language);
        let list: StringList = self
            .json(&self.models.quest, vec![ChatMessage::user(prompt)], prompts::string_list_shape("missions"))
            .await?;
        Ok(list.into_items())
    }
}

/// Collaborator used when no API key is configured; every call fails
pub struct OfflineCollaborator;

#[async_trait]
impl Collaborator for OfflineCollaborator {
    async fn routine(&self, _mood: Mood, _energy: u8) -> Result<Vec<String>, CollaboratorError> {
        Err(CollaboratorError::MissingApiKey)
    }

    async fn study_breakdown(&self, _goal: &str) -> Result<StudyPlan, CollaboratorError> {
        Err(CollaboratorError::MissingApiKey)
    }

    async fn social_reply(
        &self,
        _scenario: &str,
        _history: &[HistoryTurn],
        _message: &str,
    ) -> Result<SocialReply, CollaboratorError> {
        Err(CollaboratorError::MissingApiKey)
    }

    async fn praise(&self, _task: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::MissingApiKey)
    }

    async fn grounding_tip(&self) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::MissingApiKey)
    }

    async fn comfort_message(&self, _recipient: &str, _context: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::MissingApiKey)
    }

    async fn outdoor_missions(&self, _level: u32) -> Result<Vec<String>, CollaboratorError> {
        Err(CollaboratorError::MissingApiKey)
    }
}

/// Items requested for routines and missions
const BATCH_SIZE: usize = 3;

/// Resilient facade over a [`Collaborator`]: always returns usable content
#[derive(Clone)]
pub struct Coach {
    inner: Arc<dyn Collaborator>,
}

impl Coach {
    pub fn new(inner: Arc<dyn Collaborator>) -> Self {
        Self { inner }
    }

    /// LLM-backed coach, or an offline one when no API key is available
    pub fn from_config(config: &Config) -> Self {
        let api_key = match crate::security::get_api_key() {
            Ok(key) => key,
            Err(e) => {
                warn!("No API key available, using offline content: {}", e);
                return Self::new(Arc::new(OfflineCollaborator));
            }
        };
        match LlmCollaborator::from_config(config, api_key) {
            Ok(collaborator) => Self::new(Arc::new(collaborator)),
            Err(e) => {
                warn!("Could not build LLM client, using offline content: {}", e);
                Self::new(Arc::new(OfflineCollaborator))
            }
        }
    }

    pub async fn routine(&self, mood: Mood, energy: u8) -> Vec<String> {
        let result = self.inner.routine(mood, energy).await.and_then(non_empty_batch);
        or_fallback("routine", result, fallback::routine)
    }

    pub async fn study_breakdown(&self, goal: &str) -> StudyPlan {
        let result = self.inner.study_breakdown(goal).await.and_then(|mut plan| {
            plan.steps.retain(|s| !s.trim().is_empty());
            if plan.steps.is_empty() {
                Err(CollaboratorError::Empty)
            } else {
                Ok(plan)
            }
        });
        or_fallback("study", result, fallback::study_plan)
    }

    pub async fn social_reply(&self, scenario: &str, history: &[HistoryTurn], message: &str) -> SocialReply {
        let result = self.inner.social_reply(scenario, history, message).await.and_then(|mut reply| {
            if !reply.feedback.score.is_finite() {
                return Err(CollaboratorError::Parse("non-numeric feedback score".to_string()));
            }
            reply.feedback.score = reply.feedback.score.clamp(0.0, 100.0);
            Ok(reply)
        });
        or_fallback("social", result, fallback::social_reply)
    }

    pub async fn praise(&self, task: &str) -> String {
        let result = self.inner.praise(task).await.and_then(non_blank);
        or_fallback("praise", result, || fallback::PRAISE.to_string())
    }

    pub async fn grounding_tip(&self) -> String {
        let result = self.inner.grounding_tip().await.and_then(non_blank);
        or_fallback("tip", result, || fallback::GROUNDING_TIP.to_string())
    }

    pub async fn comfort_message(&self, recipient: &str, context: &str) -> String {
        let result = self.inner.comfort_message(recipient, context).await.and_then(non_blank);
        or_fallback("comfort", result, || fallback::COMFORT_MESSAGE.to_string())
    }

    pub async fn outdoor_missions(&self, level: u32) -> Vec<String> {
        let result = self.inner.outdoor_missions(level).await.and_then(non_empty_batch);
        or_fallback("missions", result, fallback::outdoor_missions)
    }
}

fn or_fallback<T>(shape: &str, result: Result<T, CollaboratorError>, fallback: impl FnOnce() -> T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("{} generation failed, using fallback: {}", shape, e);
            fallback()
        }
    }
}

fn non_blank(text: String) -> Result<String, CollaboratorError> {
    let text = text.trim();
    if text.is_empty() {
        Err(CollaboratorError::Empty)
    } else {
        Ok(text.to_string())
    }
}

fn non_empty_batch(items: Vec<String>) -> Result<Vec<String>, CollaboratorError> {
    let items: Vec<String> = items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(BATCH_SIZE)
        .collect();
    if items.is_empty() {
        Err(CollaboratorError::Empty)
    } else {
        Ok(items)
    }
}
