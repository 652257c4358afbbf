//! Shared types used across modules
//!
//! This module contains the value types that feature panels, the coach and
//! the REPL all pass around, to avoid circular dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the user feels at check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Great,
    Okay,
    Tired,
    Anxious,
    Down,
}

impl Mood {
    /// All moods in display order
    pub const ALL: [Mood; 5] = [Mood::Great, Mood::Okay, Mood::Tired, Mood::Anxious, Mood::Down];

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Great => "🤩",
            Mood::Okay => "🙂",
            Mood::Tired => "😴",
            Mood::Anxious => "😰",
            Mood::Down => "😞",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mood::Great => "Great",
            Mood::Okay => "Okay",
            Mood::Tired => "Tired",
            Mood::Anxious => "Anxious",
            Mood::Down => "Down",
        }
    }

    /// The two most negative moods, which prompt a rescue offer
    pub fn needs_rescue_offer(&self) -> bool {
        matches!(self, Mood::Anxious | Mood::Down)
    }

    /// Parse from a user-typed name or its 1-based menu index
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        if let Ok(idx) = s.parse::<usize>() {
            return idx.checked_sub(1).and_then(|i| Self::ALL.get(i).copied());
        }
        Self::ALL.iter().copied().find(|m| m.as_str() == s)
    }

    /// Lowercase name used in prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Great => "great",
            Mood::Okay => "okay",
            Mood::Tired => "tired",
            Mood::Anxious => "anxious",
            Mood::Down => "down",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.emoji(), self.label())
    }
}

/// A small actionable item on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroTask {
    pub id: String,
    pub text: String,
    /// One-way: false -> true
    pub completed: bool,
    pub xp_value: i64,
}

impl MicroTask {
    pub fn new(text: impl Into<String>, xp_value: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            completed: false,
            xp_value,
        }
    }
}

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    /// Role string used for the transcript passed to the model
    pub fn as_role(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }
}

/// Coach evaluation attached to a simulated reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// 0-100
    pub score: f64,
    pub advice: String,
}

/// One line of a social simulation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text.into(), None)
    }

    pub fn ai(text: impl Into<String>, feedback: Option<Feedback>) -> Self {
        Self::new(Sender::Ai, text.into(), feedback)
    }

    fn new(sender: Sender, text: String, feedback: Option<Feedback>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            text,
            feedback,
            timestamp: Utc::now(),
        }
    }
}

/// Goal breakdown returned by the coach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPlan {
    #[serde(rename = "message")]
    pub intro_message: String,
    pub steps: Vec<String>,
}

/// Simulated reply plus evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialReply {
    pub reply: String,
    pub feedback: Feedback,
}

/// Top-level panels of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Study,
    Social,
    Quest,
    Garden,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Today's Routine",
            View::Study => "Study Mate",
            View::Social => "Social Lab",
            View::Quest => "Exploration Quest",
            View::Garden => "Growth Garden",
        }
    }
}
