//! Sprout - a gamified self-help companion
//!
//! Small real-world steps (micro-tasks, focus sessions, study steps,
//! social practice turns, outdoor missions) earn experience points that
//! grow a level and a garden. Routines, plans, dialogue, praise and
//! messages come from an LLM; every request has a fixed fallback so the
//! app works the same offline.
//!
//! # Example
//!
//! ```ignore
//! use sprout::{Coach, Config, UserProgress};
//! use sprout::types::Mood;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let coach = Coach::from_config(&Config::load()?);
//!     let mut progress = UserProgress::new();
//!     for task in coach.routine(Mood::Tired, 3).await {
//!         println!("{}", task);
//!     }
//!     progress.award(20);
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod progress;
pub mod coach;
pub mod config;
pub mod security;
pub mod ticker;
pub mod features;
pub mod app;
pub mod interactive;
pub mod cli;

pub use app::{App, AppEvent, Completion, Notice};
pub use coach::{Coach, Collaborator, CollaboratorError, LlmCollaborator, OfflineCollaborator};
pub use config::Config;
pub use features::FlowError;
pub use progress::{AwardOutcome, UserProgress};
pub use security::{delete_api_key, get_api_key, has_api_key, set_api_key};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - small steps, every day", NAME, VERSION)
}

/// Truncate to at most `max` bytes without splitting a character
pub fn truncate_safe(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_safe_respects_char_boundaries() {
        assert_eq!(truncate_safe("hello", 10), "hello");
        assert_eq!(truncate_safe("hello", 3), "hel");
        // 🌱 is four bytes
        assert_eq!(truncate_safe("a🌱b", 3), "a");
        assert_eq!(truncate_safe("a🌱b", 5), "a🌱");
    }
}
