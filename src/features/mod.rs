//! Feature panels
//!
//! Each panel is a small state machine holding its own disposable state.
//! Panels award experience through [`crate::progress::UserProgress`] and
//! split every collaborator call into `begin_*` (enter loading, build the
//! request) and `finish_*` (apply the result), so the caller can run the
//! call in the background while timers keep ticking.

pub mod dashboard;
pub mod quest;
pub mod rescue;
pub mod social;
pub mod study;

use thiserror::Error;

pub use dashboard::Dashboard;
pub use quest::ExplorationQuest;
pub use rescue::RescuePanel;
pub use social::SocialLab;
pub use study::StudyMate;

/// Actions a panel refuses in its current state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("still waiting for the previous request")]
    Busy,
    #[error("pick a mood first")]
    NoMoodSelected,
    #[error("no task #{0}")]
    NoSuchTask(usize),
    #[error("enter a goal first")]
    EmptyGoal,
    #[error("create a study plan first")]
    NoStudyPlan,
    #[error("no step #{0}")]
    NoSuchStep(usize),
    #[error("choose a scenario first")]
    NoScenario,
    #[error("no scenario #{0}")]
    NoSuchScenario(usize),
    #[error("type a message first")]
    EmptyMessage,
    #[error("request missions first")]
    NoMissionsOffered,
    #[error("no mission #{0}")]
    NoSuchMission(usize),
    #[error("no active mission")]
    NoActiveMission,
    #[error("not available in this mode")]
    WrongMode,
    #[error("enter who the message is for")]
    EmptyRecipient,
    #[error("the journal entry is already saved")]
    AlreadySaved,
    #[error("the timer has finished; reset it first")]
    TimerFinished,
}
