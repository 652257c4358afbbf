//! Social lab - role-play conversations with coach feedback

use super::FlowError;
use crate::coach::{Coach, HistoryTurn};
use crate::progress::{AwardOutcome, UserProgress, SOCIAL_SCORE_THRESHOLD, SOCIAL_TURN_XP};
use crate::types::{ChatMessage, SocialReply};

/// Practice scenarios on offer
pub const SCENARIOS: [&str; 4] = [
    "Ordering a coffee at a cafe",
    "Emailing a professor to ask for an assignment extension",
    "Declining a friend's party invitation",
    "Making small talk with a neighbor in the elevator",
];

/// Everything the coach needs for one turn
#[derive(Debug, Clone, PartialEq)]
pub struct SocialRequest {
    /// Conversation the reply belongs to
    pub session: u64,
    pub scenario: String,
    pub history: Vec<HistoryTurn>,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct SocialLab {
    scenario: Option<String>,
    transcript: Vec<ChatMessage>,
    loading: bool,
    session: u64,
}

impl SocialLab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a scenario by 0-based catalogue index
    pub fn start_catalogue(&mut self, index: usize) -> Result<&[ChatMessage], FlowError> {
        let scenario = SCENARIOS.get(index).ok_or(FlowError::NoSuchScenario(index + 1))?;
        Ok(self.start(scenario))
    }

    /// Start a scenario, discarding any previous conversation
    pub fn start(&mut self, scenario: &str) -> &[ChatMessage] {
        self.session += 1;
        self.loading = false;
        self.scenario = Some(scenario.to_string());
        self.transcript = vec![ChatMessage::ai(
            format!("Scenario: {}. Say something first when you're ready!", scenario),
            None,
        )];
        &self.transcript
    }

    /// Append the user's message and build the request
    pub fn begin_send(&mut self, text: &str) -> Result<SocialRequest, FlowError> {
        let scenario = self.scenario.clone().ok_or(FlowError::NoScenario)?;
        if self.loading {
            return Err(FlowError::Busy);
        }
        if text.trim().is_empty() {
            return Err(FlowError::EmptyMessage);
        }

        let history = self
            .transcript
            .iter()
            .map(|m| (m.sender.as_role().to_string(), m.text.clone()))
            .collect();
        self.transcript.push(ChatMessage::user(text));
        self.loading = true;

        Ok(SocialRequest {
            session: self.session,
            scenario,
            history,
            message: text.to_string(),
        })
    }

    /// Append the coach reply. A score above the threshold earns the turn
    /// bonus. Replies for an ended or replaced conversation are dropped.
    pub fn finish_send(
        &mut self,
        session: u64,
        reply: SocialReply,
        progress: &mut UserProgress,
    ) -> Option<AwardOutcome> {
        if session != self.session || self.scenario.is_none() {
            tracing::debug!("Dropping reply for stale social session {}", session);
            return None;
        }
        self.loading = false;
        let score = reply.feedback.score;
        self.transcript.push(ChatMessage::ai(reply.reply, Some(reply.feedback)));

        if score > SOCIAL_SCORE_THRESHOLD {
            Some(progress.award(SOCIAL_TURN_XP))
        } else {
            None
        }
    }

    pub async fn send(
        &mut self,
        text: &str,
        coach: &Coach,
        progress: &mut UserProgress,
    ) -> Result<Option<AwardOutcome>, FlowError> {
        let request = self.begin_send(text)?;
        let reply = coach.social_reply(&request.scenario, &request.history, &request.message).await;
        Ok(self.finish_send(request.session, reply, progress))
    }

    /// Leave the scenario; the transcript is gone
    pub fn end(&mut self) {
        self.session += 1;
        self.scenario = None;
        self.transcript.clear();
        self.loading = false;
    }

    pub fn scenario(&self) -> Option<&str> {
        self.scenario.as_deref()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn session(&self) -> u64 {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Feedback, Sender};

    fn reply(score: f64) -> SocialReply {
        SocialReply {
            reply: "Sure, what size?".to_string(),
            feedback: Feedback { score, advice: "Good eye contact".to_string() },
        }
    }

    #[test]
    fn test_start_seeds_one_ai_message() {
        let mut lab = SocialLab::new();
        let transcript = lab.start_catalogue(0).unwrap();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].sender, Sender::Ai);
        assert!(transcript[0].text.contains("Ordering a coffee"));
        assert_eq!(lab.start_catalogue(9).unwrap_err(), FlowError::NoSuchScenario(10));
    }

    #[test]
    fn test_send_is_optimistic_and_history_excludes_new_message() {
        let mut lab = SocialLab::new();
        assert_eq!(lab.begin_send("hi").unwrap_err(), FlowError::NoScenario);
        lab.start("Ordering coffee");

        let req = lab.begin_send("One latte please").unwrap();
        assert_eq!(lab.transcript().len(), 2);
        assert_eq!(lab.transcript()[1].sender, Sender::User);
        assert_eq!(req.history.len(), 1);
        assert_eq!(req.history[0].0, "ai");
        assert_eq!(req.message, "One latte please");
        assert_eq!(lab.begin_send("again").unwrap_err(), FlowError::Busy);
    }

    #[test]
    fn test_score_threshold() {
        let mut p = UserProgress::new();
        let mut lab = SocialLab::new();
        lab.start("cafe");

        let req = lab.begin_send("hello").unwrap();
        assert_eq!(lab.finish_send(req.session, reply(70.0), &mut p), None);
        assert_eq!(p.current_xp, 0);

        let req = lab.begin_send("hello again").unwrap();
        let award = lab.finish_send(req.session, reply(71.0), &mut p).unwrap();
        assert_eq!(award.amount, 10);
        assert_eq!(p.current_xp, 10);

        let last = lab.transcript().last().unwrap();
        assert_eq!(last.sender, Sender::Ai);
        assert_eq!(last.feedback.as_ref().unwrap().score, 71.0);
    }

    #[test]
    fn test_stale_reply_is_dropped() {
        let mut p = UserProgress::new();
        let mut lab = SocialLab::new();
        lab.start("cafe");
        let req = lab.begin_send("hello").unwrap();
        lab.start("elevator");
        assert_eq!(lab.finish_send(req.session, reply(99.0), &mut p), None);
        assert_eq!(lab.transcript().len(), 1);
        assert_eq!(p.current_xp, 0);
    }

    #[test]
    fn test_end_discards_transcript() {
        let mut lab = SocialLab::new();
        lab.start("cafe");
        lab.begin_send("hi").unwrap();
        lab.end();
        assert!(lab.scenario().is_none());
        assert!(lab.transcript().is_empty());
        assert!(!lab.is_loading());
    }
}
