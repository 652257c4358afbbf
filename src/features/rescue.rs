//! Mental rescue panel - breathing, journaling and comfort messages
//!
//! Nothing in here awards experience.

use chrono::{DateTime, Utc};
use std::time::Duration;

use super::FlowError;
use crate::coach::Coach;

/// Inhale/exhale switch period
pub const BREATH_PERIOD: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreathPhase {
    #[default]
    Inhale,
    Exhale,
}

impl BreathPhase {
    pub fn next(self) -> Self {
        match self {
            BreathPhase::Inhale => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::Inhale,
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Breathe in...",
            BreathPhase::Exhale => "Breathe out...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Journal {
    entry: String,
    saved_at: Option<DateTime<Utc>>,
}

impl Journal {
    /// Append a line to the entry
    pub fn write(&mut self, text: &str) -> Result<(), FlowError> {
        if self.saved_at.is_some() {
            return Err(FlowError::AlreadySaved);
        }
        if !self.entry.is_empty() {
            self.entry.push('\n');
        }
        self.entry.push_str(text);
        Ok(())
    }

    /// Let the feelings go. Terminal; the text lives only for this session.
    pub fn save(&mut self) -> Result<(), FlowError> {
        if self.saved_at.is_some() {
            return Err(FlowError::AlreadySaved);
        }
        self.saved_at = Some(Utc::now());
        Ok(())
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn is_saved(&self) -> bool {
        self.saved_at.is_some()
    }
}

/// Comfort message drafting
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageComposer {
    pub recipient: String,
    pub context: String,
    draft: Option<String>,
    loading: bool,
}

/// Inputs for a comfort message request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRequest {
    pub ticket: u64,
    pub recipient: String,
    pub context: String,
}

impl MessageComposer {
    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RescueMode {
    #[default]
    Menu,
    Breathing(BreathPhase),
    Journal(Journal),
    Message(MessageComposer),
}

#[derive(Debug, Clone, Default)]
pub struct RescuePanel {
    open: bool,
    mode: RescueMode,
    /// Bumped on every open/close so late replies can be recognised
    session: u64,
    /// Bumped on every draft request; only the newest may land
    draft_ticket: u64,
    tip_loading: bool,
    tip: Option<String>,
}

impl RescuePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open at the menu, whatever was showing before
    pub fn open(&mut self) {
        self.session += 1;
        self.open = true;
        self.mode = RescueMode::Menu;
        self.tip_loading = false;
        self.tip = None;
    }

    pub fn close(&mut self) {
        self.session += 1;
        self.open = false;
        self.mode = RescueMode::Menu;
        self.tip_loading = false;
    }

    /// Back to the menu
    pub fn back(&mut self) {
        self.mode = RescueMode::Menu;
    }

    pub fn breathe(&mut self) {
        self.mode = RescueMode::Breathing(BreathPhase::Inhale);
    }

    pub fn journal(&mut self) {
        self.mode = RescueMode::Journal(Journal::default());
    }

    pub fn message(&mut self) {
        self.mode = RescueMode::Message(MessageComposer::default());
    }

    /// Advance the breathing cycle; ignored outside breathing mode
    pub fn pulse(&mut self) -> Option<BreathPhase> {
        match &mut self.mode {
            RescueMode::Breathing(phase) if self.open => {
                *phase = phase.next();
                Some(*phase)
            }
            _ => None,
        }
    }

    pub fn journal_mut(&mut self) -> Result<&mut Journal, FlowError> {
        match &mut self.mode {
            RescueMode::Journal(journal) => Ok(journal),
            _ => Err(FlowError::WrongMode),
        }
    }

    pub fn composer_mut(&mut self) -> Result<&mut MessageComposer, FlowError> {
        match &mut self.mode {
            RescueMode::Message(composer) => Ok(composer),
            _ => Err(FlowError::WrongMode),
        }
    }

    pub fn begin_draft(&mut self) -> Result<DraftRequest, FlowError> {
        let ticket = self.draft_ticket + 1;
        let composer = self.composer_mut()?;
        if composer.loading {
            return Err(FlowError::Busy);
        }
        if composer.recipient.trim().is_empty() {
            return Err(FlowError::EmptyRecipient);
        }
        composer.loading = true;
        self.draft_ticket = ticket;
        let composer = self.composer_mut()?;
        Ok(DraftRequest {
            ticket,
            recipient: composer.recipient.trim().to_string(),
            context: composer.context.trim().to_string(),
        })
    }

    /// Store the draft; false if a newer request was made or the panel
    /// moved on since
    pub fn finish_draft(&mut self, ticket: u64, text: String) -> bool {
        if ticket != self.draft_ticket {
            return false;
        }
        match &mut self.mode {
            RescueMode::Message(composer) if composer.loading => {
                composer.loading = false;
                composer.draft = Some(text);
                true
            }
            _ => false,
        }
    }

    pub async fn compose(&mut self, coach: &Coach) -> Result<&str, FlowError> {
        let request = self.begin_draft()?;
        let text = coach.comfort_message(&request.recipient, &request.context).await;
        self.finish_draft(request.ticket, text);
        self.composer_mut()?.draft().ok_or(FlowError::WrongMode)
    }

    /// Discard the draft and go back to editing recipient and context
    pub fn regenerate(&mut self) -> Result<(), FlowError> {
        let composer = self.composer_mut()?;
        composer.draft = None;
        composer.loading = false;
        Ok(())
    }

    pub fn begin_tip(&mut self) -> Result<u64, FlowError> {
        if self.mode != RescueMode::Menu {
            return Err(FlowError::WrongMode);
        }
        if self.tip_loading {
            return Err(FlowError::Busy);
        }
        self.tip_loading = true;
        Ok(self.session)
    }

    pub fn finish_tip(&mut self, session: u64, tip: String) -> bool {
        if session != self.session {
            return false;
        }
        self.tip_loading = false;
        self.tip = Some(tip);
        true
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> &RescueMode {
        &self.mode
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn tip(&self) -> Option<&str> {
        self.tip.as_deref()
    }
}
