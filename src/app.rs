//! Application controller
//!
//! [`App`] owns the progress record, the active view, every feature panel
//! and the tickers that drive them. User actions are plain method calls.
//! Everything asynchronous (coach replies, timer ticks, scheduled
//! dismissals) arrives as an [`AppEvent`] on one channel and is applied by
//! [`App::handle_event`], so state is only ever mutated from the event loop.

use std::fmt;
use std::future::Future;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::coach::Coach;
use crate::features::dashboard::{PRAISE_DURATION, RESCUE_OFFER_DELAY};
use crate::features::rescue::{BreathPhase, RescueMode, BREATH_PERIOD};
use crate::features::quest::QuestState;
use crate::features::study::{StepToggle, TICK};
use crate::features::{Dashboard, ExplorationQuest, FlowError, RescuePanel, SocialLab, StudyMate};
use crate::progress::{AwardOutcome, UserProgress};
use crate::ticker::Ticker;
use crate::types::{ChatMessage, Feedback, MicroTask, Mood, SocialReply, StudyPlan, View};

/// Everything the event loop consumes
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A line typed by the user
    Input(String),
    /// Input stream closed (Ctrl+D)
    InputClosed,
    TimerTick,
    BreathPulse,
    PraiseExpired(u64),
    RescueOfferDue,
    Generated(Completion),
}

/// A finished coach request, tagged with what it belongs to
#[derive(Debug, Clone)]
pub enum Completion {
    Routine { mount: u64, items: Vec<String> },
    Praise { mount: u64, text: String },
    StudyPlan { mount: u64, plan: StudyPlan },
    Social { mount: u64, session: u64, reply: SocialReply },
    Missions { mount: u64, missions: Vec<String> },
    Tip { session: u64, tip: String },
    Draft { ticket: u64, text: String },
}

/// Something the user should be told about
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    RoutineReady(Vec<String>),
    Praise(String),
    RescueOffer,
    Breath(BreathPhase),
    FocusComplete(AwardOutcome),
    StudyPlanReady(StudyPlan),
    SocialReply {
        reply: String,
        feedback: Feedback,
        award: Option<AwardOutcome>,
    },
    MissionsOffered(Vec<String>),
    Tip(String),
    Draft(String),
}

fn numbered(f: &mut fmt::Formatter<'_>, items: &[String]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        write!(f, "\n  {}. {}", i + 1, item)?;
    }
    Ok(())
}

/// "+N XP", plus a level-up line when one happened
pub fn award_line(award: &AwardOutcome) -> String {
    let mut line = format!("+{} XP", award.amount);
    if award.leveled_up {
        line.push_str(&format!("\n🎉 Level up! You reached level {}", award.level));
    }
    line
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::RoutineReady(items) => {
                write!(f, "Your routine for today:")?;
                numbered(f, items)
            }
            Notice::Praise(text) => write!(f, "✨ {}", text),
            Notice::RescueOffer => {
                write!(f, "It sounds like a heavy moment. Open the rescue panel? (y/n)")
            }
            Notice::Breath(phase) => write!(f, "🫧 {}", phase.prompt()),
            Notice::FocusComplete(award) => {
                write!(f, "Session complete! Great focus. {}", award_line(award))
            }
            Notice::StudyPlanReady(plan) => {
                write!(f, "{}", plan.intro_message)?;
                numbered(f, &plan.steps)
            }
            Notice::SocialReply { reply, feedback, award } => {
                write!(f, "💬 {}\n   Score {:.0}/100 - {}", reply, feedback.score, feedback.advice)?;
                if let Some(award) = award {
                    write!(f, "\n   {}", award_line(award))?;
                }
                Ok(())
            }
            Notice::MissionsOffered(missions) => {
                write!(f, "Today's outdoor missions:")?;
                numbered(f, missions)
            }
            Notice::Tip(tip) => write!(f, "🌿 {}", tip),
            Notice::Draft(text) => write!(f, "Draft:\n{}", text),
        }
    }
}

pub struct App {
    coach: Coach,
    events: UnboundedSender<AppEvent>,
    focus_secs: u32,
    progress: UserProgress,
    view: View,
    /// Bumped on every view switch; completions from an older mount are dropped
    mount: u64,
    dashboard: Dashboard,
    study: StudyMate,
    social: SocialLab,
    quest: ExplorationQuest,
    rescue: RescuePanel,
    rescue_offer_pending: bool,
    timer_ticker: Option<Ticker>,
    breath_ticker: Option<Ticker>,
    praise_ticker: Option<Ticker>,
    offer_ticker: Option<Ticker>,
}

impl App {
    pub fn new(coach: Coach, focus_secs: u32, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            coach,
            events,
            focus_secs,
            progress: UserProgress::new(),
            view: View::Dashboard,
            mount: 0,
            dashboard: Dashboard::new(),
            study: StudyMate::new(focus_secs),
            social: SocialLab::new(),
            quest: ExplorationQuest::new(),
            rescue: RescuePanel::new(),
            rescue_offer_pending: false,
            timer_ticker: None,
            breath_ticker: None,
            praise_ticker: None,
            offer_ticker: None,
        }
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn study(&self) -> &StudyMate {
        &self.study
    }

    pub fn social(&self) -> &SocialLab {
        &self.social
    }

    pub fn quest(&self) -> &ExplorationQuest {
        &self.quest
    }

    pub fn rescue(&self) -> &RescuePanel {
        &self.rescue
    }

    /// Switch views. The panel being entered starts from fresh state and
    /// anything the previous one had in flight is forgotten.
    pub fn set_view(&mut self, view: View) {
        if view == self.view {
            return;
        }
        debug!("View {:?} -> {:?}", self.view, view);
        self.view = view;
        self.mount += 1;
        self.timer_ticker = None;
        self.praise_ticker = None;
        self.dashboard.remount();
        self.study = StudyMate::new(self.focus_secs);
        self.social = SocialLab::new();
        self.quest = ExplorationQuest::new();
    }

    fn spawn_request<F>(&self, request: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.events.clone();
        tokio::spawn(async move {
            let completion = request.await;
            if tx.send(AppEvent::Generated(completion)).is_err() {
                debug!("Event loop gone, dropping completion");
            }
        });
    }

    // Dashboard

    /// Record the mood; a negative one schedules the rescue offer
    pub fn select_mood(&mut self, mood: Mood) {
        self.rescue_offer_pending = false;
        self.offer_ticker = if self.dashboard.select_mood(mood) {
            Some(Ticker::once(RESCUE_OFFER_DELAY, self.events.clone(), AppEvent::RescueOfferDue))
        } else {
            None
        };
    }

    pub fn set_energy(&mut self, energy: u8) -> u8 {
        self.dashboard.set_energy(energy)
    }

    pub fn generate_routine(&mut self) -> Result<(), FlowError> {
        let request = self.dashboard.begin_routine()?;
        let coach = self.coach.clone();
        let mount = self.mount;
        self.spawn_request(async move {
            let items = coach.routine(request.mood, request.energy).await;
            Completion::Routine { mount, items }
        });
        Ok(())
    }

    pub fn new_routine(&mut self) {
        self.dashboard.new_routine();
    }

    /// Complete a task (0-based). Awards immediately; praise follows as an event.
    pub fn complete_task(&mut self, index: usize) -> Result<Option<AwardOutcome>, FlowError> {
        let Some(done) = self.dashboard.complete_task(index, &mut self.progress)? else {
            return Ok(None);
        };
        let coach = self.coach.clone();
        let mount = self.mount;
        let task = done.text;
        self.spawn_request(async move {
            let text = coach.praise(&task).await;
            Completion::Praise { mount, text }
        });
        Ok(Some(done.award))
    }

    pub fn tasks(&self) -> &[MicroTask] {
        self.dashboard.tasks()
    }

    /// Respond to a pending rescue offer; false when none was pending
    pub fn answer_rescue_offer(&mut self, accept: bool) -> bool {
        if !std::mem::take(&mut self.rescue_offer_pending) {
            return false;
        }
        if accept {
            self.open_rescue();
        }
        true
    }

    pub fn rescue_offer_pending(&self) -> bool {
        self.rescue_offer_pending
    }

    // Study

    /// Start or pause the focus timer; returns whether it now runs
    pub fn toggle_timer(&mut self) -> Result<bool, FlowError> {
        let running = self.study.timer.toggle()?;
        self.timer_ticker = running.then(|| Ticker::every(TICK, self.events.clone(), AppEvent::TimerTick));
        Ok(running)
    }

    pub fn reset_timer(&mut self) {
        self.timer_ticker = None;
        self.study.timer.reset();
    }

    pub fn create_plan(&mut self, goal: &str) -> Result<(), FlowError> {
        let goal = self.study.planner.begin_plan(goal)?;
        let coach = self.coach.clone();
        let mount = self.mount;
        self.spawn_request(async move {
            let plan = coach.study_breakdown(&goal).await;
            Completion::StudyPlan { mount, plan }
        });
        Ok(())
    }

    /// Toggle a plan step (0-based)
    pub fn toggle_step(&mut self, index: usize) -> Result<StepToggle, FlowError> {
        self.study.planner.toggle_step(index, &mut self.progress)
    }

    pub fn clear_plan(&mut self) {
        self.study.planner.clear();
    }

    // Social

    pub fn start_scenario(&mut self, index: usize) -> Result<&[ChatMessage], FlowError> {
        self.social.start_catalogue(index)
    }

    pub fn send_message(&mut self, text: &str) -> Result<(), FlowError> {
        let request = self.social.begin_send(text)?;
        let coach = self.coach.clone();
        let mount = self.mount;
        self.spawn_request(async move {
            let reply = coach.social_reply(&request.scenario, &request.history, &request.message).await;
            Completion::Social { mount, session: request.session, reply }
        });
        Ok(())
    }

    pub fn end_scenario(&mut self) {
        self.social.end();
    }

    // Quest

    pub fn request_missions(&mut self) -> Result<(), FlowError> {
        self.quest.begin_request()?;
        let coach = self.coach.clone();
        let mount = self.mount;
        let level = self.progress.outdoor_level;
        self.spawn_request(async move {
            let missions = coach.outdoor_missions(level).await;
            Completion::Missions { mount, missions }
        });
        Ok(())
    }

    pub fn select_mission(&mut self, index: usize) -> Result<String, FlowError> {
        self.quest.select(index)
    }

    pub fn complete_mission(&mut self) -> Result<(String, AwardOutcome), FlowError> {
        self.quest.complete(&mut self.progress)
    }

    pub fn abandon_mission(&mut self) -> Result<(), FlowError> {
        self.quest.abandon()
    }

    // Rescue

    pub fn open_rescue(&mut self) {
        self.breath_ticker = None;
        self.rescue.open();
    }

    pub fn close_rescue(&mut self) {
        self.breath_ticker = None;
        self.rescue.close();
    }

    pub fn rescue_back(&mut self) {
        self.breath_ticker = None;
        self.rescue.back();
    }

    pub fn breathe(&mut self) {
        self.rescue.breathe();
        self.breath_ticker = Some(Ticker::every(BREATH_PERIOD, self.events.clone(), AppEvent::BreathPulse));
    }

    pub fn journal(&mut self) {
        self.breath_ticker = None;
        self.rescue.journal();
    }

    pub fn write_journal(&mut self, text: &str) -> Result<(), FlowError> {
        self.rescue.journal_mut()?.write(text)
    }

    pub fn save_journal(&mut self) -> Result<(), FlowError> {
        self.rescue.journal_mut()?.save()
    }

    pub fn message(&mut self) {
        self.breath_ticker = None;
        self.rescue.message();
    }

    pub fn set_recipient(&mut self, recipient: &str) -> Result<(), FlowError> {
        self.rescue.composer_mut()?.recipient = recipient.to_string();
        Ok(())
    }

    pub fn set_context(&mut self, context: &str) -> Result<(), FlowError> {
        self.rescue.composer_mut()?.context = context.to_string();
        Ok(())
    }

    pub fn draft_message(&mut self) -> Result<(), FlowError> {
        let request = self.rescue.begin_draft()?;
        let coach = self.coach.clone();
        self.spawn_request(async move {
            let text = coach.comfort_message(&request.recipient, &request.context).await;
            Completion::Draft { ticket: request.ticket, text }
        });
        Ok(())
    }

    pub fn regenerate_draft(&mut self) -> Result<(), FlowError> {
        self.rescue.regenerate()
    }

    /// The current draft, for copying
    pub fn copy_draft(&mut self) -> Result<String, FlowError> {
        self.rescue
            .composer_mut()?
            .draft()
            .map(str::to_string)
            .ok_or(FlowError::WrongMode)
    }

    pub fn request_tip(&mut self) -> Result<(), FlowError> {
        let session = self.rescue.begin_tip()?;
        let coach = self.coach.clone();
        self.spawn_request(async move {
            let tip = coach.grounding_tip().await;
            Completion::Tip { session, tip }
        });
        Ok(())
    }

    /// Apply an asynchronous event
    pub fn handle_event(&mut self, event: AppEvent) -> Vec<Notice> {
        match event {
            AppEvent::Input(_) | AppEvent::InputClosed => Vec::new(),
            AppEvent::TimerTick => {
                let award = self.study.timer.tick(&mut self.progress);
                if !self.study.timer.is_running() {
                    self.timer_ticker = None;
                }
                award.map(Notice::FocusComplete).into_iter().collect()
            }
            AppEvent::BreathPulse => {
                if !matches!(self.rescue.mode(), RescueMode::Breathing(_)) {
                    self.breath_ticker = None;
                }
                self.rescue.pulse().map(Notice::Breath).into_iter().collect()
            }
            AppEvent::PraiseExpired(seq) => {
                if self.dashboard.dismiss_praise(seq) {
                    self.praise_ticker = None;
                }
                Vec::new()
            }
            AppEvent::RescueOfferDue => {
                self.offer_ticker = None;
                if self.rescue.is_open() {
                    return Vec::new();
                }
                self.rescue_offer_pending = true;
                vec![Notice::RescueOffer]
            }
            AppEvent::Generated(completion) => self.apply(completion),
        }
    }

    fn apply(&mut self, completion: Completion) -> Vec<Notice> {
        match completion {
            Completion::Routine { mount, items } if mount == self.mount => {
                let items = self.dashboard.finish_routine(items).iter().map(|t| t.text.clone()).collect();
                vec![Notice::RoutineReady(items)]
            }
            Completion::Praise { mount, text } if mount == self.mount => {
                let seq = self.dashboard.show_praise(text.clone());
                self.praise_ticker =
                    Some(Ticker::once(PRAISE_DURATION, self.events.clone(), AppEvent::PraiseExpired(seq)));
                vec![Notice::Praise(text)]
            }
            Completion::StudyPlan { mount, plan } if mount == self.mount => {
                vec![Notice::StudyPlanReady(self.study.planner.finish_plan(plan).clone())]
            }
            Completion::Social { mount, session, reply } if mount == self.mount => {
                let text = reply.reply.clone();
                let feedback = reply.feedback.clone();
                if session != self.social.session() {
                    return Vec::new();
                }
                let award = self.social.finish_send(session, reply, &mut self.progress);
                vec![Notice::SocialReply { reply: text, feedback, award }]
            }
            Completion::Missions { mount, missions } if mount == self.mount => {
                match self.quest.finish_request(missions) {
                    QuestState::Offered(m) => vec![Notice::MissionsOffered(m.clone())],
                    _ => Vec::new(),
                }
            }
            Completion::Tip { session, tip } => {
                if self.rescue.finish_tip(session, tip.clone()) {
                    vec![Notice::Tip(tip)]
                } else {
                    Vec::new()
                }
            }
            Completion::Draft { ticket, text } => {
                if self.rescue.finish_draft(ticket, text.clone()) {
                    vec![Notice::Draft(text)]
                } else {
                    Vec::new()
                }
            }
            stale => {
                debug!("Discarding completion from a previous view: {:?}", stale);
                Vec::new()
            }
        }
    }
}
