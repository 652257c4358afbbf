//! End-to-end progression flows through the app controller

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_test::{assert_err, assert_ok};

use sprout::coach::{fallback, HistoryTurn};
use sprout::features::quest::QuestState;
use sprout::features::study::StepToggle;
use sprout::types::{Feedback, Mood, SocialReply, StudyPlan, View};
use sprout::{App, AppEvent, Coach, Collaborator, CollaboratorError, FlowError, Notice, OfflineCollaborator, UserProgress};

/// Canned content; social scores are consumed in order
struct ScriptedCollaborator {
    steps: usize,
    scores: Mutex<VecDeque<f64>>,
}

impl ScriptedCollaborator {
    fn new(steps: usize, scores: &[f64]) -> Self {
        Self { steps, scores: Mutex::new(scores.iter().copied().collect()) }
    }
}

#[async_trait]
impl Collaborator for ScriptedCollaborator {
    async fn routine(&self, mood: Mood, energy: u8) -> Result<Vec<String>, CollaboratorError> {
        Ok(vec![
            format!("{} task at energy {}", mood.as_str(), energy),
            "Make the bed".to_string(),
            "Text a friend".to_string(),
        ])
    }

    async fn study_breakdown(&self, goal: &str) -> Result<StudyPlan, CollaboratorError> {
        Ok(StudyPlan {
            intro_message: format!("Let's tackle {}", goal),
            steps: (1..=self.steps).map(|i| format!("Step {}", i)).collect(),
        })
    }

    async fn social_reply(
        &self,
        _scenario: &str,
        _history: &[HistoryTurn],
        _message: &str,
    ) -> Result<SocialReply, CollaboratorError> {
        let score = self.scores.lock().unwrap().pop_front().ok_or(CollaboratorError::Empty)?;
        Ok(SocialReply {
            reply: "Okay!".to_string(),
            feedback: Feedback { score, advice: "Keep going".to_string() },
        })
    }

    async fn praise(&self, task: &str) -> Result<String, CollaboratorError> {
        Ok(format!("You did it: {}", task))
    }

    async fn grounding_tip(&self) -> Result<String, CollaboratorError> {
        Ok("Notice three sounds around you".to_string())
    }

    async fn comfort_message(&self, recipient: &str, _context: &str) -> Result<String, CollaboratorError> {
        Ok(format!("Hi {}, could we talk later?", recipient))
    }

    async fn outdoor_missions(&self, level: u32) -> Result<Vec<String>, CollaboratorError> {
        Ok((1..=3).map(|i| format!("Tier {} mission {}", level, i)).collect())
    }
}

/// Every call fails with a server error
struct FailingCollaborator;

fn unavailable() -> CollaboratorError {
    CollaboratorError::Api { status: 503, body: "service unavailable".to_string() }
}

#[async_trait]
impl Collaborator for FailingCollaborator {
    async fn routine(&self, _mood: Mood, _energy: u8) -> Result<Vec<String>, CollaboratorError> {
        Err(unavailable())
    }

    async fn study_breakdown(&self, _goal: &str) -> Result<StudyPlan, CollaboratorError> {
        Err(unavailable())
    }

    async fn social_reply(
        &self,
        _scenario: &str,
        _history: &[HistoryTurn],
        _message: &str,
    ) -> Result<SocialReply, CollaboratorError> {
        Err(unavailable())
    }

    async fn praise(&self, _task: &str) -> Result<String, CollaboratorError> {
        Err(unavailable())
    }

    async fn grounding_tip(&self) -> Result<String, CollaboratorError> {
        Err(unavailable())
    }

    async fn comfort_message(&self, _recipient: &str, _context: &str) -> Result<String, CollaboratorError> {
        Err(unavailable())
    }

    async fn outdoor_missions(&self, _level: u32) -> Result<Vec<String>, CollaboratorError> {
        Err(unavailable())
    }
}

fn app_with(collaborator: impl Collaborator + 'static) -> (App, UnboundedReceiver<AppEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (App::new(Coach::new(Arc::new(collaborator)), 1500, tx), rx)
}

async fn settle(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>) -> Vec<Notice> {
    loop {
        let event = rx.recv().await.expect("event channel closed");
        if matches!(event, AppEvent::Generated(_)) {
            return app.handle_event(event);
        }
    }
}

#[test]
fn award_levels_up_once_with_carry_over() {
    let mut p = UserProgress::new();
    p.award(100);
    assert_eq!((p.level, p.current_xp, p.next_level_xp), (2, 0, 120));

    let mut p = UserProgress::new();
    p.award(150);
    assert_eq!((p.level, p.current_xp, p.next_level_xp), (2, 50, 120));
}

#[test]
fn non_positive_awards_leave_level_and_count_alone() {
    let mut p = UserProgress::new();
    p.award(30);
    let before = p.clone();

    p.award(0);
    p.award(-5);
    assert_eq!(p.level, before.level);
    assert_eq!(p.next_level_xp, before.next_level_xp);
    assert_eq!(p.total_tasks_completed, before.total_tasks_completed);
    assert_eq!(p.current_xp, 25);
}

#[test]
fn every_positive_award_counts_one_task() {
    let mut p = UserProgress::new();
    let start = p.total_tasks_completed;
    for amount in [1, 50, 99, 10] {
        p.award(amount);
    }
    assert_eq!(p.total_tasks_completed, start + 4);
}

#[tokio::test]
async fn study_plan_awards_fifteen_per_step() {
    let (mut app, mut rx) = app_with(ScriptedCollaborator::new(5, &[]));
    app.set_view(View::Study);
    assert_eq!(app.create_plan("  "), Err(FlowError::EmptyGoal));
    assert_ok!(app.create_plan("Rust lifetimes"));

    let notices = settle(&mut app, &mut rx).await;
    assert!(matches!(&notices[..], [Notice::StudyPlanReady(plan)] if plan.steps.len() == 5));

    let tasks_before = app.progress().total_tasks_completed;
    for i in 0..5 {
        assert!(matches!(app.toggle_step(i), Ok(StepToggle::Completed(a)) if a.amount == 15));
    }
    assert_eq!(app.progress().current_xp, 75);
    assert_eq!(app.progress().total_tasks_completed, tasks_before + 5);
    assert!(app.study().planner.all_complete());
    assert_eq!(app.study().planner.completion_xp(), 75);
}

#[tokio::test]
async fn social_bonus_needs_score_above_seventy() {
    let (mut app, mut rx) = app_with(ScriptedCollaborator::new(3, &[70.0, 71.0]));
    app.set_view(View::Social);
    assert_ok!(app.start_scenario(1));

    assert_ok!(app.send_message("Dear professor,"));
    let notices = settle(&mut app, &mut rx).await;
    assert!(matches!(&notices[..], [Notice::SocialReply { award: None, .. }]));
    assert_eq!(app.progress().current_xp, 0);

    assert_ok!(app.send_message("Could I have two more days?"));
    let notices = settle(&mut app, &mut rx).await;
    assert!(matches!(&notices[..], [Notice::SocialReply { award: Some(a), .. }] if a.amount == 10));
    assert_eq!(app.progress().current_xp, 10);
    assert_eq!(app.social().transcript().len(), 5);
}

#[tokio::test]
async fn completed_mission_returns_to_no_missions() {
    let (mut app, mut rx) = app_with(ScriptedCollaborator::new(3, &[]));
    app.set_view(View::Quest);
    assert_ok!(app.request_missions());
    assert_eq!(app.request_missions(), Err(FlowError::Busy));
    settle(&mut app, &mut rx).await;

    assert_eq!(app.select_mission(2).unwrap(), "Tier 1 mission 3");
    let (mission, award) = app.complete_mission().unwrap();
    assert_eq!(mission, "Tier 1 mission 3");
    assert_eq!(award.amount, 50);
    assert_eq!(app.progress().current_xp, 50);
    assert_eq!(app.quest().state(), &QuestState::NoMissions);
    assert_err!(app.select_mission(0));
}

#[tokio::test]
async fn completing_a_task_brings_praise() {
    let (mut app, mut rx) = app_with(ScriptedCollaborator::new(3, &[]));
    app.select_mood(Mood::Tired);
    app.set_energy(2);
    assert_ok!(app.generate_routine());
    let notices = settle(&mut app, &mut rx).await;
    assert!(matches!(&notices[..], [Notice::RoutineReady(items)] if items[0] == "tired task at energy 2"));

    let award = app.complete_task(1).unwrap().unwrap();
    assert_eq!(award.amount, 20);
    let notices = settle(&mut app, &mut rx).await;
    assert_eq!(notices, vec![Notice::Praise("You did it: Make the bed".to_string())]);
}

#[tokio::test]
async fn failing_collaborator_yields_every_fallback() {
    let coach = Coach::new(Arc::new(FailingCollaborator));

    assert_eq!(coach.routine(Mood::Down, 1).await, fallback::routine());
    assert_eq!(coach.study_breakdown("anything").await, fallback::study_plan());
    assert_eq!(coach.social_reply("cafe", &[], "hi").await, fallback::social_reply());
    assert_eq!(coach.praise("task").await, fallback::PRAISE);
    assert_eq!(coach.grounding_tip().await, fallback::GROUNDING_TIP);
    assert_eq!(coach.comfort_message("Mom", "").await, fallback::COMFORT_MESSAGE);
    assert_eq!(coach.outdoor_missions(4).await, fallback::outdoor_missions());
}

#[tokio::test]
async fn offline_flows_never_stall() {
    let (mut app, mut rx) = app_with(OfflineCollaborator);

    app.select_mood(Mood::Great);
    assert_ok!(app.generate_routine());
    assert_eq!(settle(&mut app, &mut rx).await, vec![Notice::RoutineReady(fallback::routine())]);

    app.set_view(View::Study);
    assert_ok!(app.create_plan("Finish the essay"));
    assert_eq!(settle(&mut app, &mut rx).await, vec![Notice::StudyPlanReady(fallback::study_plan())]);

    app.set_view(View::Social);
    assert_ok!(app.start_scenario(0));
    assert_ok!(app.send_message("Hello"));
    let notices = settle(&mut app, &mut rx).await;
    // Fallback score of 50 earns nothing
    assert!(matches!(&notices[..], [Notice::SocialReply { award: None, feedback, .. }] if feedback.score == 50.0));

    app.set_view(View::Quest);
    assert_ok!(app.request_missions());
    assert_eq!(settle(&mut app, &mut rx).await, vec![Notice::MissionsOffered(fallback::outdoor_missions())]);
}
