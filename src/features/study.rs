//! Study mate - focus timer and goal planner

use std::collections::BTreeSet;
use std::time::Duration;

use super::FlowError;
use crate::coach::Coach;
use crate::progress::{AwardOutcome, UserProgress, FOCUS_SESSION_XP, STUDY_STEP_XP};
use crate::types::StudyPlan;

/// Countdown granularity
pub const TICK: Duration = Duration::from_secs(1);

/// Countdown for one focus session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTimer {
    duration: u32,
    remaining: u32,
    running: bool,
}

impl FocusTimer {
    pub fn new(duration_secs: u32) -> Self {
        Self { duration: duration_secs, remaining: duration_secs, running: false }
    }

    /// Start if paused, pause if running. Returns whether it now runs.
    pub fn toggle(&mut self) -> Result<bool, FlowError> {
        if self.running {
            self.running = false;
        } else {
            if self.remaining == 0 {
                return Err(FlowError::TimerFinished);
            }
            self.running = true;
        }
        Ok(self.running)
    }

    /// Stop and return to the full duration
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining = self.duration;
    }

    /// Advance one second. Reaching zero stops the timer and awards the
    /// session bonus, which is returned.
    pub fn tick(&mut self, progress: &mut UserProgress) -> Option<AwardOutcome> {
        if !self.running || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self.remaining > 0 {
            return None;
        }
        self.running = false;
        tracing::info!("Focus session finished");
        Some(progress.award(FOCUS_SESSION_XP))
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// MM:SS
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

/// What toggling a step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepToggle {
    Completed(AwardOutcome),
    /// Marked undone again; XP already earned is kept
    Reopened,
}

/// Goal breakdown with per-step completion
#[derive(Debug, Clone, Default)]
pub struct StudyPlanner {
    loading: bool,
    plan: Option<StudyPlan>,
    completed: BTreeSet<usize>,
}

impl StudyPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the goal and enter loading; returns the trimmed goal
    pub fn begin_plan(&mut self, goal: &str) -> Result<String, FlowError> {
        if self.loading {
            return Err(FlowError::Busy);
        }
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(FlowError::EmptyGoal);
        }
        self.loading = true;
        Ok(goal.to_string())
    }

    /// Replace any previous plan
    pub fn finish_plan(&mut self, plan: StudyPlan) -> &StudyPlan {
        self.loading = false;
        self.completed.clear();
        self.plan.insert(plan)
    }

    pub async fn create_plan(&mut self, goal: &str, coach: &Coach) -> Result<&StudyPlan, FlowError> {
        let goal = self.begin_plan(goal)?;
        let plan = coach.study_breakdown(&goal).await;
        Ok(self.finish_plan(plan))
    }

    /// Toggle the step at a 0-based index; only the transition to done
    /// awards XP
    pub fn toggle_step(&mut self, index: usize, progress: &mut UserProgress) -> Result<StepToggle, FlowError> {
        let plan = self.plan.as_ref().ok_or(FlowError::NoStudyPlan)?;
        if index >= plan.steps.len() {
            return Err(FlowError::NoSuchStep(index + 1));
        }
        if self.completed.remove(&index) {
            Ok(StepToggle::Reopened)
        } else {
            self.completed.insert(index);
            Ok(StepToggle::Completed(progress.award(STUDY_STEP_XP)))
        }
    }

    /// Drop the current plan to enter a new goal
    pub fn clear(&mut self) {
        if !self.loading {
            self.plan = None;
            self.completed.clear();
        }
    }

    pub fn plan(&self) -> Option<&StudyPlan> {
        self.plan.as_ref()
    }

    pub fn is_step_done(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn all_complete(&self) -> bool {
        self.plan
            .as_ref()
            .map(|p| !p.steps.is_empty() && self.completed.len() == p.steps.len())
            .unwrap_or(false)
    }

    /// Summary figure shown once every step is done. Derived from the step
    /// count, not from the awards actually made.
    pub fn completion_xp(&self) -> i64 {
        self.plan.as_ref().map(|p| p.steps.len() as i64 * STUDY_STEP_XP).unwrap_or(0)
    }
}

/// Timer and planner shown together
#[derive(Debug, Clone)]
pub struct StudyMate {
    pub timer: FocusTimer,
    pub planner: StudyPlanner,
}

impl StudyMate {
    pub fn new(focus_secs: u32) -> Self {
        Self {
            timer: FocusTimer::new(focus_secs),
            planner: StudyPlanner::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(n: usize) -> StudyPlan {
        StudyPlan {
            intro_message: "You can do it".to_string(),
            steps: (1..=n).map(|i| format!("step {}", i)).collect(),
        }
    }

    #[test]
    fn test_timer_counts_down_and_awards_once() {
        let mut p = UserProgress::new();
        let mut t = FocusTimer::new(3);
        assert_eq!(t.display(), "00:03");

        // Paused timer ignores ticks
        assert_eq!(t.tick(&mut p), None);
        assert_eq!(t.remaining(), 3);

        assert_eq!(t.toggle(), Ok(true));
        assert_eq!(t.tick(&mut p), None);
        assert_eq!(t.tick(&mut p), None);
        let award = t.tick(&mut p).unwrap();
        assert_eq!(award.amount, 50);
        assert!(!t.is_running());
        assert_eq!(t.remaining(), 0);

        // Late ticks and restarts do nothing
        assert_eq!(t.tick(&mut p), None);
        assert_eq!(t.toggle(), Err(FlowError::TimerFinished));
        assert_eq!(p.current_xp, 50);
    }

    #[test]
    fn test_pause_resume_keeps_remaining() {
        let mut p = UserProgress::new();
        let mut t = FocusTimer::new(1500);
        t.toggle().unwrap();
        for _ in 0..10 {
            t.tick(&mut p);
        }
        assert_eq!(t.toggle(), Ok(false));
        t.tick(&mut p);
        assert_eq!(t.remaining(), 1490);
        assert_eq!(t.display(), "24:50");
        t.toggle().unwrap();
        t.tick(&mut p);
        assert_eq!(t.remaining(), 1489);
    }

    #[test]
    fn test_reset_restores_duration() {
        let mut p = UserProgress::new();
        let mut t = FocusTimer::new(1500);
        t.toggle().unwrap();
        t.tick(&mut p);
        t.reset();
        assert_eq!(t.remaining(), 1500);
        assert!(!t.is_running());
    }

    #[test]
    fn test_goal_must_not_be_blank() {
        let mut s = StudyPlanner::new();
        assert_eq!(s.begin_plan("   "), Err(FlowError::EmptyGoal));
        assert_eq!(s.begin_plan(" Learn hooks "), Ok("Learn hooks".to_string()));
        assert_eq!(s.begin_plan("again"), Err(FlowError::Busy));
    }

    #[test]
    fn test_each_step_awards_separately() {
        let mut p = UserProgress::new();
        let mut s = StudyPlanner::new();
        s.finish_plan(plan(4));
        for i in 0..4 {
            assert!(matches!(s.toggle_step(i, &mut p), Ok(StepToggle::Completed(_))));
        }
        assert!(s.all_complete());
        assert_eq!(s.completion_xp(), 60);
        assert_eq!(p.current_xp, 60);
        assert_eq!(p.total_tasks_completed, 16);
    }

    #[test]
    fn test_untoggle_keeps_xp_and_retoggle_awards_again() {
        let mut p = UserProgress::new();
        let mut s = StudyPlanner::new();
        s.finish_plan(plan(3));
        s.toggle_step(0, &mut p).unwrap();
        assert_eq!(s.toggle_step(0, &mut p), Ok(StepToggle::Reopened));
        assert_eq!(p.current_xp, 15);
        assert!(!s.is_step_done(0));
        s.toggle_step(0, &mut p).unwrap();
        assert_eq!(p.current_xp, 30);
    }

    #[test]
    fn test_new_plan_clears_completion() {
        let mut p = UserProgress::new();
        let mut s = StudyPlanner::new();
        assert_eq!(s.toggle_step(0, &mut p), Err(FlowError::NoStudyPlan));
        s.finish_plan(plan(2));
        s.toggle_step(1, &mut p).unwrap();
        assert_eq!(s.toggle_step(2, &mut p), Err(FlowError::NoSuchStep(3)));
        s.finish_plan(plan(2));
        assert!(!s.is_step_done(1));
        s.clear();
        assert!(s.plan().is_none());
    }
}
