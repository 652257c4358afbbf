//! Dashboard - mood check-in and micro-task routines

use std::time::Duration;

use super::FlowError;
use crate::coach::Coach;
use crate::progress::{AwardOutcome, UserProgress, TASK_XP};
use crate::types::{MicroTask, Mood};

/// How long a praise message stays on screen
pub const PRAISE_DURATION: Duration = Duration::from_secs(4);
/// Pause before offering the rescue panel for a negative mood
pub const RESCUE_OFFER_DELAY: Duration = Duration::from_millis(500);

pub const DEFAULT_ENERGY: u8 = 5;

/// Parameters for a routine request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutineRequest {
    pub mood: Mood,
    pub energy: u8,
}

/// Result of completing a task
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTask {
    pub task_id: String,
    pub text: String,
    pub award: AwardOutcome,
}

#[derive(Debug, Clone, PartialEq)]
struct PraiseToast {
    seq: u64,
    text: String,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    mood: Option<Mood>,
    energy: u8,
    loading: bool,
    /// Routine shown instead of the mood checker
    generated: bool,
    tasks: Vec<MicroTask>,
    praise: Option<PraiseToast>,
    praise_seq: u64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            mood: None,
            energy: DEFAULT_ENERGY,
            loading: false,
            generated: false,
            tasks: Vec::new(),
            praise: None,
            praise_seq: 0,
        }
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh check-in state that keeps the current task list
    pub fn remount(&mut self) {
        let tasks = std::mem::take(&mut self.tasks);
        *self = Self { tasks, praise_seq: self.praise_seq, ..Self::default() };
    }

    /// Record the mood; returns whether to offer the rescue panel
    pub fn select_mood(&mut self, mood: Mood) -> bool {
        self.mood = Some(mood);
        mood.needs_rescue_offer()
    }

    /// Set energy, clamped to 1-10
    pub fn set_energy(&mut self, energy: u8) -> u8 {
        self.energy = energy.clamp(1, 10);
        self.energy
    }

    pub fn begin_routine(&mut self) -> Result<RoutineRequest, FlowError> {
        if self.loading {
            return Err(FlowError::Busy);
        }
        let mood = self.mood.ok_or(FlowError::NoMoodSelected)?;
        self.loading = true;
        Ok(RoutineRequest { mood, energy: self.energy })
    }

    /// Replace the task list with a new batch
    pub fn finish_routine(&mut self, items: Vec<String>) -> &[MicroTask] {
        self.tasks = items.into_iter().map(|text| MicroTask::new(text, TASK_XP)).collect();
        self.loading = false;
        self.generated = true;
        &self.tasks
    }

    pub async fn generate_routine(&mut self, coach: &Coach) -> Result<&[MicroTask], FlowError> {
        let request = self.begin_routine()?;
        let items = coach.routine(request.mood, request.energy).await;
        Ok(self.finish_routine(items))
    }

    /// Back to the mood checker; the current tasks stay listed
    pub fn new_routine(&mut self) {
        self.generated = false;
    }

    /// Complete the task at a 0-based index.
    ///
    /// Completion is one-way: an already completed task yields `Ok(None)`
    /// and awards nothing.
    pub fn complete_task(
        &mut self,
        index: usize,
        progress: &mut UserProgress,
    ) -> Result<Option<CompletedTask>, FlowError> {
        let task = self.tasks.get_mut(index).ok_or(FlowError::NoSuchTask(index + 1))?;
        if task.completed {
            return Ok(None);
        }
        task.completed = true;
        let award = progress.award(task.xp_value);
        Ok(Some(CompletedTask {
            task_id: task.id.clone(),
            text: task.text.clone(),
            award,
        }))
    }

    /// Show a praise message; returns the token to dismiss it with
    pub fn show_praise(&mut self, text: String) -> u64 {
        self.praise_seq += 1;
        self.praise = Some(PraiseToast { seq: self.praise_seq, text });
        self.praise_seq
    }

    /// Dismiss the praise shown under `seq`, if it is still the current one
    pub fn dismiss_praise(&mut self, seq: u64) -> bool {
        if self.praise.as_ref().map(|p| p.seq) == Some(seq) {
            self.praise = None;
            true
        } else {
            false
        }
    }

    pub fn praise(&self) -> Option<&str> {
        self.praise.as_ref().map(|p| p.text.as_str())
    }

    pub fn mood(&self) -> Option<Mood> {
        self.mood
    }

    pub fn energy(&self) -> u8 {
        self.energy
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn tasks(&self) -> &[MicroTask] {
        &self.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::{MockCollaborator, fallback, CollaboratorError};
    use std::sync::Arc;

    fn routine_of(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_negative_moods_offer_rescue() {
        let mut d = Dashboard::new();
        assert!(!d.select_mood(Mood::Great));
        assert!(d.select_mood(Mood::Anxious));
        assert!(d.select_mood(Mood::Down));
        assert_eq!(d.mood(), Some(Mood::Down));
    }

    #[test]
    fn test_energy_is_clamped() {
        let mut d = Dashboard::new();
        assert_eq!(d.energy(), 5);
        assert_eq!(d.set_energy(0), 1);
        assert_eq!(d.set_energy(42), 10);
    }

    #[test]
    fn test_routine_requires_mood_and_blocks_resubmission() {
        let mut d = Dashboard::new();
        assert_eq!(d.begin_routine(), Err(FlowError::NoMoodSelected));
        d.select_mood(Mood::Tired);
        d.set_energy(3);
        assert_eq!(d.begin_routine(), Ok(RoutineRequest { mood: Mood::Tired, energy: 3 }));
        assert_eq!(d.begin_routine(), Err(FlowError::Busy));

        let tasks = d.finish_routine(routine_of(&["a", "b", "c"]));
        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| t.xp_value == 20 && !t.completed));
        assert!(d.is_generated());
        assert!(!d.is_loading());
    }

    #[test]
    fn test_complete_task_is_one_way() {
        let mut d = Dashboard::new();
        let mut p = UserProgress::new();
        d.finish_routine(routine_of(&["water", "stretch", "window"]));

        let done = d.complete_task(1, &mut p).unwrap().unwrap();
        assert_eq!(done.text, "stretch");
        assert_eq!(p.current_xp, 20);
        assert_eq!(p.total_tasks_completed, 13);

        assert_eq!(d.complete_task(1, &mut p), Ok(None));
        assert_eq!(p.current_xp, 20);
        assert_eq!(d.complete_task(3, &mut p), Err(FlowError::NoSuchTask(4)));
    }

    #[test]
    fn test_praise_dismiss_only_current() {
        let mut d = Dashboard::new();
        let first = d.show_praise("Nice!".into());
        let second = d.show_praise("Great!".into());
        assert!(!d.dismiss_praise(first));
        assert_eq!(d.praise(), Some("Great!"));
        assert!(d.dismiss_praise(second));
        assert_eq!(d.praise(), None);
    }

    #[test]
    fn test_remount_keeps_tasks() {
        let mut d = Dashboard::new();
        d.select_mood(Mood::Okay);
        d.finish_routine(routine_of(&["a"]));
        d.remount();
        assert_eq!(d.tasks().len(), 1);
        assert_eq!(d.mood(), None);
        assert!(!d.is_generated());
    }

    #[tokio::test]
    async fn test_generate_routine_falls_back() {
        let mut mock = MockCollaborator::new();
        mock.expect_routine().returning(|_, _| Err(CollaboratorError::Empty));
        let coach = Coach::new(Arc::new(mock));

        let mut d = Dashboard::new();
        d.select_mood(Mood::Down);
        let texts: Vec<String> = d.generate_routine(&coach).await.unwrap().iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts, fallback::routine());
    }
}
