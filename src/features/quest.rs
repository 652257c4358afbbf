//! Exploration quest - small outdoor missions

use super::FlowError;
use crate::coach::Coach;
use crate::progress::{AwardOutcome, UserProgress, OUTDOOR_MISSION_XP};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QuestState {
    #[default]
    NoMissions,
    Offered(Vec<String>),
    /// Only the chosen mission survives selection
    Active(String),
}

#[derive(Debug, Clone, Default)]
pub struct ExplorationQuest {
    state: QuestState,
    loading: bool,
}

impl ExplorationQuest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_request(&mut self) -> Result<(), FlowError> {
        if self.loading {
            return Err(FlowError::Busy);
        }
        self.loading = true;
        Ok(())
    }

    pub fn finish_request(&mut self, missions: Vec<String>) -> &QuestState {
        self.loading = false;
        self.state = QuestState::Offered(missions);
        &self.state
    }

    pub async fn request_missions(&mut self, outdoor_level: u32, coach: &Coach) -> Result<&QuestState, FlowError> {
        self.begin_request()?;
        let missions = coach.outdoor_missions(outdoor_level).await;
        Ok(self.finish_request(missions))
    }

    /// Pick one offered mission by 0-based index; the rest are discarded
    pub fn select(&mut self, index: usize) -> Result<String, FlowError> {
        let QuestState::Offered(missions) = &mut self.state else {
            return Err(FlowError::NoMissionsOffered);
        };
        if index >= missions.len() {
            return Err(FlowError::NoSuchMission(index + 1));
        }
        let mission = missions.swap_remove(index);
        self.state = QuestState::Active(mission.clone());
        Ok(mission)
    }

    /// Give up on the active mission; the offer list does not come back
    pub fn abandon(&mut self) -> Result<(), FlowError> {
        if !matches!(self.state, QuestState::Active(_)) {
            return Err(FlowError::NoActiveMission);
        }
        self.state = QuestState::NoMissions;
        Ok(())
    }

    /// Finish the active mission and award the outdoor bonus
    pub fn complete(&mut self, progress: &mut UserProgress) -> Result<(String, AwardOutcome), FlowError> {
        match std::mem::take(&mut self.state) {
            QuestState::Active(mission) => {
                let award = progress.award(OUTDOOR_MISSION_XP);
                tracing::info!("Outdoor mission completed: {}", mission);
                Ok((mission, award))
            }
            other => {
                self.state = other;
                Err(FlowError::NoActiveMission)
            }
        }
    }

    pub fn state(&self) -> &QuestState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offered() -> Vec<String> {
        vec!["Open the door".into(), "Look at the sky".into(), "Walk 10 steps".into()]
    }

    #[test]
    fn test_select_narrows_to_one_mission() {
        let mut q = ExplorationQuest::new();
        assert_eq!(q.select(0), Err(FlowError::NoMissionsOffered));
        q.begin_request().unwrap();
        assert_eq!(q.begin_request(), Err(FlowError::Busy));
        q.finish_request(offered());

        assert_eq!(q.select(3), Err(FlowError::NoSuchMission(4)));
        assert_eq!(q.select(1), Ok("Look at the sky".to_string()));
        assert_eq!(q.state(), &QuestState::Active("Look at the sky".into()));
    }

    #[test]
    fn test_complete_awards_and_resets() {
        let mut p = UserProgress::new();
        let mut q = ExplorationQuest::new();
        q.finish_request(offered());
        q.select(0).unwrap();

        let (mission, award) = q.complete(&mut p).unwrap();
        assert_eq!(mission, "Open the door");
        assert_eq!(award.amount, 50);
        assert_eq!(p.current_xp, 50);
        assert_eq!(q.state(), &QuestState::NoMissions);
        assert_eq!(q.complete(&mut p), Err(FlowError::NoActiveMission));
    }

    #[test]
    fn test_abandon_returns_to_no_missions() {
        let mut q = ExplorationQuest::new();
        q.finish_request(offered());
        assert_eq!(q.abandon(), Err(FlowError::NoActiveMission));
        q.select(2).unwrap();
        q.abandon().unwrap();
        assert_eq!(q.state(), &QuestState::NoMissions);
    }

    #[test]
    fn test_complete_without_active_keeps_offer() {
        let mut p = UserProgress::new();
        let mut q = ExplorationQuest::new();
        q.finish_request(offered());
        assert!(q.complete(&mut p).is_err());
        assert!(matches!(q.state(), QuestState::Offered(m) if m.len() == 3));
    }
}
