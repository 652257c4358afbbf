//! Progression engine - experience, levels and the growth garden
//!
//! `UserProgress` is the single owner of leveling state. Every feature panel
//! reports completed work through [`UserProgress::award`]; nothing else
//! computes leveling math.

use serde::{Deserialize, Serialize};

/// XP for a dashboard micro-task
pub const TASK_XP: i64 = 20;
/// XP for each completed study step
pub const STUDY_STEP_XP: i64 = 15;
/// XP for finishing a focus session
pub const FOCUS_SESSION_XP: i64 = 50;
/// XP for a well-rated social simulation turn
pub const SOCIAL_TURN_XP: i64 = 10;
/// Feedback score that must be exceeded to earn [`SOCIAL_TURN_XP`]
pub const SOCIAL_SCORE_THRESHOLD: f64 = 70.0;
/// XP for completing an outdoor mission
pub const OUTDOOR_MISSION_XP: i64 = 50;

/// Threshold multiplier applied on each level-up
const LEVEL_CURVE: f64 = 1.2;

/// Process-lifetime progression state for the single local user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub level: u32,
    /// XP toward the next level. Negative awards are applied as-is and
    /// may take this below zero.
    pub current_xp: i64,
    pub next_level_xp: i64,
    /// Display only; nothing updates it yet
    pub streak: u32,
    pub total_tasks_completed: u64,
    /// Difficulty tier for outdoor missions
    pub outdoor_level: u32,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            next_level_xp: 100,
            streak: 3,
            total_tasks_completed: 12,
            outdoor_level: 1,
        }
    }
}

/// What a single award did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwardOutcome {
    pub amount: i64,
    pub leveled_up: bool,
    pub level: u32,
}

impl UserProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply experience, leveling up at most once per call.
    ///
    /// Excess XP carries into the new level and the threshold grows by
    /// `floor(threshold * 1.2)`. Only positive amounts count as a completed
    /// task.
    pub fn award(&mut self, amount: i64) -> AwardOutcome {
        self.current_xp = self.current_xp.saturating_add(amount);

        let mut leveled_up = false;
        if self.current_xp >= self.next_level_xp {
            self.level += 1;
            self.current_xp -= self.next_level_xp;
            self.next_level_xp = (self.next_level_xp as f64 * LEVEL_CURVE).floor() as i64;
            leveled_up = true;
        }

        if amount > 0 {
            self.total_tasks_completed += 1;
        }

        if leveled_up {
            tracing::info!("Level up: now level {} (next at {} XP)", self.level, self.next_level_xp);
        } else {
            tracing::debug!("Awarded {} XP ({}/{})", amount, self.current_xp, self.next_level_xp);
        }

        AwardOutcome { amount, leveled_up, level: self.level }
    }

    /// Progress bar fill, capped at 100
    pub fn progress_percent(&self) -> f64 {
        if self.next_level_xp <= 0 {
            return 100.0;
        }
        (self.current_xp as f64 / self.next_level_xp as f64 * 100.0).min(100.0)
    }

    /// Growth garden view of this progress
    pub fn garden(&self) -> Garden {
        Garden::for_level(self.level)
    }
}

/// Tree rendering parameters derived from the level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Garden {
    /// Tree scale, grows 0.1 per level up to 2.5
    pub scale: f64,
    /// Extra crown appears past level 2
    pub crown: bool,
    /// Side branches appear past level 5
    pub branches: bool,
}

impl Garden {
    pub fn for_level(level: u32) -> Self {
        Self {
            scale: (1.0 + level as f64 * 0.1).min(2.5),
            crown: level > 2,
            branches: level > 5,
        }
    }

    /// Small ASCII tree for the terminal
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if self.crown {
            lines.push("      (@@)      ".to_string());
        }
        if self.branches {
            lines.push("  (@) (@@@@) (@)".to_string());
        }
        lines.push("    (@@@@@@)    ".to_string());
        lines.push("   (@@) (@@)    ".to_string());
        let stem = ((self.scale - 1.0) * 4.0).round().max(1.0) as usize;
        for _ in 0..stem {
            lines.push("       ||       ".to_string());
        }
        lines.push("    \\______/    ".to_string());
        lines.join("\n")
    }
}

/// Sample weekly activity series shown under the garden
pub const WEEKLY_ACTIVITY: [(&str, u32); 7] = [
    ("Mon", 40),
    ("Tue", 30),
    ("Wed", 20),
    ("Thu", 60),
    ("Fri", 50),
    ("Sat", 80),
    ("Sun", 90),
];

/// Horizontal bar chart of [`WEEKLY_ACTIVITY`]
pub fn render_weekly_activity() -> String {
    WEEKLY_ACTIVITY
        .iter()
        .map(|(day, xp)| format!("{} {:<9} {}", day, "#".repeat((*xp / 10) as usize), xp))
        .collect::<Vec<_>>()
        .join("\n")
}
