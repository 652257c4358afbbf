//! Fixed content used when a collaborator call fails

use crate::types::{Feedback, SocialReply, StudyPlan};

pub const ROUTINE: [&str; 3] = [
    "Drink a glass of water",
    "Stretch for one minute",
    "Open the window and take a deep breath",
];

pub const STUDY_MESSAGE: &str = "Let's start small!";
pub const STUDY_STEPS: [&str; 3] = [
    "Open your book or laptop",
    "Read the table of contents",
    "Write down one key concept",
];

pub const SOCIAL_REPLY: &str = "I see. (simulation unavailable)";
pub const SOCIAL_SCORE: f64 = 50.0;
pub const SOCIAL_ADVICE: &str = "Try saying it a little more specifically. (offline mode)";

pub const PRAISE: &str = "Well done! 🌱";

pub const GROUNDING_TIP: &str = "Focus on your breathing for just 10 seconds. You are safe.";

pub const COMFORT_MESSAGE: &str = "I've been having a bit of a hard time lately, so I'm sorry for the slow reply. \
I'll reach out again once I'm feeling better. Thank you for understanding.";

pub const OUTDOOR_MISSIONS: [&str; 3] = [
    "Leave the front door open for 3 seconds",
    "Check the mailbox and come back",
    "Walk 10 steps outside your door",
];

pub fn routine() -> Vec<String> {
    ROUTINE.iter().map(|s| s.to_string()).collect()
}

pub fn study_plan() -> StudyPlan {
    StudyPlan {
        intro_message: STUDY_MESSAGE.to_string(),
        steps: STUDY_STEPS.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn social_reply() -> SocialReply {
    SocialReply {
        reply: SOCIAL_REPLY.to_string(),
        feedback: Feedback { score: SOCIAL_SCORE, advice: SOCIAL_ADVICE.to_string() },
    }
}

pub fn outdoor_missions() -> Vec<String> {
    OUTDOOR_MISSIONS.iter().map(|s| s.to_string()).collect()
}
