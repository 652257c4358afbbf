//! Prompt builders and output schemas for each request shape

use serde_json::{json, Value};

use super::llm::OutputShape;
use crate::types::Mood;

pub fn routine(mood: Mood, energy: u8, language: &str) -> String {
    format!(
        "The user feels {} and has an energy level of {}/10.\n\
         Suggest 3 very small, low-barrier, actionable micro-tasks to help them start their day or feel better.\n\
         Keep tasks simple (e.g., \"Drink a glass of water\", \"Open the window\").\n\
         Respond in {}.\n\
         Return JSON with the tasks in an \"items\" array of strings.",
        mood.as_str(), energy, language
    )
}

pub fn study_breakdown(goal: &str, language: &str) -> String {
    format!(
        "The user wants to study: \"{}\".\n\
         Break this down into 3-4 concrete, small, manageable steps that can be done in 20-30 minutes.\n\
         Be encouraging. Respond in {}.\n\
         Return JSON with a short encouraging \"message\" and the \"steps\" array.",
        goal, language
    )
}

/// System instruction for the social simulation
pub fn social_system(scenario: &str, language: &str) -> String {
    format!(
        "You are a helpful social skills coach running a simulation.\n\
         Current Scenario: {}.\n\n\
         1. Reply to the user as the character in the scenario naturally in {}.\n\
         2. Provide a 'feedback' object with a politeness/appropriateness score (1-100) and a brief tip in {}.\n\n\
         Return JSON structure: {{ \"reply\": string, \"feedback\": {{ \"score\": number, \"advice\": string }} }}",
        scenario, language, language
    )
}

pub fn social_turn(user_message: &str) -> String {
    format!("User said: \"{}\". Respond as the character and evaluate.", user_message)
}

pub fn praise(task: &str, language: &str) -> String {
    format!(
        "The user just achieved a micro-success: \"{}\".\n\
         Give a short, warm, enthusiastic one-sentence praise to boost their dopamine in {}. Use emojis.",
        task, language
    )
}

pub fn grounding_tip(language: &str) -> String {
    format!(
        "The user is feeling mentally down/overwhelmed. \
         Provide one gentle, 1-minute grounding technique or comforting thought in {}.",
        language
    )
}

pub fn comfort_message(recipient: &str, context: &str, language: &str) -> String {
    format!(
        "The user is having a hard time and wants to send a message to \"{}\".\n\
         Context: \"{}\".\n\
         Write a polite, warm, and appropriate message in {} that the user can copy and send.\n\
         It should not be too dramatic, just honest and asking for connection or letting them know they need rest.",
        recipient, context, language
    )
}

pub fn outdoor_missions(level: u32, language: &str) -> String {
    format!(
        "Suggest 3 micro-missions for a user who finds it hard to go outside (hikikomori/resting).\n\
         Difficulty Level: {} (1 is extremely easy, like opening a window. 5 is going to a store).\n\n\
         Examples:\n\
         Level 1: \"Open the front door for 10 seconds\", \"Look at the sky from the balcony\"\n\
         Level 3: \"Walk to the convenience store\", \"Take a picture of a flower outside\"\n\n\
         Respond in {}. Return JSON with the missions in an \"items\" array of strings.",
        level, language
    )
}

/// `{"items": [string]}` output; strict structured outputs need an object root
pub fn string_list_shape(name: &'static str) -> OutputShape {
    OutputShape::Json {
        name,
        schema: object_schema(json!({
            "items": { "type": "array", "items": { "type": "string" } }
        })),
    }
}

pub fn study_plan_shape() -> OutputShape {
    OutputShape::Json {
        name: "study_plan",
        schema: object_schema(json!({
            "message": { "type": "string" },
            "steps": { "type": "array", "items": { "type": "string" } }
        })),
    }
}

pub fn social_reply_shape() -> OutputShape {
    OutputShape::Json {
        name: "social_reply",
        schema: object_schema(json!({
            "reply": { "type": "string" },
            "feedback": object_schema(json!({
                "score": { "type": "number" },
                "advice": { "type": "string" }
            }))
        })),
    }
}

fn object_schema(properties: Value) -> Value {
    let required: Vec<Value> = properties
        .as_object()
        .map(|o| o.keys().cloned().map(Value::String).collect())
        .unwrap_or_default();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routine_prompt_mentions_inputs() {
        let p = routine(Mood::Tired, 4, "English");
        assert!(p.contains("feels tired"));
        assert!(p.contains("4/10"));
        assert!(p.contains("Respond in English"));
    }

    #[test]
    fn test_outdoor_prompt_carries_level() {
        assert!(outdoor_missions(3, "Korean").contains("Difficulty Level: 3"));
    }

    #[test]
    fn test_string_list_has_object_root() {
        let OutputShape::Json { name, schema } = string_list_shape("routine") else {
            panic!("expected json shape");
        };
        assert_eq!(name, "routine");
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["items"]));
        assert_eq!(schema["properties"]["items"]["type"], "array");
        assert!(routine(Mood::Okay, 5, "English").contains("\"items\""));
    }

    #[test]
    fn test_object_schema_requires_every_property() {
        let OutputShape::Json { schema, .. } = social_reply_shape() else {
            panic!("expected json shape");
        };
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 2);
        assert_eq!(schema["properties"]["feedback"]["required"].as_array().unwrap().len(), 2);
    }
}
