//! Narrator.
//!
//! Turns the game state manager's summary into the opening scene: markdown
//! story text, two to four follow-up actions, and the clue log.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::services::ai::client::{
    GenerationClient, GenerationError, GenerationSettings, OutputSchema, StructuredRequest,
};
use crate::services::ai::game_state_manager::{GameStateSummary, START_PROMPT};

pub const SCHEMA_NAME: &str = "narrator_turn";

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;

/// A follow-up action offered to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOption {
    pub id: String,
    pub description: String,
}

/// A clue the player has uncovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClueEntry {
    pub id: String,
    pub description: String,
}

/// One narrated turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarratorTurn {
    /// Markdown story text.
    pub story: String,
    pub options: Vec<ActionOption>,
    pub clue_log: Vec<ClueEntry>,
}

impl NarratorTurn {
    // Strict schema mode has no array length bounds.
    fn check(self) -> Result<Self, GenerationError> {
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&self.options.len()) {
            return Err(GenerationError::schema(
                SCHEMA_NAME,
                format!(
                    "expected {MIN_OPTIONS}-{MAX_OPTIONS} options, got {}",
                    self.options.len()
                ),
            ));
        }
        Ok(self)
    }
}

fn id_description_array() -> serde_json::Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "description": { "type": "string" },
            },
            "required": ["id", "description"],
            "additionalProperties": false,
        },
    })
}

fn output_schema() -> OutputSchema {
    OutputSchema {
        name: SCHEMA_NAME,
        schema: json!({
            "type": "object",
            "properties": {
                "story": { "type": "string" },
                "options": id_description_array(),
                "clue_log": id_description_array(),
            },
            "required": ["story", "options", "clue_log"],
            "additionalProperties": false,
        }),
    }
}

fn system_prompt(state: &GameStateSummary) -> Result<String, GenerationError> {
    let setup = serde_json::to_string_pretty(state)?;
    Ok(format!(
        "You are the narrator and interaction manager for a turn-based murder mystery game. \
Your goal is to immerse the player in an interactive mystery where they gather clues and solve the murder.

Your role:
- Introduce the story with a captivating and suspenseful narrative based on the provided setup.
- Allow the player to explore rooms, interact with characters, and gather clues while maintaining an air of mystery.
- For each player action, confer with the GSM (Game State Manager) for outcome determination.
- Narrate each scene with intrigue, ensuring an engaging and immersive experience.
- Keep meticulous track of clues unearthed and maintain a clue log.
- Provide {MIN_OPTIONS}-{MAX_OPTIONS} follow-up actions or options, while allowing for player-typed custom commands if desired.

## Story Setup

Input: {setup}

- Only reveal publicInfo to the player; keep other JSON details confidential.

## Begin the Game

Start by setting an intriguing scene, explaining the player's location at the game's start. \
Conclude the introduction by inviting the player to take action and providing actionable options.

# Output Format

The story field is markdown with proper formatting.
The options field lists the player's action options, each with an id (e.g. \"option_1\") and a description.
The clue_log field lists every clue found so far, each with an id and a description.

# Notes

- Emphasize narrative elements that build mystery and suspense throughout gameplay.
- Adjust narration based on player actions to maintain an engaging mystery experience."
    ))
}

/// Narrate the opening scene for a freshly created game.
pub async fn start_narration(
    client: &dyn GenerationClient,
    settings: &GenerationSettings,
    state: &GameStateSummary,
) -> Result<NarratorTurn, GenerationError> {
    let output = client
        .generate(StructuredRequest {
            settings: settings.clone(),
            system: system_prompt(state)?,
            prompt: START_PROMPT.to_string(),
            schema: output_schema(),
        })
        .await?;

    let turn: NarratorTurn = serde_json::from_value(output)
        .map_err(|e| GenerationError::schema(SCHEMA_NAME, e.to_string()))?;
    turn.check()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ai::game_state_manager::tests::Recording;

    fn state() -> GameStateSummary {
        GameStateSummary {
            public_info: "The landlord lies dead in the lobby.".into(),
            internal_state: "The tenant in 2A did it.".into(),
        }
    }

    fn turn_with_options(count: usize) -> serde_json::Value {
        let options: Vec<_> = (1..=count)
            .map(|i| json!({ "id": format!("option_{i}"), "description": "Look around" }))
            .collect();
        json!({
            "story": "# The Lobby\nRain hammers the glass.",
            "options": options,
            "clue_log": [{ "id": "c1", "description": "A wet umbrella" }],
        })
    }

    #[tokio::test]
    async fn test_valid_turn_passes_through() {
        let client = Recording::new(turn_with_options(3));
        let turn = start_narration(&client, &GenerationSettings::default(), &state())
            .await
            .unwrap();

        assert_eq!(turn.options.len(), 3);
        assert_eq!(turn.clue_log[0].description, "A wet umbrella");

        let request = client.last.lock().unwrap().take().unwrap();
        assert!(request.system.contains("The landlord lies dead in the lobby."));
        assert_eq!(
            request.schema.schema["required"],
            json!(["story", "options", "clue_log"])
        );
    }

    #[tokio::test]
    async fn test_option_count_is_enforced() {
        for count in [1, 5] {
            let client = Recording::new(turn_with_options(count));
            let err = start_narration(&client, &GenerationSettings::default(), &state())
                .await
                .unwrap_err();
            assert!(matches!(err, GenerationError::Schema { .. }), "count {count}");
        }
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let client = Recording::new(json!({ "story": "..." }));
        assert!(start_narration(&client, &GenerationSettings::default(), &state())
            .await
            .is_err());
    }
}
