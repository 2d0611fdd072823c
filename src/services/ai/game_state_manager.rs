//! Game state manager.
//!
//! Seeds a murder mystery from the player's selections and asks the model to
//! fix the hidden ground truth (culprit, motive, alibis, weapon, timeline)
//! alongside a public summary the narrator can open with.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::services::ai::client::{
    GenerationClient, GenerationError, GenerationSettings, OutputSchema, StructuredRequest,
};

/// Player selections that seed a new game.
///
/// ```json
/// {
///   "setting": "Apartment Complex",
///   "suspectCount": 3,
///   "murderType": "Framed",
///   "twist": "None",
///   "conflictStructure": "Linear",
///   "killerSelectionLogic": "Based on Opportunity",
///   "victimArchetype": "Powerful",
///   "timeOfDay": "Morning",
///   "locationCount": "Small",
///   "difficultyLevel": "Easy"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSessionConfig {
    pub setting: String,
    pub suspect_count: u32,
    pub murder_type: String,
    pub twist: String,
    pub conflict_structure: String,
    pub killer_selection_logic: String,
    pub victim_archetype: String,
    pub time_of_day: String,
    pub location_count: String,
    pub difficulty_level: String,
}

/// What the game state manager hands to the narrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateSummary {
    /// What the narrator may use to begin the story.
    pub public_info: String,
    /// The hidden truth, kept for later turns.
    pub internal_state: String,
}

pub const SCHEMA_NAME: &str = "game_state_summary";

pub(crate) const START_PROMPT: &str = "Start the game";

fn output_schema() -> OutputSchema {
    OutputSchema {
        name: SCHEMA_NAME,
        schema: json!({
            "type": "object",
            "properties": {
                "publicInfo": { "type": "string" },
                "internalState": { "type": "string" },
            },
            "required": ["publicInfo", "internalState"],
            "additionalProperties": false,
        }),
    }
}

fn system_prompt(config: &GameSessionConfig) -> Result<String, GenerationError> {
    let seed = serde_json::to_string_pretty(config)?;
    Ok(format!(
        "You are the game state manager of a murder mystery simulator.

Your job is to:
1. Create a full canonical story world using the config below.
2. Internally decide:
   - Who is the killer
   - What their motive was
   - What the key alibis, murder weapon, and timeline are
3. Maintain this truth internally.
4. Only reveal information when prompted by player actions.

Use this JSON config to seed the game:

{seed}

When ready, respond with a summary for the narrator ONLY. Include:
- Setting summary
- List of characters (with 1-line bios)
- Initial event summary (e.g., who was found dead, where)
- Any key truths the player should NOT yet know (e.g., who the killer is, hidden accomplice, etc.)
- Total clues in a structured format
- Threshold of clues that need to be found for the case to be considered solvable

Return your output in two parts as JSON:
1. publicInfo: what the narrator can use to begin the story
2. internalState: the hidden truth (for future turns)
"
    ))
}

/// Establish the ground truth for a new game.
pub async fn create_game_session(
    client: &dyn GenerationClient,
    settings: &GenerationSettings,
    config: &GameSessionConfig,
) -> Result<GameStateSummary, GenerationError> {
    tracing::info!(setting = %config.setting, suspects = config.suspect_count, "Creating game session");

    let output = client
        .generate(StructuredRequest {
            settings: settings.clone(),
            system: system_prompt(config)?,
            prompt: START_PROMPT.to_string(),
            schema: output_schema(),
        })
        .await?;

    serde_json::from_value(output).map_err(|e| GenerationError::schema(SCHEMA_NAME, e.to_string()))
}
